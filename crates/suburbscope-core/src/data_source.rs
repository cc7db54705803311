//! Source contracts shared by the live provider client and the fixture store.
//!
//! # Failure taxonomy
//!
//! | Kind | Raised by | Resolver reaction |
//! |------|-----------|-------------------|
//! | [`SourceErrorKind::NotFoundUpstream`] | live client (4xx, empty payload) | fall back |
//! | [`SourceErrorKind::Unavailable`] | live client (5xx, timeout, network) | retry per policy, then fall back |
//! | [`SourceErrorKind::MalformedUpstreamPayload`] | live client, normalizer | fall back, logged at error level |
//! | [`SourceErrorKind::FixtureMissing`] | fixture store | terminal not-found |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::{ResolveOptions, ResourceKind, SuburbId};

/// Where a raw payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Live,
    Fixture,
}

impl SourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fixture => "fixture",
        }
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Un-normalized payload, tagged with the shape family it belongs to.
///
/// Never leaves the normalizer: everything downstream sees canonical records.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Provider(Value),
    Fixture(Value),
}

impl RawRecord {
    pub const fn source_kind(&self) -> SourceKind {
        match self {
            Self::Provider(_) => SourceKind::Live,
            Self::Fixture(_) => SourceKind::Fixture,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            Self::Provider(value) | Self::Fixture(value) => value,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Provider(value) | Self::Fixture(value) => value,
        }
    }
}

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    NotFoundUpstream,
    Unavailable,
    MalformedUpstreamPayload,
    FixtureMissing,
}

/// Structured source error used by resolver fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn not_found_upstream(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFoundUpstream,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedUpstreamPayload,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn fixture_missing(suburb: &SuburbId, kind: ResourceKind) -> Self {
        Self {
            kind: SourceErrorKind::FixtureMissing,
            message: format!("no fixture entry for '{suburb}' ({kind})"),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn is_contract_violation(&self) -> bool {
        matches!(self.kind, SourceErrorKind::MalformedUpstreamPayload)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFoundUpstream => "upstream.not_found",
            SourceErrorKind::Unavailable => "upstream.unavailable",
            SourceErrorKind::MalformedUpstreamPayload => "upstream.malformed_payload",
            SourceErrorKind::FixtureMissing => "fixture.missing",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Live third-party property data contract.
///
/// Callers must only invoke [`fetch`](PropertyDataSource::fetch) for suburbs
/// classified as live-eligible; implementations do not re-check eligibility.
/// Implementations must bound their own execution time and must not retry.
pub trait PropertyDataSource: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Fetches the provider-shaped payload for one resource of one suburb.
    ///
    /// # Errors
    ///
    /// - [`SourceErrorKind::NotFoundUpstream`] for 4xx answers or empty payloads
    /// - [`SourceErrorKind::Unavailable`] for 5xx, timeouts and transport failures
    /// - [`SourceErrorKind::MalformedUpstreamPayload`] when the body is not JSON
    fn fetch<'a>(
        &'a self,
        kind: ResourceKind,
        suburb: &'a SuburbId,
        options: &'a ResolveOptions,
    ) -> SourceFuture<'a, RawRecord>;

    /// Free-text suburb search; returns provider-shaped result items.
    fn search<'a>(&'a self, query: &'a str) -> SourceFuture<'a, Vec<Value>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(SourceError::unavailable("timeout").retryable());
        assert!(!SourceError::not_found_upstream("404").retryable());
        assert!(!SourceError::malformed("bad json").retryable());
    }

    #[test]
    fn display_carries_stable_code() {
        let error = SourceError::malformed("expected object");
        assert_eq!(error.to_string(), "expected object (upstream.malformed_payload)");
        assert!(error.is_contract_violation());
    }

    #[test]
    fn raw_record_reports_its_source() {
        let raw = RawRecord::Fixture(Value::Null);
        assert_eq!(raw.source_kind(), SourceKind::Fixture);
    }
}
