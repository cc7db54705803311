//! Source-aware mapping from raw payloads to canonical records.
//!
//! | Module | Kind |
//! |--------|------|
//! | `schools` | schools |
//! | `market` | marketTrends |
//! | `demographics` | demographics |
//! | `amenities` | amenities |
//! | `developments` | developments |
//! | `streets` | streetRankings |
//! | `search` | search hits |
//! | `details` | merged suburb headline |
//!
//! Every other kind is relayed verbatim as [`CanonicalRecord::Passthrough`].
//! A payload missing the fields needed for even a minimal record fails with
//! `MalformedUpstreamPayload`; nothing is zero-filled.

mod amenities;
mod demographics;
mod details;
mod developments;
mod market;
mod schools;
mod search;
mod streets;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::data_source::{RawRecord, SourceError};
use crate::{CanonicalRecord, ResolveOptions, ResourceKind};

pub use amenities::normalize_amenities;
pub use demographics::normalize_demographics;
pub use details::merge_details;
pub use developments::{normalize_developments, MAX_DEVELOPMENTS};
pub use market::normalize_market_trends;
pub use schools::{normalize_school, normalize_schools};
pub use search::{search_result_from_fixture, search_result_from_provider};
pub use streets::normalize_street_rankings;

/// Normalizes one raw payload for `kind`.
pub fn normalize(
    kind: ResourceKind,
    raw: RawRecord,
    options: &ResolveOptions,
) -> Result<CanonicalRecord, SourceError> {
    let record = match kind {
        ResourceKind::Schools => CanonicalRecord::Schools(normalize_schools(raw)?),
        ResourceKind::Demographics => CanonicalRecord::Demographics(normalize_demographics(raw)?),
        ResourceKind::Amenities => CanonicalRecord::Amenities(normalize_amenities(raw)?),
        ResourceKind::MarketTrends => {
            CanonicalRecord::MarketTrends(normalize_market_trends(raw, options.property_type)?)
        }
        ResourceKind::Developments => CanonicalRecord::Developments(normalize_developments(raw)?),
        ResourceKind::StreetRankings => {
            CanonicalRecord::StreetRankings(normalize_street_rankings(raw, options.property_type)?)
        }
        ResourceKind::Info
        | ResourceKind::Summary
        | ResourceKind::StreetInsights
        | ResourceKind::MarketInsights
        | ResourceKind::PocketInsights
        | ResourceKind::Risk
        | ResourceKind::Catchments
        | ResourceKind::Zoning
        | ResourceKind::Similar => CanonicalRecord::Passthrough(raw.into_value()),
    };
    Ok(record)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

pub(crate) fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, SourceError> {
    value
        .as_object()
        .ok_or_else(|| SourceError::malformed(format!("{what} payload is not a JSON object")))
}

pub(crate) fn from_canonical<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, SourceError> {
    serde_json::from_value(value)
        .map_err(|error| SourceError::malformed(format!("{what} record does not match the canonical shape: {error}")))
}

/// Provider `results`, flattened when the provider wraps them as `[[...]]`.
pub(crate) fn result_rows(value: &Value) -> Option<Vec<Value>> {
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(object) => object.get("results")?.as_array()?,
        _ => return None,
    };

    match rows.first() {
        Some(Value::Array(_)) => Some(
            rows.iter()
                .filter_map(Value::as_array)
                .flatten()
                .cloned()
                .collect(),
        ),
        _ => Some(rows.clone()),
    }
}

/// First string-ish field among `keys`; numbers are rendered.
pub(crate) fn text_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

pub(crate) fn number_field(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| object.get(*key).and_then(Value::as_f64))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn passthrough_kinds_keep_payload_verbatim() {
        let payload = json!({"results": [{"risk": "flood"}]});
        let record = normalize(
            ResourceKind::Risk,
            RawRecord::Provider(payload.clone()),
            &ResolveOptions::default(),
        )
        .expect("passthrough");
        assert_eq!(record, CanonicalRecord::Passthrough(payload));
    }

    #[test]
    fn result_rows_flattens_one_nesting_level() {
        let rows = result_rows(&json!({"results": [[{"a": 1}, {"a": 2}], [{"a": 3}]]}))
            .expect("rows");
        assert_eq!(rows.len(), 3);
        assert!(result_rows(&json!({"other": []})).is_none());
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to(4.25, 1), 4.3);
        assert_eq!(round_to(0.8 * 5.0, 1), 4.0);
    }
}
