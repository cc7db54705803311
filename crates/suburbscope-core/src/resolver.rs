//! Composite resolution of suburb resources.
//!
//! For one `(suburb, kind)` pair the resolver asks the classifier for a
//! [`SourceDecision`], tries the live provider when eligible, and otherwise
//! (or after any live failure) answers from the fixture store. Live success
//! never touches the fixtures. Only two outcomes cross this boundary: a
//! [`Resolution`] or a terminal [`ResolutionError`].
//!
//! Kinds without a fixture counterpart never fall back; their failures
//! degrade to an empty `{results, total}` body.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::data_source::{PropertyDataSource, RawRecord, SourceError, SourceErrorKind, SourceFuture};
use crate::eligibility::{EligibilityClassifier, FixedDecision, SourceDecision};
use crate::envelope::{ExtendedResults, ResourceBody, SuburbEnvelope};
use crate::fixtures::FixtureSource;
use crate::logging::{
    ATTEMPT, DECISION, DURATION_MS, ERROR_CODE, ORIGIN, REQUEST_ID, RESOURCE, RESULT_COUNT,
    SUBURB_ID,
};
use crate::normalize::{
    merge_details, normalize, search_result_from_fixture, search_result_from_provider,
};
use crate::retry::RetryConfig;
use crate::{
    CanonicalRecord, ResolveOptions, ResourceKind, Settings, SuburbDetails, SuburbId,
    SuburbSearchResult, ValidationError,
};

pub const MAX_SEARCH_QUERY_CHARS: usize = 100;
pub const MAX_SEARCH_RESULTS: usize = 10;

/// Which source produced a resolved body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceOrigin {
    Live,
    Fixture,
    /// Live-only kind answered with an empty result set.
    Empty,
}

impl SourceOrigin {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fixture => "fixture",
            Self::Empty => "empty",
        }
    }
}

/// Successful resolution of one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub request_id: Uuid,
    pub suburb_id: SuburbId,
    pub kind: ResourceKind,
    pub decision: SourceDecision,
    pub origin: SourceOrigin,
    pub body: ResourceBody,
    /// Live failures absorbed on the way to this answer.
    pub recovered: Vec<SourceError>,
    pub latency_ms: u64,
}

impl Resolution {
    /// True when the body was served from the fixture store.
    pub fn is_fallback(&self) -> bool {
        self.origin == SourceOrigin::Fixture
    }

    pub fn record(&self) -> Option<&CanonicalRecord> {
        self.body.record()
    }
}

/// Terminal outcomes surfaced to the endpoint layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("{} not found", kind.label())]
    NotFound {
        kind: ResourceKind,
        suburb_id: SuburbId,
    },

    #[error("Suburb not found")]
    SuburbNotFound { suburb_id: SuburbId },

    #[error("{} fixture for '{suburb_id}' is corrupt: {source}", kind.label())]
    CorruptFixture {
        kind: ResourceKind,
        suburb_id: SuburbId,
        #[source]
        source: SourceError,
    },

    #[error(transparent)]
    InvalidQuery(#[from] ValidationError),
}

impl ResolutionError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::SuburbNotFound { .. })
    }
}

/// One panel of the dashboard fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardPanel {
    pub kind: ResourceKind,
    pub outcome: Result<Resolution, ResolutionError>,
}

/// All dashboard panels of one suburb; a failed panel is left empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub suburb_id: SuburbId,
    pub panels: Vec<DashboardPanel>,
}

impl Dashboard {
    pub fn panel(&self, kind: ResourceKind) -> Option<&Resolution> {
        self.panels
            .iter()
            .find(|panel| panel.kind == kind)
            .and_then(|panel| panel.outcome.as_ref().ok())
    }

    pub fn loaded_count(&self) -> usize {
        self.panels.iter().filter(|panel| panel.outcome.is_ok()).count()
    }

    /// `{ "<suburbId>": { "<kind>": record | null, ... } }`
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        let mut panels = Map::new();
        for panel in &self.panels {
            let value = match panel.outcome.as_ref().ok().and_then(Resolution::record) {
                Some(record) => record.to_value()?,
                None => Value::Null,
            };
            panels.insert(panel.kind.as_str().to_owned(), value);
        }

        let mut root = Map::new();
        root.insert(self.suburb_id.as_str().to_owned(), Value::Object(panels));
        Ok(Value::Object(root))
    }
}

/// Live-first, fixture-backed resolver.
#[derive(Clone)]
pub struct CompositeResolver {
    live: Option<Arc<dyn PropertyDataSource>>,
    fixtures: Arc<dyn FixtureSource>,
    classifier: Arc<dyn EligibilityClassifier>,
    fallback_override: bool,
    retry: RetryConfig,
}

/// Builder for [`CompositeResolver`].
pub struct CompositeResolverBuilder {
    live: Option<Arc<dyn PropertyDataSource>>,
    fixtures: Arc<dyn FixtureSource>,
    classifier: Arc<dyn EligibilityClassifier>,
    fallback_override: bool,
    retry: RetryConfig,
}

impl CompositeResolverBuilder {
    /// Starts from a fixture-only resolver: no live source, every decision
    /// `Fallback`, no retries.
    pub fn new(fixtures: Arc<dyn FixtureSource>) -> Self {
        Self {
            live: None,
            fixtures,
            classifier: Arc::new(FixedDecision(SourceDecision::Fallback)),
            fallback_override: false,
            retry: RetryConfig::no_retry(),
        }
    }

    pub fn with_live_source(mut self, live: Arc<dyn PropertyDataSource>) -> Self {
        self.live = Some(live);
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn EligibilityClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Forces every decision to `Fallback` and keeps search on the fixtures.
    pub fn with_fallback_override(mut self, enabled: bool) -> Self {
        self.fallback_override = enabled;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Applies classifier, mock-data override and retry budget from settings.
    pub fn with_settings(self, settings: &Settings) -> Self {
        self.with_classifier(settings.classifier())
            .with_fallback_override(settings.use_mock_data)
            .with_retry(RetryConfig::exponential(settings.max_retries))
    }

    pub fn build(self) -> CompositeResolver {
        CompositeResolver {
            live: self.live,
            fixtures: self.fixtures,
            classifier: self.classifier,
            fallback_override: self.fallback_override,
            retry: self.retry,
        }
    }
}

impl CompositeResolver {
    pub fn builder(fixtures: Arc<dyn FixtureSource>) -> CompositeResolverBuilder {
        CompositeResolverBuilder::new(fixtures)
    }

    pub fn has_live_source(&self) -> bool {
        self.live.is_some()
    }

    pub fn fallback_override(&self) -> bool {
        self.fallback_override
    }

    pub fn decide(&self, suburb: &SuburbId) -> SourceDecision {
        if self.fallback_override {
            SourceDecision::Fallback
        } else {
            self.classifier.classify(suburb)
        }
    }

    pub async fn resolve(
        &self,
        suburb: &SuburbId,
        kind: ResourceKind,
    ) -> Result<Resolution, ResolutionError> {
        self.resolve_with(suburb, kind, &ResolveOptions::default())
            .await
    }

    pub async fn resolve_with(
        &self,
        suburb: &SuburbId,
        kind: ResourceKind,
        options: &ResolveOptions,
    ) -> Result<Resolution, ResolutionError> {
        let started = Instant::now();
        let request_id = Uuid::new_v4();
        let decision = self.decide(suburb);
        debug!(
            { REQUEST_ID } = %request_id,
            { SUBURB_ID } = %suburb,
            { RESOURCE } = kind.as_str(),
            { DECISION } = decision.as_str(),
            live_configured = self.live.is_some(),
            "routing decision"
        );

        let resolution = |origin: SourceOrigin, body: ResourceBody, recovered: Vec<SourceError>| Resolution {
            request_id,
            suburb_id: suburb.clone(),
            kind,
            decision,
            origin,
            body,
            recovered,
            latency_ms: started.elapsed().as_millis() as u64,
        };

        let mut recovered = Vec::new();
        let live = match decision {
            SourceDecision::Live => self.live.as_deref(),
            SourceDecision::Fallback => None,
        };

        if !kind.has_fallback() {
            let body = match live {
                Some(live) => match self.fetch_live(live, kind, suburb, options).await {
                    Ok(raw) => Some(ExtendedResults::from_payload(raw.into_value())),
                    Err(error) => {
                        log_live_failure(request_id, suburb, kind, &error, "live-only resource empty");
                        recovered.push(error);
                        None
                    }
                },
                None => None,
            };
            let origin = if body.is_some() {
                SourceOrigin::Live
            } else {
                SourceOrigin::Empty
            };
            let body = body.unwrap_or_else(ExtendedResults::empty);
            debug!(
                { REQUEST_ID } = %request_id,
                { RESOURCE } = kind.as_str(),
                { ORIGIN } = origin.as_str(),
                { RESULT_COUNT } = body.total,
                "live-only resource resolved"
            );
            return Ok(resolution(origin, ResourceBody::Extended(body), recovered));
        }

        if let Some(live) = live {
            match self.fetch_live(live, kind, suburb, options).await {
                Ok(raw) => match normalize(kind, raw, options) {
                    Ok(record) => {
                        let result = resolution(
                            SourceOrigin::Live,
                            ResourceBody::Suburb(SuburbEnvelope::new(suburb.clone(), record)),
                            recovered,
                        );
                        debug!(
                            { REQUEST_ID } = %request_id,
                            { ORIGIN } = SourceOrigin::Live.as_str(),
                            { DURATION_MS } = result.latency_ms,
                            "resource resolved"
                        );
                        return Ok(result);
                    }
                    Err(error) => {
                        log_live_failure(request_id, suburb, kind, &error, "falling back to fixtures");
                        recovered.push(error);
                    }
                },
                Err(error) => {
                    log_live_failure(request_id, suburb, kind, &error, "falling back to fixtures");
                    recovered.push(error);
                }
            }
        }

        let raw = match self.fixtures.lookup(suburb, kind) {
            Ok(raw) => raw,
            Err(miss) => {
                info!(
                    { REQUEST_ID } = %request_id,
                    { SUBURB_ID } = %suburb,
                    { RESOURCE } = kind.as_str(),
                    { ERROR_CODE } = miss.code(),
                    live_failures = recovered.len(),
                    "resource not found in any source"
                );
                return Err(ResolutionError::NotFound {
                    kind,
                    suburb_id: suburb.clone(),
                });
            }
        };

        let record = normalize(kind, raw, options).map_err(|source| {
            error!(
                { REQUEST_ID } = %request_id,
                { SUBURB_ID } = %suburb,
                { RESOURCE } = kind.as_str(),
                { ERROR_CODE } = source.code(),
                error = %source,
                "fixture entry does not normalize"
            );
            ResolutionError::CorruptFixture {
                kind,
                suburb_id: suburb.clone(),
                source,
            }
        })?;

        let result = resolution(
            SourceOrigin::Fixture,
            ResourceBody::Suburb(SuburbEnvelope::new(suburb.clone(), record)),
            recovered,
        );
        if result.recovered.is_empty() {
            debug!(
                { REQUEST_ID } = %request_id,
                { ORIGIN } = SourceOrigin::Fixture.as_str(),
                { DURATION_MS } = result.latency_ms,
                "resource resolved"
            );
        } else {
            info!(
                { REQUEST_ID } = %request_id,
                { SUBURB_ID } = %suburb,
                { RESOURCE } = kind.as_str(),
                { ORIGIN } = SourceOrigin::Fixture.as_str(),
                { DURATION_MS } = result.latency_ms,
                "fallback served"
            );
        }
        Ok(result)
    }

    /// Free-text suburb search: live first, then the fixture catalogue.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::InvalidQuery`] for an empty query or one longer
    /// than [`MAX_SEARCH_QUERY_CHARS`].
    pub async fn search(&self, query: &str) -> Result<Vec<SuburbSearchResult>, ResolutionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptySearchQuery.into());
        }
        if query.chars().count() > MAX_SEARCH_QUERY_CHARS {
            return Err(ValidationError::SearchQueryTooLong {
                max: MAX_SEARCH_QUERY_CHARS,
            }
            .into());
        }

        if let Some(live) = self.live.as_deref().filter(|_| !self.fallback_override) {
            match self.with_retries(|| live.search(query)).await {
                Ok(items) => {
                    let results = items
                        .iter()
                        .filter_map(search_result_from_provider)
                        .take(MAX_SEARCH_RESULTS)
                        .collect::<Vec<_>>();
                    if !results.is_empty() {
                        debug!({ RESULT_COUNT } = results.len(), { ORIGIN } = "live", "search resolved");
                        return Ok(results);
                    }
                    debug!("live search returned no usable hits");
                }
                Err(error) => {
                    warn!(
                        { ERROR_CODE } = error.code(),
                        error = %error,
                        "live search failed, using fixture catalogue"
                    );
                }
            }
        }

        let results = self
            .fixtures
            .search(query)
            .iter()
            .filter_map(search_result_from_fixture)
            .take(MAX_SEARCH_RESULTS)
            .collect::<Vec<_>>();
        debug!({ RESULT_COUNT } = results.len(), { ORIGIN } = "fixture", "search resolved");
        Ok(results)
    }

    /// Merged headline of one suburb from its info, summary and market panels.
    pub async fn suburb_details(&self, suburb: &SuburbId) -> Result<SuburbDetails, ResolutionError> {
        let options = ResolveOptions::default();
        let (info, summary, market) = futures::join!(
            self.resolve_with(suburb, ResourceKind::Info, &options),
            self.resolve_with(suburb, ResourceKind::Summary, &options),
            self.resolve_with(suburb, ResourceKind::MarketTrends, &options),
        );
        let info = found(info)?;
        let summary = found(summary)?;
        let market = found(market)?;

        if info.is_none() && summary.is_none() && market.is_none() {
            return Err(ResolutionError::SuburbNotFound {
                suburb_id: suburb.clone(),
            });
        }

        let info = info.as_ref().and_then(Resolution::record).and_then(passthrough);
        let summary = summary.as_ref().and_then(Resolution::record).and_then(passthrough);
        let market = market
            .as_ref()
            .and_then(Resolution::record)
            .and_then(|record| match record {
                CanonicalRecord::MarketTrends(trends) => Some(trends),
                _ => None,
            });

        Ok(merge_details(suburb, info, summary, market))
    }

    /// Resolves every dashboard panel concurrently. Never fails as a whole.
    pub async fn resolve_dashboard(&self, suburb: &SuburbId) -> Dashboard {
        let started = Instant::now();
        let options = ResolveOptions::default();
        let outcomes = join_all(
            ResourceKind::DASHBOARD
                .iter()
                .map(|kind| self.resolve_with(suburb, *kind, &options)),
        )
        .await;

        let dashboard = Dashboard {
            suburb_id: suburb.clone(),
            panels: ResourceKind::DASHBOARD
                .iter()
                .zip(outcomes)
                .map(|(kind, outcome)| DashboardPanel {
                    kind: *kind,
                    outcome,
                })
                .collect(),
        };
        info!(
            { SUBURB_ID } = %suburb,
            { RESULT_COUNT } = dashboard.loaded_count(),
            { DURATION_MS } = started.elapsed().as_millis() as u64,
            "dashboard resolved"
        );
        dashboard
    }

    async fn fetch_live(
        &self,
        live: &dyn PropertyDataSource,
        kind: ResourceKind,
        suburb: &SuburbId,
        options: &ResolveOptions,
    ) -> Result<RawRecord, SourceError> {
        self.with_retries(|| live.fetch(kind, suburb, options)).await
    }

    async fn with_retries<'a, T, F>(&self, mut call: F) -> Result<T, SourceError>
    where
        F: FnMut() -> SourceFuture<'a, T>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(error) if self.retry.should_retry(&error, attempt) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    debug!(
                        { ATTEMPT } = attempt + 1,
                        { ERROR_CODE } = error.code(),
                        delay_ms = delay.as_millis() as u64,
                        "retrying live call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

fn found(outcome: Result<Resolution, ResolutionError>) -> Result<Option<Resolution>, ResolutionError> {
    match outcome {
        Ok(resolution) => Ok(Some(resolution)),
        Err(ResolutionError::NotFound { .. }) => Ok(None),
        Err(other) => Err(other),
    }
}

fn passthrough(record: &CanonicalRecord) -> Option<&Value> {
    match record {
        CanonicalRecord::Passthrough(value) => Some(value),
        _ => None,
    }
}

fn log_live_failure(
    request_id: Uuid,
    suburb: &SuburbId,
    kind: ResourceKind,
    failure: &SourceError,
    outcome: &'static str,
) {
    if failure.is_contract_violation() {
        error!(
            { REQUEST_ID } = %request_id,
            { SUBURB_ID } = %suburb,
            { RESOURCE } = kind.as_str(),
            { ERROR_CODE } = failure.code(),
            error = %failure,
            outcome,
            "live provider broke its payload contract"
        );
    } else if failure.kind() == SourceErrorKind::NotFoundUpstream {
        warn!(
            { REQUEST_ID } = %request_id,
            { SUBURB_ID } = %suburb,
            { RESOURCE } = kind.as_str(),
            { ERROR_CODE } = failure.code(),
            outcome,
            "live provider has no data"
        );
    } else {
        warn!(
            { REQUEST_ID } = %request_id,
            { SUBURB_ID } = %suburb,
            { RESOURCE } = kind.as_str(),
            { ERROR_CODE } = failure.code(),
            error = %failure,
            outcome,
            "live provider unavailable"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::fixtures::FixtureStore;

    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Value, SourceError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Value, SourceError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn next(&self) -> Result<Value, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .expect("script lock")
                .pop_front()
                .unwrap_or_else(|| Err(SourceError::unavailable("script exhausted")))
        }
    }

    impl PropertyDataSource for ScriptedSource {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn fetch<'a>(
            &'a self,
            _kind: ResourceKind,
            _suburb: &'a SuburbId,
            _options: &'a ResolveOptions,
        ) -> SourceFuture<'a, RawRecord> {
            Box::pin(async move { self.next().map(RawRecord::Provider) })
        }

        fn search<'a>(&'a self, _query: &'a str) -> SourceFuture<'a, Vec<Value>> {
            Box::pin(async move {
                self.next().map(|value| value.as_array().cloned().unwrap_or_default())
            })
        }
    }

    fn id(value: &str) -> SuburbId {
        SuburbId::parse(value).expect("valid suburb id")
    }

    fn live_resolver(source: Arc<ScriptedSource>, fixtures: FixtureStore) -> CompositeResolver {
        CompositeResolver::builder(Arc::new(fixtures))
            .with_live_source(source)
            .with_classifier(Arc::new(FixedDecision(SourceDecision::Live)))
            .build()
    }

    fn info_fixture() -> FixtureStore {
        FixtureStore::default().with_entry(
            ResourceKind::Info,
            &id("melbourne-3000"),
            json!({"name": "Melbourne", "state": "VIC"}),
        )
    }

    #[tokio::test]
    async fn live_success_is_returned_as_live() {
        let source = ScriptedSource::new(vec![Ok(json!({"information": {"geo_divisions": {"state": "VIC"}}}))]);
        let resolver = live_resolver(source.clone(), info_fixture());

        let resolution = resolver
            .resolve(&id("melbourne-3000"), ResourceKind::Info)
            .await
            .expect("resolves");

        assert_eq!(resolution.origin, SourceOrigin::Live);
        assert!(!resolution.is_fallback());
        assert!(resolution.recovered.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unavailable_live_falls_back_and_records_the_failure() {
        let source = ScriptedSource::new(vec![Err(SourceError::unavailable("timeout"))]);
        let resolver = live_resolver(source, info_fixture());

        let resolution = resolver
            .resolve(&id("melbourne-3000"), ResourceKind::Info)
            .await
            .expect("falls back");

        assert!(resolution.is_fallback());
        assert_eq!(resolution.recovered.len(), 1);
        assert_eq!(resolution.recovered[0].code(), "upstream.unavailable");
    }

    #[tokio::test]
    async fn retries_unavailable_before_falling_back() {
        let source = ScriptedSource::new(vec![
            Err(SourceError::unavailable("503")),
            Ok(json!({"name": "Melbourne"})),
        ]);
        let resolver = CompositeResolver::builder(Arc::new(info_fixture()))
            .with_live_source(source.clone())
            .with_classifier(Arc::new(FixedDecision(SourceDecision::Live)))
            .with_retry(RetryConfig::fixed(Duration::from_millis(1), 2))
            .build();

        let resolution = resolver
            .resolve(&id("melbourne-3000"), ResourceKind::Info)
            .await
            .expect("resolves");

        assert_eq!(resolution.origin, SourceOrigin::Live);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_everywhere_is_not_found_with_label() {
        let resolver = CompositeResolver::builder(Arc::new(FixtureStore::default())).build();

        let error = resolver
            .resolve(&id("sydney-2000"), ResourceKind::MarketTrends)
            .await
            .expect_err("not found");

        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "Market trends not found");
    }

    #[tokio::test]
    async fn corrupt_fixture_is_distinct_from_not_found() {
        let fixtures = FixtureStore::default().with_entry(
            ResourceKind::Schools,
            &id("melbourne-3000"),
            json!({"schools": "not a list"}),
        );
        let resolver = CompositeResolver::builder(Arc::new(fixtures)).build();

        let error = resolver
            .resolve(&id("melbourne-3000"), ResourceKind::Schools)
            .await
            .expect_err("corrupt");

        assert!(matches!(error, ResolutionError::CorruptFixture { .. }));
    }

    #[tokio::test]
    async fn live_only_failure_is_an_empty_body() {
        let source = ScriptedSource::new(vec![Err(SourceError::not_found_upstream("404"))]);
        let resolver = live_resolver(source, FixtureStore::default());

        let resolution = resolver
            .resolve(&id("belmont-north-2280"), ResourceKind::Risk)
            .await
            .expect("never an error");

        assert_eq!(resolution.origin, SourceOrigin::Empty);
        assert_eq!(
            resolution.body.to_value().expect("serializes"),
            json!({"results": [], "total": 0})
        );
    }

    #[tokio::test]
    async fn override_skips_live_search() {
        let source = ScriptedSource::new(vec![Ok(json!([{"area_name": "Melbourne", "information": {"poa": "3000"}}]))]);
        let fixtures = FixtureStore::default()
            .with_suburbs(vec![json!({"id": "melbourne-3000", "name": "Melbourne", "state": "VIC"})]);
        let resolver = CompositeResolver::builder(Arc::new(fixtures))
            .with_live_source(source.clone())
            .with_fallback_override(true)
            .build();

        let results = resolver.search("melb").await.expect("search");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].state.as_deref(), Some("VIC"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn search_rejects_blank_and_oversized_queries() {
        let resolver = CompositeResolver::builder(Arc::new(FixtureStore::default())).build();

        assert!(matches!(
            resolver.search("   ").await,
            Err(ResolutionError::InvalidQuery(ValidationError::EmptySearchQuery))
        ));
        assert!(matches!(
            resolver.search(&"a".repeat(101)).await,
            Err(ResolutionError::InvalidQuery(ValidationError::SearchQueryTooLong { max: 100 }))
        ));
    }

    #[tokio::test]
    async fn details_need_at_least_one_panel() {
        let resolver = CompositeResolver::builder(Arc::new(info_fixture())).build();

        let details = resolver
            .suburb_details(&id("melbourne-3000"))
            .await
            .expect("details");
        assert_eq!(details.state.as_deref(), Some("VIC"));

        let error = resolver
            .suburb_details(&id("sydney-2000"))
            .await
            .expect_err("unknown suburb");
        assert_eq!(error.to_string(), "Suburb not found");
    }

    #[tokio::test]
    async fn dashboard_leaves_missing_panels_empty() {
        let resolver = CompositeResolver::builder(Arc::new(info_fixture())).build();

        let dashboard = resolver.resolve_dashboard(&id("melbourne-3000")).await;

        assert_eq!(dashboard.panels.len(), ResourceKind::DASHBOARD.len());
        assert_eq!(dashboard.loaded_count(), 1);
        assert!(dashboard.panel(ResourceKind::Info).is_some());

        let value = dashboard.to_value().expect("serializes");
        assert_eq!(value["melbourne-3000"]["info"]["name"], json!("Melbourne"));
        assert_eq!(value["melbourne-3000"]["schools"], Value::Null);
    }
}
