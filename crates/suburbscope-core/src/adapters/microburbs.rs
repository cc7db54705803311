use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

use crate::config::LiveApiSettings;
use crate::data_source::{PropertyDataSource, RawRecord, SourceError, SourceFuture};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, ReqwestHttpClient};
use crate::logging::{DURATION_MS, ERROR_CODE, RESOURCE, SUBURB_ID};
use crate::{ResolveOptions, ResourceKind, SuburbId};

const SEARCH_PATH: &str = "/suburb/suburbs";
const ETHNICITY_PATH: &str = "/suburb/ethnicity";

/// Live client for the Microburbs report-generator API.
///
/// One GET per resource kind, addressed by the suburb's display name.
/// Every call is bounded by `timeout`; nothing here retries.
#[derive(Clone)]
pub struct MicroburbsClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    auth: HttpAuth,
    timeout: Duration,
}

impl MicroburbsClient {
    pub fn new(settings: &LiveApiSettings) -> Self {
        Self::with_http_client(
            Arc::new(ReqwestHttpClient::new()),
            settings.base_url.clone(),
            settings.token.clone(),
        )
        .with_timeout(settings.timeout)
    }

    pub fn with_http_client(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            auth: HttpAuth::BearerToken(token.into()),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn request(&self, path: &str, suburb: &str) -> HttpRequest {
        HttpRequest::get(format!("{}{path}", self.base_url))
            .with_query("suburb", suburb)
            .with_header("accept", "application/json")
            .with_auth(&self.auth)
            .with_timeout(self.timeout)
    }

    fn resource_request(
        &self,
        kind: ResourceKind,
        suburb: &SuburbId,
        options: &ResolveOptions,
    ) -> HttpRequest {
        let mut request = self.request(kind.provider_path(), &suburb.display_name());

        if kind.accepts_geojson() {
            request = request.with_query("geojson", options.geojson.to_string());
        }
        if forwards_property_type(kind) {
            if let Some(property_type) = options.property_type {
                request = request.with_query("property_type", property_type.as_str());
            }
        }
        if kind == ResourceKind::MarketInsights {
            if let Some(metric) = &options.metric {
                request = request.with_query("metric", metric.clone());
            }
        }

        request
    }

    /// One GET bounded by `budget`, on the transport and around the call.
    async fn get_json(&self, request: HttpRequest, budget: Duration) -> Result<Value, SourceError> {
        let path = request
            .url
            .strip_prefix(&self.base_url)
            .unwrap_or(&request.url)
            .to_owned();
        let request = request.with_timeout(budget);

        let response = match tokio::time::timeout(budget, self.http_client.execute(request)).await {
            Err(_) => {
                return Err(SourceError::unavailable(format!(
                    "microburbs {path} timed out after {}ms",
                    budget.as_millis()
                )))
            }
            Ok(Err(error)) => {
                return Err(SourceError::unavailable(format!(
                    "microburbs transport error on {path}: {}",
                    error.message()
                )))
            }
            Ok(Ok(response)) => response,
        };

        if response.is_client_error() {
            return Err(SourceError::not_found_upstream(format!(
                "microburbs returned status {} for {path}",
                response.status
            )));
        }
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "microburbs returned status {} for {path}",
                response.status
            )));
        }

        let payload = serde_json::from_str::<Value>(&response.body).map_err(|error| {
            SourceError::malformed(format!("microburbs {path} body is not JSON: {error}"))
        })?;

        if is_empty_payload(&payload) {
            return Err(SourceError::not_found_upstream(format!(
                "microburbs returned no data for {path}"
            )));
        }

        Ok(payload)
    }

    /// Demographics plus the best-effort ethnicity breakdown.
    ///
    /// Both requests share one `timeout` budget; the ethnicity call only gets
    /// what the demographics call left over.
    async fn demographics(&self, suburb: &SuburbId) -> Result<Value, SourceError> {
        let started = Instant::now();
        let name = suburb.display_name();
        let mut payload = self
            .get_json(
                self.request(ResourceKind::Demographics.provider_path(), &name),
                self.timeout,
            )
            .await?;

        let remaining = self.timeout.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            debug!(
                { SUBURB_ID } = %suburb,
                "no time left for the ethnicity breakdown, serving demographics without it"
            );
            return Ok(payload);
        }

        match self.get_json(self.request(ETHNICITY_PATH, &name), remaining).await {
            Ok(ethnicity) => merge_ethnicity(&mut payload, ethnicity),
            Err(error) => debug!(
                { SUBURB_ID } = %suburb,
                { ERROR_CODE } = error.code(),
                "ethnicity breakdown unavailable, serving demographics without it"
            ),
        }

        Ok(payload)
    }
}

impl PropertyDataSource for MicroburbsClient {
    fn name(&self) -> &'static str {
        "microburbs"
    }

    fn fetch<'a>(
        &'a self,
        kind: ResourceKind,
        suburb: &'a SuburbId,
        options: &'a ResolveOptions,
    ) -> SourceFuture<'a, RawRecord> {
        Box::pin(async move {
            let started = Instant::now();
            let result = match kind {
                ResourceKind::Demographics => self.demographics(suburb).await,
                _ => {
                    self.get_json(self.resource_request(kind, suburb, options), self.timeout)
                        .await
                }
            };

            debug!(
                { SUBURB_ID } = %suburb,
                { RESOURCE } = kind.as_str(),
                { DURATION_MS } = started.elapsed().as_millis() as u64,
                ok = result.is_ok(),
                "microburbs call finished"
            );

            result.map(RawRecord::Provider)
        })
    }

    fn search<'a>(&'a self, query: &'a str) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let payload = self.get_json(self.request(SEARCH_PATH, query), self.timeout).await?;
            match payload {
                Value::Array(items) => Ok(items),
                Value::Object(mut object) => match object.remove("results") {
                    Some(Value::Array(items)) => Ok(items),
                    _ => Err(SourceError::malformed(
                        "microburbs search payload has no 'results' array",
                    )),
                },
                _ => Err(SourceError::malformed(
                    "microburbs search payload is neither an object nor an array",
                )),
            }
        })
    }
}

const fn forwards_property_type(kind: ResourceKind) -> bool {
    matches!(
        kind,
        ResourceKind::MarketInsights
            | ResourceKind::PocketInsights
            | ResourceKind::StreetInsights
            | ResourceKind::StreetRankings
    )
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(object) => object.is_empty(),
        _ => false,
    }
}

fn merge_ethnicity(demographics: &mut Value, ethnicity: Value) {
    let (Some(target), Value::Object(source)) = (demographics.as_object_mut(), ethnicity) else {
        return;
    };

    for (key, value) in source {
        match key.as_str() {
            "ethnicities" => {
                target.insert(key, value);
            }
            "results" if !target.contains_key("results") => {
                target.insert(key, value);
            }
            _ => {}
        }
    }
}
