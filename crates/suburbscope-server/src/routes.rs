//! HTTP surface of the resolver.
//!
//! | Route | Resource |
//! |-------|----------|
//! | `GET /api/health` | liveness and routing mode |
//! | `GET /api/suburbs/search?q=` | suburb search |
//! | `GET /api/suburb/:id` | merged suburb details |
//! | `GET /api/suburb/:id/dashboard` | every dashboard panel |
//! | `GET /api/suburb/:id/<resource>` | one resource, suburb-id keyed |
//! | `GET /api/suburbs/:id/street-rankings` | ranked streets |
//!
//! Resource responses carry an `x-data-source` header (`live`, `fixture` or
//! `empty`) naming the source that answered.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, Method, Request};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, MethodRouter};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use suburbscope_core::{PropertyType, ResolveOptions, ResourceKind, SuburbId, SuburbSearchResult};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub const DATA_SOURCE_HEADER: &str = "x-data-source";

/// Random UUID request correlation ids.
#[derive(Clone, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/suburbs/search", get(search))
        .route("/api/suburb/:id", get(suburb_details))
        .route("/api/suburb/:id/dashboard", get(dashboard))
        .route("/api/suburb/:id/info", resource(ResourceKind::Info))
        .route("/api/suburb/:id/summary", resource(ResourceKind::Summary))
        .route("/api/suburb/:id/demographics", resource(ResourceKind::Demographics))
        .route("/api/suburb/:id/amenities", resource(ResourceKind::Amenities))
        .route("/api/suburb/:id/market-trends", resource(ResourceKind::MarketTrends))
        .route("/api/suburb/:id/schools", resource(ResourceKind::Schools))
        .route("/api/suburb/:id/developments", resource(ResourceKind::Developments))
        .route("/api/suburb/:id/street-insights", resource(ResourceKind::StreetInsights))
        .route("/api/suburb/:id/market-insights", resource(ResourceKind::MarketInsights))
        .route("/api/suburb/:id/pocket-insights", resource(ResourceKind::PocketInsights))
        .route("/api/suburb/:id/risk", resource(ResourceKind::Risk))
        .route("/api/suburb/:id/catchments", resource(ResourceKind::Catchments))
        .route("/api/suburb/:id/zoning", resource(ResourceKind::Zoning))
        .route("/api/suburb/:id/similar", resource(ResourceKind::Similar))
        .route("/api/suburbs/:id/street-rankings", resource(ResourceKind::StreetRankings))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Any origin when none are configured, otherwise the configured list.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if origins.is_empty() {
        return layer.allow_origin(AllowOrigin::any());
    }

    let allowed = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Optional per-resource query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    pub geojson: Option<String>,
    pub property_type: Option<String>,
    pub metric: Option<String>,
}

impl ResourceQuery {
    fn options(&self) -> Result<ResolveOptions, ApiError> {
        let property_type = self
            .property_type
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(str::parse::<PropertyType>)
            .transpose()?;
        let geojson = self
            .geojson
            .as_deref()
            .map_or(true, |value| value.trim().eq_ignore_ascii_case("true"));

        Ok(ResolveOptions::default()
            .with_geojson(geojson)
            .with_property_type(property_type)
            .with_metric(self.metric.clone()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

fn resource(kind: ResourceKind) -> MethodRouter<AppState> {
    get(
        move |State(state): State<AppState>,
              Path(id): Path<String>,
              Query(query): Query<ResourceQuery>| async move {
            resolve_resource(&state, &id, kind, &query).await
        },
    )
}

async fn resolve_resource(
    state: &AppState,
    raw_id: &str,
    kind: ResourceKind,
    query: &ResourceQuery,
) -> Result<Response, ApiError> {
    let suburb = SuburbId::parse(raw_id)?;
    let options = query.options()?;
    let resolution = state.resolver().resolve_with(&suburb, kind, &options).await?;
    let body = resolution.body.to_value()?;

    Ok((
        [(DATA_SOURCE_HEADER, resolution.origin.as_str())],
        Json(body),
    )
        .into_response())
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "mockData": state.resolver().fallback_override(),
        "liveClient": state.resolver().has_live_source(),
    }))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SuburbSearchResult>>, ApiError> {
    let results = state.resolver().search(&query.q).await?;
    Ok(Json(results))
}

async fn suburb_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let suburb = SuburbId::parse(&id)?;
    let details = state.resolver().suburb_details(&suburb).await?;
    Ok(Json(serde_json::to_value(details)?))
}

async fn dashboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let suburb = SuburbId::parse(&id)?;
    let dashboard = state.resolver().resolve_dashboard(&suburb).await;
    Ok(Json(dashboard.to_value()?))
}
