use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Closed set of per-suburb resources the resolver can answer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Info,
    Demographics,
    Amenities,
    MarketTrends,
    Schools,
    Developments,
    StreetInsights,
    StreetRankings,
    MarketInsights,
    PocketInsights,
    Risk,
    Summary,
    Catchments,
    Zoning,
    Similar,
}

impl ResourceKind {
    pub const ALL: [Self; 15] = [
        Self::Info,
        Self::Demographics,
        Self::Amenities,
        Self::MarketTrends,
        Self::Schools,
        Self::Developments,
        Self::StreetInsights,
        Self::StreetRankings,
        Self::MarketInsights,
        Self::PocketInsights,
        Self::Risk,
        Self::Summary,
        Self::Catchments,
        Self::Zoning,
        Self::Similar,
    ];

    /// Panels the dashboard loads for a suburb.
    pub const DASHBOARD: [Self; 8] = [
        Self::Info,
        Self::Demographics,
        Self::Amenities,
        Self::MarketTrends,
        Self::Schools,
        Self::Developments,
        Self::StreetRankings,
        Self::Summary,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Demographics => "demographics",
            Self::Amenities => "amenities",
            Self::MarketTrends => "marketTrends",
            Self::Schools => "schools",
            Self::Developments => "developments",
            Self::StreetInsights => "streetInsights",
            Self::StreetRankings => "streetRankings",
            Self::MarketInsights => "marketInsights",
            Self::PocketInsights => "pocketInsights",
            Self::Risk => "risk",
            Self::Summary => "summary",
            Self::Catchments => "catchments",
            Self::Zoning => "zoning",
            Self::Similar => "similar",
        }
    }

    /// Whether a static fixture counterpart exists for this kind.
    ///
    /// Kinds without one are answered from the live provider only and
    /// degrade to an empty `{results, total}` body.
    pub const fn has_fallback(self) -> bool {
        !matches!(
            self,
            Self::MarketInsights
                | Self::PocketInsights
                | Self::Risk
                | Self::Catchments
                | Self::Zoning
                | Self::Similar
        )
    }

    /// Label used in the 404 body, e.g. `"Market trends not found"`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "Suburb info",
            Self::Demographics => "Demographics",
            Self::Amenities => "Amenities",
            Self::MarketTrends => "Market trends",
            Self::Schools => "Schools",
            Self::Developments => "Developments",
            Self::StreetInsights => "Street insights",
            Self::StreetRankings => "Street rankings",
            Self::MarketInsights => "Market insights",
            Self::PocketInsights => "Pocket insights",
            Self::Risk => "Risk factors",
            Self::Summary => "Suburb summary",
            Self::Catchments => "School catchments",
            Self::Zoning => "Zoning info",
            Self::Similar => "Similar suburbs",
        }
    }

    /// Provider endpoint path relative to the configured base URL.
    pub const fn provider_path(self) -> &'static str {
        match self {
            Self::Info => "/suburb/info",
            Self::Demographics => "/suburb/demographics",
            Self::Amenities => "/suburb/amenity",
            Self::MarketTrends | Self::MarketInsights => "/suburb/market",
            Self::Schools => "/suburb/schools",
            Self::Developments => "/suburb/development",
            Self::StreetInsights | Self::StreetRankings => "/suburb/streets",
            Self::PocketInsights => "/suburb/pocket",
            Self::Risk => "/suburb/risk",
            Self::Summary => "/suburb/summary",
            Self::Catchments => "/suburb/catchments",
            Self::Zoning => "/suburb/zoning",
            Self::Similar => "/suburb/similar",
        }
    }

    /// Whether the provider endpoint accepts the `geojson` flag.
    pub const fn accepts_geojson(self) -> bool {
        matches!(
            self,
            Self::Info
                | Self::Schools
                | Self::PocketInsights
                | Self::Catchments
                | Self::Zoning
                | Self::Similar
        )
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().replace(['-', '_'], "").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().to_ascii_lowercase() == wanted)
            .ok_or_else(|| ValidationError::InvalidResourceKind {
                value: value.to_owned(),
            })
    }
}

/// Property type filter accepted by market and street endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Unit,
}

impl PropertyType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Unit => "unit",
        }
    }
}

impl Display for PropertyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "house" => Ok(Self::House),
            "unit" => Ok(Self::Unit),
            other => Err(ValidationError::InvalidPropertyType {
                value: other.to_owned(),
            }),
        }
    }
}

/// Per-request knobs forwarded to the live provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    pub geojson: bool,
    pub property_type: Option<PropertyType>,
    pub metric: Option<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            geojson: true,
            property_type: None,
            metric: None,
        }
    }
}

impl ResolveOptions {
    pub fn with_geojson(mut self, geojson: bool) -> Self {
        self.geojson = geojson;
        self
    }

    pub fn with_property_type(mut self, property_type: Option<PropertyType>) -> Self {
        self.property_type = property_type;
        self
    }

    pub fn with_metric(mut self, metric: Option<String>) -> Self {
        self.metric = metric.filter(|value| !value.trim().is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_from_path_and_camel_forms() {
        assert_eq!("market-trends".parse::<ResourceKind>(), Ok(ResourceKind::MarketTrends));
        assert_eq!("marketTrends".parse::<ResourceKind>(), Ok(ResourceKind::MarketTrends));
        assert_eq!("street_rankings".parse::<ResourceKind>(), Ok(ResourceKind::StreetRankings));
        assert!("weather".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn live_only_kinds_have_no_fallback() {
        let live_only = ResourceKind::ALL
            .into_iter()
            .filter(|kind| !kind.has_fallback())
            .collect::<Vec<_>>();
        assert_eq!(
            live_only,
            vec![
                ResourceKind::MarketInsights,
                ResourceKind::PocketInsights,
                ResourceKind::Risk,
                ResourceKind::Catchments,
                ResourceKind::Zoning,
                ResourceKind::Similar,
            ]
        );
    }

    #[test]
    fn dashboard_panels_all_have_fallback() {
        assert!(ResourceKind::DASHBOARD.iter().all(|kind| kind.has_fallback()));
    }

    #[test]
    fn property_type_rejects_unknown_values() {
        assert_eq!("Unit".parse::<PropertyType>(), Ok(PropertyType::Unit));
        assert!(matches!(
            "apartment".parse::<PropertyType>(),
            Err(ValidationError::InvalidPropertyType { .. })
        ));
    }
}
