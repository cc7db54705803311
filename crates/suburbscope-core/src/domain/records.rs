//! Canonical records served to clients.
//!
//! Optional fields are omitted from the wire payload rather than zero-filled:
//! the dashboard treats an absent value as unknown and a zero as a measurement.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::SuburbId;

/// Normalized school record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub name: String,
    #[serde(rename = "type")]
    pub school_type: String,
    pub sector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naplan_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naplan_rank: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socioeconomic_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socioeconomic_rank: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub students: Option<StudentCounts>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentCounts {
    pub boys: u32,
    pub girls: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolList {
    pub schools: Vec<School>,
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBracket {
    pub age: String,
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EthnicityShare {
    pub name: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    #[serde(default)]
    pub age_distribution: Vec<AgeBracket>,
    #[serde(default)]
    pub ethnicity: Vec<EthnicityShare>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityCategory {
    pub name: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amenities {
    pub categories: Vec<AmenityCategory>,
    #[serde(default)]
    pub total: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One month of a price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub month: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broader_region_price: Option<f64>,
}

/// Percentage growth over fixed horizons, 2 dp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceGrowth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_year: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub five_year: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceComparison {
    pub price: f64,
    /// Percent above (positive) or below the comparison price, 1 dp.
    pub difference: f64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalComparison {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<PriceComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broader_region: Option<PriceComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalytics {
    /// `low`, `medium` or `high`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<String>,
    pub trend: String,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrends {
    pub price_history: Vec<PricePoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rent_history: Vec<PricePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_growth: Option<PriceGrowth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regional_comparison: Option<RegionalComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<MarketAnalytics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_yield: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Development {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub development_type: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Developments {
    pub developments: Vec<Development>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub showing: usize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetRanking {
    pub rank: u32,
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetRankings {
    pub streets: Vec<StreetRanking>,
    #[serde(default)]
    pub total: usize,
}

/// One hit of the suburb search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuburbSearchResult {
    pub id: SuburbId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
}

/// Merged headline view of a suburb (info, summary and market headline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuburbDetails {
    pub id: SuburbId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_house_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_rent: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The one normalized shape per resource kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CanonicalRecord {
    Schools(SchoolList),
    Demographics(Demographics),
    Amenities(Amenities),
    MarketTrends(MarketTrends),
    Developments(Developments),
    StreetRankings(StreetRankings),
    /// Kinds the service relays without reshaping.
    Passthrough(Value),
}

impl CanonicalRecord {
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn school_omits_unknown_fields_on_the_wire() {
        let school = School {
            name: "Belmont North Public School".to_owned(),
            school_type: "Primary".to_owned(),
            sector: "Government".to_owned(),
            rating: None,
            distance: None,
            naplan_score: None,
            naplan_rank: None,
            socioeconomic_score: None,
            socioeconomic_rank: None,
            attendance_rate: None,
            students: None,
            extra: Map::new(),
        };

        let value = serde_json::to_value(&school).expect("school serializes");
        assert_eq!(
            value,
            json!({
                "name": "Belmont North Public School",
                "type": "Primary",
                "sector": "Government"
            })
        );
    }

    #[test]
    fn market_trends_keeps_unknown_fixture_fields() {
        let input = json!({
            "priceHistory": [{"month": "Jan 2024", "price": 1.5}],
            "rentalYield": 3.4,
            "daysOnMarket": 28
        });

        let trends: MarketTrends = serde_json::from_value(input).expect("fixture shape");
        assert_eq!(trends.rental_yield, Some(3.4));
        assert_eq!(trends.extra.get("daysOnMarket"), Some(&json!(28)));

        let value = serde_json::to_value(&trends).expect("serializes");
        assert_eq!(value["daysOnMarket"], json!(28));
        assert!(value.get("currentPrice").is_none());
    }
}
