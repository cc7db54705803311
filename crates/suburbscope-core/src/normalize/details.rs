use serde_json::{Map, Value};

use super::{number_field, text_field};
use crate::{MarketTrends, SuburbDetails, SuburbId};

const HEADLINE_KEYS: [&str; 7] = [
    "id",
    "name",
    "state",
    "postcode",
    "medianHousePrice",
    "medianRent",
    "information",
];

/// Merges the info, summary and market-trends panels into one headline.
///
/// Provider info nests location under `information.geo_divisions`; fixture
/// info is flat. Unknown headline values stay absent.
pub fn merge_details(
    suburb: &SuburbId,
    info: Option<&Value>,
    summary: Option<&Value>,
    market: Option<&MarketTrends>,
) -> SuburbDetails {
    let info = info.and_then(Value::as_object);
    let divisions = info
        .and_then(|info| info.get("information"))
        .and_then(|information| information.get("geo_divisions"))
        .and_then(Value::as_object);

    let located = |keys: &[&str]| {
        divisions
            .and_then(|divisions| text_field(divisions, keys))
            .or_else(|| info.and_then(|info| text_field(info, keys)))
    };

    let mut extra = Map::new();
    if let Some(info) = info {
        for (key, value) in info {
            if !HEADLINE_KEYS.contains(&key.as_str()) {
                extra.insert(key.clone(), value.clone());
            }
        }
    }
    if let Some(summary) = summary.filter(|summary| !summary.is_null()) {
        extra.insert(String::from("summary"), summary.clone());
    }

    SuburbDetails {
        id: suburb.clone(),
        name: info
            .and_then(|info| text_field(info, &["name"]))
            .unwrap_or_else(|| suburb.display_name()),
        state: located(&["state"]),
        postcode: located(&["poa", "postcode"]).or_else(|| suburb.postcode().map(str::to_owned)),
        median_house_price: market
            .and_then(|market| market.current_price)
            .or_else(|| info.and_then(|info| number_field(info, &["medianHousePrice"]))),
        median_rent: market
            .and_then(|market| market.rent_history.last())
            .map(|point| point.price)
            .or_else(|| info.and_then(|info| number_field(info, &["medianRent"]))),
        extra,
    }
}
