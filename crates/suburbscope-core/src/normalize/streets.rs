use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::{from_canonical, number_field, result_rows, text_field};
use crate::data_source::{RawRecord, SourceError};
use crate::{PropertyType, StreetRanking, StreetRankings};

const STREET_KEYS: [&str; 4] = ["street_name", "street", "name", "area_name"];
const PRICE_KEYS: [&str; 3] = ["value", "median_price", "sell_price"];
const SELL_METRIC: &str = "sell_price";

/// Ranks streets by median sale price, highest first.
///
/// Both fixture and provider street insights come as `results` rows
/// (possibly nested once); a payload that already carries `streets` is
/// canonical and passes through.
pub fn normalize_street_rankings(
    raw: RawRecord,
    property_type: Option<PropertyType>,
) -> Result<StreetRankings, SourceError> {
    let value = raw.into_value();

    if value.get("streets").is_some() {
        let mut rankings = from_canonical::<StreetRankings>(value, "street rankings")?;
        rankings.total = rankings.streets.len();
        return Ok(rankings);
    }

    let rows = result_rows(&value)
        .ok_or_else(|| SourceError::malformed("street insights payload has no 'results' rows"))?;

    let mut streets: Vec<StreetRanking> = Vec::new();
    for row in rows.iter().filter_map(Value::as_object) {
        if !is_sale_row(row) || !matches_property_type(row, property_type) {
            continue;
        }
        let street = text_field(row, &STREET_KEYS)
            .ok_or_else(|| SourceError::malformed("street insights row has no street name"))?;
        if streets.iter().any(|existing| existing.street == street) {
            continue;
        }

        streets.push(StreetRanking {
            rank: 0,
            median_price: number_field(row, &PRICE_KEYS).filter(|price| *price > 0.0),
            property_type: text_field(row, &["property_type"]),
            extra: remaining_fields(row),
            street,
        });
    }

    streets.sort_by(|left, right| {
        match (left.median_price, right.median_price) {
            (Some(left), Some(right)) => right.total_cmp(&left),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| left.street.cmp(&right.street))
    });
    for (index, street) in streets.iter_mut().enumerate() {
        street.rank = index as u32 + 1;
    }

    Ok(StreetRankings {
        total: streets.len(),
        streets,
    })
}

fn is_sale_row(row: &Map<String, Value>) -> bool {
    row.get("metric")
        .and_then(Value::as_str)
        .map_or(true, |metric| metric == SELL_METRIC)
}

fn matches_property_type(row: &Map<String, Value>, wanted: Option<PropertyType>) -> bool {
    match (wanted, row.get("property_type").and_then(Value::as_str)) {
        (Some(wanted), Some(actual)) => actual.eq_ignore_ascii_case(wanted.as_str()),
        _ => true,
    }
}

fn remaining_fields(row: &Map<String, Value>) -> Map<String, Value> {
    row.iter()
        .filter(|(key, _)| {
            let key = key.as_str();
            !STREET_KEYS.contains(&key)
                && !PRICE_KEYS.contains(&key)
                && !matches!(key, "property_type" | "metric" | "rank" | "street")
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data_source::SourceErrorKind;

    #[test]
    fn ranks_streets_by_price_descending() {
        let rankings = normalize_street_rankings(
            RawRecord::Provider(json!({"results": [[
                {"street_name": "Oak St", "value": 900000, "property_type": "house", "metric": "sell_price"},
                {"street_name": "Elm St", "value": 1100000, "property_type": "house", "metric": "sell_price"},
                {"street_name": "Ash St", "property_type": "house"},
                {"street_name": "Elm St", "value": 700000, "property_type": "unit", "metric": "sell_price"},
                {"street_name": "Elm St", "value": 650, "property_type": "house", "metric": "rent_price"}
            ]]})),
            Some(PropertyType::House),
        )
        .expect("normalizes");

        let order = rankings
            .streets
            .iter()
            .map(|street| (street.rank, street.street.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(order, vec![(1, "Elm St"), (2, "Oak St"), (3, "Ash St")]);
        assert_eq!(rankings.streets[2].median_price, None);
        assert_eq!(rankings.total, 3);
    }

    #[test]
    fn canonical_rankings_pass_through() {
        let rankings = normalize_street_rankings(
            RawRecord::Fixture(json!({"streets": [{"rank": 1, "street": "Main St", "medianPrice": 1.0}]})),
            None,
        )
        .expect("fixture");
        assert_eq!(rankings.total, 1);
        assert_eq!(rankings.streets[0].street, "Main St");
    }

    #[test]
    fn rows_without_street_names_are_malformed() {
        let error = normalize_street_rankings(RawRecord::Provider(json!({"results": [{"value": 1}]})), None)
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::MalformedUpstreamPayload);
    }
}
