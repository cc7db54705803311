use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::{as_object, from_canonical, result_rows, round_to};
use crate::data_source::{RawRecord, SourceError};
use crate::{Amenities, AmenityCategory};

const OTHER: &str = "Other";

pub fn normalize_amenities(raw: RawRecord) -> Result<Amenities, SourceError> {
    let value = match raw {
        RawRecord::Fixture(value) => return from_canonical(value, "fixture amenities"),
        RawRecord::Provider(value) => value,
    };

    if as_object(&value, "amenities")?.contains_key("categories") {
        return from_canonical(value, "amenities");
    }

    let rows = result_rows(&value)
        .ok_or_else(|| SourceError::malformed("amenities payload has no 'results' array"))?;

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for row in &rows {
        let category = row
            .get("category")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .unwrap_or(OTHER);
        *counts.entry(category.to_owned()).or_default() += 1;
    }

    let total = rows.len() as u64;
    let mut categories = counts
        .into_iter()
        .map(|(name, count)| AmenityCategory {
            percentage: round_to(count as f64 / total as f64 * 100.0, 1),
            name,
            count,
        })
        .collect::<Vec<_>>();
    categories.sort_by(|left, right| right.count.cmp(&left.count).then_with(|| left.name.cmp(&right.name)));

    Ok(Amenities {
        categories,
        total,
        extra: Map::new(),
    })
}
