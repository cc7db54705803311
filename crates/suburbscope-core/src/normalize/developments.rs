use serde_json::{Map, Value};

use super::{as_object, from_canonical, number_field, result_rows, text_field};
use crate::data_source::{RawRecord, SourceError};
use crate::{Development, Developments};

/// Applications kept per response; `total` still counts all of them.
pub const MAX_DEVELOPMENTS: usize = 50;

const UNKNOWN: &str = "Unknown";
const DEFAULT_NAME: &str = "Development Application";

pub fn normalize_developments(raw: RawRecord) -> Result<Developments, SourceError> {
    let value = match raw {
        RawRecord::Fixture(value) => return from_canonical(value, "fixture developments"),
        RawRecord::Provider(value) => value,
    };

    if as_object(&value, "developments")?.contains_key("developments") {
        return from_canonical(value, "developments");
    }

    let rows = result_rows(&value)
        .ok_or_else(|| SourceError::malformed("developments payload has no 'results' array"))?;

    let developments = rows
        .iter()
        .take(MAX_DEVELOPMENTS)
        .enumerate()
        .filter_map(|(index, row)| row.as_object().map(|row| development(index, row)))
        .collect::<Vec<_>>();

    Ok(Developments {
        total: rows.len(),
        showing: developments.len(),
        developments,
        extra: Map::new(),
    })
}

fn development(index: usize, row: &Map<String, Value>) -> Development {
    Development {
        id: text_field(row, &["id"]).unwrap_or_else(|| format!("dev-{index}")),
        name: text_field(row, &["description", "name"]).unwrap_or_else(|| DEFAULT_NAME.to_owned()),
        development_type: text_field(row, &["category", "development_type"])
            .unwrap_or_else(|| UNKNOWN.to_owned()),
        status: text_field(row, &["status"]).unwrap_or_else(|| UNKNOWN.to_owned()),
        units: number_field(row, &["units"])
            .filter(|units| *units > 0.0)
            .map(|units| units.round() as u32),
        address: text_field(row, &["area_name", "address"]),
        applicant: text_field(row, &["applicant"]),
        submitted_date: text_field(row, &["date", "lodgement_date", "submitted_date"]),
    }
}
