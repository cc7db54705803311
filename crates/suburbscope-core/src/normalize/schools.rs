use serde::Deserialize;
use serde_json::{Map, Value};

use super::{as_object, from_canonical, result_rows, round_to};
use crate::data_source::{RawRecord, SourceError};
use crate::{School, SchoolList, StudentCounts};

const UNKNOWN: &str = "Unknown";

/// Provider school row: coded sector, 0–1 NAPLAN, separate gender counts.
#[derive(Debug, Deserialize)]
struct ProviderSchool {
    name: String,
    #[serde(default)]
    school_level_type: Option<String>,
    #[serde(default)]
    school_sector_type: Option<String>,
    #[serde(default)]
    naplan: Option<f64>,
    #[serde(default)]
    naplan_rank: Option<Value>,
    #[serde(default)]
    socioeconomic: Option<f64>,
    #[serde(default)]
    socioeconomic_rank: Option<Value>,
    #[serde(default)]
    attendance_rate: Option<f64>,
    #[serde(default)]
    boys: Option<f64>,
    #[serde(default)]
    girls: Option<f64>,
}

/// A row without a level or sector code reports `"Unknown"` for it, the
/// label the dashboard shows for unclassified schools.
impl From<ProviderSchool> for School {
    fn from(row: ProviderSchool) -> Self {
        let boys = count(row.boys);
        let girls = count(row.girls);
        let total = boys + girls;

        Self {
            name: row.name,
            school_type: row.school_level_type.unwrap_or_else(|| UNKNOWN.to_owned()),
            sector: canonical_sector(row.school_sector_type.as_deref().unwrap_or(UNKNOWN)),
            rating: row.naplan.map(|score| round_to(score * 5.0, 1)),
            distance: None,
            naplan_score: row.naplan,
            naplan_rank: row.naplan_rank,
            socioeconomic_score: row.socioeconomic,
            socioeconomic_rank: row.socioeconomic_rank,
            attendance_rate: row.attendance_rate,
            students: (total > 0).then_some(StudentCounts { boys, girls, total }),
            extra: Map::new(),
        }
    }
}

fn count(value: Option<f64>) -> u32 {
    value
        .filter(|count| count.is_finite() && *count > 0.0)
        .map_or(0, |count| count.round() as u32)
}

/// Provider sector codes mapped to the descriptive names the dashboard shows.
pub(crate) fn canonical_sector(code: &str) -> String {
    match code.trim() {
        "Public" => String::from("Government"),
        other => other.to_owned(),
    }
}

fn is_canonical(row: &Map<String, Value>) -> bool {
    row.contains_key("rating")
        || row.contains_key("distance")
        || (row.contains_key("sector") && !row.contains_key("school_sector_type"))
}

/// Normalizes one school row. Rows that already carry `rating`, `distance`
/// or a descriptive `sector` are canonical and come back unchanged.
pub fn normalize_school(row: Value) -> Result<School, SourceError> {
    let object = as_object(&row, "school")?;
    if is_canonical(object) {
        return from_canonical(row, "school");
    }

    serde_json::from_value::<ProviderSchool>(row)
        .map(School::from)
        .map_err(|error| SourceError::malformed(format!("provider school row is unusable: {error}")))
}

pub fn normalize_schools(raw: RawRecord) -> Result<SchoolList, SourceError> {
    let schools = match raw {
        RawRecord::Fixture(value) => from_canonical::<SchoolList>(value, "fixture schools")?.schools,
        RawRecord::Provider(value) => {
            let object = as_object(&value, "schools")?;
            if object.contains_key("schools") {
                from_canonical::<SchoolList>(value, "schools")?.schools
            } else {
                result_rows(&value)
                    .ok_or_else(|| SourceError::malformed("schools payload has no 'results' array"))?
                    .into_iter()
                    .map(normalize_school)
                    .collect::<Result<Vec<_>, _>>()?
            }
        }
    };

    Ok(SchoolList {
        total: schools.len(),
        schools,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data_source::SourceErrorKind;

    #[test]
    fn derives_rating_and_students_from_provider_row() {
        let school = normalize_school(json!({
            "name": "Belmont North Public School",
            "school_level_type": "Primary",
            "school_sector_type": "Public",
            "naplan": 0.8,
            "boys": 120,
            "girls": 131
        }))
        .expect("normalizes");

        assert_eq!(school.sector, "Government");
        assert_eq!(school.rating, Some(4.0));
        assert_eq!(school.naplan_score, Some(0.8));
        assert_eq!(
            school.students,
            Some(StudentCounts {
                boys: 120,
                girls: 131,
                total: 251
            })
        );
    }

    #[test]
    fn other_sectors_pass_through() {
        let school = normalize_school(json!({
            "name": "St Mary's",
            "school_sector_type": "Catholic"
        }))
        .expect("normalizes");
        assert_eq!(school.sector, "Catholic");
        assert_eq!(school.school_type, "Unknown");
    }

    #[test]
    fn null_naplan_leaves_rating_absent() {
        let school = normalize_school(json!({"name": "X", "naplan": null, "boys": 0, "girls": 0}))
            .expect("normalizes");
        assert_eq!(school.rating, None);
        assert_eq!(school.students, None);
    }

    #[test]
    fn missing_codes_read_unknown() {
        let school = normalize_school(json!({"name": "Valentine Campus", "naplan": 0.5}))
            .expect("normalizes");
        assert_eq!(school.school_type, "Unknown");
        assert_eq!(school.sector, "Unknown");
    }

    #[test]
    fn row_without_name_is_malformed() {
        let error = normalize_school(json!({"naplan": 0.5})).expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::MalformedUpstreamPayload);
    }

    #[test]
    fn provider_payload_without_results_is_malformed() {
        let error = normalize_schools(RawRecord::Provider(json!({"data": []}))).expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::MalformedUpstreamPayload);
    }

    #[test]
    fn fixture_list_total_follows_schools() {
        let list = normalize_schools(RawRecord::Fixture(json!({
            "schools": [{"name": "A", "type": "Primary", "sector": "Government", "rating": 4.5}],
            "total": 7
        })))
        .expect("fixture list");
        assert_eq!(list.total, 1);
    }
}
