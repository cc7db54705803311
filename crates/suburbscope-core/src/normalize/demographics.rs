use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{as_object, from_canonical, round_to};
use crate::data_source::{RawRecord, SourceError};
use crate::{AgeBracket, Demographics, EthnicityShare};

const TOP_ETHNICITIES: usize = 10;

#[derive(Debug, Deserialize)]
struct ProviderAgeBracket {
    age: String,
    #[serde(default)]
    gender: Option<String>,
    proportion: f64,
}

#[derive(Debug, Deserialize)]
struct ProviderEthnicity {
    #[serde(default, alias = "name")]
    ethnicity: Option<String>,
    #[serde(default)]
    proportion: Option<f64>,
    /// Already a percentage when present.
    #[serde(default)]
    percentage: Option<f64>,
}

pub fn normalize_demographics(raw: RawRecord) -> Result<Demographics, SourceError> {
    let value = match raw {
        RawRecord::Fixture(value) => return from_canonical(value, "fixture demographics"),
        RawRecord::Provider(value) => value,
    };

    let object = as_object(&value, "demographics")?;
    if object.contains_key("ageDistribution") {
        return from_canonical(value, "demographics");
    }
    if !["age_brackets", "ethnicities", "results"]
        .iter()
        .any(|key| object.contains_key(*key))
    {
        return Err(SourceError::malformed(
            "demographics payload has neither age brackets nor ethnicity data",
        ));
    }

    let age_distribution = match object.get("age_brackets") {
        Some(brackets) => age_distribution(brackets.clone())?,
        None => Vec::new(),
    };
    let ethnicity = match (object.get("ethnicities"), object.get("results")) {
        (Some(list), _) => ethnicity_list(list.clone())?,
        (None, Some(Value::Array(areas))) => averaged_ethnicity(areas),
        _ => Vec::new(),
    };

    Ok(Demographics {
        age_distribution,
        ethnicity,
        extra: Map::new(),
    })
}

/// Persons-only brackets in provider order; a repeated age keeps the later value.
fn age_distribution(brackets: Value) -> Result<Vec<AgeBracket>, SourceError> {
    let brackets = serde_json::from_value::<Vec<ProviderAgeBracket>>(brackets)
        .map_err(|error| SourceError::malformed(format!("age brackets are unusable: {error}")))?;

    let mut ordered: Vec<AgeBracket> = Vec::new();
    for bracket in brackets
        .into_iter()
        .filter(|bracket| bracket.gender.as_deref().map_or(true, |gender| gender == "persons"))
    {
        let entry = AgeBracket {
            percentage: round_to(bracket.proportion * 100.0, 1),
            age: bracket.age,
            population: None,
        };
        match ordered.iter_mut().find(|existing| existing.age == entry.age) {
            Some(existing) => *existing = entry,
            None => ordered.push(entry),
        }
    }
    Ok(ordered)
}

fn ethnicity_list(list: Value) -> Result<Vec<EthnicityShare>, SourceError> {
    let rows = serde_json::from_value::<Vec<ProviderEthnicity>>(list)
        .map_err(|error| SourceError::malformed(format!("ethnicity list is unusable: {error}")))?;

    let shares = rows
        .into_iter()
        .filter_map(|row| {
            let name = row.ethnicity.filter(|name| !name.trim().is_empty())?;
            let percentage = match (row.proportion, row.percentage) {
                (Some(proportion), _) => proportion * 100.0,
                (None, Some(percentage)) => percentage,
                (None, None) => return None,
            };
            Some(EthnicityShare {
                name,
                percentage: round_to(percentage, 1),
            })
        })
        .collect();
    Ok(top_shares(shares))
}

/// Mean share across statistical areas that report an ethnicity map.
fn averaged_ethnicity(areas: &[Value]) -> Vec<EthnicityShare> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut reporting = 0_usize;

    for breakdown in areas
        .iter()
        .filter_map(|area| area.get("ethnicity").and_then(Value::as_object))
    {
        reporting += 1;
        for (name, proportion) in breakdown {
            if let Some(proportion) = proportion.as_f64() {
                *totals.entry(name.clone()).or_default() += proportion;
            }
        }
    }

    if reporting == 0 {
        return Vec::new();
    }

    let shares = totals
        .into_iter()
        .map(|(name, total)| EthnicityShare {
            name,
            percentage: round_to(total / reporting as f64 * 100.0, 1),
        })
        .collect();
    top_shares(shares)
}

fn top_shares(mut shares: Vec<EthnicityShare>) -> Vec<EthnicityShare> {
    shares.sort_by(|left, right| {
        right
            .percentage
            .total_cmp(&left.percentage)
            .then_with(|| left.name.cmp(&right.name))
    });
    shares.truncate(TOP_ETHNICITIES);
    shares
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data_source::SourceErrorKind;

    #[test]
    fn keeps_persons_brackets_only() {
        let demographics = normalize_demographics(RawRecord::Provider(json!({
            "age_brackets": [
                {"age": "0-4", "gender": "male", "proportion": 0.03},
                {"age": "0-4", "gender": "persons", "proportion": 0.061},
                {"age": "5-9", "gender": "persons", "proportion": 0.07}
            ]
        })))
        .expect("normalizes");

        assert_eq!(demographics.age_distribution.len(), 2);
        assert_eq!(demographics.age_distribution[0].age, "0-4");
        assert_eq!(demographics.age_distribution[0].percentage, 6.1);
        assert_eq!(demographics.age_distribution[0].population, None);
        assert!(demographics.ethnicity.is_empty());
    }

    #[test]
    fn averages_area_ethnicity_and_sorts_descending() {
        let demographics = normalize_demographics(RawRecord::Provider(json!({
            "results": [
                {"ethnicity": {"Australian": 0.4, "English": 0.2}},
                {"ethnicity": {"Australian": 0.2, "Chinese": 0.3}},
                {"sa1": "no breakdown"}
            ]
        })))
        .expect("normalizes");

        let names = demographics
            .ethnicity
            .iter()
            .map(|share| share.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Australian", "Chinese", "English"]);
        assert_eq!(demographics.ethnicity[0].percentage, 30.0);
    }

    #[test]
    fn ethnicity_list_is_capped_at_ten() {
        let list = (0..15)
            .map(|index| json!({"ethnicity": format!("Group {index:02}"), "proportion": 0.01 * index as f64}))
            .collect::<Vec<_>>();
        let demographics = normalize_demographics(RawRecord::Provider(json!({"ethnicities": list})))
            .expect("normalizes");

        assert_eq!(demographics.ethnicity.len(), 10);
        assert_eq!(demographics.ethnicity[0].name, "Group 14");
    }

    #[test]
    fn unrelated_payload_is_malformed() {
        let error = normalize_demographics(RawRecord::Provider(json!({"status": "ok"})))
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::MalformedUpstreamPayload);
    }
}
