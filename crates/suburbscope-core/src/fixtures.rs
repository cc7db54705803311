//! Bundled static dataset keyed by `(suburb id, resource kind)`.
//!
//! Loaded once at startup and read-only afterwards.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::data_source::{RawRecord, SourceError};
use crate::error::CoreError;
use crate::{ResourceKind, SuburbId};

const SUBURBS_FILE: &str = "suburbs.json";

/// Read-only fixture lookup consulted by the resolver.
pub trait FixtureSource: Send + Sync {
    /// # Errors
    ///
    /// [`SourceErrorKind::FixtureMissing`](crate::SourceErrorKind::FixtureMissing)
    /// when no entry exists for the pair.
    fn lookup(&self, suburb: &SuburbId, kind: ResourceKind) -> Result<RawRecord, SourceError>;

    /// Catalogue entries whose name contains `query`, case-insensitively.
    fn search(&self, query: &str) -> Vec<Value>;
}

/// File name holding the fixtures of one kind, if the kind has any.
pub const fn fixture_file(kind: ResourceKind) -> Option<&'static str> {
    match kind {
        ResourceKind::Info => Some("suburb_info.json"),
        ResourceKind::Summary => Some("suburb_summary.json"),
        ResourceKind::Demographics => Some("demographics.json"),
        ResourceKind::Amenities => Some("amenities.json"),
        ResourceKind::MarketTrends => Some("market_trends.json"),
        ResourceKind::Schools => Some("schools.json"),
        ResourceKind::Developments => Some("developments.json"),
        ResourceKind::StreetInsights => Some("street_insights.json"),
        ResourceKind::StreetRankings
        | ResourceKind::MarketInsights
        | ResourceKind::PocketInsights
        | ResourceKind::Risk
        | ResourceKind::Catchments
        | ResourceKind::Zoning
        | ResourceKind::Similar => None,
    }
}

/// Street rankings are derived from the street insights fixtures.
const fn storage_kind(kind: ResourceKind) -> ResourceKind {
    match kind {
        ResourceKind::StreetRankings => ResourceKind::StreetInsights,
        other => other,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureStore {
    entries: HashMap<ResourceKind, Map<String, Value>>,
    suburbs: Vec<Value>,
}

impl FixtureStore {
    /// Loads every known fixture file from `dir`. Absent files leave their
    /// kind empty; unreadable or non-object files are errors.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, CoreError> {
        let dir = dir.as_ref();
        let mut store = Self::default();

        for kind in ResourceKind::ALL {
            let Some(file) = fixture_file(kind) else {
                continue;
            };
            let Some(value) = read_json(&dir.join(file))? else {
                debug!(resource = kind.as_str(), file, "fixture file absent");
                continue;
            };
            match value {
                Value::Object(entries) => {
                    store.entries.insert(kind, entries);
                }
                _ => {
                    return Err(CoreError::FixtureShape {
                        path: dir.join(file).display().to_string(),
                    })
                }
            }
        }

        let suburbs_path = dir.join(SUBURBS_FILE);
        store.suburbs = match read_json(&suburbs_path)? {
            None => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(Value::Object(items)) => items.into_iter().map(|(_, item)| item).collect(),
            Some(_) => {
                return Err(CoreError::FixtureShape {
                    path: suburbs_path.display().to_string(),
                })
            }
        };

        info!(
            dir = %dir.display(),
            kinds = store.entries.len(),
            suburbs = store.suburbs.len(),
            "fixture store loaded"
        );
        Ok(store)
    }

    pub fn with_entry(mut self, kind: ResourceKind, suburb: &SuburbId, value: Value) -> Self {
        self.entries
            .entry(storage_kind(kind))
            .or_default()
            .insert(suburb.as_str().to_owned(), value);
        self
    }

    pub fn with_suburbs(mut self, suburbs: Vec<Value>) -> Self {
        self.suburbs = suburbs;
        self
    }

    pub fn contains(&self, suburb: &SuburbId, kind: ResourceKind) -> bool {
        self.entries
            .get(&storage_kind(kind))
            .is_some_and(|entries| entries.contains_key(suburb.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Map::is_empty) && self.suburbs.is_empty()
    }
}

impl FixtureSource for FixtureStore {
    fn lookup(&self, suburb: &SuburbId, kind: ResourceKind) -> Result<RawRecord, SourceError> {
        self.entries
            .get(&storage_kind(kind))
            .and_then(|entries| entries.get(suburb.as_str()))
            .cloned()
            .map(RawRecord::Fixture)
            .ok_or_else(|| SourceError::fixture_missing(suburb, kind))
    }

    fn search(&self, query: &str) -> Vec<Value> {
        let needle = query.trim().to_lowercase();
        self.suburbs
            .iter()
            .filter(|item| {
                item.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }
}

fn read_json(path: &Path) -> Result<Option<Value>, CoreError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CoreError::FixtureIo {
                path: path.display().to_string(),
                source,
            })
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| CoreError::FixtureParse {
            path: path.display().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data_source::SourceErrorKind;

    fn id(value: &str) -> SuburbId {
        SuburbId::parse(value).expect("valid suburb id")
    }

    #[test]
    fn loads_present_files_and_skips_absent_ones() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join("market_trends.json"),
            r#"{"melbourne-3000": {"priceHistory": [], "rentalYield": 3.4}}"#,
        )
        .expect("write fixture");
        std::fs::write(
            dir.path().join("suburbs.json"),
            r#"[{"id": "melbourne-3000", "name": "Melbourne"}]"#,
        )
        .expect("write catalogue");

        let store = FixtureStore::load_dir(dir.path()).expect("store loads");

        let raw = store
            .lookup(&id("melbourne-3000"), ResourceKind::MarketTrends)
            .expect("entry");
        assert_eq!(raw.value()["rentalYield"], json!(3.4));
        assert!(!store.contains(&id("melbourne-3000"), ResourceKind::Schools));
        assert_eq!(store.search("MELB").len(), 1);
    }

    #[test]
    fn missing_suburb_is_fixture_missing_not_a_substitute() {
        let store = FixtureStore::default().with_entry(
            ResourceKind::Schools,
            &id("melbourne-3000"),
            json!({"schools": []}),
        );

        let error = store
            .lookup(&id("sydney-2000"), ResourceKind::Schools)
            .expect_err("must miss");

        assert_eq!(error.kind(), SourceErrorKind::FixtureMissing);
    }

    #[test]
    fn rejects_invalid_json_and_wrong_shapes() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("schools.json"), "{not json").expect("write");
        assert!(matches!(
            FixtureStore::load_dir(dir.path()),
            Err(CoreError::FixtureParse { .. })
        ));

        std::fs::write(dir.path().join("schools.json"), "[1, 2]").expect("write");
        assert!(matches!(
            FixtureStore::load_dir(dir.path()),
            Err(CoreError::FixtureShape { .. })
        ));
    }

    #[test]
    fn empty_directory_loads_an_empty_store() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FixtureStore::load_dir(dir.path()).expect("store loads");
        assert!(store.is_empty());
    }
}
