//! Response envelopes.
//!
//! Per-suburb kinds answer `{ "<suburbId>": record }`; live-only kinds answer
//! `{ "results": [...], "total": n }` and are never an error.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{CanonicalRecord, SuburbId};

/// Suburb-id-keyed wrapper around one canonical record.
#[derive(Debug, Clone, PartialEq)]
pub struct SuburbEnvelope {
    suburb_id: SuburbId,
    record: CanonicalRecord,
}

impl SuburbEnvelope {
    pub fn new(suburb_id: SuburbId, record: CanonicalRecord) -> Self {
        Self { suburb_id, record }
    }

    pub fn suburb_id(&self) -> &SuburbId {
        &self.suburb_id
    }

    pub fn record(&self) -> &CanonicalRecord {
        &self.record
    }

    pub fn into_record(self) -> CanonicalRecord {
        self.record
    }
}

impl Serialize for SuburbEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.suburb_id.as_str(), &self.record)?;
        map.end()
    }
}

/// Body of the live-only extended kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedResults {
    pub results: Vec<Value>,
    pub total: usize,
    /// Other top-level provider fields (e.g. GeoJSON layers).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExtendedResults {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            total: 0,
            extra: Map::new(),
        }
    }

    /// Reshapes a provider payload; a payload without `results` becomes the
    /// single result.
    pub fn from_payload(payload: Value) -> Self {
        let (results, extra) = match payload {
            Value::Array(items) => (items, Map::new()),
            Value::Object(mut object) => {
                object.remove("total");
                match object.remove("results") {
                    Some(Value::Array(items)) => (items, object),
                    Some(Value::Null) | None if object.is_empty() => (Vec::new(), Map::new()),
                    Some(Value::Null) | None => (vec![Value::Object(object)], Map::new()),
                    Some(other) => (vec![other], object),
                }
            }
            Value::Null => (Vec::new(), Map::new()),
            other => (vec![other], Map::new()),
        };

        Self {
            total: results.len(),
            results,
            extra,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Serialized body of a resolved resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceBody {
    Suburb(SuburbEnvelope),
    Extended(ExtendedResults),
}

impl ResourceBody {
    /// The canonical record, when the body is a suburb envelope.
    pub fn record(&self) -> Option<&CanonicalRecord> {
        match self {
            Self::Suburb(envelope) => Some(envelope.record()),
            Self::Extended(_) => None,
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
