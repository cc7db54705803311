//! Live-eligibility classification.
//!
//! Classifiers are pure and total: an id they cannot place is `Fallback`.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use crate::{Region, SuburbId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceDecision {
    Live,
    Fallback,
}

impl SourceDecision {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fallback => "fallback",
        }
    }
}

impl Display for SourceDecision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait EligibilityClassifier: Send + Sync {
    fn classify(&self, suburb: &SuburbId) -> SourceDecision;
}

/// Static partition: explicit suburb ids plus every suburb whose postcode
/// falls inside a configured region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionRule {
    regions: BTreeSet<Region>,
    suburbs: BTreeSet<SuburbId>,
}

impl PartitionRule {
    pub fn new(
        regions: impl IntoIterator<Item = Region>,
        suburbs: impl IntoIterator<Item = SuburbId>,
    ) -> Self {
        Self {
            regions: regions.into_iter().collect(),
            suburbs: suburbs.into_iter().collect(),
        }
    }

    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.regions.iter().copied()
    }
}

impl EligibilityClassifier for PartitionRule {
    fn classify(&self, suburb: &SuburbId) -> SourceDecision {
        if self.suburbs.contains(suburb) {
            return SourceDecision::Live;
        }

        match suburb.postcode().and_then(Region::from_postcode) {
            Some(region) if self.regions.contains(&region) => SourceDecision::Live,
            _ => SourceDecision::Fallback,
        }
    }
}

/// Classifier that ignores the id; installed by the mock-data override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDecision(pub SourceDecision);

impl EligibilityClassifier for FixedDecision {
    fn classify(&self, _suburb: &SuburbId) -> SourceDecision {
        self.0
    }
}
