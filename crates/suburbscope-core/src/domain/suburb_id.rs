use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const POSTCODE_LEN: usize = 4;

/// Canonical suburb identifier, `<slug>` or `<slug>-<postcode>`.
///
/// The slug is one or more lowercase ASCII words joined by single hyphens;
/// the optional postcode is exactly four digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SuburbId(String);

impl SuburbId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySuburbId);
        }

        let invalid = || ValidationError::InvalidSuburbId {
            value: trimmed.to_owned(),
        };

        let segments = trimmed.split('-').collect::<Vec<_>>();
        let (last, words) = segments.split_last().ok_or_else(invalid)?;

        let word_segments = if is_postcode(last) { words } else { &segments[..] };
        if word_segments.is_empty() {
            return Err(invalid());
        }

        for word in word_segments {
            if word.is_empty() || !word.chars().all(|ch| ch.is_ascii_lowercase()) {
                return Err(invalid());
            }
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing four-digit postcode, when the id carries one.
    pub fn postcode(&self) -> Option<&str> {
        self.0
            .rsplit_once('-')
            .map(|(_, tail)| tail)
            .filter(|tail| is_postcode(tail))
    }

    /// Slug without the postcode suffix.
    pub fn slug(&self) -> &str {
        match self.postcode() {
            Some(postcode) => &self.0[..self.0.len() - postcode.len() - 1],
            None => &self.0,
        }
    }

    /// Human suburb name used to address the live provider ("Belmont North").
    pub fn display_name(&self) -> String {
        self.slug()
            .split('-')
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn is_postcode(value: &str) -> bool {
    value.len() == POSTCODE_LEN && value.chars().all(|ch| ch.is_ascii_digit())
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

impl Display for SuburbId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SuburbId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for SuburbId {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SuburbId> for String {
    fn from(value: SuburbId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slug_with_postcode() {
        let id = SuburbId::parse(" belmont-north-2280 ").expect("id should parse");
        assert_eq!(id.as_str(), "belmont-north-2280");
        assert_eq!(id.postcode(), Some("2280"));
        assert_eq!(id.slug(), "belmont-north");
        assert_eq!(id.display_name(), "Belmont North");
    }

    #[test]
    fn parses_slug_without_postcode() {
        let id = SuburbId::parse("melbourne").expect("id should parse");
        assert_eq!(id.postcode(), None);
        assert_eq!(id.display_name(), "Melbourne");
    }

    #[test]
    fn rejects_uppercase_and_symbols() {
        for bad in ["Melbourne-3000", "melbourne_3000", "melbourne--3000", "3000", "melb-30000"] {
            let err = SuburbId::parse(bad).expect_err("must fail");
            assert!(matches!(err, ValidationError::InvalidSuburbId { .. }), "{bad}");
        }
    }

    #[test]
    fn rejects_empty() {
        let err = SuburbId::parse("  ").expect_err("must fail");
        assert_eq!(err, ValidationError::EmptySuburbId);
    }
}
