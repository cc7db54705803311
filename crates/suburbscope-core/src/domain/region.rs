use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Australian state or territory, derived from a postcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Nsw,
    Act,
    Vic,
    Qld,
    Sa,
    Wa,
    Tas,
    Nt,
}

/// Inclusive postcode ranges. ACT enclaves inside the NSW block are listed
/// before NSW so the first match wins.
const POSTCODE_RANGES: [(u16, u16, Region); 14] = [
    (200, 299, Region::Act),
    (800, 999, Region::Nt),
    (2600, 2618, Region::Act),
    (2900, 2920, Region::Act),
    (1000, 2599, Region::Nsw),
    (2619, 2899, Region::Nsw),
    (2921, 2999, Region::Nsw),
    (3000, 3999, Region::Vic),
    (8000, 8999, Region::Vic),
    (4000, 4999, Region::Qld),
    (9000, 9999, Region::Qld),
    (5000, 5999, Region::Sa),
    (6000, 6999, Region::Wa),
    (7000, 7999, Region::Tas),
];

impl Region {
    pub const ALL: [Self; 8] = [
        Self::Nsw,
        Self::Act,
        Self::Vic,
        Self::Qld,
        Self::Sa,
        Self::Wa,
        Self::Tas,
        Self::Nt,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nsw => "NSW",
            Self::Act => "ACT",
            Self::Vic => "VIC",
            Self::Qld => "QLD",
            Self::Sa => "SA",
            Self::Wa => "WA",
            Self::Tas => "TAS",
            Self::Nt => "NT",
        }
    }

    /// Maps a four-digit postcode string to its region.
    pub fn from_postcode(postcode: &str) -> Option<Self> {
        let value = postcode.parse::<u16>().ok()?;
        POSTCODE_RANGES
            .iter()
            .find(|(low, high, _)| (*low..=*high).contains(&value))
            .map(|(_, _, region)| *region)
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|region| region.as_str() == wanted)
            .ok_or_else(|| ValidationError::InvalidRegion {
                value: value.trim().to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_capital_city_postcodes() {
        assert_eq!(Region::from_postcode("2000"), Some(Region::Nsw));
        assert_eq!(Region::from_postcode("2280"), Some(Region::Nsw));
        assert_eq!(Region::from_postcode("3000"), Some(Region::Vic));
        assert_eq!(Region::from_postcode("4000"), Some(Region::Qld));
        assert_eq!(Region::from_postcode("5000"), Some(Region::Sa));
        assert_eq!(Region::from_postcode("6000"), Some(Region::Wa));
        assert_eq!(Region::from_postcode("7000"), Some(Region::Tas));
        assert_eq!(Region::from_postcode("0800"), Some(Region::Nt));
    }

    #[test]
    fn unlisted_postcodes_have_no_region() {
        assert_eq!(Region::from_postcode("0100"), None);
        assert_eq!(Region::from_postcode("0199"), None);
        assert_eq!(Region::from_postcode("0799"), None);
    }

    #[test]
    fn act_enclaves_win_over_nsw() {
        assert_eq!(Region::from_postcode("2600"), Some(Region::Act));
        assert_eq!(Region::from_postcode("2913"), Some(Region::Act));
        assert_eq!(Region::from_postcode("2620"), Some(Region::Nsw));
    }

    #[test]
    fn parses_region_codes_case_insensitively() {
        assert_eq!("nsw".parse::<Region>(), Ok(Region::Nsw));
        assert!("NZ".parse::<Region>().is_err());
    }
}
