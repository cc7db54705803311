//! Domain types for suburb lookups.
//!
//! | Module | Contents |
//! |--------|----------|
//! | `suburb_id` | validated [`SuburbId`] |
//! | `resource` | [`ResourceKind`], [`PropertyType`], [`ResolveOptions`] |
//! | `region` | [`Region`] postcode mapping |
//! | `records` | canonical response records |

mod records;
mod region;
mod resource;
mod suburb_id;

pub use records::{
    AgeBracket, AmenityCategory, Amenities, CanonicalRecord, Demographics, Development,
    Developments, EthnicityShare, MarketAnalytics, MarketTrends, PriceComparison, PriceGrowth,
    PricePoint, RegionalComparison, School, SchoolList, StreetRanking, StreetRankings,
    StudentCounts, SuburbDetails, SuburbSearchResult,
};
pub use region::Region;
pub use resource::{PropertyType, ResolveOptions, ResourceKind};
pub use suburb_id::SuburbId;
