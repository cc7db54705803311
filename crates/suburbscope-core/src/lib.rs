//! # Suburbscope Core
//!
//! Data resolution layer for the suburb-analytics dashboard.
//!
//! ## Overview
//!
//! For every per-suburb resource the resolver decides whether to ask the live
//! property-data provider or the bundled fixture dataset, normalizes whichever
//! shape comes back into one canonical record, and wraps it in a
//! suburb-id-keyed envelope. Provider availability is never a single point of
//! failure for a suburb the fixtures also know.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Live provider client (Microburbs) |
//! | [`config`] | Environment-driven settings |
//! | [`data_source`] | Live source trait, raw records, source errors |
//! | [`domain`] | Suburb ids, resource kinds, regions, canonical records |
//! | [`eligibility`] | Live-eligibility classifiers |
//! | [`envelope`] | Response bodies |
//! | [`error`] | Core error types |
//! | [`fixtures`] | Load-once fixture store |
//! | [`http_client`] | HTTP client abstraction |
//! | [`logging`] | Structured log field names |
//! | [`normalize`] | Provider/fixture to canonical mapping |
//! | [`resolver`] | Composite resolver |
//! | [`retry`] | Resolver-side retry policy |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ HTTP / CLI      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Composite       │────▶│ Eligibility      │
//! │ Resolver        │     │ Classifier       │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!    ┌─────┴──────┐
//!    ▼            ▼
//! ┌────────┐  ┌──────────┐
//! │ Live   │  │ Fixture  │
//! │ Client │  │ Store    │
//! └───┬────┘  └────┬─────┘
//!     └─────┬──────┘
//!           ▼
//! ┌─────────────────┐
//! │ Normalizer      │
//! └─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use suburbscope_core::{CompositeResolver, FixtureStore, ResourceKind, SuburbId};
//!
//! let fixtures = FixtureStore::load_dir("data")?;
//! let resolver = CompositeResolver::builder(Arc::new(fixtures)).build();
//! let resolution = resolver
//!     .resolve(&SuburbId::parse("melbourne-3000")?, ResourceKind::MarketTrends)
//!     .await?;
//! println!("{}", resolution.body.to_value()?);
//! ```

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod eligibility;
pub mod envelope;
pub mod error;
pub mod fixtures;
pub mod http_client;
pub mod logging;
pub mod normalize;
pub mod resolver;
pub mod retry;

pub use adapters::MicroburbsClient;

pub use config::{LiveApiSettings, Settings};

pub use data_source::{PropertyDataSource, RawRecord, SourceError, SourceErrorKind, SourceKind};

pub use domain::{
    AgeBracket, Amenities, AmenityCategory, CanonicalRecord, Demographics, Development,
    Developments, EthnicityShare, MarketAnalytics, MarketTrends, PriceComparison, PriceGrowth,
    PricePoint, PropertyType, Region, RegionalComparison, ResolveOptions, ResourceKind, School,
    SchoolList, StreetRanking, StreetRankings, StudentCounts, SuburbDetails, SuburbId,
    SuburbSearchResult,
};

pub use eligibility::{EligibilityClassifier, FixedDecision, PartitionRule, SourceDecision};

pub use envelope::{ExtendedResults, ResourceBody, SuburbEnvelope};

pub use error::{CoreError, ValidationError};

pub use fixtures::{FixtureSource, FixtureStore};

pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

pub use resolver::{
    CompositeResolver, CompositeResolverBuilder, Dashboard, DashboardPanel, Resolution,
    ResolutionError, SourceOrigin,
};

pub use retry::{Backoff, RetryConfig};
