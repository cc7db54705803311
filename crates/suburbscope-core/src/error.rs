use thiserror::Error;

/// Validation and contract errors exposed by `suburbscope-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("suburb id cannot be empty")]
    EmptySuburbId,
    #[error(
        "invalid suburb id '{value}', expected 'suburb-name' or 'suburb-name-postcode' (e.g. 'melbourne-3000')"
    )]
    InvalidSuburbId { value: String },

    #[error("unknown resource kind '{value}'")]
    InvalidResourceKind { value: String },
    #[error("invalid property type '{value}', expected one of house, unit")]
    InvalidPropertyType { value: String },
    #[error("invalid region '{value}', expected one of NSW, VIC, QLD, SA, WA, TAS, NT, ACT")]
    InvalidRegion { value: String },

    #[error("search query parameter 'q' is required")]
    EmptySearchQuery,
    #[error("search query must not exceed {max} characters")]
    SearchQueryTooLong { max: usize },

    #[error("invalid value for {name}: '{value}'")]
    InvalidSetting { name: &'static str, value: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("fixture file '{path}' could not be read: {source}")]
    FixtureIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fixture file '{path}' is not valid JSON: {source}")]
    FixtureParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("fixture file '{path}' must contain a JSON object keyed by suburb id")]
    FixtureShape { path: String },
}
