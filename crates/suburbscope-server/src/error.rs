use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use suburbscope_core::{CoreError, ResolutionError, ValidationError};
use thiserror::Error;
use tracing::error;

/// Error body returned by every endpoint: `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<ResolutionError> for ApiError {
    fn from(err: ResolutionError) -> Self {
        match &err {
            ResolutionError::NotFound { .. } | ResolutionError::SuburbNotFound { .. } => {
                ApiError::NotFound(err.to_string())
            }
            ResolutionError::InvalidQuery(_) => ApiError::BadRequest(err.to_string()),
            ResolutionError::CorruptFixture { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("serialization error: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("Internal server error"),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Process-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("invalid listen address '{0}'")]
    Address(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Address(_) => 2,
            Self::Resolution(ResolutionError::InvalidQuery(_)) => 2,
            Self::Resolution(ResolutionError::NotFound { .. })
            | Self::Resolution(ResolutionError::SuburbNotFound { .. }) => 3,
            Self::Serialization(_) => 4,
            Self::Core(_) => 5,
            Self::Resolution(ResolutionError::CorruptFixture { .. }) => 5,
            Self::Io(_) => 10,
        }
    }
}
