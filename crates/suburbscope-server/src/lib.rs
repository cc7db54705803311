//! # Suburbscope Server
//!
//! Thin HTTP shim over [`suburbscope_core::CompositeResolver`]: request
//! parsing, error mapping, CORS, tracing and request ids. All routing and
//! fallback decisions live in the core crate.

pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use error::{ApiError, ServerError};
pub use routes::{router, DATA_SOURCE_HEADER};
pub use state::AppState;
