//! Structured logging field names shared by the resolver, live client and server.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Provider contract violations, corrupt fixtures |
//! | WARN  | Live call failed, fixture fallback applied |
//! | INFO  | Lifecycle events, fallback-served results |
//! | DEBUG | Routing decisions, per-call timings |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Per-resolution correlation id (UUIDv4).
pub const REQUEST_ID: &str = "request_id";

/// Canonical suburb id being resolved.
pub const SUBURB_ID: &str = "suburb_id";

/// Resource kind, camelCase (`marketTrends`).
pub const RESOURCE: &str = "resource";

// ─── Routing fields ────────────────────────────────────────────────────────

/// Classifier output. Values: "live", "fallback"
pub const DECISION: &str = "decision";

/// Where the served body came from. Values: "live", "fixture", "empty"
pub const ORIGIN: &str = "origin";

/// Stable `SourceError::code()` of a recovered or terminal failure.
pub const ERROR_CODE: &str = "error_code";

/// Live attempt number, starting at 1.
pub const ATTEMPT: &str = "attempt";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search.
pub const RESULT_COUNT: &str = "result_count";
