//! Structured logging field name constants.
//!
//! All crates log through `tracing` with these field names so aggregation
//! tools can query consistently across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, best-effort work swallowed |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values |
//! | TRACE | Per-item iteration, high-volume data |

/// Subsystem originating the log event.
/// Values: "engine", "db".
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "notes", "tags", "reconciler", "pool", "activity".
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "get", "reconcile", "bump_access".
pub const OPERATION: &str = "op";

/// Acting owner (user id).
pub const OWNER_ID: &str = "owner_id";

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Tag UUID being operated on.
pub const TAG_ID: &str = "tag_id";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
