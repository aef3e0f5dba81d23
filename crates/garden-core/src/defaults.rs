//! Shared limits and defaults.

/// Maximum note title length in characters.
pub const TITLE_MAX_CHARS: usize = 500;

/// Maximum note content length in characters.
pub const CONTENT_MAX_CHARS: usize = 100_000;

/// Maximum tag name length in characters.
pub const TAG_NAME_MAX_CHARS: usize = 100;

/// Default page size for listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Maximum page size for listings.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Words per minute assumed when deriving reading time.
pub const READING_WORDS_PER_MINUTE: i32 = 200;

/// Bytes of surrounding text captured on each side of a wiki reference.
pub const LINK_CONTEXT_RADIUS: usize = 50;

/// Maximum results for trending and forgotten queries.
pub const ANALYTICS_MAX_LIMIT: i64 = 50;

/// Maximum notes loaded into a graph snapshot.
pub const GRAPH_NODE_LIMIT: i64 = 1000;

/// Title prefix for daily notes; the date string is appended verbatim.
pub const DAILY_TITLE_PREFIX: &str = "Daily Note - ";
