//! UUID v7 utilities for time-ordered identifiers.
//!
//! Row identifiers across the store are UUIDv7: the embedded millisecond
//! timestamp makes ids sort in creation order, which keeps index pages warm
//! and makes "newest first" scans cheap.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Whether a UUID is version 7.
pub fn is_v7(id: &Uuid) -> bool {
    id.get_version_num() == 7
}
