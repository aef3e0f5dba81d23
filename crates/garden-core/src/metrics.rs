//! Content metrics mirrored from the database triggers.
//!
//! The relational store derives `word_count` and `reading_time_minutes` in a
//! trigger on every content write. These functions implement the same rules
//! for in-memory stores and property tests, so both paths agree.

use crate::defaults::READING_WORDS_PER_MINUTE;

/// Count whitespace-delimited tokens.
pub fn word_count(content: &str) -> i32 {
    content.split_whitespace().count() as i32
}

/// Reading time in whole minutes: `ceil(words / 200)`, zero for empty text.
pub fn reading_time_minutes(word_count: i32) -> i32 {
    if word_count <= 0 {
        return 0;
    }
    (word_count + READING_WORDS_PER_MINUTE - 1) / READING_WORDS_PER_MINUTE
}
