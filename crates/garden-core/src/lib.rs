//! # garden-core
//!
//! Core types, traits, and abstractions for the knowledge-garden backend.
//!
//! This crate provides:
//! - Domain models (notes, tags, links, activity) with their validation rules
//! - Repository traits the storage gateway implements
//! - The wiki-reference parser (`[[Title]]` / `[[Title|Display]]`)
//! - The error taxonomy shared across every crate
//! - Content metrics mirroring the database trigger rules

pub mod defaults;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod principal;
pub mod traits;
pub mod uuid_utils;
pub mod wiki;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use principal::Principal;
pub use traits::*;
pub use uuid_utils::new_v7;
pub use wiki::{extract_refs, normalize_title, rewrite_refs, strip_refs, WikiRef};
