//! # garden-engine
//!
//! The note graph and content engine: the public contract of the
//! knowledge-garden core.
//!
//! Services orchestrate the repository traits from `garden-core`, so they
//! run unchanged over the PostgreSQL gateway in `garden-db` or over
//! in-memory fakes in tests. Every operation takes the acting
//! [`Principal`](garden_core::Principal); nothing here crosses owners.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use garden_core::{CreateNoteRequest, Principal};
//! use garden_db::Database;
//! use garden_engine::NoteService;
//!
//! let db = Database::connect("postgres://localhost/garden").await?;
//! let notes = NoteService::new(
//!     Arc::new(db.notes.clone()),
//!     Arc::new(db.links.clone()),
//!     Arc::new(db.activity.clone()),
//! );
//!
//! let note = notes
//!     .create(owner, &CreateNoteRequest {
//!         title: "Beta".into(),
//!         content: "see [[Alpha]]".into(),
//!         kind: None,
//!     })
//!     .await?;
//! ```

pub mod activity;
pub mod notes;
mod reconcile;
pub mod tags;

pub use activity::ActivityService;
pub use notes::NoteService;
pub use tags::TagService;
