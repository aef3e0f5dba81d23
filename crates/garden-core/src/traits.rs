//! Repository traits for the storage gateway.
//!
//! One interface per entity, satisfied by the PostgreSQL implementations in
//! `garden-db` and by the in-memory fakes that drive the engine tests.
//! Every method takes the acting [`Principal`]; implementations must scope
//! every query by it and keep soft-deleted notes invisible outside the
//! explicit restore path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::principal::Principal;

/// Repository for note storage.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note and return the stored row, derived fields included.
    async fn create(
        &self,
        owner: Principal,
        title: &str,
        content: &str,
        kind: NoteKind,
    ) -> Result<Note>;

    /// Fetch a note by id. Soft-deleted or cross-owner notes are NotFound.
    async fn find_by_id(&self, owner: Principal, id: Uuid) -> Result<Note>;

    /// Fetch the newest note with an exact, case-sensitive title match.
    async fn find_by_title(&self, owner: Principal, title: &str) -> Result<Note>;

    /// List notes with filtering and pagination; returns `(notes, total)`.
    async fn list(&self, owner: Principal, filter: &NoteFilter) -> Result<(Vec<Note>, i64)>;

    /// Persist new title and content and return the stored row.
    async fn update_title_content(
        &self,
        owner: Principal,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Note>;

    /// Soft-delete a note. Already-deleted or missing notes are NotFound.
    async fn soft_delete(&self, owner: Principal, id: Uuid) -> Result<()>;

    /// Restore a soft-deleted note. Visible or missing notes are NotFound.
    async fn restore(&self, owner: Principal, id: Uuid) -> Result<()>;

    /// Atomically increment `access_count` and refresh `last_accessed_at`.
    async fn bump_access(&self, owner: Principal, id: Uuid) -> Result<()>;
}

/// Repository for tag storage and note attachment.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Insert a tag. A `(owner, name)` collision is a Conflict.
    async fn create(&self, owner: Principal, name: &str, color: Option<&str>) -> Result<Tag>;

    /// Fetch a tag by id.
    async fn find_by_id(&self, owner: Principal, id: Uuid) -> Result<Tag>;

    /// Fetch a tag by exact name.
    async fn find_by_name(&self, owner: Principal, name: &str) -> Result<Tag>;

    /// List all tags for the owner, name-ordered.
    async fn list(&self, owner: Principal) -> Result<Vec<Tag>>;

    /// List tags with per-tag note counts; zero-count tags included.
    /// Returns `(tags, total)`.
    async fn list_with_note_count(
        &self,
        owner: Principal,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<TagWithCount>, i64)>;

    /// Persist new name and/or color and return the stored row.
    async fn update(
        &self,
        owner: Principal,
        id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Tag>;

    /// Delete a tag; `note_tags` rows cascade off.
    async fn delete(&self, owner: Principal, id: Uuid) -> Result<()>;

    /// Attach a tag to a note. Idempotent.
    async fn attach(&self, owner: Principal, note_id: Uuid, tag_id: Uuid) -> Result<()>;

    /// Detach a tag from a note. A non-attached pair is NotFound.
    async fn detach(&self, owner: Principal, note_id: Uuid, tag_id: Uuid) -> Result<()>;

    /// All tags attached to a note, name-ordered.
    async fn list_for_note(&self, owner: Principal, note_id: Uuid) -> Result<Vec<Tag>>;

    /// All non-deleted notes carrying a tag, newest first.
    async fn list_notes_for_tag(&self, owner: Principal, tag_id: Uuid) -> Result<Vec<Note>>;
}

/// Repository for link-graph edges.
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Insert an edge. Idempotent on `(source, target)`.
    async fn create(
        &self,
        owner: Principal,
        source_note_id: Uuid,
        target_note_id: Uuid,
        link_context: Option<&str>,
    ) -> Result<()>;

    /// Outgoing edges of a note, newest first.
    async fn list_by_source(&self, owner: Principal, note_id: Uuid) -> Result<Vec<Link>>;

    /// Incoming edges of a note (backlinks), newest first.
    async fn list_by_target(&self, owner: Principal, note_id: Uuid) -> Result<Vec<Link>>;

    /// Delete one edge. A missing edge is NotFound.
    async fn delete(
        &self,
        owner: Principal,
        source_note_id: Uuid,
        target_note_id: Uuid,
    ) -> Result<()>;

    /// Delete every outgoing edge of a note.
    async fn delete_by_source(&self, owner: Principal, note_id: Uuid) -> Result<()>;

    /// Delete every edge touching a note, both directions.
    async fn delete_all_touching(&self, owner: Principal, note_id: Uuid) -> Result<()>;
}

/// Append-only activity log and its derived analytics queries.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Append an event; the repository assigns id and timestamp.
    async fn append(&self, owner: Principal, event: NewActivity) -> Result<Activity>;

    /// Most recent events, newest first.
    async fn list_recent(&self, owner: Principal, limit: i64) -> Result<Vec<Activity>>;

    /// Timestamp of the owner's most recent event, if any.
    async fn last_at(&self, owner: Principal) -> Result<Option<DateTime<Utc>>>;

    /// Aggregate statistics across the owner's corpus.
    async fn user_stats(&self, owner: Principal) -> Result<UserStats>;

    /// Notes ordered by `(access_count desc, last_accessed_at desc)`.
    async fn trending(&self, owner: Principal, limit: i64) -> Result<Vec<TrendingNote>>;

    /// Notes not accessed for at least `days`, stalest first.
    async fn forgotten(&self, owner: Principal, days: i64, limit: i64)
        -> Result<Vec<ForgottenNote>>;
}
