//! Core data models for the knowledge-garden backend.
//!
//! Entities are plain records with tagged enums for note kind and activity
//! action; all of them are owner-scoped and serialize to the wire shapes
//! the HTTP surface exposes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// NOTE TYPES
// =============================================================================

/// Kind of note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    #[default]
    Note,
    Daily,
    Meeting,
    Idea,
}

impl NoteKind {
    /// Database representation (the `note_type` column).
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Note => "note",
            NoteKind::Daily => "daily",
            NoteKind::Meeting => "meeting",
            NoteKind::Idea => "idea",
        }
    }
}

impl std::str::FromStr for NoteKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "note" => Ok(NoteKind::Note),
            "daily" => Ok(NoteKind::Daily),
            "meeting" => Ok(NoteKind::Meeting),
            "idea" => Ok(NoteKind::Idea),
            other => Err(Error::validation(
                "kind",
                format!("unknown note kind '{}'", other),
            )),
        }
    }
}

impl std::fmt::Display for NoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A note owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub kind: NoteKind,
    pub word_count: i32,
    pub reading_time_minutes: i32,
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub access_count: i32,
    pub metadata: JsonValue,
}

/// Request for creating a new note.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub kind: Option<NoteKind>,
}

impl CreateNoteRequest {
    /// Check field bounds; returns the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.title.is_empty() {
            return Err(Error::validation("title", "must not be empty"));
        }
        if self.title.chars().count() > defaults::TITLE_MAX_CHARS {
            return Err(Error::validation(
                "title",
                format!("must be at most {} characters", defaults::TITLE_MAX_CHARS),
            ));
        }
        if self.content.chars().count() > defaults::CONTENT_MAX_CHARS {
            return Err(Error::validation(
                "content",
                format!("must be at most {} characters", defaults::CONTENT_MAX_CHARS),
            ));
        }
        Ok(())
    }
}

/// Request for updating a note; both fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl UpdateNoteRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.is_empty() {
                return Err(Error::validation("title", "must not be empty"));
            }
            if title.chars().count() > defaults::TITLE_MAX_CHARS {
                return Err(Error::validation(
                    "title",
                    format!("must be at most {} characters", defaults::TITLE_MAX_CHARS),
                ));
            }
        }
        if let Some(content) = &self.content {
            if content.chars().count() > defaults::CONTENT_MAX_CHARS {
                return Err(Error::validation(
                    "content",
                    format!("must be at most {} characters", defaults::CONTENT_MAX_CHARS),
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// LISTING & FILTERING
// =============================================================================

/// Field to sort note listings by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    AccessCount,
}

impl SortBy {
    /// Column name for ORDER BY. Sort fields map through this match so user
    /// input never reaches the SQL string.
    pub fn as_column(&self) -> &'static str {
        match self {
            SortBy::CreatedAt => "created_at",
            SortBy::UpdatedAt => "updated_at",
            SortBy::Title => "title",
            SortBy::AccessCount => "access_count",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filter for listing and searching notes.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteFilter {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub kind: Option<NoteKind>,
    #[serde(default)]
    pub tag_id: Option<Uuid>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_order: SortOrder,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    defaults::DEFAULT_PAGE_LIMIT
}

impl Default for NoteFilter {
    fn default() -> Self {
        Self {
            page: 1,
            limit: defaults::DEFAULT_PAGE_LIMIT,
            kind: None,
            tag_id: None,
            search: None,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl NoteFilter {
    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(Error::validation("page", "must be at least 1"));
        }
        if self.limit < 1 || self.limit > defaults::MAX_PAGE_LIMIT {
            return Err(Error::validation(
                "limit",
                format!("must be between 1 and {}", defaults::MAX_PAGE_LIMIT),
            ));
        }
        Ok(())
    }

    /// OFFSET implied by page and limit.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Whether the full-text predicate applies.
    pub fn has_search(&self) -> bool {
        self.search.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Pagination metadata carried in list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

// =============================================================================
// TAG TYPES
// =============================================================================

/// A user-defined tag. `(user_id, name)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A tag with the number of notes currently carrying it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: Tag,
    pub note_count: i64,
}

/// Request for creating a tag.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl CreateTagRequest {
    pub fn validate(&self) -> Result<()> {
        validate_tag_name(&self.name)?;
        if let Some(color) = &self.color {
            validate_tag_color(color)?;
        }
        Ok(())
    }
}

/// Request for updating a tag; both fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTagRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl UpdateTagRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_tag_name(name)?;
        }
        if let Some(color) = &self.color {
            validate_tag_color(color)?;
        }
        Ok(())
    }
}

fn validate_tag_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation("name", "must not be empty"));
    }
    if name.chars().count() > defaults::TAG_NAME_MAX_CHARS {
        return Err(Error::validation(
            "name",
            format!("must be at most {} characters", defaults::TAG_NAME_MAX_CHARS),
        ));
    }
    Ok(())
}

fn validate_tag_color(color: &str) -> Result<()> {
    let mut chars = color.chars();
    let well_formed = color.len() == 7
        && chars.next() == Some('#')
        && chars.all(|c| c.is_ascii_hexdigit());
    if !well_formed {
        return Err(Error::validation("color", "must be a 7-character hex color"));
    }
    Ok(())
}

// =============================================================================
// LINK TYPES
// =============================================================================

/// A directed edge between two notes of the same owner, created by the
/// reconciler from a wiki reference in the source note's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: Uuid,
    pub user_id: Uuid,
    pub source_note_id: Uuid,
    pub target_note_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_context: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Hydrated source note (backlink queries). None when hydration missed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_note: Option<Box<Note>>,
    /// Hydrated target note (outgoing queries). None when hydration missed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_note: Option<Box<Note>>,
}

// =============================================================================
// GRAPH TYPES
// =============================================================================

/// A node in the owner's link graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: Uuid,
    pub title: String,
    pub kind: NoteKind,
}

/// An edge in the owner's link graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: Uuid,
    pub target: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Full-graph snapshot: nodes in list order, edges whose endpoints both
/// appear in the node set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

// =============================================================================
// ACTIVITY TYPES
// =============================================================================

/// Kind of recorded user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Create,
    Update,
    View,
    Search,
    Delete,
    Login,
    Logout,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Create => "create",
            ActivityAction::Update => "update",
            ActivityAction::View => "view",
            ActivityAction::Search => "search",
            ActivityAction::Delete => "delete",
            ActivityAction::Login => "login",
            ActivityAction::Logout => "logout",
        }
    }
}

impl std::str::FromStr for ActivityAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(ActivityAction::Create),
            "update" => Ok(ActivityAction::Update),
            "view" => Ok(ActivityAction::View),
            "search" => Ok(ActivityAction::Search),
            "delete" => Ok(ActivityAction::Delete),
            "login" => Ok(ActivityAction::Login),
            "logout" => Ok(ActivityAction::Logout),
            other => Err(Error::Internal(format!(
                "unknown activity action '{}'",
                other
            ))),
        }
    }
}

/// An immutable record of a user action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<Uuid>,
    pub action: ActivityAction,
    pub metadata: JsonValue,
    pub created_at: DateTime<Utc>,
}

/// An activity event about to be appended; id and timestamp are assigned
/// by the gateway.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub note_id: Option<Uuid>,
    pub action: ActivityAction,
    pub metadata: JsonValue,
}

impl NewActivity {
    pub fn new(action: ActivityAction) -> Self {
        Self {
            note_id: None,
            action,
            metadata: JsonValue::Object(Default::default()),
        }
    }

    pub fn for_note(action: ActivityAction, note_id: Uuid) -> Self {
        Self {
            note_id: Some(note_id),
            action,
            metadata: JsonValue::Object(Default::default()),
        }
    }

    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = metadata;
        self
    }
}

// =============================================================================
// ANALYTICS TYPES
// =============================================================================

/// Per-user aggregate statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub total_notes: i64,
    pub total_tags: i64,
    pub total_links: i64,
    pub total_words: i64,
    pub notes_created_today: i64,
    pub notes_created_week: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
}

/// A frequently accessed note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingNote {
    pub id: Uuid,
    pub title: String,
    pub access_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed_at: Option<DateTime<Utc>>,
}

/// A note that has not been accessed for a while. When the note was never
/// accessed, staleness is measured from its creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgottenNote {
    pub id: Uuid,
    pub title: String,
    pub last_accessed_at: DateTime<Utc>,
    pub days_since_access: i64,
}

/// Result of a get-or-create daily note call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyNote {
    pub note: Note,
    pub created: bool,
}

/// Canonical title of the daily note for a date (`YYYY-MM-DD`).
pub fn daily_note_title(date: &str) -> String {
    format!("{}{}", defaults::DAILY_TITLE_PREFIX, date)
}
