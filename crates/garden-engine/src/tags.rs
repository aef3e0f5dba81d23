//! Tag engine.
//!
//! CRUD on the per-owner tag set plus note attachment. Attach and detach
//! verify ownership of both sides first, so cross-owner access surfaces as
//! NotFound without touching the join table.

use std::sync::Arc;

use uuid::Uuid;

use garden_core::{
    defaults, CreateTagRequest, Error, Note, NoteRepository, Principal, Result, Tag,
    TagRepository, TagWithCount, UpdateTagRequest,
};

/// Service implementing the tag engine operations.
pub struct TagService {
    tags: Arc<dyn TagRepository>,
    notes: Arc<dyn NoteRepository>,
}

impl TagService {
    /// Create a new TagService over the given repositories.
    pub fn new(tags: Arc<dyn TagRepository>, notes: Arc<dyn NoteRepository>) -> Self {
        Self { tags, notes }
    }

    /// Create a tag. A pre-existing name for this owner is a Conflict.
    pub async fn create(&self, owner: Principal, req: &CreateTagRequest) -> Result<Tag> {
        req.validate()?;

        match self.tags.find_by_name(owner, &req.name).await {
            Ok(_) => {
                return Err(Error::Conflict(format!(
                    "tag '{}' already exists",
                    req.name
                )))
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        // A concurrent create may still hit the unique index; that also
        // surfaces as Conflict.
        self.tags
            .create(owner, &req.name, req.color.as_deref())
            .await
    }

    /// Fetch a tag by id.
    pub async fn get(&self, owner: Principal, id: Uuid) -> Result<Tag> {
        self.tags.find_by_id(owner, id).await
    }

    /// List tags with note counts; returns `(tags, total)`. Tags with zero
    /// notes still appear.
    pub async fn list(
        &self,
        owner: Principal,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<TagWithCount>, i64)> {
        let page = if page < 1 { 1 } else { page };
        let limit = if limit < 1 || limit > defaults::MAX_PAGE_LIMIT {
            defaults::DEFAULT_PAGE_LIMIT
        } else {
            limit
        };
        self.tags.list_with_note_count(owner, page, limit).await
    }

    /// Update a tag. Renaming onto an existing name is a Conflict.
    pub async fn update(&self, owner: Principal, id: Uuid, req: &UpdateTagRequest) -> Result<Tag> {
        req.validate()?;

        let existing = self.tags.find_by_id(owner, id).await?;

        if let Some(name) = &req.name {
            if *name != existing.name {
                match self.tags.find_by_name(owner, name).await {
                    Ok(_) => {
                        return Err(Error::Conflict(format!("tag '{}' already exists", name)))
                    }
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                }
            }
        }

        self.tags
            .update(owner, id, req.name.as_deref(), req.color.as_deref())
            .await
    }

    /// Delete a tag; its note attachments cascade off.
    pub async fn delete(&self, owner: Principal, id: Uuid) -> Result<()> {
        self.tags.delete(owner, id).await
    }

    /// Attach a tag to a note. Idempotent.
    pub async fn add_to_note(&self, owner: Principal, note_id: Uuid, tag_id: Uuid) -> Result<()> {
        self.notes.find_by_id(owner, note_id).await?;
        self.tags.find_by_id(owner, tag_id).await?;
        self.tags.attach(owner, note_id, tag_id).await
    }

    /// Detach a tag from a note. A non-attached pair is NotFound.
    pub async fn remove_from_note(
        &self,
        owner: Principal,
        note_id: Uuid,
        tag_id: Uuid,
    ) -> Result<()> {
        self.notes.find_by_id(owner, note_id).await?;
        self.tags.find_by_id(owner, tag_id).await?;
        self.tags.detach(owner, note_id, tag_id).await
    }

    /// All tags attached to a note.
    pub async fn tags_for_note(&self, owner: Principal, note_id: Uuid) -> Result<Vec<Tag>> {
        self.notes.find_by_id(owner, note_id).await?;
        self.tags.list_for_note(owner, note_id).await
    }

    /// All non-deleted notes carrying a tag.
    pub async fn notes_with_tag(&self, owner: Principal, tag_id: Uuid) -> Result<Vec<Note>> {
        self.tags.find_by_id(owner, tag_id).await?;
        self.tags.list_notes_for_tag(owner, tag_id).await
    }
}
