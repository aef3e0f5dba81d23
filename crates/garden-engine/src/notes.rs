//! Note engine: the public contract of the core.
//!
//! Orchestrates the storage gateway, the wiki parser, and the link
//! reconciler, and emits activity records for every state change. Primary
//! operations fail loudly; ancillary work (access bumps, activity appends,
//! reconciliation) logs and swallows so a read or write never fails for
//! bookkeeping reasons.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use garden_core::{
    daily_note_title, defaults, ActivityAction, ActivityRepository, CreateNoteRequest, DailyNote,
    Error, GraphEdge, GraphNode, GraphSnapshot, Link, LinkRepository, NewActivity, Note,
    NoteFilter, NoteRepository, Principal, Result, UpdateNoteRequest,
};

use crate::reconcile;

/// Service implementing the note engine operations.
pub struct NoteService {
    notes: Arc<dyn NoteRepository>,
    links: Arc<dyn LinkRepository>,
    activity: Arc<dyn ActivityRepository>,
}

impl NoteService {
    /// Create a new NoteService over the given repositories.
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        links: Arc<dyn LinkRepository>,
        activity: Arc<dyn ActivityRepository>,
    ) -> Self {
        Self {
            notes,
            links,
            activity,
        }
    }

    /// Create a note, reconcile its references, and record the event.
    pub async fn create(&self, owner: Principal, req: &CreateNoteRequest) -> Result<Note> {
        req.validate()?;
        let kind = req.kind.unwrap_or_default();

        let note = self
            .notes
            .create(owner, &req.title, &req.content, kind)
            .await?;

        reconcile::rebuild_outgoing(self.notes.as_ref(), self.links.as_ref(), owner, &note).await;

        self.append_activity(
            owner,
            NewActivity::for_note(ActivityAction::Create, note.id)
                .with_metadata(json!({ "title": note.title })),
        )
        .await;

        Ok(note)
    }

    /// Fetch a note, bump its access counter, and record the view.
    ///
    /// The bump and the view event are best-effort; the note is returned
    /// even when they fail.
    pub async fn get(&self, owner: Principal, id: Uuid) -> Result<Note> {
        let note = self.notes.find_by_id(owner, id).await?;

        if let Err(e) = self.notes.bump_access(owner, id).await {
            warn!(
                subsystem = "engine",
                component = "notes",
                op = "bump_access",
                owner_id = %owner,
                note_id = %id,
                error = %e,
                "Access bump failed"
            );
        }

        self.append_activity(owner, NewActivity::for_note(ActivityAction::View, note.id))
            .await;

        Ok(note)
    }

    /// List notes with filtering and pagination; returns `(notes, total)`.
    pub async fn list(&self, owner: Principal, filter: &NoteFilter) -> Result<(Vec<Note>, i64)> {
        filter.validate()?;
        self.notes.list(owner, filter).await
    }

    /// Full-text search. Identical to [`list`](Self::list) with the
    /// caller-provided `filter.search` driving the FTS predicate.
    pub async fn search(&self, owner: Principal, filter: &NoteFilter) -> Result<(Vec<Note>, i64)> {
        filter.validate()?;
        self.notes.list(owner, filter).await
    }

    /// Apply the provided fields, persist, and rewire outgoing edges from
    /// the new content.
    pub async fn update(
        &self,
        owner: Principal,
        id: Uuid,
        req: &UpdateNoteRequest,
    ) -> Result<Note> {
        req.validate()?;

        let existing = self.notes.find_by_id(owner, id).await?;
        let title = req.title.as_deref().unwrap_or(&existing.title);
        let content = req.content.as_deref().unwrap_or(&existing.content);

        let note = self
            .notes
            .update_title_content(owner, id, title, content)
            .await?;

        // Rebuild only this note's outgoing edges; backlinks written by
        // other notes are left alone.
        if let Err(e) = self.links.delete_by_source(owner, id).await {
            warn!(
                subsystem = "engine",
                component = "notes",
                op = "update",
                owner_id = %owner,
                note_id = %id,
                error = %e,
                "Clearing outgoing edges failed"
            );
        }
        reconcile::rebuild_outgoing(self.notes.as_ref(), self.links.as_ref(), owner, &note).await;

        self.append_activity(owner, NewActivity::for_note(ActivityAction::Update, note.id))
            .await;

        Ok(note)
    }

    /// Soft-delete a note and remove every edge touching it.
    pub async fn delete(&self, owner: Principal, id: Uuid) -> Result<()> {
        self.notes.soft_delete(owner, id).await?;

        if let Err(e) = self.links.delete_all_touching(owner, id).await {
            warn!(
                subsystem = "engine",
                component = "notes",
                op = "delete",
                owner_id = %owner,
                note_id = %id,
                error = %e,
                "Removing edges of deleted note failed"
            );
        }

        self.append_activity(owner, NewActivity::for_note(ActivityAction::Delete, id))
            .await;

        Ok(())
    }

    /// Restore a soft-deleted note. Its pre-deletion edges stay gone until
    /// the note or its referrers are saved again.
    pub async fn restore(&self, owner: Principal, id: Uuid) -> Result<()> {
        self.notes.restore(owner, id).await
    }

    /// Fetch the daily note for `date` (`YYYY-MM-DD`), creating it when
    /// absent.
    ///
    /// Find-then-create without a uniqueness guarantee: concurrent calls
    /// for the same date may both create.
    pub async fn get_or_create_daily(&self, owner: Principal, date: &str) -> Result<DailyNote> {
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(Error::validation("date", "must be a YYYY-MM-DD date"));
        }

        let title = daily_note_title(date);
        match self.notes.find_by_title(owner, &title).await {
            Ok(note) => Ok(DailyNote {
                note,
                created: false,
            }),
            Err(e) if e.is_not_found() => {
                let req = CreateNoteRequest {
                    title,
                    content: String::new(),
                    kind: Some(garden_core::NoteKind::Daily),
                };
                let note = self.create(owner, &req).await?;
                Ok(DailyNote {
                    note,
                    created: true,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// All outgoing edges of a note, with target notes hydrated.
    pub async fn outgoing_links(&self, owner: Principal, id: Uuid) -> Result<Vec<Link>> {
        self.notes.find_by_id(owner, id).await?;

        let mut links = self.links.list_by_source(owner, id).await?;
        for link in &mut links {
            if let Ok(target) = self.notes.find_by_id(owner, link.target_note_id).await {
                link.target_note = Some(Box::new(target));
            }
        }
        Ok(links)
    }

    /// All incoming edges of a note (backlinks), with source notes hydrated.
    pub async fn backlinks(&self, owner: Principal, id: Uuid) -> Result<Vec<Link>> {
        self.notes.find_by_id(owner, id).await?;

        let mut links = self.links.list_by_target(owner, id).await?;
        for link in &mut links {
            if let Ok(source) = self.notes.find_by_id(owner, link.source_note_id).await {
                link.source_note = Some(Box::new(source));
            }
        }
        Ok(links)
    }

    /// Snapshot of the owner's link graph over the first page of notes.
    ///
    /// Edges whose endpoint falls outside the node set are dropped; cycles
    /// are returned as-is.
    pub async fn graph(&self, owner: Principal) -> Result<GraphSnapshot> {
        let filter = NoteFilter {
            page: 1,
            limit: defaults::GRAPH_NODE_LIMIT,
            ..Default::default()
        };
        let (notes, _) = self.notes.list(owner, &filter).await?;

        let node_ids: HashSet<Uuid> = notes.iter().map(|n| n.id).collect();
        let nodes = notes
            .iter()
            .map(|n| GraphNode {
                id: n.id,
                title: n.title.clone(),
                kind: n.kind,
            })
            .collect();

        let mut edges = Vec::new();
        for note in &notes {
            let links = match self.links.list_by_source(owner, note.id).await {
                Ok(links) => links,
                Err(e) => {
                    warn!(
                        subsystem = "engine",
                        component = "notes",
                        op = "graph",
                        owner_id = %owner,
                        note_id = %note.id,
                        error = %e,
                        "Skipping edges of node"
                    );
                    continue;
                }
            };

            for link in links {
                if node_ids.contains(&link.target_note_id) {
                    edges.push(GraphEdge {
                        source: link.source_note_id,
                        target: link.target_note_id,
                        context: link.link_context,
                        created_at: link.created_at,
                    });
                }
            }
        }

        Ok(GraphSnapshot { nodes, edges })
    }

    /// Append an activity event, logging instead of failing.
    async fn append_activity(&self, owner: Principal, event: NewActivity) {
        let action = event.action;
        if let Err(e) = self.activity.append(owner, event).await {
            warn!(
                subsystem = "engine",
                component = "notes",
                op = "activity",
                owner_id = %owner,
                action = action.as_str(),
                error = %e,
                "Activity append failed"
            );
        }
    }
}
