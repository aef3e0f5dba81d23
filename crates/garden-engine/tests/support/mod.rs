//! In-memory repository fakes driving the engine tests.
//!
//! One shared store implements all four repository traits with the same
//! observable semantics as the PostgreSQL gateway: owner predicates on
//! every operation, soft-deleted notes invisible, idempotent edge and
//! attachment inserts, and trigger-equivalent derived fields.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc, Weekday};
use serde_json::json;
use uuid::Uuid;

use garden_core::{
    metrics, new_v7, Activity, ActivityRepository, Error, ForgottenNote, Link, LinkRepository,
    NewActivity, Note, NoteFilter, NoteKind, NoteRepository, Principal, Result, Tag,
    TagRepository, TagWithCount, TrendingNote, UserStats,
};

#[derive(Default)]
struct State {
    notes: Vec<Note>,
    links: Vec<Link>,
    tags: Vec<Tag>,
    note_tags: Vec<NoteTagRow>,
    activities: Vec<Activity>,
}

struct NoteTagRow {
    note_id: Uuid,
    tag_id: Uuid,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

/// Shared in-memory store; clones share the same state.
#[derive(Clone, Default)]
pub struct MemStore {
    state: Arc<Mutex<State>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw view of the stored edges, for invariant assertions.
    pub fn link_pairs(&self) -> Vec<(Uuid, Uuid)> {
        self.state
            .lock()
            .unwrap()
            .links
            .iter()
            .map(|l| (l.source_note_id, l.target_note_id))
            .collect()
    }

    /// Raw count of `(note, tag)` attachment rows.
    pub fn attachment_count(&self, note_id: Uuid, tag_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .note_tags
            .iter()
            .filter(|r| r.note_id == note_id && r.tag_id == tag_id)
            .count()
    }

    /// All recorded activities for an owner, oldest first.
    pub fn activities(&self, owner: Principal) -> Vec<Activity> {
        self.state
            .lock()
            .unwrap()
            .activities
            .iter()
            .filter(|a| a.user_id == owner.user_id())
            .cloned()
            .collect()
    }
}

fn derived(note: &mut Note) {
    note.word_count = metrics::word_count(&note.content);
    note.reading_time_minutes = metrics::reading_time_minutes(note.word_count);
}

/// Naive stand-in for `plainto_tsquery`: every query token must appear in
/// the note's title or content, case-insensitively.
fn matches_search(note: &Note, query: &str) -> bool {
    let haystack = format!("{} {}", note.title, note.content).to_lowercase();
    query
        .to_lowercase()
        .split_whitespace()
        .all(|token| haystack.contains(token))
}

#[async_trait]
impl NoteRepository for MemStore {
    async fn create(
        &self,
        owner: Principal,
        title: &str,
        content: &str,
        kind: NoteKind,
    ) -> Result<Note> {
        let now = Utc::now();
        let mut note = Note {
            id: new_v7(),
            user_id: owner.user_id(),
            title: title.to_string(),
            content: content.to_string(),
            kind,
            word_count: 0,
            reading_time_minutes: 0,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
            last_accessed_at: None,
            access_count: 0,
            metadata: json!({}),
        };
        derived(&mut note);

        let mut state = self.state.lock().unwrap();
        state.notes.push(note.clone());
        Ok(note)
    }

    async fn find_by_id(&self, owner: Principal, id: Uuid) -> Result<Note> {
        let state = self.state.lock().unwrap();
        state
            .notes
            .iter()
            .find(|n| n.id == id && n.user_id == owner.user_id() && !n.is_deleted)
            .cloned()
            .ok_or(Error::NoteNotFound(id))
    }

    async fn find_by_title(&self, owner: Principal, title: &str) -> Result<Note> {
        let state = self.state.lock().unwrap();
        state
            .notes
            .iter()
            .filter(|n| n.user_id == owner.user_id() && n.title == title && !n.is_deleted)
            .max_by_key(|n| n.created_at)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("note titled '{}'", title)))
    }

    async fn list(&self, owner: Principal, filter: &NoteFilter) -> Result<(Vec<Note>, i64)> {
        let state = self.state.lock().unwrap();
        let mut notes: Vec<Note> = state
            .notes
            .iter()
            .filter(|n| n.user_id == owner.user_id() && !n.is_deleted)
            .filter(|n| filter.kind.map_or(true, |k| n.kind == k))
            .filter(|n| {
                filter.tag_id.map_or(true, |tag_id| {
                    state
                        .note_tags
                        .iter()
                        .any(|r| r.note_id == n.id && r.tag_id == tag_id)
                })
            })
            .filter(|n| {
                if filter.has_search() {
                    matches_search(n, filter.search.as_deref().unwrap_or_default())
                } else {
                    true
                }
            })
            .cloned()
            .collect();

        use garden_core::{SortBy, SortOrder};
        notes.sort_by(|a, b| {
            let ord = match filter.sort_by {
                SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
                SortBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortBy::Title => a.title.cmp(&b.title),
                SortBy::AccessCount => a.access_count.cmp(&b.access_count),
            };
            match filter.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let total = notes.len() as i64;
        let page: Vec<Note> = notes
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn update_title_content(
        &self,
        owner: Principal,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Note> {
        let mut state = self.state.lock().unwrap();
        let note = state
            .notes
            .iter_mut()
            .find(|n| n.id == id && n.user_id == owner.user_id() && !n.is_deleted)
            .ok_or(Error::NoteNotFound(id))?;

        note.title = title.to_string();
        note.content = content.to_string();
        note.updated_at = Utc::now();
        derived(note);
        Ok(note.clone())
    }

    async fn soft_delete(&self, owner: Principal, id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let note = state
            .notes
            .iter_mut()
            .find(|n| n.id == id && n.user_id == owner.user_id() && !n.is_deleted)
            .ok_or(Error::NoteNotFound(id))?;

        note.is_deleted = true;
        note.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn restore(&self, owner: Principal, id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let note = state
            .notes
            .iter_mut()
            .find(|n| n.id == id && n.user_id == owner.user_id() && n.is_deleted)
            .ok_or(Error::NoteNotFound(id))?;

        note.is_deleted = false;
        note.deleted_at = None;
        Ok(())
    }

    async fn bump_access(&self, owner: Principal, id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(note) = state
            .notes
            .iter_mut()
            .find(|n| n.id == id && n.user_id == owner.user_id())
        {
            note.access_count += 1;
            note.last_accessed_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for MemStore {
    async fn create(
        &self,
        owner: Principal,
        source_note_id: Uuid,
        target_note_id: Uuid,
        link_context: Option<&str>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let exists = state
            .links
            .iter()
            .any(|l| l.source_note_id == source_note_id && l.target_note_id == target_note_id);
        if exists {
            return Ok(());
        }

        state.links.push(Link {
            id: new_v7(),
            user_id: owner.user_id(),
            source_note_id,
            target_note_id,
            link_context: link_context.map(String::from),
            created_at: Utc::now(),
            source_note: None,
            target_note: None,
        });
        Ok(())
    }

    async fn list_by_source(&self, owner: Principal, note_id: Uuid) -> Result<Vec<Link>> {
        let state = self.state.lock().unwrap();
        let mut links: Vec<Link> = state
            .links
            .iter()
            .filter(|l| l.user_id == owner.user_id() && l.source_note_id == note_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn list_by_target(&self, owner: Principal, note_id: Uuid) -> Result<Vec<Link>> {
        let state = self.state.lock().unwrap();
        let mut links: Vec<Link> = state
            .links
            .iter()
            .filter(|l| l.user_id == owner.user_id() && l.target_note_id == note_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn delete(
        &self,
        owner: Principal,
        source_note_id: Uuid,
        target_note_id: Uuid,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.links.len();
        state.links.retain(|l| {
            !(l.user_id == owner.user_id()
                && l.source_note_id == source_note_id
                && l.target_note_id == target_note_id)
        });
        if state.links.len() == before {
            return Err(Error::NotFound(format!(
                "link {} -> {}",
                source_note_id, target_note_id
            )));
        }
        Ok(())
    }

    async fn delete_by_source(&self, owner: Principal, note_id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .links
            .retain(|l| !(l.user_id == owner.user_id() && l.source_note_id == note_id));
        Ok(())
    }

    async fn delete_all_touching(&self, owner: Principal, note_id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.links.retain(|l| {
            !(l.user_id == owner.user_id()
                && (l.source_note_id == note_id || l.target_note_id == note_id))
        });
        Ok(())
    }
}

#[async_trait]
impl TagRepository for MemStore {
    async fn create(&self, owner: Principal, name: &str, color: Option<&str>) -> Result<Tag> {
        let mut state = self.state.lock().unwrap();
        if state
            .tags
            .iter()
            .any(|t| t.user_id == owner.user_id() && t.name == name)
        {
            return Err(Error::Conflict(format!(
                "duplicate key value violates unique constraint: tags ({}, {})",
                owner.user_id(),
                name
            )));
        }

        let tag = Tag {
            id: new_v7(),
            user_id: owner.user_id(),
            name: name.to_string(),
            color: color.map(String::from),
            created_at: Utc::now(),
        };
        state.tags.push(tag.clone());
        Ok(tag)
    }

    async fn find_by_id(&self, owner: Principal, id: Uuid) -> Result<Tag> {
        let state = self.state.lock().unwrap();
        state
            .tags
            .iter()
            .find(|t| t.id == id && t.user_id == owner.user_id())
            .cloned()
            .ok_or(Error::TagNotFound(id))
    }

    async fn find_by_name(&self, owner: Principal, name: &str) -> Result<Tag> {
        let state = self.state.lock().unwrap();
        state
            .tags
            .iter()
            .find(|t| t.user_id == owner.user_id() && t.name == name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("tag named '{}'", name)))
    }

    async fn list(&self, owner: Principal) -> Result<Vec<Tag>> {
        let state = self.state.lock().unwrap();
        let mut tags: Vec<Tag> = state
            .tags
            .iter()
            .filter(|t| t.user_id == owner.user_id())
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn list_with_note_count(
        &self,
        owner: Principal,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<TagWithCount>, i64)> {
        let state = self.state.lock().unwrap();
        let mut tags: Vec<TagWithCount> = state
            .tags
            .iter()
            .filter(|t| t.user_id == owner.user_id())
            .map(|t| {
                let note_count = state
                    .note_tags
                    .iter()
                    .filter(|r| r.tag_id == t.id)
                    .filter(|r| {
                        state
                            .notes
                            .iter()
                            .any(|n| n.id == r.note_id && !n.is_deleted)
                    })
                    .count() as i64;
                TagWithCount {
                    tag: t.clone(),
                    note_count,
                }
            })
            .collect();
        tags.sort_by(|a, b| a.tag.name.cmp(&b.tag.name));

        let total = tags.len() as i64;
        let page_items: Vec<TagWithCount> = tags
            .into_iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .collect();
        Ok((page_items, total))
    }

    async fn update(
        &self,
        owner: Principal,
        id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Tag> {
        let mut state = self.state.lock().unwrap();
        let tag = state
            .tags
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner.user_id())
            .ok_or(Error::TagNotFound(id))?;

        if let Some(name) = name {
            tag.name = name.to_string();
        }
        if let Some(color) = color {
            tag.color = Some(color.to_string());
        }
        Ok(tag.clone())
    }

    async fn delete(&self, owner: Principal, id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.tags.len();
        state
            .tags
            .retain(|t| !(t.id == id && t.user_id == owner.user_id()));
        if state.tags.len() == before {
            return Err(Error::TagNotFound(id));
        }
        state.note_tags.retain(|r| r.tag_id != id);
        Ok(())
    }

    async fn attach(&self, owner: Principal, note_id: Uuid, tag_id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        let note_visible = state
            .notes
            .iter()
            .any(|n| n.id == note_id && n.user_id == owner.user_id() && !n.is_deleted);
        let tag_visible = state
            .tags
            .iter()
            .any(|t| t.id == tag_id && t.user_id == owner.user_id());
        if !note_visible || !tag_visible {
            return Err(Error::NoteNotFound(note_id));
        }

        let exists = state
            .note_tags
            .iter()
            .any(|r| r.note_id == note_id && r.tag_id == tag_id);
        if !exists {
            state.note_tags.push(NoteTagRow {
                note_id,
                tag_id,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn detach(&self, owner: Principal, note_id: Uuid, tag_id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let note_owned = state
            .notes
            .iter()
            .any(|n| n.id == note_id && n.user_id == owner.user_id());
        let tag_owned = state
            .tags
            .iter()
            .any(|t| t.id == tag_id && t.user_id == owner.user_id());
        let before = state.note_tags.len();
        if note_owned && tag_owned {
            state
                .note_tags
                .retain(|r| !(r.note_id == note_id && r.tag_id == tag_id));
        }
        if state.note_tags.len() == before {
            return Err(Error::NotFound(format!(
                "tag {} is not attached to note {}",
                tag_id, note_id
            )));
        }
        Ok(())
    }

    async fn list_for_note(&self, owner: Principal, note_id: Uuid) -> Result<Vec<Tag>> {
        let state = self.state.lock().unwrap();
        let mut tags: Vec<Tag> = state
            .note_tags
            .iter()
            .filter(|r| r.note_id == note_id)
            .filter_map(|r| {
                state
                    .tags
                    .iter()
                    .find(|t| t.id == r.tag_id && t.user_id == owner.user_id())
                    .cloned()
            })
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn list_notes_for_tag(&self, owner: Principal, tag_id: Uuid) -> Result<Vec<Note>> {
        let state = self.state.lock().unwrap();
        let mut notes: Vec<Note> = state
            .note_tags
            .iter()
            .filter(|r| r.tag_id == tag_id)
            .filter_map(|r| {
                state
                    .notes
                    .iter()
                    .find(|n| n.id == r.note_id && n.user_id == owner.user_id() && !n.is_deleted)
                    .cloned()
            })
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }
}

#[async_trait]
impl ActivityRepository for MemStore {
    async fn append(&self, owner: Principal, event: NewActivity) -> Result<Activity> {
        let activity = Activity {
            id: new_v7(),
            user_id: owner.user_id(),
            note_id: event.note_id,
            action: event.action,
            metadata: event.metadata,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().activities.push(activity.clone());
        Ok(activity)
    }

    async fn list_recent(&self, owner: Principal, limit: i64) -> Result<Vec<Activity>> {
        let state = self.state.lock().unwrap();
        // Append order is timestamp order; reverse instead of sorting so
        // same-instant events keep a deterministic newest-first order.
        let mut activities: Vec<Activity> = state
            .activities
            .iter()
            .filter(|a| a.user_id == owner.user_id())
            .cloned()
            .collect();
        activities.reverse();
        activities.truncate(limit as usize);
        Ok(activities)
    }

    async fn last_at(&self, owner: Principal) -> Result<Option<DateTime<Utc>>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .activities
            .iter()
            .filter(|a| a.user_id == owner.user_id())
            .map(|a| a.created_at)
            .max())
    }

    async fn user_stats(&self, owner: Principal) -> Result<UserStats> {
        let state = self.state.lock().unwrap();
        let live: Vec<&Note> = state
            .notes
            .iter()
            .filter(|n| n.user_id == owner.user_id() && !n.is_deleted)
            .collect();

        let today = Utc::now().date_naive();
        let week_start = today.week(Weekday::Mon).first_day();

        let last_activity = state
            .activities
            .iter()
            .filter(|a| a.user_id == owner.user_id())
            .map(|a| a.created_at)
            .max();

        Ok(UserStats {
            total_notes: live.len() as i64,
            total_tags: state
                .tags
                .iter()
                .filter(|t| t.user_id == owner.user_id())
                .count() as i64,
            total_links: state
                .links
                .iter()
                .filter(|l| l.user_id == owner.user_id())
                .count() as i64,
            total_words: live.iter().map(|n| n.word_count as i64).sum(),
            notes_created_today: live
                .iter()
                .filter(|n| n.created_at.date_naive() == today)
                .count() as i64,
            notes_created_week: live
                .iter()
                .filter(|n| n.created_at.date_naive() >= week_start)
                .count() as i64,
            last_activity,
        })
    }

    async fn trending(&self, owner: Principal, limit: i64) -> Result<Vec<TrendingNote>> {
        let state = self.state.lock().unwrap();
        let mut notes: Vec<&Note> = state
            .notes
            .iter()
            .filter(|n| n.user_id == owner.user_id() && !n.is_deleted)
            .collect();
        notes.sort_by(|a, b| {
            b.access_count
                .cmp(&a.access_count)
                .then(b.last_accessed_at.cmp(&a.last_accessed_at))
        });

        Ok(notes
            .into_iter()
            .take(limit as usize)
            .map(|n| TrendingNote {
                id: n.id,
                title: n.title.clone(),
                access_count: n.access_count,
                last_accessed_at: n.last_accessed_at,
            })
            .collect())
    }

    async fn forgotten(
        &self,
        owner: Principal,
        days: i64,
        limit: i64,
    ) -> Result<Vec<ForgottenNote>> {
        let now = Utc::now();
        let cutoff = now - chrono::Duration::days(days);

        let state = self.state.lock().unwrap();
        let mut stale: Vec<ForgottenNote> = state
            .notes
            .iter()
            .filter(|n| n.user_id == owner.user_id() && !n.is_deleted)
            .filter(|n| n.last_accessed_at.map_or(true, |at| at < cutoff))
            .map(|n| {
                let last = n.last_accessed_at.unwrap_or(n.created_at);
                ForgottenNote {
                    id: n.id,
                    title: n.title.clone(),
                    last_accessed_at: last,
                    days_since_access: (now - last).num_days(),
                }
            })
            .collect();
        stale.sort_by(|a, b| a.last_accessed_at.cmp(&b.last_accessed_at));
        stale.truncate(limit as usize);
        Ok(stale)
    }
}

/// Wire a full engine over one shared in-memory store.
pub fn engine() -> (
    MemStore,
    garden_engine::NoteService,
    garden_engine::TagService,
    garden_engine::ActivityService,
) {
    let store = MemStore::new();
    let notes = garden_engine::NoteService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    );
    let tags = garden_engine::TagService::new(Arc::new(store.clone()), Arc::new(store.clone()));
    let activity = garden_engine::ActivityService::new(Arc::new(store.clone()));
    (store, notes, tags, activity)
}

/// A fresh principal for a test user.
pub fn principal() -> Principal {
    Principal::new(Uuid::new_v4())
}
