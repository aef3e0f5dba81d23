//! Note repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use garden_core::{
    new_v7, Error, Note, NoteFilter, NoteKind, NoteRepository, Principal, Result,
};

/// Column list shared by every query returning full note rows.
pub(crate) const NOTE_COLUMNS: &str = "id, user_id, title, content, note_type, word_count, \
     reading_time_minutes, is_deleted, deleted_at, created_at, updated_at, \
     last_accessed_at, access_count, metadata";

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Map a database row to a Note.
pub(crate) fn map_note_row(row: &PgRow) -> Result<Note> {
    let kind: String = row.get("note_type");
    let kind: NoteKind = kind
        .parse()
        .map_err(|_| Error::Internal(format!("unexpected note_type '{}' in store", kind)))?;

    Ok(Note {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        content: row.get("content"),
        kind,
        word_count: row.get("word_count"),
        reading_time_minutes: row.get("reading_time_minutes"),
        is_deleted: row.get("is_deleted"),
        deleted_at: row.get("deleted_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        last_accessed_at: row.get("last_accessed_at"),
        access_count: row.get("access_count"),
        metadata: row.get("metadata"),
    })
}

/// Append the optional filter predicates, numbering parameters from
/// `param_idx`. Returns the next free parameter index.
fn push_filter_predicates(sql: &mut String, filter: &NoteFilter, mut param_idx: usize) -> usize {
    if filter.kind.is_some() {
        sql.push_str(&format!("AND note_type = ${} ", param_idx));
        param_idx += 1;
    }
    if filter.tag_id.is_some() {
        sql.push_str(&format!(
            "AND id IN (SELECT note_id FROM note_tags WHERE tag_id = ${}) ",
            param_idx
        ));
        param_idx += 1;
    }
    if filter.has_search() {
        sql.push_str(&format!(
            "AND content_tsv @@ plainto_tsquery('english', ${}) ",
            param_idx
        ));
        param_idx += 1;
    }
    param_idx
}

/// Bind the optional filter parameters in the same order
/// `push_filter_predicates` numbered them.
macro_rules! bind_filter_params {
    ($query:expr, $filter:expr) => {{
        let mut q = $query;
        if let Some(kind) = $filter.kind {
            q = q.bind(kind.as_str());
        }
        if let Some(tag_id) = $filter.tag_id {
            q = q.bind(tag_id);
        }
        if $filter.has_search() {
            q = q.bind($filter.search.as_deref().unwrap_or_default());
        }
        q
    }};
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create(
        &self,
        owner: Principal,
        title: &str,
        content: &str,
        kind: NoteKind,
    ) -> Result<Note> {
        let sql = format!(
            "INSERT INTO notes (id, user_id, title, content, note_type, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
             RETURNING {}",
            NOTE_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(new_v7())
            .bind(owner.user_id())
            .bind(title)
            .bind(content)
            .bind(kind.as_str())
            .fetch_one(&self.pool)
            .await?;

        map_note_row(&row)
    }

    async fn find_by_id(&self, owner: Principal, id: Uuid) -> Result<Note> {
        let sql = format!(
            "SELECT {} FROM notes WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE",
            NOTE_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(owner.user_id())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::NoteNotFound(id))?;

        map_note_row(&row)
    }

    async fn find_by_title(&self, owner: Principal, title: &str) -> Result<Note> {
        let sql = format!(
            "SELECT {} FROM notes
             WHERE user_id = $1 AND title = $2 AND is_deleted = FALSE
             ORDER BY created_at DESC
             LIMIT 1",
            NOTE_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(owner.user_id())
            .bind(title)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("note titled '{}'", title)))?;

        map_note_row(&row)
    }

    async fn list(&self, owner: Principal, filter: &NoteFilter) -> Result<(Vec<Note>, i64)> {
        let mut predicates = String::from("WHERE user_id = $1 AND is_deleted = FALSE ");
        let param_idx = push_filter_predicates(&mut predicates, filter, 2);

        let count_sql = format!("SELECT COUNT(*) FROM notes {}", predicates);
        let total: i64 = {
            let q = sqlx::query_scalar(&count_sql).bind(owner.user_id());
            let q = bind_filter_params!(q, filter);
            q.fetch_one(&self.pool).await?
        };

        let page_sql = format!(
            "SELECT {} FROM notes {} ORDER BY {} {} LIMIT ${} OFFSET ${}",
            NOTE_COLUMNS,
            predicates,
            filter.sort_by.as_column(),
            filter.sort_order.as_sql(),
            param_idx,
            param_idx + 1,
        );

        let rows = {
            let q = sqlx::query(&page_sql).bind(owner.user_id());
            let q = bind_filter_params!(q, filter);
            q.bind(filter.limit)
                .bind(filter.offset())
                .fetch_all(&self.pool)
                .await?
        };

        let notes = rows
            .iter()
            .map(map_note_row)
            .collect::<Result<Vec<_>>>()?;

        Ok((notes, total))
    }

    async fn update_title_content(
        &self,
        owner: Principal,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Note> {
        let sql = format!(
            "UPDATE notes
             SET title = $1, content = $2, updated_at = NOW()
             WHERE id = $3 AND user_id = $4 AND is_deleted = FALSE
             RETURNING {}",
            NOTE_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(title)
            .bind(content)
            .bind(id)
            .bind(owner.user_id())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::NoteNotFound(id))?;

        map_note_row(&row)
    }

    async fn soft_delete(&self, owner: Principal, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE notes
             SET is_deleted = TRUE, deleted_at = NOW()
             WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(owner.user_id())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn restore(&self, owner: Principal, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE notes
             SET is_deleted = FALSE, deleted_at = NULL
             WHERE id = $1 AND user_id = $2 AND is_deleted = TRUE",
        )
        .bind(id)
        .bind(owner.user_id())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn bump_access(&self, owner: Principal, id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE notes
             SET access_count = access_count + 1, last_accessed_at = NOW()
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner.user_id())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
