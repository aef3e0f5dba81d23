//! Tag repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use garden_core::{
    new_v7, Error, Note, Principal, Result, Tag, TagRepository, TagWithCount,
};

use crate::notes::{map_note_row, NOTE_COLUMNS};

const TAG_COLUMNS: &str = "id, user_id, name, color, created_at";

/// PostgreSQL implementation of TagRepository.
#[derive(Clone)]
pub struct PgTagRepository {
    pool: Pool<Postgres>,
}

impl PgTagRepository {
    /// Create a new PgTagRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_tag_row(row: &PgRow) -> Tag {
    Tag {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        color: row.get("color"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn create(&self, owner: Principal, name: &str, color: Option<&str>) -> Result<Tag> {
        let sql = format!(
            "INSERT INTO tags (id, user_id, name, color, created_at)
             VALUES ($1, $2, $3, $4, NOW())
             RETURNING {}",
            TAG_COLUMNS
        );

        // A (user_id, name) collision surfaces as Conflict via the driver
        // error classifier.
        let row = sqlx::query(&sql)
            .bind(new_v7())
            .bind(owner.user_id())
            .bind(name)
            .bind(color)
            .fetch_one(&self.pool)
            .await?;

        Ok(map_tag_row(&row))
    }

    async fn find_by_id(&self, owner: Principal, id: Uuid) -> Result<Tag> {
        let sql = format!(
            "SELECT {} FROM tags WHERE id = $1 AND user_id = $2",
            TAG_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(owner.user_id())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::TagNotFound(id))?;

        Ok(map_tag_row(&row))
    }

    async fn find_by_name(&self, owner: Principal, name: &str) -> Result<Tag> {
        let sql = format!(
            "SELECT {} FROM tags WHERE user_id = $1 AND name = $2",
            TAG_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(owner.user_id())
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("tag named '{}'", name)))?;

        Ok(map_tag_row(&row))
    }

    async fn list(&self, owner: Principal) -> Result<Vec<Tag>> {
        let sql = format!(
            "SELECT {} FROM tags WHERE user_id = $1 ORDER BY name ASC",
            TAG_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(owner.user_id())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(map_tag_row).collect())
    }

    async fn list_with_note_count(
        &self,
        owner: Principal,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<TagWithCount>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE user_id = $1")
            .bind(owner.user_id())
            .fetch_one(&self.pool)
            .await?;

        let offset = (page - 1) * limit;

        // Left joins keep zero-count tags in the listing; the join through
        // notes drops soft-deleted notes from the counts.
        let rows = sqlx::query(
            "SELECT t.id, t.user_id, t.name, t.color, t.created_at,
                    COUNT(n.id) AS note_count
             FROM tags t
             LEFT JOIN note_tags nt ON t.id = nt.tag_id
             LEFT JOIN notes n ON nt.note_id = n.id AND n.is_deleted = FALSE
             WHERE t.user_id = $1
             GROUP BY t.id, t.user_id, t.name, t.color, t.created_at
             ORDER BY t.name ASC
             LIMIT $2 OFFSET $3",
        )
        .bind(owner.user_id())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let tags = rows
            .iter()
            .map(|row| TagWithCount {
                tag: map_tag_row(row),
                note_count: row.get("note_count"),
            })
            .collect();

        Ok((tags, total))
    }

    async fn update(
        &self,
        owner: Principal,
        id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Tag> {
        let sql = format!(
            "UPDATE tags
             SET name = COALESCE($1, name), color = COALESCE($2, color)
             WHERE id = $3 AND user_id = $4
             RETURNING {}",
            TAG_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(name)
            .bind(color)
            .bind(id)
            .bind(owner.user_id())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::TagNotFound(id))?;

        Ok(map_tag_row(&row))
    }

    async fn delete(&self, owner: Principal, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner.user_id())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::TagNotFound(id));
        }
        Ok(())
    }

    async fn attach(&self, owner: Principal, note_id: Uuid, tag_id: Uuid) -> Result<()> {
        // Both subqueries carry the owner predicate, so a cross-owner note
        // or tag inserts nothing and reports NotFound.
        let result = sqlx::query(
            "INSERT INTO note_tags (note_id, tag_id, created_at)
             SELECT $1, $2, NOW()
             WHERE EXISTS (SELECT 1 FROM notes WHERE id = $1 AND user_id = $3 AND is_deleted = FALSE)
               AND EXISTS (SELECT 1 FROM tags WHERE id = $2 AND user_id = $3)
             ON CONFLICT (note_id, tag_id) DO NOTHING",
        )
        .bind(note_id)
        .bind(tag_id)
        .bind(owner.user_id())
        .execute(&self.pool)
        .await?;

        // Distinguish "pair already attached" (idempotent success) from
        // "note or tag invisible to this owner".
        if result.rows_affected() == 0 {
            let attached: bool = sqlx::query_scalar(
                "SELECT EXISTS(
                     SELECT 1 FROM note_tags nt
                     JOIN notes n ON n.id = nt.note_id
                     WHERE nt.note_id = $1 AND nt.tag_id = $2 AND n.user_id = $3
                 )",
            )
            .bind(note_id)
            .bind(tag_id)
            .bind(owner.user_id())
            .fetch_one(&self.pool)
            .await?;

            if !attached {
                return Err(Error::NoteNotFound(note_id));
            }
        }
        Ok(())
    }

    async fn detach(&self, owner: Principal, note_id: Uuid, tag_id: Uuid) -> Result<()> {
        // Both sides carry the owner predicate, mirroring attach, so a
        // cross-owner note or tag deletes nothing and reports NotFound.
        let result = sqlx::query(
            "DELETE FROM note_tags nt
             USING notes n, tags t
             WHERE nt.note_id = $1 AND nt.tag_id = $2
               AND n.id = nt.note_id AND n.user_id = $3
               AND t.id = nt.tag_id AND t.user_id = $3",
        )
        .bind(note_id)
        .bind(tag_id)
        .bind(owner.user_id())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "tag {} is not attached to note {}",
                tag_id, note_id
            )));
        }
        Ok(())
    }

    async fn list_for_note(&self, owner: Principal, note_id: Uuid) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT t.id, t.user_id, t.name, t.color, t.created_at
             FROM tags t
             INNER JOIN note_tags nt ON t.id = nt.tag_id
             WHERE nt.note_id = $1 AND t.user_id = $2
             ORDER BY t.name ASC",
        )
        .bind(note_id)
        .bind(owner.user_id())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_tag_row).collect())
    }

    async fn list_notes_for_tag(&self, owner: Principal, tag_id: Uuid) -> Result<Vec<Note>> {
        let sql = format!(
            "SELECT {} FROM notes
             WHERE user_id = $1 AND is_deleted = FALSE
               AND id IN (SELECT note_id FROM note_tags WHERE tag_id = $2)
             ORDER BY created_at DESC",
            NOTE_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(owner.user_id())
            .bind(tag_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_note_row).collect()
    }
}
