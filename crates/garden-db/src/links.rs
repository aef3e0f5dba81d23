//! Link repository implementation.
//!
//! Edges are written solely by the reconciler and removed by the
//! reconciler, by note soft-delete, or by endpoint deletion cascades.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use garden_core::{new_v7, Error, Link, LinkRepository, Principal, Result};

/// PostgreSQL implementation of LinkRepository.
#[derive(Clone)]
pub struct PgLinkRepository {
    pool: Pool<Postgres>,
}

impl PgLinkRepository {
    /// Create a new PgLinkRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_link_row(row: &PgRow) -> Link {
    Link {
        id: row.get("id"),
        user_id: row.get("user_id"),
        source_note_id: row.get("source_note_id"),
        target_note_id: row.get("target_note_id"),
        link_context: row.get("link_context"),
        created_at: row.get("created_at"),
        source_note: None,
        target_note: None,
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(
        &self,
        owner: Principal,
        source_note_id: Uuid,
        target_note_id: Uuid,
        link_context: Option<&str>,
    ) -> Result<()> {
        // Duplicate (source, target) pairs collapse silently; a duplicate
        // edge is absorbed, never a conflict.
        sqlx::query(
            "INSERT INTO links (id, user_id, source_note_id, target_note_id, link_context, created_at)
             VALUES ($1, $2, $3, $4, $5, NOW())
             ON CONFLICT (source_note_id, target_note_id) DO NOTHING",
        )
        .bind(new_v7())
        .bind(owner.user_id())
        .bind(source_note_id)
        .bind(target_note_id)
        .bind(link_context)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_by_source(&self, owner: Principal, note_id: Uuid) -> Result<Vec<Link>> {
        let rows = sqlx::query(
            "SELECT id, user_id, source_note_id, target_note_id, link_context, created_at
             FROM links
             WHERE user_id = $1 AND source_note_id = $2
             ORDER BY created_at DESC",
        )
        .bind(owner.user_id())
        .bind(note_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_link_row).collect())
    }

    async fn list_by_target(&self, owner: Principal, note_id: Uuid) -> Result<Vec<Link>> {
        let rows = sqlx::query(
            "SELECT id, user_id, source_note_id, target_note_id, link_context, created_at
             FROM links
             WHERE user_id = $1 AND target_note_id = $2
             ORDER BY created_at DESC",
        )
        .bind(owner.user_id())
        .bind(note_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_link_row).collect())
    }

    async fn delete(
        &self,
        owner: Principal,
        source_note_id: Uuid,
        target_note_id: Uuid,
    ) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM links
             WHERE user_id = $1 AND source_note_id = $2 AND target_note_id = $3",
        )
        .bind(owner.user_id())
        .bind(source_note_id)
        .bind(target_note_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "link {} -> {}",
                source_note_id, target_note_id
            )));
        }
        Ok(())
    }

    async fn delete_by_source(&self, owner: Principal, note_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM links WHERE user_id = $1 AND source_note_id = $2")
            .bind(owner.user_id())
            .bind(note_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all_touching(&self, owner: Principal, note_id: Uuid) -> Result<()> {
        sqlx::query(
            "DELETE FROM links
             WHERE user_id = $1 AND (source_note_id = $2 OR target_note_id = $2)",
        )
        .bind(owner.user_id())
        .bind(note_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
