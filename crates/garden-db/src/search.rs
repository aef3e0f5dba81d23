//! Ranked full-text search over notes.
//!
//! Listing with `NoteFilter.search` applies the boolean FTS predicate only;
//! this provider is the ranked variant for callers that want relevance
//! ordering. The stored `content_tsv` already weights title (A) over
//! content (B), so a title match outranks the same match in the body.

use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use garden_core::{Principal, Result};

/// A ranked search hit.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchHit {
    pub note_id: Uuid,
    pub title: String,
    pub rank: f32,
    pub snippet: String,
}

/// Full-text search provider using the trigger-maintained tsvector.
#[derive(Clone)]
pub struct PgNoteSearch {
    pool: Pool<Postgres>,
}

impl PgNoteSearch {
    /// Create a new PgNoteSearch with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search the owner's notes, best match first.
    pub async fn search_ranked(
        &self,
        owner: Principal,
        query: &str,
        limit: i64,
    ) -> Result<Vec<SearchHit>> {
        let rows = sqlx::query(
            "SELECT id AS note_id,
                    title,
                    ts_rank(content_tsv, plainto_tsquery('english', $2)) AS rank,
                    LEFT(content, 200) AS snippet
             FROM notes
             WHERE user_id = $1 AND is_deleted = FALSE
               AND content_tsv @@ plainto_tsquery('english', $2)
             ORDER BY rank DESC, created_at DESC
             LIMIT $3",
        )
        .bind(owner.user_id())
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| SearchHit {
                note_id: row.get("note_id"),
                title: row.get("title"),
                rank: row.get("rank"),
                snippet: row.get("snippet"),
            })
            .collect())
    }
}
