//! Activity log repository and derived analytics queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use garden_core::{
    new_v7, Activity, ActivityAction, ActivityRepository, ForgottenNote, NewActivity, Principal,
    Result, TrendingNote, UserStats,
};

/// PostgreSQL implementation of ActivityRepository.
#[derive(Clone)]
pub struct PgActivityRepository {
    pool: Pool<Postgres>,
}

impl PgActivityRepository {
    /// Create a new PgActivityRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_activity_row(row: &PgRow) -> Result<Activity> {
    let action: String = row.get("action");
    let action: ActivityAction = action.parse()?;

    Ok(Activity {
        id: row.get("id"),
        user_id: row.get("user_id"),
        note_id: row.get("note_id"),
        action,
        metadata: row.get("metadata"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn append(&self, owner: Principal, event: NewActivity) -> Result<Activity> {
        let row = sqlx::query(
            "INSERT INTO activity_log (id, user_id, note_id, action, metadata, created_at)
             VALUES ($1, $2, $3, $4, $5, NOW())
             RETURNING id, user_id, note_id, action, metadata, created_at",
        )
        .bind(new_v7())
        .bind(owner.user_id())
        .bind(event.note_id)
        .bind(event.action.as_str())
        .bind(&event.metadata)
        .fetch_one(&self.pool)
        .await?;

        map_activity_row(&row)
    }

    async fn list_recent(&self, owner: Principal, limit: i64) -> Result<Vec<Activity>> {
        let rows = sqlx::query(
            "SELECT id, user_id, note_id, action, metadata, created_at
             FROM activity_log
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2",
        )
        .bind(owner.user_id())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_activity_row).collect()
    }

    async fn last_at(&self, owner: Principal) -> Result<Option<DateTime<Utc>>> {
        let at = sqlx::query_scalar(
            "SELECT created_at FROM activity_log
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(owner.user_id())
        .fetch_optional(&self.pool)
        .await?;

        Ok(at)
    }

    async fn user_stats(&self, owner: Principal) -> Result<UserStats> {
        let total_notes: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notes WHERE user_id = $1 AND is_deleted = FALSE",
        )
        .bind(owner.user_id())
        .fetch_one(&self.pool)
        .await?;

        let total_tags: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE user_id = $1")
            .bind(owner.user_id())
            .fetch_one(&self.pool)
            .await?;

        let total_links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE user_id = $1")
            .bind(owner.user_id())
            .fetch_one(&self.pool)
            .await?;

        let total_words: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(word_count), 0)
             FROM notes WHERE user_id = $1 AND is_deleted = FALSE",
        )
        .bind(owner.user_id())
        .fetch_one(&self.pool)
        .await?;

        let notes_created_today: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notes
             WHERE user_id = $1 AND is_deleted = FALSE
               AND DATE(created_at) = CURRENT_DATE",
        )
        .bind(owner.user_id())
        .fetch_one(&self.pool)
        .await?;

        // Week starts Monday per date_trunc.
        let notes_created_week: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notes
             WHERE user_id = $1 AND is_deleted = FALSE
               AND created_at >= DATE_TRUNC('week', CURRENT_DATE)",
        )
        .bind(owner.user_id())
        .fetch_one(&self.pool)
        .await?;

        let last_activity = self.last_at(owner).await?;

        Ok(UserStats {
            total_notes,
            total_tags,
            total_links,
            total_words,
            notes_created_today,
            notes_created_week,
            last_activity,
        })
    }

    async fn trending(&self, owner: Principal, limit: i64) -> Result<Vec<TrendingNote>> {
        let rows = sqlx::query(
            "SELECT id, title, access_count, last_accessed_at
             FROM notes
             WHERE user_id = $1 AND is_deleted = FALSE
             ORDER BY access_count DESC, last_accessed_at DESC
             LIMIT $2",
        )
        .bind(owner.user_id())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| TrendingNote {
                id: row.get("id"),
                title: row.get("title"),
                access_count: row.get("access_count"),
                last_accessed_at: row.get("last_accessed_at"),
            })
            .collect())
    }

    async fn forgotten(
        &self,
        owner: Principal,
        days: i64,
        limit: i64,
    ) -> Result<Vec<ForgottenNote>> {
        let rows = sqlx::query(
            "SELECT id, title, COALESCE(last_accessed_at, created_at) AS last_accessed
             FROM notes
             WHERE user_id = $1 AND is_deleted = FALSE
               AND (last_accessed_at < NOW() - INTERVAL '1 day' * $2 OR last_accessed_at IS NULL)
             ORDER BY last_accessed ASC
             LIMIT $3",
        )
        .bind(owner.user_id())
        .bind(days as f64)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();
        Ok(rows
            .iter()
            .map(|row| {
                let last_accessed: DateTime<Utc> = row.get("last_accessed");
                ForgottenNote {
                    id: row.get("id"),
                    title: row.get("title"),
                    last_accessed_at: last_accessed,
                    days_since_access: (now - last_accessed).num_days(),
                }
            })
            .collect())
    }
}
