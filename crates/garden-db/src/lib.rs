//! # garden-db
//!
//! PostgreSQL storage gateway for the knowledge-garden backend.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for notes, tags, links, and activity
//! - Ranked full-text search over the trigger-maintained tsvector
//!
//! Every query is owner-scoped and soft-deleted notes stay invisible to
//! everything but the restore path. Derived note columns are maintained by
//! triggers in `migrations/`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use garden_core::{NoteKind, Principal};
//! use garden_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> garden_core::Result<()> {
//!     let db = Database::connect("postgres://localhost/garden").await?;
//!     let owner = Principal::new(user_id);
//!
//!     let note = db
//!         .notes
//!         .create(owner, "Alpha", "see [[Beta]]", NoteKind::Note)
//!         .await?;
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod activity;
pub mod links;
pub mod notes;
pub mod pool;
pub mod search;
pub mod tags;

// Always compiled so integration tests (in tests/) can use the fixtures.
pub mod test_fixtures;

// Re-export core types
pub use garden_core::*;

// Re-export repository implementations
pub use activity::PgActivityRepository;
pub use links::PgLinkRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use search::{PgNoteSearch, SearchHit};
pub use tags::PgTagRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note repository.
    pub notes: PgNoteRepository,
    /// Tag repository.
    pub tags: PgTagRepository,
    /// Link repository for graph edges.
    pub links: PgLinkRepository,
    /// Append-only activity log and analytics.
    pub activity: PgActivityRepository,
    /// Ranked full-text search provider.
    pub search: PgNoteSearch,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            links: PgLinkRepository::new(pool.clone()),
            activity: PgActivityRepository::new(pool.clone()),
            search: PgNoteSearch::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
