//! Activity and analytics service.
//!
//! Thin orchestration over the append-only log and its derived queries.
//! Out-of-range limits fall back to their defaults instead of erroring, so
//! dashboard calls with sloppy parameters still answer.

use std::sync::Arc;

use garden_core::{
    Activity, ActivityRepository, ForgottenNote, NewActivity, Principal, Result, TrendingNote,
    UserStats,
};

const RECENT_DEFAULT_LIMIT: i64 = 20;
const RECENT_MAX_LIMIT: i64 = 100;
const TRENDING_DEFAULT_LIMIT: i64 = 10;
const TRENDING_MAX_LIMIT: i64 = 50;
const FORGOTTEN_DEFAULT_DAYS: i64 = 30;
const FORGOTTEN_DEFAULT_LIMIT: i64 = 10;

/// Service implementing the activity and analytics operations.
pub struct ActivityService {
    activity: Arc<dyn ActivityRepository>,
}

impl ActivityService {
    /// Create a new ActivityService over the given repository.
    pub fn new(activity: Arc<dyn ActivityRepository>) -> Self {
        Self { activity }
    }

    /// Append an event to the log. Exposed for collaborators that record
    /// their own actions (login, logout, search).
    pub async fn record(&self, owner: Principal, event: NewActivity) -> Result<Activity> {
        self.activity.append(owner, event).await
    }

    /// Recent events, newest first.
    pub async fn recent(&self, owner: Principal, limit: i64) -> Result<Vec<Activity>> {
        let limit = if limit < 1 || limit > RECENT_MAX_LIMIT {
            RECENT_DEFAULT_LIMIT
        } else {
            limit
        };
        self.activity.list_recent(owner, limit).await
    }

    /// Aggregate statistics for the owner.
    pub async fn stats(&self, owner: Principal) -> Result<UserStats> {
        self.activity.user_stats(owner).await
    }

    /// Most-accessed notes first.
    pub async fn trending(&self, owner: Principal, limit: i64) -> Result<Vec<TrendingNote>> {
        let limit = if limit < 1 || limit > TRENDING_MAX_LIMIT {
            TRENDING_DEFAULT_LIMIT
        } else {
            limit
        };
        self.activity.trending(owner, limit).await
    }

    /// Notes unvisited for at least `days`, stalest first.
    pub async fn forgotten(
        &self,
        owner: Principal,
        days: i64,
        limit: i64,
    ) -> Result<Vec<ForgottenNote>> {
        let days = if days < 1 { FORGOTTEN_DEFAULT_DAYS } else { days };
        let limit = if limit < 1 || limit > TRENDING_MAX_LIMIT {
            FORGOTTEN_DEFAULT_LIMIT
        } else {
            limit
        };
        self.activity.forgotten(owner, days, limit).await
    }
}
