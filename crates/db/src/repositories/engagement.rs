//! Engagement repository (interest, likes, bookmarks).

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Engagement, engagement, engagement::EngagementKind};
use plaza_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QuerySelect,
    sea_query::{Expr, OnConflict},
};

/// Membership count of a target and whether the viewer is a member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromQueryResult)]
pub struct EngagementCounter {
    pub count: i64,
    pub active: bool,
}

/// Engagement repository for database operations.
#[derive(Clone)]
pub struct EngagementRepository {
    db: Arc<DatabaseConnection>,
}

impl EngagementRepository {
    /// Create a new engagement repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a membership row unless one already exists.
    ///
    /// Returns `true` when a row was inserted.
    pub async fn insert_ignore(&self, model: engagement::ActiveModel) -> AppResult<bool> {
        let inserted = Engagement::insert(model)
            .on_conflict(
                OnConflict::columns([
                    engagement::Column::Kind,
                    engagement::Column::TargetId,
                    engagement::Column::UserId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Delete a membership row. Returns `true` when a row was removed.
    pub async fn delete(
        &self,
        kind: EngagementKind,
        target_id: &str,
        user_id: &str,
    ) -> AppResult<bool> {
        let result = Engagement::delete_many()
            .filter(engagement::Column::Kind.eq(kind))
            .filter(engagement::Column::TargetId.eq(target_id))
            .filter(engagement::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Count and viewer membership, read from the same snapshot.
    pub async fn counter(
        &self,
        kind: EngagementKind,
        target_id: &str,
        viewer: Option<&str>,
    ) -> AppResult<EngagementCounter> {
        let counter = Engagement::find()
            .select_only()
            .column_as(engagement::Column::Id.count(), "count")
            .column_as(
                Expr::cust_with_values(
                    "COALESCE(BOOL_OR(\"engagement\".\"user_id\" = ?), false)",
                    [viewer.map(ToString::to_string)],
                ),
                "active",
            )
            .filter(engagement::Column::Kind.eq(kind))
            .filter(engagement::Column::TargetId.eq(target_id))
            .into_model::<EngagementCounter>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(counter.unwrap_or_default())
    }

    /// Membership counts for many targets of one kind.
    ///
    /// Targets without members are absent from the map.
    pub async fn count_many(
        &self,
        kind: EngagementKind,
        target_ids: &[String],
    ) -> AppResult<HashMap<String, i64>> {
        #[derive(FromQueryResult)]
        struct TargetCount {
            target_id: String,
            count: i64,
        }

        if target_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Engagement::find()
            .select_only()
            .column(engagement::Column::TargetId)
            .column_as(engagement::Column::Id.count(), "count")
            .filter(engagement::Column::Kind.eq(kind))
            .filter(engagement::Column::TargetId.is_in(target_ids.iter().cloned()))
            .group_by(engagement::Column::TargetId)
            .into_model::<TargetCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|r| (r.target_id, r.count)).collect())
    }
}
