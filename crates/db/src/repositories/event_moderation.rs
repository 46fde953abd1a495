//! Event moderation log repository.

use std::sync::Arc;

use crate::entities::{EventModeration, event_moderation};
use plaza_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Moderation log repository for database operations.
#[derive(Clone)]
pub struct EventModerationRepository {
    db: Arc<DatabaseConnection>,
}

impl EventModerationRepository {
    /// Create a new moderation log repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append an entry.
    pub async fn create(
        &self,
        model: event_moderation::ActiveModel,
    ) -> AppResult<event_moderation::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The entry currently in force.
    pub async fn find_latest(&self, event_id: &str) -> AppResult<Option<event_moderation::Model>> {
        EventModeration::find()
            .filter(event_moderation::Column::EventId.eq(event_id))
            .order_by_desc(event_moderation::Column::CreatedAt)
            .order_by_desc(event_moderation::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Full log, oldest first.
    pub async fn find_by_event(&self, event_id: &str) -> AppResult<Vec<event_moderation::Model>> {
        EventModeration::find()
            .filter(event_moderation::Column::EventId.eq(event_id))
            .order_by_asc(event_moderation::Column::CreatedAt)
            .order_by_asc(event_moderation::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::event_moderation::ModerationStatus;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn entry(id: &str, status: ModerationStatus) -> event_moderation::Model {
        event_moderation::Model {
            id: id.to_string(),
            event_id: "e1".to_string(),
            user_id: "mod1".to_string(),
            status,
            comment: Some("Looks good".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_latest() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[entry("m2", ModerationStatus::Approved)]])
                .into_connection(),
        );

        let repo = EventModerationRepository::new(db);
        let latest = repo.find_latest("e1").await.unwrap().unwrap();

        assert_eq!(latest.status, ModerationStatus::Approved);
    }

    #[tokio::test]
    async fn test_find_by_event() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    entry("m1", ModerationStatus::Pending),
                    entry("m2", ModerationStatus::ChangesRequested),
                ]])
                .into_connection(),
        );

        let repo = EventModerationRepository::new(db);
        let history = repo.find_by_event("e1").await.unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[1].status, ModerationStatus::ChangesRequested);
    }
}
