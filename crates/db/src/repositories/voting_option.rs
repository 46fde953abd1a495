//! Voting option repository.

use std::sync::Arc;

use crate::entities::{EventVotingOption, event_voting_option};
use plaza_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Voting option repository for database operations.
#[derive(Clone)]
pub struct VotingOptionRepository {
    db: Arc<DatabaseConnection>,
}

impl VotingOptionRepository {
    /// Create a new voting option repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a voting option by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<event_voting_option::Model>> {
        EventVotingOption::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Options of an event in creation order.
    pub async fn find_by_event(&self, event_id: &str) -> AppResult<Vec<event_voting_option::Model>> {
        EventVotingOption::find()
            .filter(event_voting_option::Column::EventId.eq(event_id))
            .order_by_asc(event_voting_option::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_option(id: &str, day: u32) -> event_voting_option::Model {
        event_voting_option::Model {
            id: id.to_string(),
            event_id: "e1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_event() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_option("o1", 1), create_test_option("o2", 2)]])
                .into_connection(),
        );

        let repo = VotingOptionRepository::new(db);
        let options = repo.find_by_event("e1").await.unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].id, "o1");
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<event_voting_option::Model>::new()])
                .into_connection(),
        );

        let repo = VotingOptionRepository::new(db);
        assert!(repo.find_by_id("nope").await.unwrap().is_none());
    }
}
