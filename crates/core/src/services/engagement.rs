//! Interest, like and bookmark toggles.

use std::collections::HashMap;

use chrono::Utc;
use plaza_common::{AppResult, IdGenerator};
use plaza_db::{
    entities::{engagement, engagement::EngagementKind},
    repositories::{EngagementCounter, EngagementRepository, EventRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What a membership row points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementTarget {
    pub kind: EngagementKind,
    pub id: String,
}

impl EngagementTarget {
    #[must_use]
    pub fn new(kind: EngagementKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// Engagement service for business logic.
#[derive(Clone)]
pub struct EngagementService {
    engagement_repo: EngagementRepository,
    event_repo: EventRepository,
    id_gen: IdGenerator,
}

impl EngagementService {
    /// Create a new engagement service.
    #[must_use]
    pub const fn new(engagement_repo: EngagementRepository, event_repo: EventRepository) -> Self {
        Self {
            engagement_repo,
            event_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set membership to `desired` and return the resulting counter.
    ///
    /// Idempotent in both directions.
    pub async fn toggle(
        &self,
        target: &EngagementTarget,
        user_id: &str,
        desired: bool,
    ) -> AppResult<EngagementCounter> {
        // Other target kinds are owned elsewhere and stay opaque.
        if target.kind == EngagementKind::EventInterest {
            self.event_repo.get_by_id(&target.id).await?;
        }

        let changed = if desired {
            self.engagement_repo
                .insert_ignore(engagement::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    kind: Set(target.kind),
                    target_id: Set(target.id.clone()),
                    user_id: Set(user_id.to_string()),
                    created_at: Set(Utc::now().into()),
                })
                .await?
        } else {
            self.engagement_repo
                .delete(target.kind, &target.id, user_id)
                .await?
        };

        debug!(
            kind = ?target.kind,
            target_id = %target.id,
            user_id = %user_id,
            desired,
            changed,
            "Engagement toggled"
        );

        self.counter(target, Some(user_id)).await
    }

    /// Count and viewer membership from one read.
    pub async fn counter(
        &self,
        target: &EngagementTarget,
        viewer: Option<&str>,
    ) -> AppResult<EngagementCounter> {
        self.engagement_repo
            .counter(target.kind, &target.id, viewer)
            .await
    }

    /// Counts for many targets of one kind; absent targets count zero.
    pub async fn count_many(
        &self,
        kind: EngagementKind,
        target_ids: &[String],
    ) -> AppResult<HashMap<String, i64>> {
        let mut counts = self.engagement_repo.count_many(kind, target_ids).await?;
        for id in target_ids {
            counts.entry(id.clone()).or_insert(0);
        }
        Ok(counts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use plaza_common::AppError;
    use plaza_db::entities::event;
    use plaza_db::test_utils::fixtures;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
    use std::sync::Arc;

    fn service(db: &Arc<DatabaseConnection>) -> EngagementService {
        EngagementService::new(
            EngagementRepository::new(db.clone()),
            EventRepository::new(db.clone()),
        )
    }

    fn counter_row(count: i64, active: bool) -> std::collections::BTreeMap<&'static str, Value> {
        maplit::btreemap! {
            "count" => Value::BigInt(Some(count)),
            "active" => Value::Bool(Some(active)),
        }
    }

    #[tokio::test]
    async fn test_toggle_interest_on() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::fixed_event("e1", "user1")]])
                .append_exec_results([fixtures::exec_rows(1)])
                .append_query_results([vec![counter_row(1, true)]])
                .into_connection(),
        );

        let target = EngagementTarget::new(EngagementKind::EventInterest, "e1");
        let counter = service(&db).toggle(&target, "user2", true).await.unwrap();

        assert_eq!(
            counter,
            EngagementCounter {
                count: 1,
                active: true
            }
        );
    }

    #[tokio::test]
    async fn test_toggle_on_twice_keeps_single_row() {
        // Conflict: nothing inserted
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([fixtures::exec_rows(0)])
                .append_query_results([vec![counter_row(1, true)]])
                .into_connection(),
        );

        let target = EngagementTarget::new(EngagementKind::ThreadLike, "thread1");
        let counter = service(&db).toggle(&target, "user2", true).await.unwrap();

        assert_eq!(counter.count, 1);
    }

    #[tokio::test]
    async fn test_toggle_off_without_row_is_noop() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([fixtures::exec_rows(0)])
                .append_query_results([vec![counter_row(0, false)]])
                .into_connection(),
        );

        let target = EngagementTarget::new(EngagementKind::GuideBookmark, "guide1");
        let counter = service(&db).toggle(&target, "user2", false).await.unwrap();

        assert_eq!(counter, EngagementCounter::default());
    }

    #[tokio::test]
    async fn test_interest_on_missing_event() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<event::Model>::new()])
                .into_connection(),
        );

        let target = EngagementTarget::new(EngagementKind::EventInterest, "missing");
        let err = service(&db).toggle(&target, "user2", true).await.unwrap_err();

        assert!(matches!(err, AppError::EventNotFound(_)));
    }

    #[tokio::test]
    async fn test_count_many_fills_zeroes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![maplit::btreemap! {
                    "target_id" => Value::String(Some(Box::new("c1".to_string()))),
                    "count" => Value::BigInt(Some(5)),
                }]])
                .into_connection(),
        );

        let counts = service(&db)
            .count_many(
                EngagementKind::CommentLike,
                &["c1".to_string(), "c2".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(counts.get("c1"), Some(&5));
        assert_eq!(counts.get("c2"), Some(&0));
    }
}
