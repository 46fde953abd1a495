//! Event vote repository.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use plaza_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction,
    EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Statement,
    TransactionTrait,
};

use crate::entities::{Event, EventVote, event_vote};

/// Number of votes an option received.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct VoteTally {
    pub voting_option_id: String,
    pub votes: i64,
}

/// One row of the per-option vote summary.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct OptionSummaryRow {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub vote_count: i64,
    pub has_voted: bool,
}

/// Event vote repository for database operations.
#[derive(Clone)]
pub struct EventVoteRepository {
    db: Arc<DatabaseConnection>,
}

impl EventVoteRepository {
    /// Create a new event vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Serialize concurrent writers for one (event, user) pair until the
    /// transaction ends.
    async fn lock_voter(txn: &DatabaseTransaction, event_id: &str, user_id: &str) -> AppResult<()> {
        txn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT pg_advisory_xact_lock(hashtext($1))",
            [format!("event_vote:{event_id}:{user_id}").into()],
        ))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Re-read the event under a shared row lock and refuse the write unless
    /// it still accepts votes at `now`.
    ///
    /// Finalization takes the row exclusively, so it waits for in-flight
    /// vote writes and they in turn see its result.
    async fn ensure_open(
        txn: &DatabaseTransaction,
        event_id: &str,
        now: NaiveDateTime,
    ) -> AppResult<()> {
        let event = Event::find_by_id(event_id)
            .lock_shared()
            .one(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::EventNotFound(event_id.to_string()))?;

        if !event.accepts_votes(now) {
            return Err(AppError::Conflict("Voting has closed".to_string()));
        }
        Ok(())
    }

    /// Replace a user's votes on an event with `votes`.
    ///
    /// Delete and insert share one transaction, so a failure leaves the
    /// previous vote set in place.
    pub async fn replace_votes(
        &self,
        event_id: &str,
        user_id: &str,
        votes: Vec<event_vote::ActiveModel>,
        now: NaiveDateTime,
    ) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Self::lock_voter(&txn, event_id, user_id).await?;
        Self::ensure_open(&txn, event_id, now).await?;

        EventVote::delete_many()
            .filter(event_vote::Column::EventId.eq(event_id))
            .filter(event_vote::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !votes.is_empty() {
            EventVote::insert_many(votes)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Delete all of a user's votes on an event. Returns the number removed.
    pub async fn remove_votes(
        &self,
        event_id: &str,
        user_id: &str,
        now: NaiveDateTime,
    ) -> AppResult<u64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Self::lock_voter(&txn, event_id, user_id).await?;
        Self::ensure_open(&txn, event_id, now).await?;

        let result = EventVote::delete_many()
            .filter(event_vote::Column::EventId.eq(event_id))
            .filter(event_vote::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Option ids a user currently votes for.
    pub async fn find_user_option_ids(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> AppResult<Vec<String>> {
        let votes = EventVote::find()
            .filter(event_vote::Column::EventId.eq(event_id))
            .filter(event_vote::Column::UserId.eq(user_id))
            .order_by_asc(event_vote::Column::VotingOptionId)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(votes.into_iter().map(|v| v.voting_option_id).collect())
    }

    /// Vote counts grouped by option. Options without votes are absent.
    pub async fn tally(&self, event_id: &str) -> AppResult<Vec<VoteTally>> {
        Self::tally_on(self.db.as_ref(), event_id).await
    }

    /// [`Self::tally`] on any connection, such as an open transaction.
    pub(crate) async fn tally_on<C: ConnectionTrait>(
        conn: &C,
        event_id: &str,
    ) -> AppResult<Vec<VoteTally>> {
        EventVote::find()
            .select_only()
            .column(event_vote::Column::VotingOptionId)
            .column_as(event_vote::Column::Id.count(), "votes")
            .filter(event_vote::Column::EventId.eq(event_id))
            .group_by(event_vote::Column::VotingOptionId)
            .order_by_asc(event_vote::Column::VotingOptionId)
            .into_model::<VoteTally>()
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every option of an event with its vote count and whether `viewer`
    /// voted for it, in one query.
    pub async fn summary(
        &self,
        event_id: &str,
        viewer: Option<&str>,
    ) -> AppResult<Vec<OptionSummaryRow>> {
        OptionSummaryRow::find_by_statement(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            r#"SELECT o."id", o."date", o."start_time", o."end_time",
                      COUNT(v."id") AS "vote_count",
                      COALESCE(BOOL_OR(v."user_id" = $2), false) AS "has_voted"
               FROM "event_voting_option" o
               LEFT JOIN "event_vote" v ON v."voting_option_id" = o."id"
               WHERE o."event_id" = $1
               GROUP BY o."id"
               ORDER BY o."id" ASC"#,
            [
                event_id.into(),
                viewer.map(ToString::to_string).into(),
            ],
        ))
        .all(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use chrono::Utc;
    use sea_orm::{MockDatabase, MockExecResult, Set, Value};

    fn before_deadline() -> NaiveDateTime {
        fixtures::date("2024-05-20").and_time(fixtures::time("12:00"))
    }

    fn affected(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    fn new_vote(id: &str, option_id: &str) -> event_vote::ActiveModel {
        event_vote::ActiveModel {
            id: Set(id.to_string()),
            event_id: Set("e1".to_string()),
            user_id: Set("user1".to_string()),
            voting_option_id: Set(option_id.to_string()),
            created_at: Set(Utc::now().into()),
        }
    }

    #[tokio::test]
    async fn test_replace_votes_runs_lock_delete_insert() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::voting_event("e1", "owner")]])
                // advisory lock, delete, insert
                .append_exec_results([affected(1), affected(2), affected(1)])
                .into_connection(),
        );

        let repo = EventVoteRepository::new(db.clone());
        repo.replace_votes("e1", "user1", vec![new_vote("v1", "o2")], before_deadline())
            .await
            .unwrap();
        drop(repo);

        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("pg_advisory_xact_lock"));
        assert!(sql.contains("FOR SHARE"));
        assert!(sql.contains("DELETE FROM"));
        assert!(sql.contains("INSERT INTO"));
    }

    #[tokio::test]
    async fn test_replace_votes_with_empty_set_only_deletes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::voting_event("e1", "owner")]])
                .append_exec_results([affected(1), affected(3)])
                .into_connection(),
        );

        let repo = EventVoteRepository::new(db.clone());
        repo.replace_votes("e1", "user1", Vec::new(), before_deadline())
            .await
            .unwrap();
        drop(repo);

        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(!sql.contains("INSERT INTO"));
    }

    #[tokio::test]
    async fn test_remove_votes_without_votes_is_noop() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::voting_event("e1", "owner")]])
                .append_exec_results([affected(1), affected(0)])
                .into_connection(),
        );

        let repo = EventVoteRepository::new(db);
        assert_eq!(
            repo.remove_votes("e1", "user1", before_deadline())
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_replace_votes_refuses_once_deadline_passed() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::voting_event("e1", "owner")]])
                .append_exec_results([affected(1)])
                .into_connection(),
        );

        let repo = EventVoteRepository::new(db.clone());
        let deadline = fixtures::date("2024-05-30").and_time(fixtures::time("23:59"));
        let err = repo
            .replace_votes("e1", "user1", vec![new_vote("v1", "o1")], deadline)
            .await
            .unwrap_err();
        drop(repo);

        assert!(matches!(err, AppError::Conflict(_)));

        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(!sql.contains("DELETE FROM"));
    }

    #[tokio::test]
    async fn test_remove_votes_on_missing_event() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<crate::entities::event::Model>::new()])
                .append_exec_results([affected(1)])
                .into_connection(),
        );

        let repo = EventVoteRepository::new(db);
        let err = repo
            .remove_votes("gone", "user1", before_deadline())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EventNotFound(_)));
    }

    #[tokio::test]
    async fn test_tally() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    maplit::btreemap! {
                        "voting_option_id" => Value::String(Some(Box::new("o1".to_string()))),
                        "votes" => Value::BigInt(Some(2)),
                    },
                    maplit::btreemap! {
                        "voting_option_id" => Value::String(Some(Box::new("o2".to_string()))),
                        "votes" => Value::BigInt(Some(1)),
                    },
                ]])
                .into_connection(),
        );

        let repo = EventVoteRepository::new(db);
        let tally = repo.tally("e1").await.unwrap();

        assert_eq!(tally.len(), 2);
        assert_eq!(tally[0].voting_option_id, "o1");
        assert_eq!(tally[0].votes, 2);
    }

    #[tokio::test]
    async fn test_summary() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![maplit::btreemap! {
                    "id" => Value::String(Some(Box::new("o1".to_string()))),
                    "date" => Value::ChronoDate(Some(Box::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()))),
                    "start_time" => Value::ChronoTime(Some(Box::new(NaiveTime::from_hms_opt(10, 0, 0).unwrap()))),
                    "end_time" => Value::ChronoTime(Some(Box::new(NaiveTime::from_hms_opt(11, 0, 0).unwrap()))),
                    "vote_count" => Value::BigInt(Some(2)),
                    "has_voted" => Value::Bool(Some(true)),
                }]])
                .into_connection(),
        );

        let repo = EventVoteRepository::new(db);
        let rows = repo.summary("e1", Some("user1")).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].vote_count, 2);
        assert!(rows[0].has_voted);
    }

    #[tokio::test]
    async fn test_find_user_option_ids() {
        let vote = event_vote::Model {
            id: "v1".to_string(),
            event_id: "e1".to_string(),
            user_id: "user1".to_string(),
            voting_option_id: "o1".to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote]])
                .into_connection(),
        );

        let repo = EventVoteRepository::new(db);
        assert_eq!(
            repo.find_user_option_ids("e1", "user1").await.unwrap(),
            vec!["o1".to_string()]
        );
    }
}
