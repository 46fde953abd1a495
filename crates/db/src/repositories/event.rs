//! Event repository.

use std::sync::Arc;

use chrono::NaiveDateTime;
use plaza_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseBackend,
    DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect,
    Statement, TransactionTrait, sea_query::Expr,
};
use serde_json::json;

use super::event_vote::{EventVoteRepository, VoteTally};
use crate::entities::{
    Engagement, Event, EventAnnex, EventModeration, EventVotingOption, engagement,
    engagement::EngagementKind, event, event::EventStatus, event_annex, event_annex::AnnexKind,
    event_moderation, event_voting_option,
};

/// Filter for listing events.
#[derive(Debug, Clone, Default)]
pub struct EventListFilter {
    /// Substring of the title.
    pub search: Option<String>,
    /// Events carrying any of these tags.
    pub tags: Vec<String>,
    /// Events in any of these statuses.
    pub statuses: Vec<EventStatus>,
    /// Events owned by this user.
    pub user_id: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

/// Number of events using a tag.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

/// Outcome picked for an event whose voting closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalChoice {
    /// The winning option and the status it implies.
    Winner {
        option_id: String,
        status: Option<EventStatus>,
    },
    NoVotes,
}

/// Event repository for database operations.
#[derive(Clone)]
pub struct EventRepository {
    db: Arc<DatabaseConnection>,
}

impl EventRepository {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an event by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<event::Model>> {
        Event::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an event by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<event::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::EventNotFound(id.to_string()))
    }

    /// Insert an event together with its voting options and initial
    /// moderation entry, all or nothing.
    pub async fn create_with_schedule(
        &self,
        model: event::ActiveModel,
        options: Vec<event_voting_option::ActiveModel>,
        moderation: event_moderation::ActiveModel,
    ) -> AppResult<event::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !options.is_empty() {
            EventVotingOption::insert_many(options)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        EventModeration::insert(moderation)
            .exec_without_returning(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Write the editable columns of `next`, as long as the winning option
    /// is still `expected_final`.
    ///
    /// The winning option itself is never written. Returns `false` when the
    /// event is gone or was finalized in between.
    pub async fn update_editable(
        &self,
        next: &event::Model,
        expected_final: Option<&str>,
    ) -> AppResult<bool> {
        let unchanged_final = match expected_final {
            Some(option_id) => event::Column::FinalVotingOptionId.eq(option_id),
            None => event::Column::FinalVotingOptionId.is_null(),
        };

        let result = Event::update_many()
            .col_expr(event::Column::Title, Expr::value(next.title.clone()))
            .col_expr(event::Column::Description, Expr::value(next.description.clone()))
            .col_expr(event::Column::Tags, Expr::value(next.tags.clone()))
            .col_expr(event::Column::Image, Expr::value(next.image.clone()))
            .col_expr(event::Column::Location, Expr::value(next.location.clone()))
            .col_expr(event::Column::RecordingLink, Expr::value(next.recording_link.clone()))
            .col_expr(event::Column::Date, Expr::value(next.date))
            .col_expr(event::Column::StartTime, Expr::value(next.start_time))
            .col_expr(event::Column::EndTime, Expr::value(next.end_time))
            .col_expr(event::Column::VotingEndDate, Expr::value(next.voting_end_date))
            .col_expr(event::Column::VotingEndTime, Expr::value(next.voting_end_time))
            .col_expr(event::Column::Status, Expr::value(next.status))
            .col_expr(event::Column::UpdatedAt, Expr::value(next.updated_at))
            .filter(event::Column::Id.eq(next.id.as_str()))
            .filter(unchanged_final)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Delete an event and everything pointing at it.
    ///
    /// Options, votes, moderation entries and the event's own annexes go by
    /// cascade; interest rows and annexes of other events that reference
    /// this one are removed explicitly.
    pub async fn delete_cascade(&self, id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Engagement::delete_many()
            .filter(engagement::Column::Kind.eq(EngagementKind::EventInterest))
            .filter(engagement::Column::TargetId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        EventAnnex::delete_many()
            .filter(event_annex::Column::Kind.eq(AnnexKind::Event))
            .filter(event_annex::Column::AnnexedId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Event::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// List events, newest first.
    pub async fn list(&self, filter: &EventListFilter) -> AppResult<Vec<event::Model>> {
        let mut query = Event::find();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(event::Column::Title.contains(search));
        }

        if let Some(user_id) = &filter.user_id {
            query = query.filter(event::Column::UserId.eq(user_id.as_str()));
        }

        if !filter.tags.is_empty() {
            // tags @> '["tag"]' for any of the requested tags
            let mut any_tag = Condition::any();
            for tag in &filter.tags {
                any_tag = any_tag.add(Expr::cust_with_values(
                    "\"event\".\"tags\" @> ?",
                    [json!([tag])],
                ));
            }
            query = query.filter(any_tag);
        }

        if !filter.statuses.is_empty() {
            query = query.filter(event::Column::Status.is_in(filter.statuses.iter().copied()));
        }

        query
            .order_by_desc(event::Column::CreatedAt)
            .order_by_desc(event::Column::Id)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tag usage across all events, most used first.
    pub async fn tag_counts(&self) -> AppResult<Vec<TagCount>> {
        TagCount::find_by_statement(Statement::from_string(
            DatabaseBackend::Postgres,
            r#"SELECT t.tag AS "tag", COUNT(*) AS "count"
               FROM "event", jsonb_array_elements_text("event"."tags") AS t(tag)
               GROUP BY t.tag
               ORDER BY COUNT(*) DESC, t.tag ASC"#,
        ))
        .all(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Voting events whose deadline is at or before `now` and that still
    /// await finalization.
    pub async fn find_due_for_finalization(
        &self,
        now: NaiveDateTime,
    ) -> AppResult<Vec<event::Model>> {
        let today = now.date();
        let time = now.time();

        let deadline_passed = Condition::any()
            .add(event::Column::VotingEndDate.lt(today))
            .add(
                Condition::all()
                    .add(event::Column::VotingEndDate.eq(today))
                    .add(event::Column::VotingEndTime.lte(time)),
            );

        let not_marked_empty = Condition::any()
            .add(event::Column::Status.is_null())
            .add(event::Column::Status.ne(EventStatus::NoOneVoted));

        Event::find()
            .filter(event::Column::AllowVoting.eq(true))
            .filter(event::Column::FinalVotingOptionId.is_null())
            .filter(event::Column::VotingEndDate.is_not_null())
            .filter(event::Column::VotingEndTime.is_not_null())
            .filter(deadline_passed)
            .filter(not_marked_empty)
            .order_by_asc(event::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Events whose status may still change.
    pub async fn find_unsettled(&self) -> AppResult<Vec<event::Model>> {
        Event::find()
            .filter(
                Condition::any()
                    .add(event::Column::Status.is_null())
                    .add(event::Column::Status.ne(EventStatus::Completed)),
            )
            .order_by_asc(event::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Close voting on an event in one transaction.
    ///
    /// The event row is locked `FOR UPDATE`, so vote writers holding it
    /// `FOR SHARE` finish first and later ones see the result. `decide`
    /// picks the outcome from the locked row, the current tally and the
    /// event's options. Returns `None` when the event is gone or was already
    /// closed.
    pub async fn close_voting<F>(&self, id: &str, decide: F) -> AppResult<Option<FinalChoice>>
    where
        F: FnOnce(
            &event::Model,
            &[VoteTally],
            &[event_voting_option::Model],
        ) -> AppResult<FinalChoice>,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(event) = Event::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        else {
            return Ok(None);
        };
        if event.final_voting_option_id.is_some() || event.status == Some(EventStatus::NoOneVoted)
        {
            return Ok(None);
        }

        let tallies = EventVoteRepository::tally_on(&txn, id).await?;
        let options = EventVotingOption::find()
            .filter(event_voting_option::Column::EventId.eq(id))
            .order_by_asc(event_voting_option::Column::Id)
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let choice = decide(&event, &tallies, &options)?;
        let written = match &choice {
            FinalChoice::Winner { option_id, status } => {
                Self::write_final_option(&txn, id, option_id, *status).await?
            }
            FinalChoice::NoVotes => Self::write_no_one_voted(&txn, id).await?,
        };

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(written.then_some(choice))
    }

    /// Write the winning option, only if none was written yet.
    ///
    /// Returns `false` when another sweep got there first.
    pub async fn set_final_option(
        &self,
        id: &str,
        option_id: &str,
        status: Option<EventStatus>,
    ) -> AppResult<bool> {
        Self::write_final_option(self.db.as_ref(), id, option_id, status).await
    }

    /// Mark an unfinalized event as having received no votes.
    ///
    /// Returns `false` when the event was finalized or already marked.
    pub async fn mark_no_one_voted(&self, id: &str) -> AppResult<bool> {
        Self::write_no_one_voted(self.db.as_ref(), id).await
    }

    async fn write_final_option<C: ConnectionTrait>(
        conn: &C,
        id: &str,
        option_id: &str,
        status: Option<EventStatus>,
    ) -> AppResult<bool> {
        let result = Event::update_many()
            .col_expr(
                event::Column::FinalVotingOptionId,
                Expr::value(option_id.to_string()),
            )
            .col_expr(event::Column::Status, Expr::value(status))
            .filter(event::Column::Id.eq(id))
            .filter(event::Column::FinalVotingOptionId.is_null())
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn write_no_one_voted<C: ConnectionTrait>(conn: &C, id: &str) -> AppResult<bool> {
        let result = Event::update_many()
            .col_expr(event::Column::Status, Expr::value(EventStatus::NoOneVoted))
            .filter(event::Column::Id.eq(id))
            .filter(event::Column::FinalVotingOptionId.is_null())
            .filter(
                Condition::any()
                    .add(event::Column::Status.is_null())
                    .add(event::Column::Status.ne(EventStatus::NoOneVoted)),
            )
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Overwrite the cached status.
    pub async fn set_status(&self, id: &str, status: Option<EventStatus>) -> AppResult<()> {
        Event::update_many()
            .col_expr(event::Column::Status, Expr::value(status))
            .filter(event::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_event(id: &str, allow_voting: bool) -> event::Model {
        event::Model {
            id: id.to_string(),
            user_id: "user1".to_string(),
            title: "Board game night".to_string(),
            description: "Bring your favourite games".to_string(),
            tags: json!(["games", "social"]),
            image: "cover.png".to_string(),
            location: "Community hall".to_string(),
            allow_voting,
            date: None,
            start_time: None,
            end_time: None,
            voting_end_date: NaiveDate::from_ymd_opt(2024, 5, 30),
            voting_end_time: NaiveTime::from_hms_opt(23, 59, 0),
            final_voting_option_id: None,
            status: Some(EventStatus::VotingOpen),
            recording_link: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn affected(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<event::Model>::new()])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let err = repo.get_by_id("missing").await.unwrap_err();

        assert!(matches!(err, AppError::EventNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_create_with_schedule() {
        let event = create_test_event("e1", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[event.clone()]])
                .append_exec_results([affected(2), affected(1)])
                .into_connection(),
        );

        let options = vec![
            event_voting_option::ActiveModel {
                id: Set("o1".to_string()),
                event_id: Set("e1".to_string()),
                date: Set(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
                start_time: Set(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
                end_time: Set(NaiveTime::from_hms_opt(11, 0, 0).unwrap()),
                created_at: Set(Utc::now().into()),
            },
            event_voting_option::ActiveModel {
                id: Set("o2".to_string()),
                event_id: Set("e1".to_string()),
                date: Set(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()),
                start_time: Set(NaiveTime::from_hms_opt(14, 0, 0).unwrap()),
                end_time: Set(NaiveTime::from_hms_opt(15, 0, 0).unwrap()),
                created_at: Set(Utc::now().into()),
            },
        ];
        let moderation = event_moderation::ActiveModel {
            id: Set("m1".to_string()),
            event_id: Set("e1".to_string()),
            user_id: Set("user1".to_string()),
            status: Set(event_moderation::ModerationStatus::Pending),
            comment: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let repo = EventRepository::new(db);
        let created = repo
            .create_with_schedule(event.into(), options, moderation)
            .await
            .unwrap();

        assert_eq!(created.id, "e1");
        assert!(created.allow_voting);
    }

    #[tokio::test]
    async fn test_set_final_option_first_writer_wins() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([affected(1), affected(0)])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        assert!(
            repo.set_final_option("e1", "o1", Some(EventStatus::Scheduled))
                .await
                .unwrap()
        );
        assert!(
            !repo
                .set_final_option("e1", "o2", Some(EventStatus::Scheduled))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_mark_no_one_voted() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([affected(1)])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        assert!(repo.mark_no_one_voted("e1").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_editable_never_writes_final_option() {
        let mut event = create_test_event("e1", true);
        event.final_voting_option_id = Some("o1".to_string());
        event.title = "Board game marathon".to_string();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([affected(1)])
                .into_connection(),
        );

        let repo = EventRepository::new(db.clone());
        assert!(repo.update_editable(&event, Some("o1")).await.unwrap());
        drop(repo);

        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        let (set, filter) = sql.split_once("WHERE").unwrap();
        assert!(set.contains("UPDATE"));
        assert!(set.contains("title"));
        assert!(!set.contains("final_voting_option_id"));
        assert!(filter.contains("final_voting_option_id"));
    }

    #[tokio::test]
    async fn test_update_editable_reports_lost_race() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([affected(0)])
                .into_connection(),
        );

        let repo = EventRepository::new(db.clone());
        assert!(
            !repo
                .update_editable(&create_test_event("e1", true), None)
                .await
                .unwrap()
        );
        drop(repo);

        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        assert!(format!("{log:?}").contains("IS NULL"));
    }

    #[tokio::test]
    async fn test_close_voting_locks_row_and_writes_winner() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_event("e1", true)]])
                .append_query_results([vec![maplit::btreemap! {
                    "voting_option_id" => sea_orm::Value::String(Some(Box::new("o1".to_string()))),
                    "votes" => sea_orm::Value::BigInt(Some(2)),
                }]])
                .append_query_results([[fixtures::voting_option(
                    "o1", "e1", "2024-06-01", "10:00", "11:00",
                )]])
                .append_exec_results([affected(1)])
                .into_connection(),
        );

        let repo = EventRepository::new(db.clone());
        let choice = repo
            .close_voting("e1", |_, tallies, options| {
                assert_eq!(tallies[0].votes, 2);
                assert_eq!(options.len(), 1);
                Ok(FinalChoice::Winner {
                    option_id: tallies[0].voting_option_id.clone(),
                    status: Some(EventStatus::Scheduled),
                })
            })
            .await
            .unwrap();
        drop(repo);

        assert_eq!(
            choice,
            Some(FinalChoice::Winner {
                option_id: "o1".to_string(),
                status: Some(EventStatus::Scheduled),
            })
        );

        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("FOR UPDATE"));
        assert!(sql.contains("final_voting_option_id"));
    }

    #[tokio::test]
    async fn test_close_voting_skips_closed_event() {
        let mut closed = create_test_event("e1", true);
        closed.status = Some(EventStatus::NoOneVoted);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[closed]])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let choice = repo
            .close_voting("e1", |_, _, _| Ok(FinalChoice::NoVotes))
            .await
            .unwrap();

        assert_eq!(choice, None);
    }

    #[tokio::test]
    async fn test_find_due_for_finalization() {
        let event = create_test_event("e1", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[event]])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let now = NaiveDate::from_ymd_opt(2024, 5, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let due = repo.find_due_for_finalization(now).await.unwrap();

        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, "e1");
    }

    #[tokio::test]
    async fn test_tag_counts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    maplit::btreemap! {
                        "tag" => sea_orm::Value::String(Some(Box::new("games".to_string()))),
                        "count" => sea_orm::Value::BigInt(Some(3)),
                    },
                    maplit::btreemap! {
                        "tag" => sea_orm::Value::String(Some(Box::new("music".to_string()))),
                        "count" => sea_orm::Value::BigInt(Some(1)),
                    },
                ]])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let counts = repo.tag_counts().await.unwrap();

        assert_eq!(
            counts,
            vec![
                TagCount {
                    tag: "games".to_string(),
                    count: 3
                },
                TagCount {
                    tag: "music".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_tag_list() {
        let event = create_test_event("e1", false);
        assert_eq!(event.tag_list(), vec!["games", "social"]);
    }
}
