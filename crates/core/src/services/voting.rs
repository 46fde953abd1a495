//! Vote ledger service.

use std::collections::{BTreeSet, HashSet};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use plaza_common::{AppError, AppResult, IdGenerator};
use plaza_db::{
    entities::{event, event_vote},
    repositories::{EventRepository, EventVoteRepository, OptionSummaryRow, VotingOptionRepository},
};
use sea_orm::Set;
use serde::Serialize;
use tracing::{debug, info};

/// Vote service for business logic.
#[derive(Clone)]
pub struct VotingService {
    event_repo: EventRepository,
    option_repo: VotingOptionRepository,
    vote_repo: EventVoteRepository,
    id_gen: IdGenerator,
}

/// A voting option with its tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSummary {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub vote_count: i64,
    /// Whether the viewer voted for this option.
    pub has_voted: bool,
    pub is_final: bool,
}

/// Tallies of every option of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    pub event_id: String,
    pub options: Vec<OptionSummary>,
    pub total_votes: i64,
    pub voting_open: bool,
    pub final_voting_option_id: Option<String>,
}

/// Whether `event` still accepts votes at `now`.
#[must_use]
pub fn is_voting_open(event: &event::Model, now: NaiveDateTime) -> bool {
    event.accepts_votes(now)
}

fn ensure_voting_open(event: &event::Model, now: NaiveDateTime) -> AppResult<()> {
    if !event.allow_voting {
        return Err(AppError::BadRequest(
            "This event does not use voting".to_string(),
        ));
    }
    if event.final_voting_option_id.is_some() {
        return Err(AppError::Conflict(
            "Voting has already been finalized".to_string(),
        ));
    }
    if !is_voting_open(event, now) {
        return Err(AppError::Conflict("Voting has closed".to_string()));
    }
    Ok(())
}

impl VotingService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(
        event_repo: EventRepository,
        option_repo: VotingOptionRepository,
        vote_repo: EventVoteRepository,
    ) -> Self {
        Self {
            event_repo,
            option_repo,
            vote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Replace the user's votes on an event with `option_ids`.
    ///
    /// Ids that are not options of this event are dropped and duplicates
    /// collapse. An empty result clears the user's votes. Returns the
    /// option ids now recorded, sorted.
    pub async fn cast_votes(
        &self,
        event_id: &str,
        user_id: &str,
        option_ids: &[String],
        now: NaiveDateTime,
    ) -> AppResult<Vec<String>> {
        let event = self.event_repo.get_by_id(event_id).await?;
        ensure_voting_open(&event, now)?;

        let known: HashSet<String> = self
            .option_repo
            .find_by_event(event_id)
            .await?
            .into_iter()
            .map(|o| o.id)
            .collect();

        let accepted: BTreeSet<&String> = option_ids.iter().filter(|id| known.contains(*id)).collect();
        let dropped = option_ids.iter().filter(|id| !known.contains(*id)).count();
        if dropped > 0 {
            debug!(
                event_id = %event_id,
                user_id = %user_id,
                dropped,
                "Ignoring option ids that do not belong to the event"
            );
        }

        let votes = accepted
            .iter()
            .map(|option_id| event_vote::ActiveModel {
                id: Set(self.id_gen.generate()),
                event_id: Set(event_id.to_string()),
                user_id: Set(user_id.to_string()),
                voting_option_id: Set((*option_id).clone()),
                created_at: Set(Utc::now().into()),
            })
            .collect();

        self.vote_repo
            .replace_votes(event_id, user_id, votes, now)
            .await?;

        info!(
            event_id = %event_id,
            user_id = %user_id,
            options = accepted.len(),
            "Votes cast"
        );

        Ok(accepted.into_iter().cloned().collect())
    }

    /// Remove all of the user's votes on an event. Removing nothing succeeds.
    pub async fn remove_votes(
        &self,
        event_id: &str,
        user_id: &str,
        now: NaiveDateTime,
    ) -> AppResult<u64> {
        let event = self.event_repo.get_by_id(event_id).await?;
        ensure_voting_open(&event, now)?;

        let removed = self.vote_repo.remove_votes(event_id, user_id, now).await?;
        debug!(event_id = %event_id, user_id = %user_id, removed, "Votes removed");
        Ok(removed)
    }

    /// Option ids the user currently votes for.
    pub async fn my_votes(&self, event_id: &str, user_id: &str) -> AppResult<Vec<String>> {
        self.vote_repo.find_user_option_ids(event_id, user_id).await
    }

    /// Per-option tallies, with the viewer's own choices marked.
    pub async fn summary(
        &self,
        event_id: &str,
        viewer: Option<&str>,
        now: NaiveDateTime,
    ) -> AppResult<VoteSummary> {
        let event = self.event_repo.get_by_id(event_id).await?;
        let rows = self.vote_repo.summary(event_id, viewer).await?;

        let final_id = event.final_voting_option_id.clone();
        let options: Vec<OptionSummary> = rows
            .into_iter()
            .map(|row: OptionSummaryRow| OptionSummary {
                is_final: final_id.as_deref() == Some(row.id.as_str()),
                id: row.id,
                date: row.date,
                start_time: row.start_time,
                end_time: row.end_time,
                vote_count: row.vote_count,
                has_voted: row.has_voted,
            })
            .collect();

        Ok(VoteSummary {
            event_id: event.id.clone(),
            total_votes: options.iter().map(|o| o.vote_count).sum(),
            voting_open: is_voting_open(&event, now),
            final_voting_option_id: final_id,
            options,
        })
    }
}
