//! Finalization and status sweep.
//!
//! Safe to run concurrently with itself: finalization locks the event row
//! and its writes are conditional on `final_voting_option_id IS NULL`, so
//! the first writer wins and later runs are no-ops.

use chrono::NaiveDateTime;
use plaza_common::{AppError, AppResult};
use plaza_db::{
    entities::{event, event::EventStatus},
    repositories::{EventRepository, EventVoteRepository, FinalChoice, VotingOptionRepository},
};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::schedule::{Slot, StatusInput, derive_status, pick_winner, voting_deadline};

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Events that received a winning option.
    pub finalized: u64,
    /// Events closed without any vote.
    pub no_one_voted: u64,
    /// Events whose cached status changed.
    pub statuses_updated: u64,
    /// Events that could not be processed; retried next sweep.
    pub failed: u64,
}

impl SweepReport {
    fn merge(&mut self, other: Self) {
        self.finalized += other.finalized;
        self.no_one_voted += other.no_one_voted;
        self.statuses_updated += other.statuses_updated;
        self.failed += other.failed;
    }
}

/// What finalizing a single event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finalization {
    Winner(String),
    NoVotes,
    /// Another run finalized the event first.
    AlreadyDone,
}

/// Lifecycle service for business logic.
#[derive(Clone)]
pub struct LifecycleService {
    event_repo: EventRepository,
    option_repo: VotingOptionRepository,
    vote_repo: EventVoteRepository,
}

impl LifecycleService {
    /// Create a new lifecycle service.
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
        }
    }

    /// Finalize, then refresh every cached status.
    pub async fn sweep(&self, now: NaiveDateTime) -> AppResult<SweepReport> {
        let mut report = self.finalize_due(now).await?;
        report.merge(self.refresh_statuses(now).await?);

        info!(
            finalized = report.finalized,
            no_one_voted = report.no_one_voted,
            statuses_updated = report.statuses_updated,
            failed = report.failed,
            "Event sweep completed"
        );

        Ok(report)
    }

    /// Pick winners for every voting event whose deadline has passed.
    ///
    /// A failing event is logged and counted; the others still run.
    pub async fn finalize_due(&self, now: NaiveDateTime) -> AppResult<SweepReport> {
        let due = self.event_repo.find_due_for_finalization(now).await?;
        let mut report = SweepReport::default();

        for event in &due {
            match self.finalize_event(&event.id, now).await {
                Ok(Finalization::Winner(option_id)) => {
                    info!(event_id = %event.id, option_id = %option_id, "Event finalized");
                    report.finalized += 1;
                }
                Ok(Finalization::NoVotes) => {
                    info!(event_id = %event.id, "Voting closed without votes");
                    report.no_one_voted += 1;
                }
                Ok(Finalization::AlreadyDone) => {
                    debug!(event_id = %event.id, "Event already finalized");
                }
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "Failed to finalize event");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Finalize one due event.
    ///
    /// The tally is read and the outcome written while the event row is
    /// locked, so no vote can land between the two.
    pub async fn finalize_event(
        &self,
        event_id: &str,
        now: NaiveDateTime,
    ) -> AppResult<Finalization> {
        let choice = self
            .event_repo
            .close_voting(event_id, |event, tallies, options| {
                let Some(option_id) = pick_winner(tallies) else {
                    return Ok(FinalChoice::NoVotes);
                };

                let option = options
                    .iter()
                    .find(|option| option.id == option_id)
                    .ok_or_else(|| {
                        AppError::Internal(format!("Voted option {option_id} is missing"))
                    })?;

                let status = derive_status(
                    &StatusInput {
                        allow_voting: true,
                        deadline: voting_deadline(event),
                        finalized: true,
                        has_votes: true,
                        schedule: Some(Slot::from(option)),
                    },
                    now,
                );

                Ok(FinalChoice::Winner { option_id, status })
            })
            .await?;

        Ok(match choice {
            Some(FinalChoice::Winner { option_id, .. }) => Finalization::Winner(option_id),
            Some(FinalChoice::NoVotes) => Finalization::NoVotes,
            None => Finalization::AlreadyDone,
        })
    }

    /// Recompute the status of every event not yet completed, writing only
    /// changed values.
    pub async fn refresh_statuses(&self, now: NaiveDateTime) -> AppResult<SweepReport> {
        let events = self.event_repo.find_unsettled().await?;
        let mut report = SweepReport::default();

        for event in &events {
            match self.refresh_status(event, now).await {
                Ok(true) => {
                    debug!(event_id = %event.id, "Status updated");
                    report.statuses_updated += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "Failed to refresh status");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    async fn refresh_status(&self, event: &event::Model, now: NaiveDateTime) -> AppResult<bool> {
        let status = self.status_of(event, now).await?;
        if status == event.status {
            return Ok(false);
        }
        self.event_repo.set_status(&event.id, status).await?;
        Ok(true)
    }

    /// Status of an event at `now`, loading the winning slot and vote
    /// presence only when they matter.
    pub async fn status_of(
        &self,
        event: &event::Model,
        now: NaiveDateTime,
    ) -> AppResult<Option<EventStatus>> {
        let final_option = match event.final_voting_option_id.as_deref() {
            Some(id) => self.option_repo.find_by_id(id).await?,
            None => None,
        };

        let mut input = StatusInput::from_event(event, final_option.as_ref(), false);
        if input.needs_votes(now) {
            input.has_votes = !self.vote_repo.tally(&event.id).await?.is_empty();
        }

        Ok(derive_status(&input, now))
    }
}
