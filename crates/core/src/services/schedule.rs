//! Time slots, status derivation and winner selection.
//!
//! Everything here is pure: the current time is always passed in.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use plaza_db::entities::{event, event::EventStatus, event_voting_option};
use plaza_db::repositories::VoteTally;
use serde::Serialize;

/// A concrete (date, start, end) window in the event timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Slot {
    #[must_use]
    pub const fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            date,
            start_time,
            end_time,
        }
    }

    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    #[must_use]
    pub fn end(&self) -> NaiveDateTime {
        self.date.and_time(self.end_time)
    }

    /// The fixed schedule of a non-voting event, if complete.
    #[must_use]
    pub fn fixed(event: &event::Model) -> Option<Self> {
        match (event.date, event.start_time, event.end_time) {
            (Some(date), Some(start), Some(end)) => Some(Self::new(date, start, end)),
            _ => None,
        }
    }
}

impl From<&event_voting_option::Model> for Slot {
    fn from(option: &event_voting_option::Model) -> Self {
        Self::new(option.date, option.start_time, option.end_time)
    }
}

/// Voting deadline of an event, if both parts are set.
#[must_use]
pub fn voting_deadline(event: &event::Model) -> Option<NaiveDateTime> {
    event.voting_deadline()
}

/// Facts the status of an event depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInput {
    pub allow_voting: bool,
    pub deadline: Option<NaiveDateTime>,
    pub finalized: bool,
    pub has_votes: bool,
    /// Fixed slot, or the winning slot of a finalized voting event.
    pub schedule: Option<Slot>,
}

impl StatusInput {
    /// Collect the inputs from a stored event.
    ///
    /// `final_option` must be the event's winning option when it has one.
    #[must_use]
    pub fn from_event(
        event: &event::Model,
        final_option: Option<&event_voting_option::Model>,
        has_votes: bool,
    ) -> Self {
        let finalized = event.final_voting_option_id.is_some();
        let schedule = if event.allow_voting {
            final_option.filter(|_| finalized).map(Slot::from)
        } else {
            Slot::fixed(event)
        };

        Self {
            allow_voting: event.allow_voting,
            deadline: voting_deadline(event),
            finalized,
            has_votes,
            schedule,
        }
    }

    /// Whether vote counts can influence the status right now.
    ///
    /// Only an unfinalized voting event past its deadline needs them.
    #[must_use]
    pub fn needs_votes(&self, now: NaiveDateTime) -> bool {
        self.allow_voting && !self.finalized && self.deadline.is_some_and(|d| d <= now)
    }
}

/// Derive the scheduling status at `now`.
///
/// A voting event whose deadline passed with votes but that has not been
/// finalized yet stays `VotingOpen` until the next sweep picks a winner.
/// Returns `None` when there is no schedule to reason about.
#[must_use]
pub fn derive_status(input: &StatusInput, now: NaiveDateTime) -> Option<EventStatus> {
    if input.allow_voting && !input.finalized {
        let deadline_passed = input.deadline.is_some_and(|d| d <= now);
        return if deadline_passed && !input.has_votes {
            Some(EventStatus::NoOneVoted)
        } else {
            Some(EventStatus::VotingOpen)
        };
    }

    let slot = input.schedule?;
    if now < slot.start() {
        Some(EventStatus::Scheduled)
    } else if now <= slot.end() {
        Some(EventStatus::Ongoing)
    } else {
        Some(EventStatus::Completed)
    }
}

/// Pick the winning option: strictly highest count, ties go to the lowest
/// option id. `None` when nobody voted.
#[must_use]
pub fn pick_winner(tallies: &[VoteTally]) -> Option<String> {
    tallies
        .iter()
        .filter(|t| t.votes > 0)
        .min_by(|a, b| {
            b.votes
                .cmp(&a.votes)
                .then_with(|| a.voting_option_id.cmp(&b.voting_option_id))
        })
        .map(|t| t.voting_option_id.clone())
}
