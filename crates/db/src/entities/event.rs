//! Event entity.

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Scheduling status of an event.
///
/// Derived from the schedule and the clock; the stored value is a cache
/// refreshed by the periodic sweep.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[sea_orm(string_value = "voting_open")]
    VotingOpen,
    #[sea_orm(string_value = "no_one_voted")]
    NoOneVoted,
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "ongoing")]
    Ongoing,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owner of the event
    #[sea_orm(indexed)]
    pub user_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Tags (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: JsonValue,

    /// Storage key of the cover image
    pub image: String,

    pub location: String,

    /// Whether the schedule is decided by member votes
    pub allow_voting: bool,

    /// Fixed schedule (non-voting events only)
    #[sea_orm(nullable)]
    pub date: Option<Date>,
    #[sea_orm(nullable)]
    pub start_time: Option<Time>,
    #[sea_orm(nullable)]
    pub end_time: Option<Time>,

    /// Voting deadline (voting events only)
    #[sea_orm(nullable)]
    pub voting_end_date: Option<Date>,
    #[sea_orm(nullable)]
    pub voting_end_time: Option<Time>,

    /// Winning slot, written once by finalization
    #[sea_orm(nullable)]
    pub final_voting_option_id: Option<String>,

    #[sea_orm(nullable)]
    pub status: Option<EventStatus>,

    #[sea_orm(nullable)]
    pub recording_link: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Tags as plain strings.
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_array()
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.as_str().map(ToString::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Voting deadline, when both parts are set.
    #[must_use]
    pub fn voting_deadline(&self) -> Option<NaiveDateTime> {
        Some(self.voting_end_date?.and_time(self.voting_end_time?))
    }

    /// Whether votes may be cast or withdrawn at `now`.
    #[must_use]
    pub fn accepts_votes(&self, now: NaiveDateTime) -> bool {
        self.allow_voting
            && self.final_voting_option_id.is_none()
            && self.status != Some(EventStatus::NoOneVoted)
            && self.voting_deadline().is_some_and(|deadline| now < deadline)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_voting_option::Entity")]
    VotingOptions,

    #[sea_orm(has_many = "super::event_vote::Entity")]
    Votes,

    #[sea_orm(has_many = "super::event_moderation::Entity")]
    Moderations,

    #[sea_orm(has_many = "super::event_annex::Entity")]
    Annexes,
}

impl Related<super::event_voting_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VotingOptions.def()
    }
}

impl Related<super::event_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl Related<super::event_moderation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Moderations.def()
    }
}

impl Related<super::event_annex::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Annexes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
