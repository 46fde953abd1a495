//! Engagement entity: interest, likes and bookmarks.
//!
//! One row per (kind, target, user). Threads, comments and guides live
//! outside this service, so their ids are stored opaquely.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of engagement, which also fixes the kind of target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    /// Interest/RSVP on an event
    #[sea_orm(string_value = "event_interest")]
    EventInterest,
    #[sea_orm(string_value = "thread_like")]
    ThreadLike,
    #[sea_orm(string_value = "comment_like")]
    CommentLike,
    /// "This guide was useful"
    #[sea_orm(string_value = "guide_useful")]
    GuideUseful,
    #[sea_orm(string_value = "guide_bookmark")]
    GuideBookmark,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "engagement")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub kind: EngagementKind,

    #[sea_orm(indexed)]
    pub target_id: String,

    #[sea_orm(indexed)]
    pub user_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
