//! Event moderation log.

use chrono::Utc;
use plaza_common::{AppError, AppResult, IdGenerator};
use plaza_db::{
    entities::{event_moderation, event_moderation::ModerationStatus},
    repositories::{EventModerationRepository, EventRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::authorization::Actor;

/// A moderator's decision on an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ModerationInput {
    pub status: ModerationStatus,
    #[validate(length(min = 1, max = 500, message = "Comment must be between 1 and 500 characters"))]
    pub comment: String,
}

/// Moderation service for business logic.
#[derive(Clone)]
pub struct ModerationService {
    moderation_repo: EventModerationRepository,
    event_repo: EventRepository,
    id_gen: IdGenerator,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(moderation_repo: EventModerationRepository, event_repo: EventRepository) -> Self {
        Self {
            moderation_repo,
            event_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Append a decision. Moderators only; `pending` is reserved for
    /// newly created events.
    pub async fn record(
        &self,
        actor: &Actor,
        event_id: &str,
        input: &ModerationInput,
    ) -> AppResult<event_moderation::Model> {
        actor.ensure_moderator()?;
        input.validate()?;

        if input.status == ModerationStatus::Pending {
            return Err(AppError::BadRequest(
                "An event cannot be moved back to pending".to_string(),
            ));
        }

        self.event_repo.get_by_id(event_id).await?;

        let entry = self
            .moderation_repo
            .create(event_moderation::ActiveModel {
                id: Set(self.id_gen.generate()),
                event_id: Set(event_id.to_string()),
                user_id: Set(actor.id.clone()),
                status: Set(input.status),
                comment: Set(Some(input.comment.clone())),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        info!(
            event_id = %event_id,
            moderator_id = %actor.id,
            status = ?input.status,
            "Moderation recorded"
        );

        Ok(entry)
    }

    /// The decision currently in force.
    pub async fn latest(&self, event_id: &str) -> AppResult<Option<event_moderation::Model>> {
        self.moderation_repo.find_latest(event_id).await
    }

    /// Full log, visible to the owner and moderators.
    pub async fn history(
        &self,
        actor: &Actor,
        event_id: &str,
    ) -> AppResult<Vec<event_moderation::Model>> {
        let event = self.event_repo.get_by_id(event_id).await?;
        actor.ensure_can_manage(&event.user_id)?;

        self.moderation_repo.find_by_event(event_id).await
    }
}
