//! Event service.

use chrono::{NaiveDateTime, Utc};
use plaza_common::{AppError, AppResult, IdGenerator};
use plaza_db::{
    entities::{
        engagement::EngagementKind, event, event::EventStatus, event_moderation,
        event_moderation::ModerationStatus, event_voting_option,
    },
    repositories::{
        EngagementCounter, EngagementRepository, EventListFilter, EventModerationRepository,
        EventRepository, TagCount, VotingOptionRepository,
    },
};
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::authorization::Actor;
use super::lifecycle::LifecycleService;
use super::schedule::{Slot, StatusInput, derive_status};
use super::validation::{
    EventDraft, EventSchedule, ValidationContext, VotingOptionDraft, format_date, format_time,
    validate_event,
};

/// Default page size for listings.
pub const DEFAULT_LIST_LIMIT: u64 = 20;

/// Largest page size a caller may request.
pub const MAX_LIST_LIMIT: u64 = 100;

/// Event service for business logic.
#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    option_repo: VotingOptionRepository,
    moderation_repo: EventModerationRepository,
    engagement_repo: EngagementRepository,
    lifecycle: LifecycleService,
    id_gen: IdGenerator,
}

/// An event with everything a detail page shows.
#[derive(Debug, Clone)]
pub struct EventDetail {
    pub event: event::Model,
    pub voting_options: Vec<event_voting_option::Model>,
    /// Effective schedule: the fixed slot or the winning option.
    pub schedule: Option<Slot>,
    pub interest_count: i64,
    pub is_interested: bool,
    pub moderation_status: Option<ModerationStatus>,
}

/// Input for listing events.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsInput {
    pub search: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<EventStatus>,
    pub user_id: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// One row of an event listing.
#[derive(Debug, Clone)]
pub struct EventListItem {
    pub event: event::Model,
    pub interest_count: i64,
}

impl EventService {
    /// Create a new event service.
    #[must_use]
    pub const fn new(
        event_repo: EventRepository,
        option_repo: VotingOptionRepository,
        moderation_repo: EventModerationRepository,
        engagement_repo: EngagementRepository,
        lifecycle: LifecycleService,
    ) -> Self {
        Self {
            event_repo,
            option_repo,
            moderation_repo,
            engagement_repo,
            lifecycle,
            id_gen: IdGenerator::new(),
        }
    }

    /// Validate and store a new event with its candidate slots.
    ///
    /// The event, its options and a pending moderation entry are written in
    /// one transaction.
    pub async fn create(
        &self,
        actor: &Actor,
        draft: &EventDraft,
        now: NaiveDateTime,
    ) -> AppResult<event::Model> {
        let validated = validate_event(draft, &ValidationContext::create(now))?;
        let event_id = self.id_gen.generate();

        let (fixed, options, deadline) = match &validated.schedule {
            EventSchedule::Fixed(slot) => (Some(*slot), Vec::new(), None),
            EventSchedule::Voting { options, deadline } => (None, options.clone(), Some(*deadline)),
        };

        let status = derive_status(
            &StatusInput {
                allow_voting: validated.allow_voting(),
                deadline,
                finalized: false,
                has_votes: false,
                schedule: fixed,
            },
            now,
        );

        // Monotonic ids keep "lowest id" equal to "first submitted".
        let option_ids = self.id_gen.generate_ordered(options.len())?;
        let option_models = option_ids
            .into_iter()
            .zip(&options)
            .map(|(id, slot)| event_voting_option::ActiveModel {
                id: Set(id),
                event_id: Set(event_id.clone()),
                date: Set(slot.date),
                start_time: Set(slot.start_time),
                end_time: Set(slot.end_time),
                created_at: Set(Utc::now().into()),
            })
            .collect();

        let model = event::ActiveModel {
            id: Set(event_id.clone()),
            user_id: Set(actor.id.clone()),
            title: Set(validated.title),
            description: Set(validated.description),
            tags: Set(json!(validated.tags)),
            image: Set(validated.image),
            location: Set(validated.location),
            allow_voting: Set(deadline.is_some()),
            date: Set(fixed.map(|s| s.date)),
            start_time: Set(fixed.map(|s| s.start_time)),
            end_time: Set(fixed.map(|s| s.end_time)),
            voting_end_date: Set(deadline.map(|d| d.date())),
            voting_end_time: Set(deadline.map(|d| d.time())),
            final_voting_option_id: Set(None),
            status: Set(status),
            recording_link: Set(validated.recording_link),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let moderation = event_moderation::ActiveModel {
            id: Set(self.id_gen.generate()),
            event_id: Set(event_id.clone()),
            user_id: Set(actor.id.clone()),
            status: Set(ModerationStatus::Pending),
            comment: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let created = self
            .event_repo
            .create_with_schedule(model, option_models, moderation)
            .await?;

        info!(
            event_id = %created.id,
            user_id = %actor.id,
            voting = created.allow_voting,
            "Event created"
        );

        Ok(created)
    }

    /// Get an event by ID.
    pub async fn get(&self, id: &str) -> AppResult<event::Model> {
        self.event_repo.get_by_id(id).await
    }

    /// Event with options, interest and moderation state.
    pub async fn get_detail(&self, id: &str, viewer: Option<&str>) -> AppResult<EventDetail> {
        let event = self.event_repo.get_by_id(id).await?;
        let voting_options = self.option_repo.find_by_event(id).await?;
        let EngagementCounter { count, active } = self
            .engagement_repo
            .counter(EngagementKind::EventInterest, id, viewer)
            .await?;
        let moderation_status = self
            .moderation_repo
            .find_latest(id)
            .await?
            .map(|entry| entry.status);

        let schedule = if event.allow_voting {
            event.final_voting_option_id.as_deref().and_then(|final_id| {
                voting_options
                    .iter()
                    .find(|option| option.id == final_id)
                    .map(Slot::from)
            })
        } else {
            Slot::fixed(&event)
        };

        Ok(EventDetail {
            event,
            voting_options,
            schedule,
            interest_count: count,
            is_interested: active,
            moderation_status,
        })
    }

    /// Edit an event.
    ///
    /// Whether the event votes is fixed at creation, and so are its
    /// candidate slots. A finalized event keeps its deadline and its winning
    /// option; the write fails with a conflict if finalization lands first.
    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        draft: &EventDraft,
        now: NaiveDateTime,
    ) -> AppResult<event::Model> {
        let event = self.event_repo.get_by_id(id).await?;
        actor.ensure_can_manage(&event.user_id)?;

        if draft.allow_voting != event.allow_voting {
            return Err(AppError::Conflict(
                "Voting cannot be turned on or off after creation".to_string(),
            ));
        }

        let mut draft = draft.clone();
        if event.allow_voting {
            draft.voting_options = self
                .option_repo
                .find_by_event(id)
                .await?
                .iter()
                .map(VotingOptionDraft::from)
                .collect();

            if event.final_voting_option_id.is_some() {
                draft.voting_end_date = event.voting_end_date.map(format_date);
                draft.voting_end_time = event.voting_end_time.map(format_time);
            }
        }

        let validated = validate_event(&draft, &ValidationContext::edit(now, event.date))?;

        let mut next = event.clone();
        next.title = validated.title;
        next.description = validated.description;
        next.tags = json!(validated.tags);
        next.image = validated.image;
        next.location = validated.location;
        next.recording_link = validated.recording_link;
        match validated.schedule {
            EventSchedule::Fixed(slot) => {
                next.date = Some(slot.date);
                next.start_time = Some(slot.start_time);
                next.end_time = Some(slot.end_time);
            }
            EventSchedule::Voting { deadline, .. } => {
                next.voting_end_date = Some(deadline.date());
                next.voting_end_time = Some(deadline.time());
            }
        }
        next.status = self.lifecycle.status_of(&next, now).await?;
        next.updated_at = Some(Utc::now().into());

        let written = self
            .event_repo
            .update_editable(&next, event.final_voting_option_id.as_deref())
            .await?;
        if !written {
            return Err(AppError::Conflict(
                "Event was finalized while being edited".to_string(),
            ));
        }

        info!(event_id = %id, user_id = %actor.id, "Event updated");
        self.event_repo.get_by_id(id).await
    }

    /// Delete an event and everything attached to it.
    pub async fn delete(&self, actor: &Actor, id: &str) -> AppResult<()> {
        let event = self.event_repo.get_by_id(id).await?;
        actor.ensure_can_manage(&event.user_id)?;

        self.event_repo.delete_cascade(id).await?;

        info!(event_id = %id, user_id = %actor.id, "Event deleted");
        Ok(())
    }

    /// List events, newest first, each with its interest count.
    pub async fn list(&self, input: &ListEventsInput) -> AppResult<Vec<EventListItem>> {
        let filter = EventListFilter {
            search: input.search.clone(),
            tags: input.tags.clone(),
            statuses: input.statuses.clone(),
            user_id: input.user_id.clone(),
            limit: input
                .limit
                .unwrap_or(DEFAULT_LIST_LIMIT)
                .clamp(1, MAX_LIST_LIMIT),
            offset: input.offset.unwrap_or(0),
        };

        let events = self.event_repo.list(&filter).await?;
        let ids: Vec<String> = events.iter().map(|e| e.id.clone()).collect();
        let counts = self
            .engagement_repo
            .count_many(EngagementKind::EventInterest, &ids)
            .await?;

        Ok(events
            .into_iter()
            .map(|event| EventListItem {
                interest_count: counts.get(&event.id).copied().unwrap_or(0),
                event,
            })
            .collect())
    }

    /// Tag usage across all events.
    pub async fn tag_counts(&self) -> AppResult<Vec<TagCount>> {
        self.event_repo.tag_counts().await
    }
}
