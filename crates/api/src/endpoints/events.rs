//! Event endpoints.

use axum::{Json, Router, extract::State, routing::post};
use plaza_common::AppResult;
use plaza_core::{
    EventDetail, EventDraft, EventListItem, ListEventsInput, Slot,
    validation::{format_date, format_time},
};
use plaza_db::{
    entities::{event, event::EventStatus, event_moderation::ModerationStatus, event_voting_option},
    repositories::TagCount,
};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Event response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub image: String,
    pub location: String,
    pub allow_voting: bool,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub voting_end_date: Option<String>,
    pub voting_end_time: Option<String>,
    pub final_voting_option_id: Option<String>,
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_link: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<event::Model> for EventResponse {
    fn from(event: event::Model) -> Self {
        Self {
            tags: event.tag_list(),
            id: event.id,
            user_id: event.user_id,
            title: event.title,
            description: event.description,
            image: event.image,
            location: event.location,
            allow_voting: event.allow_voting,
            date: event.date.map(format_date),
            start_time: event.start_time.map(format_time),
            end_time: event.end_time.map(format_time),
            voting_end_date: event.voting_end_date.map(format_date),
            voting_end_time: event.voting_end_time.map(format_time),
            final_voting_option_id: event.final_voting_option_id,
            status: event.status,
            recording_link: event.recording_link,
            created_at: event.created_at.to_rfc3339(),
            updated_at: event.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// A date and time window as strings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

impl From<Slot> for SlotResponse {
    fn from(slot: Slot) -> Self {
        Self {
            date: format_date(slot.date),
            start_time: format_time(slot.start_time),
            end_time: format_time(slot.end_time),
        }
    }
}

/// Voting option response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingOptionResponse {
    pub id: String,
    #[serde(flatten)]
    pub slot: SlotResponse,
}

impl From<&event_voting_option::Model> for VotingOptionResponse {
    fn from(option: &event_voting_option::Model) -> Self {
        Self {
            id: option.id.clone(),
            slot: Slot::from(option).into(),
        }
    }
}

/// Event detail response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub voting_options: Vec<VotingOptionResponse>,
    pub schedule: Option<SlotResponse>,
    pub interest_count: i64,
    pub is_interested: bool,
    pub moderation_status: Option<ModerationStatus>,
}

impl From<EventDetail> for EventDetailResponse {
    fn from(detail: EventDetail) -> Self {
        Self {
            voting_options: detail
                .voting_options
                .iter()
                .map(VotingOptionResponse::from)
                .collect(),
            event: detail.event.into(),
            schedule: detail.schedule.map(Into::into),
            interest_count: detail.interest_count,
            is_interested: detail.is_interested,
            moderation_status: detail.moderation_status,
        }
    }
}

/// Event listing entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListItemResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub interest_count: i64,
}

impl From<EventListItem> for EventListItemResponse {
    fn from(item: EventListItem) -> Self {
        Self {
            event: item.event.into(),
            interest_count: item.interest_count,
        }
    }
}

/// Request naming a single event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventIdRequest {
    pub event_id: String,
}

/// Update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub event_id: String,
    #[serde(flatten)]
    pub draft: EventDraft,
}

/// Deleted response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub id: String,
    pub deleted: bool,
}

/// Create an event.
async fn create(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(draft): Json<EventDraft>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state
        .event_service
        .create(&actor, &draft, state.clock.now())
        .await?;

    Ok(ApiResponse::ok(event.into()))
}

/// Show an event with its options, interest and moderation state.
async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventIdRequest>,
) -> AppResult<ApiResponse<EventDetailResponse>> {
    let detail = state
        .event_service
        .get_detail(&req.event_id, viewer.id())
        .await?;

    Ok(ApiResponse::ok(detail.into()))
}

/// Edit an event.
async fn update(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateEventRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state
        .event_service
        .update(&actor, &req.event_id, &req.draft, state.clock.now())
        .await?;

    Ok(ApiResponse::ok(event.into()))
}

/// Delete an event.
async fn delete(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventIdRequest>,
) -> AppResult<ApiResponse<DeletedResponse>> {
    state.event_service.delete(&actor, &req.event_id).await?;

    Ok(ApiResponse::ok(DeletedResponse {
        id: req.event_id,
        deleted: true,
    }))
}

/// List events.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListEventsInput>,
) -> AppResult<ApiResponse<Vec<EventListItemResponse>>> {
    let items = state.event_service.list(&req).await?;

    Ok(ApiResponse::ok(items.into_iter().map(Into::into).collect()))
}

/// Tag usage.
async fn tags(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<TagCountResponse>>> {
    let counts = state.event_service.tag_counts().await?;

    Ok(ApiResponse::ok(counts.into_iter().map(Into::into).collect()))
}

/// Tag usage entry.
#[derive(Debug, Serialize)]
pub struct TagCountResponse {
    pub tag: String,
    pub count: i64,
}

impl From<TagCount> for TagCountResponse {
    fn from(count: TagCount) -> Self {
        Self {
            tag: count.tag,
            count: count.count,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/show", post(show))
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/list", post(list))
        .route("/tags", post(tags))
}
