//! Event moderation endpoints.

use axum::{Json, Router, extract::State, routing::post};
use plaza_common::AppResult;
use plaza_core::ModerationInput;
use plaza_db::entities::{event_moderation, event_moderation::ModerationStatus};
use serde::{Deserialize, Serialize};

use super::events::EventIdRequest;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Moderation decision request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerateRequest {
    pub event_id: String,
    #[serde(flatten)]
    pub input: ModerationInput,
}

/// Moderation log entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationEntryResponse {
    pub id: String,
    pub event_id: String,
    pub moderator_id: String,
    pub status: ModerationStatus,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<event_moderation::Model> for ModerationEntryResponse {
    fn from(entry: event_moderation::Model) -> Self {
        Self {
            id: entry.id,
            event_id: entry.event_id,
            moderator_id: entry.user_id,
            status: entry.status,
            comment: entry.comment,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

async fn update(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ModerateRequest>,
) -> AppResult<ApiResponse<ModerationEntryResponse>> {
    let entry = state
        .moderation_service
        .record(&actor, &req.event_id, &req.input)
        .await?;

    Ok(ApiResponse::ok(entry.into()))
}

/// Current moderation state; visible to anyone who can see the event.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<EventIdRequest>,
) -> AppResult<ApiResponse<Option<ModerationEntryResponse>>> {
    let entry = state.moderation_service.latest(&req.event_id).await?;

    Ok(ApiResponse::ok(entry.map(Into::into)))
}

async fn history(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventIdRequest>,
) -> AppResult<ApiResponse<Vec<ModerationEntryResponse>>> {
    let entries = state
        .moderation_service
        .history(&actor, &req.event_id)
        .await?;

    Ok(ApiResponse::ok(entries.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/update", post(update))
        .route("/show", post(show))
        .route("/history", post(history))
}
