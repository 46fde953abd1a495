//! Event interest (RSVP) endpoints.

use axum::{Json, Router, extract::State, routing::post};
use plaza_common::AppResult;
use plaza_core::EngagementTarget;
use plaza_db::entities::engagement::EngagementKind;
use serde::{Deserialize, Serialize};

use super::events::EventIdRequest;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Toggle interest request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleInterestRequest {
    pub event_id: String,
    pub interested: bool,
}

/// Interest counter response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestResponse {
    pub event_id: String,
    pub count: i64,
    pub interested: bool,
}

async fn toggle(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ToggleInterestRequest>,
) -> AppResult<ApiResponse<InterestResponse>> {
    let target = EngagementTarget::new(EngagementKind::EventInterest, req.event_id);
    let counter = state
        .engagement_service
        .toggle(&target, &actor.id, req.interested)
        .await?;

    Ok(ApiResponse::ok(InterestResponse {
        event_id: target.id,
        count: counter.count,
        interested: counter.active,
    }))
}

async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventIdRequest>,
) -> AppResult<ApiResponse<InterestResponse>> {
    let target = EngagementTarget::new(EngagementKind::EventInterest, req.event_id);
    let counter = state
        .engagement_service
        .counter(&target, viewer.id())
        .await?;

    Ok(ApiResponse::ok(InterestResponse {
        event_id: target.id,
        count: counter.count,
        interested: counter.active,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/show", post(show))
}
