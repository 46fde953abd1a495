//! Likes, "useful" marks and bookmarks on threads, comments and guides.

use axum::{Json, Router, extract::State, routing::post};
use plaza_common::{AppError, AppResult};
use plaza_core::EngagementTarget;
use plaza_db::entities::engagement::EngagementKind;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Target of a like.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeTargetRequest {
    pub kind: EngagementKind,
    pub target_id: String,
}

/// Toggle request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    #[serde(flatten)]
    pub target: LikeTargetRequest,
    pub active: bool,
}

/// Like counter response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub kind: EngagementKind,
    pub target_id: String,
    pub count: i64,
    pub active: bool,
}

impl LikeTargetRequest {
    fn into_target(self) -> AppResult<EngagementTarget> {
        if self.kind == EngagementKind::EventInterest {
            return Err(AppError::BadRequest(
                "Use /events/interest for event interest".to_string(),
            ));
        }
        Ok(EngagementTarget::new(self.kind, self.target_id))
    }
}

async fn toggle(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ToggleLikeRequest>,
) -> AppResult<ApiResponse<LikeResponse>> {
    let target = req.target.into_target()?;
    let counter = state
        .engagement_service
        .toggle(&target, &actor.id, req.active)
        .await?;

    Ok(ApiResponse::ok(LikeResponse {
        kind: target.kind,
        target_id: target.id,
        count: counter.count,
        active: counter.active,
    }))
}

async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<LikeTargetRequest>,
) -> AppResult<ApiResponse<LikeResponse>> {
    let target = req.into_target()?;
    let counter = state
        .engagement_service
        .counter(&target, viewer.id())
        .await?;

    Ok(ApiResponse::ok(LikeResponse {
        kind: target.kind,
        target_id: target.id,
        count: counter.count,
        active: counter.active,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/show", post(show))
}
