//! Annex endpoints.

use axum::{Json, Router, extract::State, routing::post};
use plaza_common::AppResult;
use plaza_core::SelectableItem;
use serde::{Deserialize, Serialize};

use super::events::EventIdRequest;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Replace annexes request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnnexesRequest {
    pub event_id: String,
    pub items: Vec<SelectableItem>,
}

/// Annexes of an event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnexesResponse {
    pub event_id: String,
    pub items: Vec<SelectableItem>,
}

async fn update(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateAnnexesRequest>,
) -> AppResult<ApiResponse<AnnexesResponse>> {
    let items = state
        .annex_service
        .replace(&actor, &req.event_id, &req.items)
        .await?;

    Ok(ApiResponse::ok(AnnexesResponse {
        event_id: req.event_id,
        items,
    }))
}

async fn list(
    State(state): State<AppState>,
    Json(req): Json<EventIdRequest>,
) -> AppResult<ApiResponse<AnnexesResponse>> {
    let items = state.annex_service.list(&req.event_id).await?;

    Ok(ApiResponse::ok(AnnexesResponse {
        event_id: req.event_id,
        items,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/update", post(update))
        .route("/list", post(list))
}
