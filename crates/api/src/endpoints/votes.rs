//! Voting endpoints.

use axum::{Json, Router, extract::State, routing::post};
use plaza_common::AppResult;
use plaza_core::{OptionSummary, VoteSummary};
use serde::{Deserialize, Serialize};

use super::events::{EventIdRequest, SlotResponse};
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Cast votes request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVotesRequest {
    pub event_id: String,
    pub option_ids: Vec<String>,
}

/// The caller's votes after a change.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyVotesResponse {
    pub event_id: String,
    pub option_ids: Vec<String>,
}

/// One option of the summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSummaryResponse {
    pub id: String,
    #[serde(flatten)]
    pub slot: SlotResponse,
    pub vote_count: i64,
    pub has_voted: bool,
    pub is_final: bool,
}

impl From<OptionSummary> for OptionSummaryResponse {
    fn from(option: OptionSummary) -> Self {
        Self {
            slot: plaza_core::Slot::new(option.date, option.start_time, option.end_time).into(),
            id: option.id,
            vote_count: option.vote_count,
            has_voted: option.has_voted,
            is_final: option.is_final,
        }
    }
}

/// Vote summary response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummaryResponse {
    pub event_id: String,
    pub options: Vec<OptionSummaryResponse>,
    pub total_votes: i64,
    pub voting_open: bool,
    pub final_voting_option_id: Option<String>,
}

impl From<VoteSummary> for VoteSummaryResponse {
    fn from(summary: VoteSummary) -> Self {
        Self {
            event_id: summary.event_id,
            options: summary.options.into_iter().map(Into::into).collect(),
            total_votes: summary.total_votes,
            voting_open: summary.voting_open,
            final_voting_option_id: summary.final_voting_option_id,
        }
    }
}

/// Replace the caller's votes.
async fn cast(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CastVotesRequest>,
) -> AppResult<ApiResponse<MyVotesResponse>> {
    let option_ids = state
        .voting_service
        .cast_votes(&req.event_id, &actor.id, &req.option_ids, state.clock.now())
        .await?;

    Ok(ApiResponse::ok(MyVotesResponse {
        event_id: req.event_id,
        option_ids,
    }))
}

/// Withdraw all of the caller's votes.
async fn remove(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventIdRequest>,
) -> AppResult<ApiResponse<MyVotesResponse>> {
    state
        .voting_service
        .remove_votes(&req.event_id, &actor.id, state.clock.now())
        .await?;

    Ok(ApiResponse::ok(MyVotesResponse {
        event_id: req.event_id,
        option_ids: Vec::new(),
    }))
}

/// The caller's current votes.
async fn mine(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventIdRequest>,
) -> AppResult<ApiResponse<MyVotesResponse>> {
    let option_ids = state
        .voting_service
        .my_votes(&req.event_id, &actor.id)
        .await?;

    Ok(ApiResponse::ok(MyVotesResponse {
        event_id: req.event_id,
        option_ids,
    }))
}

/// Per-option tallies.
async fn summary(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventIdRequest>,
) -> AppResult<ApiResponse<VoteSummaryResponse>> {
    let summary = state
        .voting_service
        .summary(&req.event_id, viewer.id(), state.clock.now())
        .await?;

    Ok(ApiResponse::ok(summary.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cast", post(cast))
        .route("/remove", post(remove))
        .route("/mine", post(mine))
        .route("/summary", post(summary))
}
