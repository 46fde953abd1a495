//! Admin endpoints.

use axum::{Router, extract::State, routing::post};
use plaza_common::AppResult;
use plaza_core::SweepReport;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Run the finalization and status sweep now.
async fn sweep_events(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SweepReport>> {
    actor.ensure_admin()?;

    let report = state.lifecycle_service.sweep(state.clock.now()).await?;
    Ok(ApiResponse::ok(report))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/events/sweep", post(sweep_events))
}
