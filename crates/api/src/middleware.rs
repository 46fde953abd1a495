//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use plaza_common::LocalClock;
use plaza_core::{
    Actor, AnnexService, EngagementService, EventService, LifecycleService, ModerationService,
    VotingService,
};
use plaza_db::repositories::UserRoleRepository;

use crate::auth::TokenVerifier;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub event_service: EventService,
    pub voting_service: VotingService,
    pub lifecycle_service: LifecycleService,
    pub engagement_service: EngagementService,
    pub moderation_service: ModerationService,
    pub annex_service: AnnexService,
    pub user_role_repo: UserRoleRepository,
    pub tokens: Arc<TokenVerifier>,
    pub clock: LocalClock,
}

/// Authentication middleware.
///
/// A valid bearer token puts the acting [`Actor`] into the request
/// extensions. Requests without a token pass through anonymously; a token
/// that fails verification is rejected.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    if let Some(token) = token {
        let user_id = match state.tokens.verify(&token) {
            Ok(user_id) => user_id,
            Err(e) => return e.into_response(),
        };
        let role = match state.user_role_repo.find_role(&user_id).await {
            Ok(role) => role,
            Err(e) => return e.into_response(),
        };
        req.extensions_mut().insert(Actor::new(user_id, role));
    }

    next.run(req).await
}
