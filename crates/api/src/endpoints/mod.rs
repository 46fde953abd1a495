//! API endpoints.

mod admin;
mod annexes;
mod events;
mod interest;
mod likes;
mod moderation;
mod votes;

use axum::Router;

use crate::middleware::AppState;

pub use events::{EventDetailResponse, EventResponse};

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/events", events::router())
        .nest("/events/votes", votes::router())
        .nest("/events/interest", interest::router())
        .nest("/events/moderation", moderation::router())
        .nest("/events/annexes", annexes::router())
        .nest("/likes", likes::router())
        .nest("/admin", admin::router())
}
