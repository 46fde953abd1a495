//! HTTP API layer for plaza.
//!
//! - **Endpoints**: event, voting, engagement, moderation and annex routes
//! - **Extractors**: acting user resolved from the bearer token
//! - **Middleware**: token verification
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod auth;
pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use auth::{Claims, TokenVerifier};
pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
