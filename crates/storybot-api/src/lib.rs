//! Storybot — HTTP transport.
//!
//! Exposes the session controller over JSON routes, including a chat-message
//! endpoint that interprets raw chat text the way the bot does.

pub mod chat;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the application router with every route mounted. Layers are added
/// by the caller.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_router())
        .with_state(state)
}
