//! Route modules, one per resource.

pub mod health;
pub mod messages;
pub mod navigation;
pub mod stats;
pub mod stories;

use axum::Router;

use crate::state::AppState;

/// Every versioned API route, to be nested under `/api/v1`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(stories::router())
        .merge(navigation::router())
        .merge(messages::router())
        .merge(stats::router())
}
