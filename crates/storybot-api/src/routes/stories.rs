//! Story catalog routes.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use tracing::instrument;

use storybot_narrative::application::query_handlers;
use storybot_narrative::domain::menu::Menu;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /stories
#[instrument(skip(state))]
async fn list_stories(State(state): State<AppState>) -> Result<Json<Menu>, ApiError> {
    let menu = query_handlers::get_story_menu(&*state.content).await?;
    Ok(Json(menu))
}

/// Returns the router for the story catalog.
pub fn router() -> Router<AppState> {
    Router::new().route("/stories", get(list_stories))
}
