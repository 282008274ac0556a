//! Statistics routes.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::instrument;

use storybot_core::content::{ChapterId, StoryId};
use storybot_core::save::UserId;
use storybot_narrative::application::query_handlers;
use storybot_narrative::domain::stats::{ChapterBreakdown, StoryBreakdown, StoryProgress};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /users/{user_id}/stats
#[instrument(skip(state))]
async fn overall(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<StoryProgress>>, ApiError> {
    let stories = query_handlers::get_overall_stats(user_id, &*state.content, &*state.saves).await?;
    Ok(Json(stories))
}

/// GET /users/{user_id}/stats/{story_id}
#[instrument(skip(state))]
async fn story(
    State(state): State<AppState>,
    Path((user_id, story_id)): Path<(UserId, StoryId)>,
) -> Result<Json<StoryBreakdown>, ApiError> {
    let breakdown =
        query_handlers::get_story_stats(user_id, story_id, &*state.content, &*state.saves).await?;
    Ok(Json(breakdown))
}

/// GET /users/{user_id}/stats/{story_id}/{chapter_id}
#[instrument(skip(state))]
async fn chapter(
    State(state): State<AppState>,
    Path((user_id, story_id, chapter_id)): Path<(UserId, StoryId, ChapterId)>,
) -> Result<Json<ChapterBreakdown>, ApiError> {
    let breakdown = query_handlers::get_chapter_stats(
        user_id,
        story_id,
        chapter_id,
        &*state.content,
        &*state.saves,
    )
    .await?;
    Ok(Json(breakdown))
}

/// Returns the router for progress statistics.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}/stats", get(overall))
        .route("/users/{user_id}/stats/{story_id}", get(story))
        .route("/users/{user_id}/stats/{story_id}/{chapter_id}", get(chapter))
}
