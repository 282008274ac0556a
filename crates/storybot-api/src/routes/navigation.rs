//! Navigation routes: move a user's cursor through the stories.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use storybot_core::save::UserId;
use storybot_narrative::application::command_handlers::{self, Reply};
use storybot_narrative::application::query_handlers;
use storybot_narrative::domain::commands;
use storybot_narrative::domain::resolver::NavigationInput;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /users/{user_id}/advance.
#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    /// The navigation input.
    pub input: NavigationInput,
    /// When the event was sent, for discarding out-of-order deliveries.
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

/// Request body for POST /users/{user_id}/choose.
#[derive(Debug, Deserialize)]
pub struct ChooseRequest {
    /// The number the user typed.
    pub number: i64,
    /// When the event was sent, for discarding out-of-order deliveries.
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

/// POST /users/{user_id}/advance
#[instrument(skip(state, request))]
async fn advance(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(request): Json<AdvanceRequest>,
) -> Result<Json<Reply>, ApiError> {
    let command = commands::Advance {
        correlation_id: Uuid::new_v4(),
        user_id,
        input: request.input,
        sent_at: request.sent_at,
    };

    info!(correlation_id = %command.correlation_id, "handling advance command");

    let reply = command_handlers::handle_advance(
        &command,
        state.clock.as_ref(),
        &*state.content,
        &*state.saves,
    )
    .await?;

    Ok(Json(reply))
}

/// POST /users/{user_id}/choose
#[instrument(skip(state, request))]
async fn choose(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(request): Json<ChooseRequest>,
) -> Result<Json<Reply>, ApiError> {
    let command = commands::ChooseNumber {
        correlation_id: Uuid::new_v4(),
        user_id,
        number: request.number,
        sent_at: request.sent_at,
    };

    info!(correlation_id = %command.correlation_id, number = command.number, "handling choose command");

    let reply = command_handlers::handle_choose_number(
        &command,
        state.clock.as_ref(),
        &*state.content,
        &*state.saves,
    )
    .await?;

    Ok(Json(reply))
}

/// POST /users/{user_id}/reset
#[instrument(skip(state))]
async fn reset(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Reply>, ApiError> {
    let command = commands::ResetProgress {
        correlation_id: Uuid::new_v4(),
        user_id,
        sent_at: None,
    };

    info!(correlation_id = %command.correlation_id, "handling reset command");

    let reply = command_handlers::handle_reset(
        &command,
        state.clock.as_ref(),
        &*state.content,
        &*state.saves,
    )
    .await?;

    Ok(Json(reply))
}

/// GET /users/{user_id}/current
#[instrument(skip(state))]
async fn current(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Reply>, ApiError> {
    let reply =
        query_handlers::get_current_prompt(user_id, &*state.content, &*state.saves).await?;
    Ok(Json(reply))
}

/// Returns the router for cursor navigation.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}/advance", post(advance))
        .route("/users/{user_id}/choose", post(choose))
        .route("/users/{user_id}/reset", post(reset))
        .route("/users/{user_id}/current", get(current))
}
