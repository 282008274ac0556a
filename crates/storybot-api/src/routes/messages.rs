//! Chat message route: raw chat text in, what the bot should say out.
//!
//! Unlike the navigation routes, recoverable errors are answered rather than
//! returned: a choice that is not on offer asks the user to pick again, and a
//! cursor that no longer fits the content sends the user back to story
//! selection.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use storybot_core::error::{DomainError, ErrorKind};
use storybot_core::save::UserId;
use storybot_narrative::application::command_handlers::{self, Reply};
use storybot_narrative::application::query_handlers;
use storybot_narrative::domain::commands;
use storybot_narrative::domain::resolver::NavigationInput;
use storybot_narrative::domain::stats::{ChapterBreakdown, StoryBreakdown, StoryProgress};

use crate::chat::{self, ChatIntent, HelpEntry, StatsScope};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /users/{user_id}/messages.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Message text.
    #[serde(default)]
    pub text: String,
    /// Button payload attached to the message, if any.
    #[serde(default)]
    pub payload: Option<String>,
    /// When the message was sent.
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

/// What the bot answers.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageResponse {
    /// A presentation and/or menu.
    Reply {
        /// The reply.
        reply: Reply,
        /// Set when the user was sent back to story selection.
        #[serde(skip_serializing_if = "Option::is_none")]
        notice: Option<String>,
    },
    /// The choice is not on offer; nothing changed.
    Retry {
        /// Why the choice was rejected.
        message: String,
    },
    /// Progress across every story.
    OverallStats {
        /// One entry per story.
        stories: Vec<StoryProgress>,
    },
    /// Progress through one story.
    StoryStats {
        /// The breakdown.
        story: StoryBreakdown,
    },
    /// Endings and achievements of one chapter.
    ChapterStats {
        /// The breakdown.
        chapter: ChapterBreakdown,
    },
    /// The command list.
    Help {
        /// Available commands.
        commands: Vec<HelpEntry>,
    },
    /// The message was not for the bot, or arrived out of order.
    Ignored,
}

/// POST /users/{user_id}/messages
#[instrument(skip(state, request))]
async fn receive_message(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let correlation_id = Uuid::new_v4();
    let intent = chat::interpret(&request.text, request.payload.as_deref());

    info!(%correlation_id, ?intent, "handling chat message");

    let outcome = respond(&state, correlation_id, user_id, intent, request.sent_at).await;
    let response = match outcome {
        Ok(response) => response,
        Err(DomainError::StaleEvent) => {
            info!(%correlation_id, "ignoring out-of-order message");
            MessageResponse::Ignored
        }
        Err(e) if e.kind() == ErrorKind::UserInput => MessageResponse::Retry {
            message: e.to_string(),
        },
        Err(e) if e.kind() == ErrorKind::ContentIntegrity => {
            warn!(%correlation_id, error = %e, "cursor does not fit content, resetting user");
            let command = commands::ResetProgress {
                correlation_id,
                user_id,
                sent_at: request.sent_at,
            };
            let reply = command_handlers::handle_reset(
                &command,
                state.clock.as_ref(),
                &*state.content,
                &*state.saves,
            )
            .await?;
            MessageResponse::Reply {
                reply,
                notice: Some(format!("Your place in the story was lost ({e}). Please choose a story.")),
            }
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(response))
}

async fn respond(
    state: &AppState,
    correlation_id: Uuid,
    user_id: UserId,
    intent: ChatIntent,
    sent_at: Option<DateTime<Utc>>,
) -> Result<MessageResponse, DomainError> {
    let clock = state.clock.as_ref();
    let content = &*state.content;
    let saves = &*state.saves;

    let reply = match intent {
        ChatIntent::Navigate(cursor) => {
            let command = commands::Advance {
                correlation_id,
                user_id,
                input: NavigationInput::DirectCursor { cursor },
                sent_at,
            };
            command_handlers::handle_advance(&command, clock, content, saves).await?
        }
        ChatIntent::Choose(number) => {
            let command = commands::ChooseNumber {
                correlation_id,
                user_id,
                number,
                sent_at,
            };
            command_handlers::handle_choose_number(&command, clock, content, saves).await?
        }
        ChatIntent::Reset | ChatIntent::Start => {
            let command = commands::ResetProgress {
                correlation_id,
                user_id,
                sent_at,
            };
            command_handlers::handle_reset(&command, clock, content, saves).await?
        }
        ChatIntent::Repeat => query_handlers::get_current_prompt(user_id, content, saves).await?,
        ChatIntent::Stats(StatsScope::Overall) => {
            let stories = query_handlers::get_overall_stats(user_id, content, saves).await?;
            return Ok(MessageResponse::OverallStats { stories });
        }
        ChatIntent::Stats(StatsScope::Story(story_id)) => {
            let story = query_handlers::get_story_stats(user_id, story_id, content, saves)
                .await
                .map_err(mistyped_stats_query)?;
            return Ok(MessageResponse::StoryStats { story });
        }
        ChatIntent::Stats(StatsScope::Chapter(story_id, chapter_id)) => {
            let chapter =
                query_handlers::get_chapter_stats(user_id, story_id, chapter_id, content, saves)
                    .await
                    .map_err(mistyped_stats_query)?;
            return Ok(MessageResponse::ChapterStats { chapter });
        }
        ChatIntent::Help => {
            return Ok(MessageResponse::Help {
                commands: chat::help(),
            });
        }
        ChatIntent::Ignore => return Ok(MessageResponse::Ignored),
    };

    Ok(MessageResponse::Reply {
        reply,
        notice: None,
    })
}

/// Stats asked for a story or chapter that does not exist are a typo, not a
/// broken cursor. Numbers are shown 1-based, as the user typed them.
fn mistyped_stats_query(error: DomainError) -> DomainError {
    match error {
        DomainError::ContentNotFound {
            story_id,
            chapter_id: Some(chapter_id),
        } => DomainError::InvalidInput(format!(
            "story {} has no chapter {}",
            u64::from(story_id) + 1,
            u64::from(chapter_id) + 1
        )),
        DomainError::ContentNotFound { story_id, .. } => {
            DomainError::InvalidInput(format!("there is no story {}", u64::from(story_id) + 1))
        }
        other => other,
    }
}

/// Returns the router for chat messages.
pub fn router() -> Router<AppState> {
    Router::new().route("/users/{user_id}/messages", post(receive_message))
}
