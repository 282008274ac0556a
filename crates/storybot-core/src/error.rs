//! Domain error types.

use thiserror::Error;

use crate::content::{ChapterId, StoryId};
use crate::save::UserId;

/// Broad classification of a `DomainError`, used by transports to decide how
/// to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The user picked something that is not on offer. Re-prompt with the
    /// same cursor.
    UserInput,
    /// The cursor references content that does not exist. Reset the user to
    /// story selection.
    ContentIntegrity,
    /// The save or content store failed, or the write lost a race.
    Persistence,
}

impl ErrorKind {
    /// Machine-readable name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserInput => "user_input",
            Self::ContentIntegrity => "content_integrity",
            Self::Persistence => "persistence",
        }
    }
}

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The chosen option number is not one of the element's options.
    #[error("option {index} is out of range: {available} option(s) available")]
    OptionOutOfRange {
        /// The 1-based option number the user chose.
        index: usize,
        /// Number of options the element offers.
        available: usize,
    },

    /// The input is not accepted at the cursor's current stage.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The cursor names a storyline tag the chapter does not have.
    #[error("unknown storyline: {0}")]
    UnknownStoryline(String),

    /// No content exists for the story or chapter.
    #[error("content not found: story {story_id}, chapter {chapter_id:?}")]
    ContentNotFound {
        /// The requested story.
        story_id: StoryId,
        /// The requested chapter, if one was requested.
        chapter_id: Option<ChapterId>,
    },

    /// The cursor position is past the end of the sequence it indexes.
    #[error("position {position} is out of range in storyline {storyline}")]
    PositionOutOfRange {
        /// The storyline tag (or the ending sentinel).
        storyline: String,
        /// The offending position.
        position: usize,
    },

    /// An achievement index past the chapter's achievements list.
    #[error("unknown achievement: {0}")]
    UnknownAchievement(usize),

    /// The event is not newer than the last event processed for the user.
    #[error("stale event: not newer than the last processed event")]
    StaleEvent,

    /// Optimistic concurrency conflict on a save write.
    #[error("concurrency conflict on save of user {user_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The user whose save had the conflict.
        user_id: UserId,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// Authored content failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Returns the recovery classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OptionOutOfRange { .. } | Self::InvalidInput(_) => ErrorKind::UserInput,
            Self::UnknownStoryline(_)
            | Self::ContentNotFound { .. }
            | Self::PositionOutOfRange { .. }
            | Self::UnknownAchievement(_)
            | Self::Validation(_) => ErrorKind::ContentIntegrity,
            Self::StaleEvent | Self::ConcurrencyConflict { .. } | Self::Infrastructure(_) => {
                ErrorKind::Persistence
            }
        }
    }
}
