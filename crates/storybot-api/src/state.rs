//! Shared application state.

use std::sync::Arc;

use storybot_core::clock::Clock;
use storybot_core::repository::{ContentRepository, SaveStore};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock used to stamp save documents.
    pub clock: Arc<dyn Clock>,
    /// Story content lookup.
    pub content: Arc<dyn ContentRepository>,
    /// Per-user save persistence.
    pub saves: Arc<dyn SaveStore>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        content: Arc<dyn ContentRepository>,
        saves: Arc<dyn SaveStore>,
    ) -> Self {
        Self {
            clock,
            content,
            saves,
        }
    }
}
