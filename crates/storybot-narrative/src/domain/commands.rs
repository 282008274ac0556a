//! Commands accepted by the session controller.

use chrono::{DateTime, Utc};
use storybot_core::command::Command;
use storybot_core::save::UserId;
use uuid::Uuid;

use crate::domain::resolver::NavigationInput;

/// Command to apply a navigation input to a user's cursor.
#[derive(Debug, Clone)]
pub struct Advance {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user navigating.
    pub user_id: UserId,
    /// What the user chose.
    pub input: NavigationInput,
    /// When the chat platform says the event was sent.
    pub sent_at: Option<DateTime<Utc>>,
}

/// Command to interpret a bare number according to the cursor's stage.
#[derive(Debug, Clone)]
pub struct ChooseNumber {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user navigating.
    pub user_id: UserId,
    /// The number typed.
    pub number: i64,
    /// When the chat platform says the event was sent.
    pub sent_at: Option<DateTime<Utc>>,
}

/// Command to send a user back to story selection. Stats are kept.
#[derive(Debug, Clone)]
pub struct ResetProgress {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user.
    pub user_id: UserId,
    /// When the chat platform says the event was sent.
    pub sent_at: Option<DateTime<Utc>>,
}

impl Command for Advance {
    fn command_type(&self) -> &'static str {
        "narrative.advance"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl Command for ChooseNumber {
    fn command_type(&self) -> &'static str {
        "narrative.choose_number"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl Command for ResetProgress {
    fn command_type(&self) -> &'static str {
        "narrative.reset_progress"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> UserId {
        self.user_id
    }
}
