//! Command abstractions.

use uuid::Uuid;

use crate::save::UserId;

/// Trait implemented by every command a user's chat event turns into.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// The user whose save this command reads or mutates.
    fn user_id(&self) -> UserId;
}
