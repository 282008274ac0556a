//! Storybot — Narrative Orchestration.
//!
//! Responsible for moving a user's cursor through a story's content tree,
//! recording the endings and achievements they unlock, and projecting their
//! completion statistics.

pub mod application;
pub mod domain;
