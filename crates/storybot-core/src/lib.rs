//! Storybot Core — shared content and save models.
//!
//! This crate defines the story content tree, the per-user save document,
//! the collaborator traits the engine consumes and the error taxonomy. It
//! contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod content;
pub mod error;
pub mod repository;
pub mod save;
