//! Storybot — PostgreSQL persistence.
//!
//! Saves are stored as one JSONB document per user with a version column for
//! compare-and-swap writes. Story chapters are stored as one JSONB document
//! per `(story_id, chapter_id)`.

pub mod pg_content_repository;
pub mod pg_save_store;
pub mod schema;
