//! Shared test doubles and story fixtures for the Storybot narrative engine.

mod clock;
mod content;
pub mod fixtures;
mod save_store;

pub use clock::FixedClock;
pub use content::FailingContentRepository;
pub use save_store::{FailingSaveStore, InMemorySaveStore};
