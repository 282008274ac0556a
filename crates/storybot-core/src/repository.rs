//! Collaborator abstractions: story content lookup and save persistence.

use async_trait::async_trait;

use crate::content::{ChapterId, StoryContent, StoryId};
use crate::error::DomainError;
use crate::save::{SaveDocument, UserId};

/// Read-only lookup of authored story content.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Load one chapter.
    ///
    /// Returns `DomainError::ContentNotFound` when the chapter does not exist.
    async fn get_chapter(
        &self,
        story_id: StoryId,
        chapter_id: ChapterId,
    ) -> Result<StoryContent, DomainError>;

    /// Load every chapter of a story, ordered by chapter id. Empty when the
    /// story does not exist.
    async fn list_chapters(&self, story_id: StoryId) -> Result<Vec<StoryContent>, DomainError>;

    /// Load chapter 0 of every story, ordered by story id.
    async fn list_prologues(&self) -> Result<Vec<StoryContent>, DomainError>;
}

/// A save document together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSave {
    /// The owner of the save.
    pub user_id: UserId,
    /// Number of writes so far; 0 when the user has no save yet.
    pub version: i64,
    /// The document itself.
    pub document: SaveDocument,
}

impl StoredSave {
    /// The value returned for a user seen for the first time.
    #[must_use]
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            version: 0,
            document: SaveDocument::default(),
        }
    }
}

/// Whole-document persistence of user saves.
#[async_trait]
pub trait SaveStore: Send + Sync {
    /// Load a user's save, or an empty version-0 document when absent.
    async fn get_save(&self, user_id: UserId) -> Result<StoredSave, DomainError>;

    /// Replace a user's save with optimistic concurrency.
    /// `expected_version` is the version the document was read at.
    async fn put_save(
        &self,
        user_id: UserId,
        expected_version: i64,
        document: &SaveDocument,
    ) -> Result<(), DomainError>;
}
