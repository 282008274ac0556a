//! Content repository doubles.

use async_trait::async_trait;
use storybot_core::content::{ChapterId, StoryContent, StoryId};
use storybot_core::error::DomainError;
use storybot_core::repository::ContentRepository;

/// A content repository whose every lookup fails with an infrastructure
/// error. Useful for testing error-handling paths.
#[derive(Debug)]
pub struct FailingContentRepository;

#[async_trait]
impl ContentRepository for FailingContentRepository {
    async fn get_chapter(
        &self,
        _story_id: StoryId,
        _chapter_id: ChapterId,
    ) -> Result<StoryContent, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn list_chapters(&self, _story_id: StoryId) -> Result<Vec<StoryContent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn list_prologues(&self) -> Result<Vec<StoryContent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
