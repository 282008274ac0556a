//! In-memory `ContentRepository` serving a loaded catalog.

use std::collections::BTreeMap;

use async_trait::async_trait;
use storybot_core::content::{ChapterId, PROLOGUE_CHAPTER, StoryContent, StoryId};
use storybot_core::error::DomainError;
use storybot_core::repository::ContentRepository;

/// Content repository backed by a map keyed on `(story_id, chapter_id)`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContentRepository {
    chapters: BTreeMap<(StoryId, ChapterId), StoryContent>,
}

impl InMemoryContentRepository {
    /// Creates a repository from chapters. A later chapter with the same key
    /// replaces an earlier one.
    #[must_use]
    pub fn new(chapters: impl IntoIterator<Item = StoryContent>) -> Self {
        Self {
            chapters: chapters
                .into_iter()
                .map(|c| ((c.story_id, c.chapter_id), c))
                .collect(),
        }
    }

    /// Number of chapters held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Returns true when no chapters are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn get_chapter(
        &self,
        story_id: StoryId,
        chapter_id: ChapterId,
    ) -> Result<StoryContent, DomainError> {
        self.chapters
            .get(&(story_id, chapter_id))
            .cloned()
            .ok_or(DomainError::ContentNotFound {
                story_id,
                chapter_id: Some(chapter_id),
            })
    }

    async fn list_chapters(&self, story_id: StoryId) -> Result<Vec<StoryContent>, DomainError> {
        Ok(self
            .chapters
            .range((story_id, ChapterId::MIN)..=(story_id, ChapterId::MAX))
            .map(|(_, c)| c.clone())
            .collect())
    }

    async fn list_prologues(&self) -> Result<Vec<StoryContent>, DomainError> {
        Ok(self
            .chapters
            .values()
            .filter(|c| c.chapter_id == PROLOGUE_CHAPTER)
            .cloned()
            .collect())
    }
}
