//! Query handlers for the session controller. None of them write.

use std::collections::BTreeMap;

use storybot_core::content::{ChapterId, StoryId};
use storybot_core::error::DomainError;
use storybot_core::repository::{ContentRepository, SaveStore};
use storybot_core::save::{CursorStage, UserId};

use crate::application::command_handlers::{Reply, chapter_menu};
use crate::domain::menu::Menu;
use crate::domain::resolver;
use crate::domain::stats::{self, ChapterBreakdown, StoryBreakdown, StoryProgress};

/// Returns the story menu.
///
/// # Errors
///
/// Returns `DomainError` if content cannot be read.
pub async fn get_story_menu(content: &dyn ContentRepository) -> Result<Menu, DomainError> {
    Ok(Menu::stories(&content.list_prologues().await?))
}

/// Re-presents whatever the user's cursor points at: the story menu, the
/// chapter menu, or the current element. The pending achievement is not
/// announced again.
///
/// # Errors
///
/// Returns `DomainError` if the save or content cannot be read, or if the
/// stored cursor no longer fits the content.
pub async fn get_current_prompt(
    user_id: UserId,
    content: &dyn ContentRepository,
    saves: &dyn SaveStore,
) -> Result<Reply, DomainError> {
    let mut cursor = saves.get_save(user_id).await?.document.current;
    cursor.pending_achievement = None;

    let (presentation, menu) = match cursor.stage() {
        CursorStage::StorySelection => (None, Some(get_story_menu(content).await?)),
        CursorStage::ChapterSelection { story, .. } => {
            (None, Some(chapter_menu(content, story).await?))
        }
        CursorStage::InChapter { story, chapter, .. } => {
            let chapter = content.get_chapter(story, chapter).await?;
            (Some(resolver::present(&chapter, &cursor)?), None)
        }
    };

    Ok(Reply {
        cursor,
        presentation,
        menu,
    })
}

/// Returns the user's progress through every story.
///
/// # Errors
///
/// Returns `DomainError` if the save or content cannot be read.
pub async fn get_overall_stats(
    user_id: UserId,
    content: &dyn ContentRepository,
    saves: &dyn SaveStore,
) -> Result<Vec<StoryProgress>, DomainError> {
    let save = saves.get_save(user_id).await?.document;
    let prologues = content.list_prologues().await?;

    let mut chapter_counts = BTreeMap::new();
    for prologue in &prologues {
        let chapters = content.list_chapters(prologue.story_id).await?;
        chapter_counts.insert(prologue.story_id, chapters.len());
    }

    Ok(stats::overall_stats(&save, &prologues, &chapter_counts))
}

/// Returns the user's progress through the chapters of one story.
///
/// # Errors
///
/// Returns `DomainError::ContentNotFound` if the story has no chapters, or
/// another `DomainError` if the save or content cannot be read.
pub async fn get_story_stats(
    user_id: UserId,
    story_id: StoryId,
    content: &dyn ContentRepository,
    saves: &dyn SaveStore,
) -> Result<StoryBreakdown, DomainError> {
    let chapters = content.list_chapters(story_id).await?;
    if chapters.is_empty() {
        return Err(DomainError::ContentNotFound {
            story_id,
            chapter_id: None,
        });
    }
    let save = saves.get_save(user_id).await?.document;

    Ok(stats::story_stats(&save, story_id, &chapters))
}

/// Returns the status of every ending and achievement of one chapter.
///
/// # Errors
///
/// Returns `DomainError::ContentNotFound` if the chapter does not exist, or
/// another `DomainError` if the save or content cannot be read.
pub async fn get_chapter_stats(
    user_id: UserId,
    story_id: StoryId,
    chapter_id: ChapterId,
    content: &dyn ContentRepository,
    saves: &dyn SaveStore,
) -> Result<ChapterBreakdown, DomainError> {
    let chapter = content.get_chapter(story_id, chapter_id).await?;
    let save = saves.get_save(user_id).await?.document;

    Ok(stats::chapter_stats(&save, story_id, chapter_id, &chapter))
}
