//! Story and chapter menus offered between chapters.

use serde::Serialize;
use storybot_core::content::{PROLOGUE_CHAPTER, StoryContent, StoryId};

/// One line of a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    /// Story or chapter id.
    pub id: u32,
    /// The number the user types to pick this entry.
    pub number: i64,
    /// Display name.
    pub name: String,
}

/// A menu to present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Menu {
    /// Every story, numbered from 1.
    Stories {
        /// Entries in story order.
        entries: Vec<MenuEntry>,
    },
    /// Chapters of one story, numbered by chapter id.
    Chapters {
        /// The story.
        story_id: StoryId,
        /// Display name of the story.
        story_name: String,
        /// Entries in chapter order.
        entries: Vec<MenuEntry>,
    },
}

impl Menu {
    /// The story menu, built from every story's prologue.
    #[must_use]
    pub fn stories(prologues: &[StoryContent]) -> Self {
        let entries = prologues
            .iter()
            .map(|p| MenuEntry {
                id: p.story_id,
                number: i64::from(p.story_id) + 1,
                name: p.name.clone(),
            })
            .collect();
        Self::Stories { entries }
    }

    /// The chapter menu of a story. `chapters` holds the story's chapters
    /// ordered by id.
    #[must_use]
    pub fn chapters(story_id: StoryId, chapters: &[StoryContent]) -> Self {
        let story_name = chapters
            .iter()
            .find(|c| c.chapter_id == PROLOGUE_CHAPTER)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        let entries = chapters
            .iter()
            .map(|c| MenuEntry {
                id: c.chapter_id,
                number: i64::from(c.chapter_id),
                name: c.name.clone(),
            })
            .collect();
        Self::Chapters {
            story_id,
            story_name,
            entries,
        }
    }

    /// Ids of the entries in menu order.
    #[must_use]
    pub fn ids(&self) -> Vec<u32> {
        match self {
            Self::Stories { entries } | Self::Chapters { entries, .. } => {
                entries.iter().map(|e| e.id).collect()
            }
        }
    }
}
