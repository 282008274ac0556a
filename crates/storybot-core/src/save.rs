//! Per-user save document: the narrative cursor plus completion records.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{ChapterId, ENDING_STORYLINE, StoryId};

/// Identifier of a chat user.
pub type UserId = i64;

/// Pointer to a user's position in a story.
///
/// Fields fill in a strict progression: no story means story selection, a
/// story without a positioned chapter means chapter selection, and
/// `chapter` + `storyline` + `position` together place the user inside a
/// chapter. Every field serializes as present-or-absent because 0 is a legal
/// value for each of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// The chosen story.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<StoryId>,
    /// The chosen (or last played) chapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<ChapterId>,
    /// Current storyline tag, or the ending sentinel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storyline: Option<String>,
    /// Index into the storyline's elements, or into the chapter's endings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    /// Achievement granted by the transition that produced this cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_achievement: Option<usize>,
}

/// Where a cursor stands in the story/chapter/position progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStage<'a> {
    /// No story chosen yet.
    StorySelection,
    /// Story chosen, waiting for a chapter. `last_chapter` is the chapter
    /// just finished, if any.
    ChapterSelection {
        /// The chosen story.
        story: StoryId,
        /// The chapter the user last played.
        last_chapter: Option<ChapterId>,
    },
    /// Positioned inside a chapter.
    InChapter {
        /// The chosen story.
        story: StoryId,
        /// The chosen chapter.
        chapter: ChapterId,
        /// Current storyline tag.
        storyline: &'a str,
        /// Current position.
        position: usize,
    },
}

impl Cursor {
    /// Cursor for a story whose chapter has not been chosen.
    #[must_use]
    pub fn story(story: StoryId) -> Self {
        Self {
            story: Some(story),
            ..Self::default()
        }
    }

    /// Cursor positioned on an element or ending of a chapter.
    #[must_use]
    pub fn positioned(
        story: StoryId,
        chapter: ChapterId,
        storyline: impl Into<String>,
        position: usize,
    ) -> Self {
        Self {
            story: Some(story),
            chapter: Some(chapter),
            storyline: Some(storyline.into()),
            position: Some(position),
            pending_achievement: None,
        }
    }

    /// Classifies the cursor.
    #[must_use]
    pub fn stage(&self) -> CursorStage<'_> {
        match (self.story, self.chapter, self.storyline.as_deref(), self.position) {
            (None, ..) => CursorStage::StorySelection,
            (Some(story), Some(chapter), Some(storyline), Some(position)) => {
                CursorStage::InChapter {
                    story,
                    chapter,
                    storyline,
                    position,
                }
            }
            (Some(story), last_chapter, ..) => CursorStage::ChapterSelection {
                story,
                last_chapter,
            },
        }
    }

    /// Returns true when the cursor points at one of a chapter's endings.
    #[must_use]
    pub fn is_at_ending(&self) -> bool {
        self.storyline.as_deref() == Some(ENDING_STORYLINE)
    }

    /// The same cursor with storyline and position cleared, so the next
    /// numeric input selects a chapter again.
    #[must_use]
    pub fn chapter_finished(&self) -> Self {
        Self {
            story: self.story,
            chapter: self.chapter,
            storyline: None,
            position: None,
            pending_achievement: None,
        }
    }
}

/// Completion record of one chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterStats {
    /// Indices of endings reached.
    #[serde(default)]
    pub obtained_endings: BTreeSet<usize>,
    /// Indices of achievements earned.
    #[serde(default)]
    pub obtained_achievements: BTreeSet<usize>,
}

/// The persisted per-user document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveDocument {
    /// The user's current cursor.
    #[serde(default)]
    pub current: Cursor,
    /// Completion records by story, then by chapter. A missing entry means
    /// the story or chapter was never visited.
    #[serde(default)]
    pub stories_stats: BTreeMap<StoryId, BTreeMap<ChapterId, ChapterStats>>,
    /// Timestamp of the last navigation event applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event_at: Option<DateTime<Utc>>,
    /// When the document was last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SaveDocument {
    /// Completion records of a story, if it was ever visited.
    #[must_use]
    pub fn story_stats(&self, story: StoryId) -> Option<&BTreeMap<ChapterId, ChapterStats>> {
        self.stories_stats.get(&story)
    }

    /// Completion record of a chapter, if it was ever visited.
    #[must_use]
    pub fn chapter_stats(&self, story: StoryId, chapter: ChapterId) -> Option<&ChapterStats> {
        self.story_stats(story)?.get(&chapter)
    }

    /// Completion record of a chapter, created empty on first touch.
    pub fn chapter_stats_mut(&mut self, story: StoryId, chapter: ChapterId) -> &mut ChapterStats {
        self.stories_stats
            .entry(story)
            .or_default()
            .entry(chapter)
            .or_default()
    }
}
