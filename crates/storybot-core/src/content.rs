//! Story content tree.
//!
//! Content is authored offline and is read-only at runtime. A story is a
//! sequence of chapters; chapter 0 is the prologue and carries the story's
//! display name.

use serde::{Deserialize, Serialize};

/// Identifier of a story.
pub type StoryId = u32;

/// Identifier of a chapter within a story.
pub type ChapterId = u32;

/// Chapter id of every story's prologue.
pub const PROLOGUE_CHAPTER: ChapterId = 0;

/// Reserved storyline tag: a cursor on this storyline indexes the chapter's
/// endings instead of a storyline's elements.
pub const ENDING_STORYLINE: &str = "Ending";

/// One chapter of a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryContent {
    /// The story this chapter belongs to.
    pub story_id: StoryId,
    /// The chapter number (0 is the prologue).
    pub chapter_id: ChapterId,
    /// Display title of the chapter.
    pub name: String,
    /// Tag of the storyline entered when the chapter starts.
    pub beginning_storyline: String,
    /// Storylines of the chapter, tags unique.
    pub storylines: Vec<Storyline>,
    /// Achievements obtainable in the chapter.
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    /// Endings of the chapter; index 0 is the canonical ending.
    #[serde(default)]
    pub endings: Vec<Ending>,
}

impl StoryContent {
    /// Looks up a storyline by tag.
    #[must_use]
    pub fn storyline(&self, tag: &str) -> Option<&Storyline> {
        self.storylines.iter().find(|s| s.tag == tag)
    }

    /// Returns true for chapter 0.
    #[must_use]
    pub fn is_prologue(&self) -> bool {
        self.chapter_id == PROLOGUE_CHAPTER
    }

    /// Number of endings other than the canonical one.
    #[must_use]
    pub fn alternative_endings_count(&self) -> usize {
        self.endings.len().saturating_sub(1)
    }
}

/// A named branch of content within a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storyline {
    /// Tag, unique within the chapter.
    pub tag: String,
    /// Ordered elements of the storyline.
    pub elements: Vec<Element>,
}

/// One unit of presented content plus the options leading on from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Lines of text.
    pub content: Vec<String>,
    /// Options, presented 1-based.
    pub options: Vec<StoryOption>,
}

/// A choice offered by an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryOption {
    /// Text shown for the option.
    pub label: String,
    /// Storyline to move to; absent means stay in the current storyline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_storyline: Option<String>,
    /// Element index in the target storyline, or ending index when the target
    /// is the ending sentinel.
    pub target_position: usize,
    /// Achievement granted by taking this option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grants_achievement: Option<usize>,
}

impl StoryOption {
    /// Returns true when the option leads to one of the chapter's endings.
    #[must_use]
    pub fn targets_ending(&self) -> bool {
        self.target_storyline.as_deref() == Some(ENDING_STORYLINE)
    }
}

/// An achievement obtainable within a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    /// Display name.
    pub name: String,
    /// What the player did to earn it.
    pub description: String,
}

/// A terminal ending of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ending {
    /// Display name.
    pub name: String,
    /// Lines of text.
    pub content: Vec<String>,
}
