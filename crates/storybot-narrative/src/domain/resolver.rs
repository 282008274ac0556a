//! Cursor resolution: given a chapter's content, the user's cursor and a
//! navigation input, compute the next cursor and what to present.
//!
//! Every position is checked against the content when it is read. Cursors can
//! arrive from outside (button payloads echoed back by the chat client), so a
//! stored or echoed cursor is never trusted to still be valid.

use serde::{Deserialize, Serialize};
use storybot_core::content::{
    Achievement, ChapterId, ENDING_STORYLINE, Element, PROLOGUE_CHAPTER, StoryContent, StoryId,
};
use storybot_core::error::DomainError;
use storybot_core::save::{Cursor, CursorStage};

/// A navigation input from the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationInput {
    /// Choose a story. Only accepted while no story is chosen.
    SelectStory {
        /// The story id.
        story: StoryId,
    },
    /// Choose a chapter of the chosen story. Only accepted while no chapter
    /// is in progress.
    SelectChapter {
        /// The chapter id; 0 is the prologue.
        chapter: ChapterId,
    },
    /// Choose an option of the current element. Only accepted inside a
    /// chapter.
    SelectOption {
        /// The 1-based option number.
        option: usize,
    },
    /// Jump to a cursor computed earlier, e.g. one carried by a button.
    /// Accepted at any stage once it checks out against the content.
    DirectCursor {
        /// The cursor to jump to.
        cursor: Cursor,
    },
}

impl NavigationInput {
    /// Interprets a number typed by the user according to the cursor's stage.
    ///
    /// Stories are listed 1-based, chapters by id (0 is the prologue), and
    /// options 1-based.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` when the number cannot name a story
    /// or chapter.
    pub fn from_number(cursor: &Cursor, number: i64) -> Result<Self, DomainError> {
        let not_listed = || DomainError::InvalidInput(format!("{number} is not on the list"));
        match cursor.stage() {
            CursorStage::StorySelection => {
                let story = number
                    .checked_sub(1)
                    .and_then(|n| StoryId::try_from(n).ok())
                    .ok_or_else(not_listed)?;
                Ok(Self::SelectStory { story })
            }
            CursorStage::ChapterSelection { .. } => {
                let chapter = ChapterId::try_from(number).map_err(|_| not_listed())?;
                Ok(Self::SelectChapter { chapter })
            }
            CursorStage::InChapter { .. } => Ok(Self::SelectOption {
                option: usize::try_from(number).unwrap_or(0),
            }),
        }
    }
}

/// The chapter whose content `resolve` needs for an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentKey {
    /// The story.
    pub story_id: StoryId,
    /// The chapter.
    pub chapter_id: ChapterId,
}

/// An option as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    /// The 1-based number the user picks.
    pub number: usize,
    /// Text of the option.
    pub label: String,
    /// The cursor taking this option leads to; a client may echo it back as
    /// a `DirectCursor` input.
    pub next: Cursor,
}

/// An achievement granted by the transition being presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementView {
    /// Index in the chapter's achievements.
    pub index: usize,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
}

impl AchievementView {
    fn new(index: usize, achievement: &Achievement) -> Self {
        Self {
            index,
            name: achievement.name.clone(),
            description: achievement.description.clone(),
        }
    }
}

/// A content element to present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementView {
    /// The story.
    pub story_id: StoryId,
    /// The chapter.
    pub chapter_id: ChapterId,
    /// Lines of text.
    pub lines: Vec<String>,
    /// Options leading on.
    pub options: Vec<OptionView>,
    /// Achievement earned on the way here.
    pub achievement: Option<AchievementView>,
}

/// A chapter ending to present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndingView {
    /// The story.
    pub story_id: StoryId,
    /// The chapter.
    pub chapter_id: ChapterId,
    /// Index in the chapter's endings.
    pub position: usize,
    /// Name of the ending.
    pub ending_name: String,
    /// Lines of text.
    pub lines: Vec<String>,
    /// True for the canonical ending (index 0).
    pub is_canonical: bool,
    /// True when the finished chapter is the prologue.
    pub is_prologue: bool,
    /// Alternative endings of the chapter other than this one.
    pub remaining_alternatives_count: usize,
    /// Achievement earned on the way here.
    pub achievement: Option<AchievementView>,
}

/// The story was chosen; its chapters should be offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterChoiceView {
    /// The story.
    pub story_id: StoryId,
    /// Display name of the story.
    pub story_name: String,
}

/// What to show the user after a navigation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Presentation {
    /// Offer the chapters of a story.
    ChapterChoice(ChapterChoiceView),
    /// Show a content element and its options.
    Content(ElementView),
    /// Show a terminal ending; the chapter is finished.
    Ending(EndingView),
}

/// The outcome of a successful navigation: the next cursor and what to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The resolved cursor.
    pub cursor: Cursor,
    /// What to present.
    pub presentation: Presentation,
}

impl Resolution {
    /// The ending reached by this transition, if any.
    #[must_use]
    pub fn obtained_ending(&self) -> Option<usize> {
        match &self.presentation {
            Presentation::Ending(view) => Some(view.position),
            _ => None,
        }
    }

    /// The achievement granted by this transition, if any.
    #[must_use]
    pub fn granted_achievement(&self) -> Option<usize> {
        match &self.presentation {
            Presentation::Content(view) => view.achievement.as_ref().map(|a| a.index),
            Presentation::Ending(view) => view.achievement.as_ref().map(|a| a.index),
            Presentation::ChapterChoice(_) => None,
        }
    }

    /// Returns true when the transition finished the chapter.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.presentation, Presentation::Ending(_))
    }
}

/// Determines which chapter's content `resolve` needs for `input`, checking
/// that the input is accepted at the cursor's stage.
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` when the input is not accepted at the
/// current stage or a direct cursor names no story.
pub fn content_key(cursor: &Cursor, input: &NavigationInput) -> Result<ContentKey, DomainError> {
    match (input, cursor.stage()) {
        (NavigationInput::SelectStory { story }, CursorStage::StorySelection) => Ok(ContentKey {
            story_id: *story,
            chapter_id: PROLOGUE_CHAPTER,
        }),
        (NavigationInput::SelectStory { .. }, _) => Err(DomainError::InvalidInput(
            "a story is already chosen".to_owned(),
        )),
        (NavigationInput::SelectChapter { chapter }, CursorStage::ChapterSelection { story, .. }) => {
            Ok(ContentKey {
                story_id: story,
                chapter_id: *chapter,
            })
        }
        (NavigationInput::SelectChapter { .. }, CursorStage::StorySelection) => Err(
            DomainError::InvalidInput("no story is chosen".to_owned()),
        ),
        (NavigationInput::SelectChapter { .. }, CursorStage::InChapter { .. }) => Err(
            DomainError::InvalidInput("a chapter is in progress".to_owned()),
        ),
        (
            NavigationInput::SelectOption { .. },
            CursorStage::InChapter { story, chapter, .. },
        ) => Ok(ContentKey {
            story_id: story,
            chapter_id: chapter,
        }),
        (NavigationInput::SelectOption { .. }, _) => Err(DomainError::InvalidInput(
            "no chapter is in progress".to_owned(),
        )),
        (NavigationInput::DirectCursor { cursor: target }, _) => match target.stage() {
            CursorStage::StorySelection => Err(DomainError::InvalidInput(
                "cursor names no story".to_owned(),
            )),
            CursorStage::ChapterSelection { story, .. } => Ok(ContentKey {
                story_id: story,
                chapter_id: PROLOGUE_CHAPTER,
            }),
            CursorStage::InChapter { story, chapter, .. } => Ok(ContentKey {
                story_id: story,
                chapter_id: chapter,
            }),
        },
    }
}

/// Resolves a navigation input against the content named by
/// [`content_key`].
///
/// The input cursor is never modified; on error nothing changes.
///
/// # Errors
///
/// - `DomainError::InvalidInput` if the input is not accepted at the cursor's
///   stage.
/// - `DomainError::OptionOutOfRange` if the chosen option does not exist.
/// - `DomainError::ContentNotFound` if `content` is not the chapter the input
///   needs.
/// - `DomainError::UnknownStoryline`, `DomainError::PositionOutOfRange` or
///   `DomainError::UnknownAchievement` if the resulting cursor does not fit
///   the content.
pub fn resolve(
    content: &StoryContent,
    cursor: &Cursor,
    input: &NavigationInput,
) -> Result<Resolution, DomainError> {
    let key = content_key(cursor, input)?;
    if (content.story_id, content.chapter_id) != (key.story_id, key.chapter_id) {
        return Err(DomainError::ContentNotFound {
            story_id: key.story_id,
            chapter_id: Some(key.chapter_id),
        });
    }

    let next = match input {
        NavigationInput::SelectStory { story } => {
            return Ok(chapter_choice(content, Cursor::story(*story)));
        }
        NavigationInput::SelectChapter { chapter } => Cursor::positioned(
            key.story_id,
            *chapter,
            content.beginning_storyline.clone(),
            0,
        ),
        NavigationInput::SelectOption { option } => follow_option(content, cursor, *option)?,
        NavigationInput::DirectCursor { cursor: target } => {
            if let CursorStage::ChapterSelection { .. } = target.stage() {
                return Ok(chapter_choice(content, target.chapter_finished()));
            }
            target.clone()
        }
    };

    let presentation = present(content, &next)?;
    Ok(Resolution {
        cursor: next,
        presentation,
    })
}

/// Builds the presentation of a cursor positioned inside `content`.
///
/// # Errors
///
/// - `DomainError::InvalidInput` if the cursor is not positioned in a chapter.
/// - `DomainError::ContentNotFound` if the cursor is in another chapter.
/// - `DomainError::UnknownStoryline`, `DomainError::PositionOutOfRange` or
///   `DomainError::UnknownAchievement` if the cursor does not fit the
///   content.
pub fn present(content: &StoryContent, cursor: &Cursor) -> Result<Presentation, DomainError> {
    let CursorStage::InChapter {
        story,
        chapter,
        storyline,
        position,
    } = cursor.stage()
    else {
        return Err(DomainError::InvalidInput(
            "cursor is not positioned inside a chapter".to_owned(),
        ));
    };
    if (story, chapter) != (content.story_id, content.chapter_id) {
        return Err(DomainError::ContentNotFound {
            story_id: story,
            chapter_id: Some(chapter),
        });
    }

    let achievement = cursor
        .pending_achievement
        .map(|index| {
            content
                .achievements
                .get(index)
                .map(|a| AchievementView::new(index, a))
                .ok_or(DomainError::UnknownAchievement(index))
        })
        .transpose()?;

    if storyline == ENDING_STORYLINE {
        let ending = content
            .endings
            .get(position)
            .ok_or_else(|| DomainError::PositionOutOfRange {
                storyline: storyline.to_owned(),
                position,
            })?;
        let is_canonical = position == 0;
        let remaining_alternatives_count = if is_canonical {
            content.alternative_endings_count()
        } else {
            content.alternative_endings_count().saturating_sub(1)
        };
        return Ok(Presentation::Ending(EndingView {
            story_id: story,
            chapter_id: chapter,
            position,
            ending_name: ending.name.clone(),
            lines: ending.content.clone(),
            is_canonical,
            is_prologue: content.is_prologue(),
            remaining_alternatives_count,
            achievement,
        }));
    }

    let element = element_at(content, storyline, position)?;
    let options = element
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| OptionView {
            number: index + 1,
            label: option.label.clone(),
            next: Cursor {
                story: Some(story),
                chapter: Some(chapter),
                storyline: Some(
                    option
                        .target_storyline
                        .clone()
                        .unwrap_or_else(|| storyline.to_owned()),
                ),
                position: Some(option.target_position),
                pending_achievement: option.grants_achievement,
            },
        })
        .collect();

    Ok(Presentation::Content(ElementView {
        story_id: story,
        chapter_id: chapter,
        lines: element.content.clone(),
        options,
        achievement,
    }))
}

fn chapter_choice(prologue: &StoryContent, cursor: Cursor) -> Resolution {
    Resolution {
        cursor,
        presentation: Presentation::ChapterChoice(ChapterChoiceView {
            story_id: prologue.story_id,
            story_name: prologue.name.clone(),
        }),
    }
}

fn element_at<'c>(
    content: &'c StoryContent,
    storyline: &str,
    position: usize,
) -> Result<&'c Element, DomainError> {
    content
        .storyline(storyline)
        .ok_or_else(|| DomainError::UnknownStoryline(storyline.to_owned()))?
        .elements
        .get(position)
        .ok_or_else(|| DomainError::PositionOutOfRange {
            storyline: storyline.to_owned(),
            position,
        })
}

fn follow_option(
    content: &StoryContent,
    cursor: &Cursor,
    option: usize,
) -> Result<Cursor, DomainError> {
    let CursorStage::InChapter {
        story,
        chapter,
        storyline,
        position,
    } = cursor.stage()
    else {
        return Err(DomainError::InvalidInput(
            "no chapter is in progress".to_owned(),
        ));
    };
    if storyline == ENDING_STORYLINE {
        return Err(DomainError::InvalidInput(
            "the chapter is already finished".to_owned(),
        ));
    }

    let element = element_at(content, storyline, position)?;
    let chosen = option
        .checked_sub(1)
        .and_then(|index| element.options.get(index))
        .ok_or(DomainError::OptionOutOfRange {
            index: option,
            available: element.options.len(),
        })?;

    Ok(Cursor {
        story: Some(story),
        chapter: Some(chapter),
        storyline: Some(
            chosen
                .target_storyline
                .clone()
                .unwrap_or_else(|| storyline.to_owned()),
        ),
        position: Some(chosen.target_position),
        pending_achievement: chosen.grants_achievement,
    })
}
