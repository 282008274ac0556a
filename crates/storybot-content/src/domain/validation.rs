//! Authoring validation of story chapters.
//!
//! A catalog with any issue is rejected at load time. The cursor resolver
//! still re-checks every position it reads.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use storybot_core::content::{ChapterId, ENDING_STORYLINE, PROLOGUE_CHAPTER, StoryContent, StoryId};
use thiserror::Error;

/// Address of an element inside a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    /// Storyline tag.
    pub storyline: String,
    /// Element index.
    pub position: usize,
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element {}[{}]", self.storyline, self.position)
    }
}

/// A problem inside one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChapterProblem {
    /// Two storylines share a tag.
    #[error("storyline {0:?} is defined more than once")]
    DuplicateStoryline(String),

    /// A storyline uses the ending sentinel as its tag.
    #[error("storyline tag \"Ending\" is reserved for endings")]
    ReservedTag,

    /// The beginning storyline does not exist.
    #[error("beginning storyline {0:?} does not exist")]
    MissingBeginning(String),

    /// A storyline has no elements.
    #[error("storyline {0:?} has no elements")]
    EmptyStoryline(String),

    /// An element offers no way forward.
    #[error("{at} has no options")]
    NoOptions {
        /// The element.
        at: ElementRef,
    },

    /// An option targets a storyline the chapter does not have.
    #[error("{at}, option {option}: storyline {target:?} does not exist")]
    UnknownTarget {
        /// The element.
        at: ElementRef,
        /// 1-based option number.
        option: usize,
        /// The missing storyline tag.
        target: String,
    },

    /// An option targets a position past the end of its target.
    #[error("{at}, option {option}: position {position} is past the end of {target:?}")]
    TargetOutOfRange {
        /// The element.
        at: ElementRef,
        /// 1-based option number.
        option: usize,
        /// The target storyline tag (or the ending sentinel).
        target: String,
        /// The offending position.
        position: usize,
    },

    /// An option grants an achievement the chapter does not define.
    #[error("{at}, option {option}: achievement {achievement} does not exist")]
    UnknownAchievement {
        /// The element.
        at: ElementRef,
        /// 1-based option number.
        option: usize,
        /// The achievement index.
        achievement: usize,
    },

    /// The chapter cannot be finished.
    #[error("chapter has no endings")]
    NoEndings,
}

/// A problem found in authored content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentIssue {
    /// A problem inside one chapter.
    #[error("story {story_id}, chapter {chapter_id}: {problem}")]
    Chapter {
        /// The story.
        story_id: StoryId,
        /// The chapter.
        chapter_id: ChapterId,
        /// What is wrong.
        problem: ChapterProblem,
    },

    /// A story has chapters but no prologue.
    #[error("story {0} has no prologue")]
    MissingPrologue(StoryId),

    /// The same chapter is defined twice.
    #[error("story {story_id}, chapter {chapter_id} is defined more than once")]
    DuplicateChapter {
        /// The story.
        story_id: StoryId,
        /// The chapter.
        chapter_id: ChapterId,
    },
}

/// Checks one chapter. An empty result means the chapter is playable.
#[must_use]
pub fn validate_chapter(chapter: &StoryContent) -> Vec<ContentIssue> {
    let mut problems = Vec::new();

    let mut tags = HashSet::new();
    for storyline in &chapter.storylines {
        if !tags.insert(storyline.tag.as_str()) {
            problems.push(ChapterProblem::DuplicateStoryline(storyline.tag.clone()));
        }
        if storyline.tag == ENDING_STORYLINE {
            problems.push(ChapterProblem::ReservedTag);
        }
        if storyline.elements.is_empty() {
            problems.push(ChapterProblem::EmptyStoryline(storyline.tag.clone()));
        }
    }

    if chapter.storyline(&chapter.beginning_storyline).is_none() {
        problems.push(ChapterProblem::MissingBeginning(
            chapter.beginning_storyline.clone(),
        ));
    }
    if chapter.endings.is_empty() {
        problems.push(ChapterProblem::NoEndings);
    }

    for storyline in &chapter.storylines {
        for (position, element) in storyline.elements.iter().enumerate() {
            let at = ElementRef {
                storyline: storyline.tag.clone(),
                position,
            };
            if element.options.is_empty() {
                problems.push(ChapterProblem::NoOptions { at: at.clone() });
            }
            for (index, option) in element.options.iter().enumerate() {
                let number = index + 1;
                let target = option
                    .target_storyline
                    .as_deref()
                    .unwrap_or(storyline.tag.as_str());
                let target_len = if target == ENDING_STORYLINE {
                    Some(chapter.endings.len())
                } else {
                    chapter.storyline(target).map(|s| s.elements.len())
                };
                match target_len {
                    None => problems.push(ChapterProblem::UnknownTarget {
                        at: at.clone(),
                        option: number,
                        target: target.to_owned(),
                    }),
                    Some(len) if option.target_position >= len => {
                        problems.push(ChapterProblem::TargetOutOfRange {
                            at: at.clone(),
                            option: number,
                            target: target.to_owned(),
                            position: option.target_position,
                        });
                    }
                    Some(_) => {}
                }
                if let Some(achievement) = option
                    .grants_achievement
                    .filter(|&a| a >= chapter.achievements.len())
                {
                    problems.push(ChapterProblem::UnknownAchievement {
                        at: at.clone(),
                        option: number,
                        achievement,
                    });
                }
            }
        }
    }

    problems
        .into_iter()
        .map(|problem| ContentIssue::Chapter {
            story_id: chapter.story_id,
            chapter_id: chapter.chapter_id,
            problem,
        })
        .collect()
}

/// Checks a whole catalog: every chapter, unique chapter keys, and a prologue
/// for every story.
#[must_use]
pub fn validate_catalog(chapters: &[StoryContent]) -> Vec<ContentIssue> {
    let mut issues = Vec::new();
    let mut keys = BTreeSet::new();
    let mut stories = BTreeSet::new();

    for chapter in chapters {
        stories.insert(chapter.story_id);
        if !keys.insert((chapter.story_id, chapter.chapter_id)) {
            issues.push(ContentIssue::DuplicateChapter {
                story_id: chapter.story_id,
                chapter_id: chapter.chapter_id,
            });
        }
        issues.extend(validate_chapter(chapter));
    }

    for story_id in stories {
        if !keys.contains(&(story_id, PROLOGUE_CHAPTER)) {
            issues.push(ContentIssue::MissingPrologue(story_id));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use storybot_test_support::fixtures::{
        self, element, ending, finish, granting, jump, lighthouse_prologue, lighthouse_storm,
        stay, storyline,
    };

    use super::*;

    fn problems(chapter: &StoryContent) -> Vec<ChapterProblem> {
        validate_chapter(chapter)
            .into_iter()
            .map(|issue| match issue {
                ContentIssue::Chapter { problem, .. } => problem,
                other => panic!("expected a chapter issue, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_fixture_catalog_is_valid() {
        assert!(validate_catalog(&fixtures::catalog()).is_empty());
    }

    #[test]
    fn test_element_without_options_is_reported() {
        // Arrange
        let mut chapter = lighthouse_prologue();
        chapter.storylines[1].elements[0].options.clear();

        // Act
        let found = problems(&chapter);

        // Assert
        assert_eq!(
            found,
            vec![ChapterProblem::NoOptions {
                at: ElementRef {
                    storyline: "beach".into(),
                    position: 0
                }
            }]
        );
    }

    #[test]
    fn test_bad_targets_are_reported() {
        // Arrange
        let mut chapter = lighthouse_storm();
        chapter.storylines[0].elements[0].options = vec![
            jump("Fly", "sky", 0),
            stay("Wait", 4),
            granting(finish("Vanish", 7), 9),
        ];

        // Act
        let found = problems(&chapter);

        // Assert
        let at = ElementRef {
            storyline: "harbor".into(),
            position: 0,
        };
        assert_eq!(
            found,
            vec![
                ChapterProblem::UnknownTarget {
                    at: at.clone(),
                    option: 1,
                    target: "sky".into()
                },
                ChapterProblem::TargetOutOfRange {
                    at: at.clone(),
                    option: 2,
                    target: "harbor".into(),
                    position: 4
                },
                ChapterProblem::TargetOutOfRange {
                    at: at.clone(),
                    option: 3,
                    target: ENDING_STORYLINE.into(),
                    position: 7
                },
                ChapterProblem::UnknownAchievement {
                    at,
                    option: 3,
                    achievement: 9
                },
            ]
        );
    }

    #[test]
    fn test_structural_problems_are_reported() {
        // Arrange
        let mut chapter = lighthouse_prologue();
        chapter.beginning_storyline = "attic".into();
        chapter.endings.clear();
        chapter.storylines.push(storyline("beach", Vec::new()));
        chapter.storylines.push(storyline(
            ENDING_STORYLINE,
            vec![element("Oops.", vec![stay("Again", 0)])],
        ));
        chapter.storylines[0].elements[1].options = vec![stay("Loop", 0)];

        // Act
        let found = problems(&chapter);

        // Assert
        assert!(found.contains(&ChapterProblem::DuplicateStoryline("beach".into())));
        assert!(found.contains(&ChapterProblem::EmptyStoryline("beach".into())));
        assert!(found.contains(&ChapterProblem::ReservedTag));
        assert!(found.contains(&ChapterProblem::MissingBeginning("attic".into())));
        assert!(found.contains(&ChapterProblem::NoEndings));
    }

    #[test]
    fn test_catalog_requires_prologue_and_unique_chapters() {
        // Arrange
        let mut orphan = lighthouse_storm();
        orphan.story_id = 5;
        let mut chapters = vec![lighthouse_prologue(), lighthouse_prologue(), orphan];
        chapters[1].endings = vec![ending("Twin")];

        // Act
        let issues = validate_catalog(&chapters);

        // Assert
        assert_eq!(
            issues,
            vec![
                ContentIssue::DuplicateChapter {
                    story_id: 0,
                    chapter_id: 0
                },
                ContentIssue::MissingPrologue(5),
            ]
        );
        assert_eq!(issues[1].to_string(), "story 5 has no prologue");
    }
}
