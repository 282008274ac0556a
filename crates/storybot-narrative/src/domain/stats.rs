//! Completion statistics derived from a save document and story content.
//!
//! Nothing here fails: content that is missing or has shrunk since the save
//! was written simply counts as nothing obtained.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use storybot_core::content::{ChapterId, PROLOGUE_CHAPTER, StoryContent, StoryId};
use storybot_core::save::SaveDocument;

/// Progress through one story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryProgress {
    /// The story.
    pub story_id: StoryId,
    /// Display name (the prologue's name).
    pub story_name: String,
    /// Chapters with a completion record.
    pub completed_chapter_count: usize,
    /// Chapters the story has.
    pub total_chapter_count: usize,
}

/// Obtained counts of a visited chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObtainedCounts {
    /// Endings reached.
    pub endings: usize,
    /// Achievements earned.
    pub achievements: usize,
}

/// Progress through one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterProgress {
    /// The chapter.
    pub chapter_id: ChapterId,
    /// Display name.
    pub chapter_name: String,
    /// Endings the chapter has.
    pub total_endings: usize,
    /// Achievements the chapter has.
    pub total_achievements: usize,
    /// What was obtained, or `None` if the chapter was never visited.
    pub obtained: Option<ObtainedCounts>,
}

/// Progress through every chapter of a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryBreakdown {
    /// The story.
    pub story_id: StoryId,
    /// Display name (the prologue's name).
    pub story_name: String,
    /// Chapters ordered by id.
    pub chapters: Vec<ChapterProgress>,
}

/// One ending of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndingStatus {
    /// Index in the chapter's endings.
    pub index: usize,
    /// Name of the ending.
    pub name: String,
    /// True for ending 0.
    pub is_canonical: bool,
    /// True once reached.
    pub obtained: bool,
}

/// One achievement of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementStatus {
    /// Index in the chapter's achievements.
    pub index: usize,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// True once earned.
    pub obtained: bool,
}

/// Per-ending and per-achievement status of one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterBreakdown {
    /// The story.
    pub story_id: StoryId,
    /// The chapter.
    pub chapter_id: ChapterId,
    /// Display name.
    pub chapter_name: String,
    /// False if the chapter was never visited.
    pub has_data: bool,
    /// Endings in authored order.
    pub endings: Vec<EndingStatus>,
    /// Achievements in authored order.
    pub achievements: Vec<AchievementStatus>,
}

/// Progress through every story, in prologue order.
#[must_use]
pub fn overall_stats(
    save: &SaveDocument,
    prologues: &[StoryContent],
    chapter_counts: &BTreeMap<StoryId, usize>,
) -> Vec<StoryProgress> {
    prologues
        .iter()
        .map(|prologue| StoryProgress {
            story_id: prologue.story_id,
            story_name: prologue.name.clone(),
            completed_chapter_count: save
                .story_stats(prologue.story_id)
                .map_or(0, BTreeMap::len),
            total_chapter_count: chapter_counts
                .get(&prologue.story_id)
                .copied()
                .unwrap_or_default(),
        })
        .collect()
}

/// Progress through the chapters of one story. `chapters` holds the story's
/// chapters ordered by id.
#[must_use]
pub fn story_stats(
    save: &SaveDocument,
    story_id: StoryId,
    chapters: &[StoryContent],
) -> StoryBreakdown {
    let story_name = chapters
        .iter()
        .find(|c| c.chapter_id == PROLOGUE_CHAPTER)
        .map(|c| c.name.clone())
        .unwrap_or_default();

    let chapters = chapters
        .iter()
        .map(|chapter| {
            let total_endings = chapter.endings.len();
            let total_achievements = chapter.achievements.len();
            let obtained = save
                .chapter_stats(story_id, chapter.chapter_id)
                .map(|stats| ObtainedCounts {
                    endings: count_below(&stats.obtained_endings, total_endings),
                    achievements: count_below(&stats.obtained_achievements, total_achievements),
                });
            ChapterProgress {
                chapter_id: chapter.chapter_id,
                chapter_name: chapter.name.clone(),
                total_endings,
                total_achievements,
                obtained,
            }
        })
        .collect();

    StoryBreakdown {
        story_id,
        story_name,
        chapters,
    }
}

/// Status of every ending and achievement of one chapter.
#[must_use]
pub fn chapter_stats(
    save: &SaveDocument,
    story_id: StoryId,
    chapter_id: ChapterId,
    content: &StoryContent,
) -> ChapterBreakdown {
    let stats = save.chapter_stats(story_id, chapter_id);
    let endings_obtained = |i: usize| stats.is_some_and(|s| s.obtained_endings.contains(&i));
    let achievement_obtained =
        |i: usize| stats.is_some_and(|s| s.obtained_achievements.contains(&i));

    ChapterBreakdown {
        story_id,
        chapter_id,
        chapter_name: content.name.clone(),
        has_data: stats.is_some(),
        endings: content
            .endings
            .iter()
            .enumerate()
            .map(|(index, ending)| EndingStatus {
                index,
                name: ending.name.clone(),
                is_canonical: index == 0,
                obtained: endings_obtained(index),
            })
            .collect(),
        achievements: content
            .achievements
            .iter()
            .enumerate()
            .map(|(index, achievement)| AchievementStatus {
                index,
                name: achievement.name.clone(),
                description: achievement.description.clone(),
                obtained: achievement_obtained(index),
            })
            .collect(),
    }
}

fn count_below(obtained: &BTreeSet<usize>, total: usize) -> usize {
    obtained.range(..total).count()
}

#[cfg(test)]
mod tests {
    use storybot_test_support::fixtures::{
        lighthouse_prologue, lighthouse_storm, midnight_train_prologue,
    };

    use super::*;

    fn played_save() -> SaveDocument {
        let mut save = SaveDocument::default();
        let storm = save.chapter_stats_mut(0, 1);
        storm.obtained_endings.insert(1);
        storm.obtained_achievements.insert(2);
        storm.obtained_achievements.insert(1);
        save.chapter_stats_mut(0, 0);
        save
    }

    #[test]
    fn test_overall_stats_counts_visited_chapters() {
        // Arrange
        let prologues = vec![lighthouse_prologue(), midnight_train_prologue()];
        let counts = BTreeMap::from([(0, 2), (1, 1)]);

        // Act
        let overall = overall_stats(&played_save(), &prologues, &counts);

        // Assert
        assert_eq!(
            overall,
            vec![
                StoryProgress {
                    story_id: 0,
                    story_name: "The Lighthouse".into(),
                    completed_chapter_count: 2,
                    total_chapter_count: 2,
                },
                StoryProgress {
                    story_id: 1,
                    story_name: "Midnight Train".into(),
                    completed_chapter_count: 0,
                    total_chapter_count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_story_stats_distinguishes_no_data_from_zero() {
        // Arrange
        let mut save = SaveDocument::default();
        save.chapter_stats_mut(0, 0);

        // Act
        let breakdown = story_stats(&save, 0, &[lighthouse_prologue(), lighthouse_storm()]);

        // Assert
        assert_eq!(breakdown.story_name, "The Lighthouse");
        assert_eq!(
            breakdown.chapters[0].obtained,
            Some(ObtainedCounts {
                endings: 0,
                achievements: 0
            })
        );
        assert_eq!(breakdown.chapters[1].obtained, None);
        assert_eq!(breakdown.chapters[1].total_endings, 3);
        assert_eq!(breakdown.chapters[1].total_achievements, 3);
    }

    #[test]
    fn test_story_stats_counts_obtained() {
        let breakdown = story_stats(&played_save(), 0, &[lighthouse_prologue(), lighthouse_storm()]);

        assert_eq!(
            breakdown.chapters[1].obtained,
            Some(ObtainedCounts {
                endings: 1,
                achievements: 2
            })
        );
    }

    #[test]
    fn test_story_stats_ignores_indices_past_current_content() {
        let mut save = SaveDocument::default();
        save.chapter_stats_mut(1, 0).obtained_endings.extend([0, 4]);

        let breakdown = story_stats(&save, 1, &[midnight_train_prologue()]);

        assert_eq!(breakdown.chapters[0].obtained.unwrap().endings, 1);
    }

    #[test]
    fn test_chapter_stats_lists_endings_and_achievements() {
        // Act
        let breakdown = chapter_stats(&played_save(), 0, 1, &lighthouse_storm());

        // Assert
        assert!(breakdown.has_data);
        let endings: Vec<(&str, bool, bool)> = breakdown
            .endings
            .iter()
            .map(|e| (e.name.as_str(), e.is_canonical, e.obtained))
            .collect();
        assert_eq!(
            endings,
            vec![
                ("Safe Harbor", true, false),
                ("Shipwreck", false, true),
                ("Adrift", false, false),
            ]
        );
        let achievements: Vec<bool> = breakdown.achievements.iter().map(|a| a.obtained).collect();
        assert_eq!(achievements, vec![false, true, true]);
    }

    #[test]
    fn test_chapter_stats_without_data() {
        let breakdown = chapter_stats(&SaveDocument::default(), 0, 1, &lighthouse_storm());

        assert!(!breakdown.has_data);
        assert!(breakdown.endings.iter().all(|e| !e.obtained));
        assert!(breakdown.achievements.iter().all(|a| !a.obtained));
    }
}
