//! Folding a resolution into the save document.

use storybot_core::save::SaveDocument;

use crate::domain::resolver::{Presentation, Resolution};

/// Applies a resolution to a save document, returning the updated document.
///
/// Endings and achievements are only ever added, so stats never shrink. A
/// cursor on an ending is stored as finished, which sends the next numeric
/// input to chapter selection.
#[must_use]
pub fn apply(save: &SaveDocument, resolution: &Resolution) -> SaveDocument {
    let mut next = save.clone();

    let (story_id, chapter_id) = match &resolution.presentation {
        Presentation::ChapterChoice(_) => {
            next.current = resolution.cursor.clone();
            return next;
        }
        Presentation::Content(view) => (view.story_id, view.chapter_id),
        Presentation::Ending(view) => (view.story_id, view.chapter_id),
    };

    let stats = next.chapter_stats_mut(story_id, chapter_id);
    if let Some(achievement) = resolution.granted_achievement() {
        stats.obtained_achievements.insert(achievement);
    }
    if let Some(ending) = resolution.obtained_ending() {
        stats.obtained_endings.insert(ending);
        next.current = resolution.cursor.chapter_finished();
    } else {
        next.current = resolution.cursor.clone();
    }

    next
}
