//! Story fixtures shared by the test suites.
//!
//! Two stories: "The Lighthouse" (story 0) with a prologue and one chapter,
//! and "Midnight Train" (story 1) with only a prologue.

use storybot_core::content::{
    Achievement, ENDING_STORYLINE, Element, Ending, StoryContent, StoryOption, Storyline,
};

/// An option staying in the current storyline.
#[must_use]
pub fn stay(label: &str, position: usize) -> StoryOption {
    StoryOption {
        label: label.to_owned(),
        target_storyline: None,
        target_position: position,
        grants_achievement: None,
    }
}

/// An option jumping to another storyline.
#[must_use]
pub fn jump(label: &str, storyline: &str, position: usize) -> StoryOption {
    StoryOption {
        label: label.to_owned(),
        target_storyline: Some(storyline.to_owned()),
        target_position: position,
        grants_achievement: None,
    }
}

/// An option leading to the chapter's ending at `ending`.
#[must_use]
pub fn finish(label: &str, ending: usize) -> StoryOption {
    jump(label, ENDING_STORYLINE, ending)
}

/// Adds an achievement grant to an option.
#[must_use]
pub fn granting(mut option: StoryOption, achievement: usize) -> StoryOption {
    option.grants_achievement = Some(achievement);
    option
}

/// An element with one line of text.
#[must_use]
pub fn element(line: &str, options: Vec<StoryOption>) -> Element {
    Element {
        content: vec![line.to_owned()],
        options,
    }
}

/// A storyline.
#[must_use]
pub fn storyline(tag: &str, elements: Vec<Element>) -> Storyline {
    Storyline {
        tag: tag.to_owned(),
        elements,
    }
}

/// A one-line ending.
#[must_use]
pub fn ending(name: &str) -> Ending {
    Ending {
        name: name.to_owned(),
        content: vec![format!("{name}.")],
    }
}

/// An achievement.
#[must_use]
pub fn achievement(name: &str, description: &str) -> Achievement {
    Achievement {
        name: name.to_owned(),
        description: description.to_owned(),
    }
}

/// Prologue of "The Lighthouse".
///
/// `intro[0]` offers: 1 climb (stay → `intro[1]`), 2 walk (→ `beach[0]`).
/// `intro[1]` offers: 1 knock (→ ending 0, grants achievement 0).
/// `beach[0]` offers: 1 return (→ `intro[0]`).
#[must_use]
pub fn lighthouse_prologue() -> StoryContent {
    StoryContent {
        story_id: 0,
        chapter_id: 0,
        name: "The Lighthouse".to_owned(),
        beginning_storyline: "intro".to_owned(),
        storylines: vec![
            storyline(
                "intro",
                vec![
                    element(
                        "You wake on a rocky shore.",
                        vec![
                            stay("Climb to the lighthouse", 1),
                            jump("Walk along the beach", "beach", 0),
                        ],
                    ),
                    element(
                        "The door is locked.",
                        vec![granting(finish("Knock", 0), 0)],
                    ),
                ],
            ),
            storyline(
                "beach",
                vec![element(
                    "Waves wash over your boots.",
                    vec![jump("Return", "intro", 0)],
                )],
            ),
        ],
        achievements: vec![achievement("Polite", "Knocked before entering")],
        endings: vec![ending("Welcome")],
    }
}

/// Chapter 1 of "The Lighthouse".
///
/// `harbor[0]` offers: 1 sail (→ `sea[0]`), 2 stay ashore (→ ending 1, grants
/// achievement 1).
/// `sea[0]` offers: 1 steer home (→ ending 0, grants achievement 0), 2 dive
/// (→ ending 1, grants achievement 2), 3 drift (→ ending 2).
#[must_use]
pub fn lighthouse_storm() -> StoryContent {
    StoryContent {
        story_id: 0,
        chapter_id: 1,
        name: "The Storm".to_owned(),
        beginning_storyline: "harbor".to_owned(),
        storylines: vec![
            storyline(
                "harbor",
                vec![element(
                    "Black clouds gather over the harbor.",
                    vec![
                        jump("Sail out", "sea", 0),
                        granting(finish("Stay ashore", 1), 1),
                    ],
                )],
            ),
            storyline(
                "sea",
                vec![element(
                    "The waves tower over the boat.",
                    vec![
                        granting(finish("Steer home", 0), 0),
                        granting(finish("Dive", 1), 2),
                        finish("Drift", 2),
                    ],
                )],
            ),
        ],
        achievements: vec![
            achievement("Sailor", "Brought the boat home"),
            achievement("Landlubber", "Never left the harbor"),
            achievement("Diver", "Jumped into the storm"),
        ],
        endings: vec![ending("Safe Harbor"), ending("Shipwreck"), ending("Adrift")],
    }
}

/// Prologue of "Midnight Train": one element whose only option finishes the
/// prologue.
#[must_use]
pub fn midnight_train_prologue() -> StoryContent {
    StoryContent {
        story_id: 1,
        chapter_id: 0,
        name: "Midnight Train".to_owned(),
        beginning_storyline: "platform".to_owned(),
        storylines: vec![storyline(
            "platform",
            vec![element("A train pulls in.", vec![finish("Board", 0)])],
        )],
        achievements: Vec::new(),
        endings: vec![ending("Departed")],
    }
}

/// Every fixture chapter.
#[must_use]
pub fn catalog() -> Vec<StoryContent> {
    vec![
        lighthouse_prologue(),
        lighthouse_storm(),
        midnight_train_prologue(),
    ]
}
