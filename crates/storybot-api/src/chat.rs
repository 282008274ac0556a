//! Interpretation of raw chat messages.
//!
//! A message is, in order of precedence: a dot-prefixed command in the text,
//! a button payload (itself either a dot-prefixed command or a JSON cursor),
//! a bare number, or the word `start`. Anything else is ignored.

use serde::Serialize;
use storybot_core::content::{ChapterId, StoryId};
use storybot_core::save::Cursor;

/// Prefix marking a chat command.
pub const COMMAND_PREFIX: char = '.';

/// Which statistics a `.stats` command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsScope {
    /// Every story.
    Overall,
    /// One story.
    Story(StoryId),
    /// One chapter of a story.
    Chapter(StoryId, ChapterId),
}

/// What a chat message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatIntent {
    /// Jump to a cursor carried by a button.
    Navigate(Cursor),
    /// Pick the numbered entry.
    Choose(i64),
    /// Go back to story selection.
    Reset,
    /// Show the current prompt again.
    Repeat,
    /// Show statistics.
    Stats(StatsScope),
    /// Show the story menu.
    Start,
    /// List the commands.
    Help,
    /// Not addressed to the bot.
    Ignore,
}

/// One line of the command list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpEntry {
    /// Usage, including the prefix.
    pub usage: &'static str,
    /// What the command does.
    pub description: &'static str,
}

/// The command list shown for unknown commands.
#[must_use]
pub fn help() -> Vec<HelpEntry> {
    vec![
        HelpEntry {
            usage: ".reset",
            description: "Leave the current chapter and choose another story",
        },
        HelpEntry {
            usage: ".repeat",
            description: "Show the current choice again",
        },
        HelpEntry {
            usage: ".stats",
            description: "Progress across every story",
        },
        HelpEntry {
            usage: ".stats <story>",
            description: "Progress through each chapter of a story",
        },
        HelpEntry {
            usage: ".stats <story> <chapter>",
            description: "Endings and achievements of one chapter",
        },
    ]
}

/// Interprets a chat message and its optional button payload.
#[must_use]
pub fn interpret(text: &str, payload: Option<&str>) -> ChatIntent {
    let text = text.trim();
    if let Some(command) = text.strip_prefix(COMMAND_PREFIX) {
        return parse_command(command);
    }

    if let Some(payload) = payload.map(str::trim).filter(|p| !p.is_empty()) {
        if let Some(command) = payload.strip_prefix(COMMAND_PREFIX) {
            return parse_command(command);
        }
        return match serde_json::from_str::<Cursor>(payload) {
            Ok(cursor) if cursor.story.is_some() => ChatIntent::Navigate(cursor),
            _ => ChatIntent::Ignore,
        };
    }

    if let Ok(number) = text.parse::<i64>() {
        return ChatIntent::Choose(number);
    }
    if text.eq_ignore_ascii_case("start") {
        return ChatIntent::Start;
    }
    ChatIntent::Ignore
}

fn parse_command(command: &str) -> ChatIntent {
    let lowered = command.to_lowercase();
    let mut words = lowered.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    match name {
        "reset" => ChatIntent::Reset,
        "repeat" => ChatIntent::Repeat,
        "stats" => parse_stats(&args).map_or(ChatIntent::Help, ChatIntent::Stats),
        _ => ChatIntent::Help,
    }
}

/// Stats arguments are 1-based: `.stats 1 1` is the prologue of the first
/// story.
fn parse_stats(args: &[&str]) -> Option<StatsScope> {
    let one_based = |raw: &&str| -> Option<u32> { raw.parse::<u32>().ok()?.checked_sub(1) };
    match args {
        [] => Some(StatsScope::Overall),
        [story] => Some(StatsScope::Story(one_based(story)?)),
        [story, chapter] => Some(StatsScope::Chapter(one_based(story)?, one_based(chapter)?)),
        _ => None,
    }
}
