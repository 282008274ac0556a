//! Loading story chapters from YAML.
//!
//! A story file holds a sequence of chapters, each carrying its own
//! `story_id` and `chapter_id`. A catalog directory holds any number of
//! `*.yaml` / `*.yml` files.

use std::fs;
use std::path::{Path, PathBuf};

use storybot_core::content::StoryContent;
use storybot_core::error::DomainError;
use tracing::{debug, info, warn};

use crate::domain::validation::validate_catalog;

/// Parses one story file.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the YAML does not describe a sequence
/// of chapters.
pub fn parse_chapters(source: &str) -> Result<Vec<StoryContent>, DomainError> {
    serde_yaml::from_str(source)
        .map_err(|e| DomainError::Validation(format!("malformed story file: {e}")))
}

/// Validates a set of chapters as one catalog.
///
/// # Errors
///
/// Returns `DomainError::Validation` listing every issue found.
pub fn build_catalog(chapters: Vec<StoryContent>) -> Result<Vec<StoryContent>, DomainError> {
    let issues = validate_catalog(&chapters);
    if !issues.is_empty() {
        for issue in &issues {
            warn!(%issue, "story content issue");
        }
        let listing: Vec<String> = issues.iter().map(ToString::to_string).collect();
        return Err(DomainError::Validation(listing.join("; ")));
    }
    Ok(chapters)
}

/// Loads and validates a catalog from a story file or a directory of story
/// files.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the path cannot be read and
/// `DomainError::Validation` if a file is malformed or the catalog has
/// authoring issues.
pub fn load_catalog(path: &Path) -> Result<Vec<StoryContent>, DomainError> {
    let files = story_files(path)?;
    let mut chapters = Vec::new();
    for file in &files {
        let source = fs::read_to_string(file).map_err(|e| {
            DomainError::Infrastructure(format!("cannot read {}: {e}", file.display()))
        })?;
        let parsed = parse_chapters(&source).map_err(|e| match e {
            DomainError::Validation(msg) => {
                DomainError::Validation(format!("{}: {msg}", file.display()))
            }
            other => other,
        })?;
        debug!(file = %file.display(), chapters = parsed.len(), "parsed story file");
        chapters.extend(parsed);
    }

    let chapters = build_catalog(chapters)?;
    info!(
        files = files.len(),
        chapters = chapters.len(),
        "loaded story catalog"
    );
    Ok(chapters)
}

fn story_files(path: &Path) -> Result<Vec<PathBuf>, DomainError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let entries = fs::read_dir(path).map_err(|e| {
        DomainError::Infrastructure(format!("cannot read {}: {e}", path.display()))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DomainError::Infrastructure(e.to_string()))?;
        let file = entry.path();
        let is_yaml = file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if is_yaml && file.is_file() {
            files.push(file);
        }
    }
    files.sort();
    Ok(files)
}
