//! Storybot — story content authoring.
//!
//! Responsible for loading story chapters authored as YAML, checking them for
//! authoring mistakes before they reach players, and serving them from memory.

pub mod application;
pub mod domain;
