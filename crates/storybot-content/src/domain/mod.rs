//! Authoring rules for story content.

pub mod validation;
