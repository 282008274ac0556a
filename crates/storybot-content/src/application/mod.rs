//! Catalog loading and the in-memory content repository.

pub mod catalog;
pub mod repository;
