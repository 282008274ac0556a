//! Pure narrative logic: no I/O, no suspension points.

pub mod commands;
pub mod menu;
pub mod mutator;
pub mod resolver;
pub mod stats;
