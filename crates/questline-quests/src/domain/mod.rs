//! Domain layer: commands and the quest queue.

pub mod commands;
pub mod queue;
