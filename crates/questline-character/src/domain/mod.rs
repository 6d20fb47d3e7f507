//! Domain layer: commands and the progression rule.

pub mod commands;
pub mod progression;
