//! Questline: character records and experience progression.
//!
//! Responsible for creating characters, looking them up, and applying the
//! experience/level rule when a quest is completed.

pub mod application;
pub mod domain;
