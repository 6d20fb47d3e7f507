//! Questline: quest catalog and per-character quest queues.
//!
//! Owns the FIFO ordering of accepted quests: accepting appends to the
//! character's queue, completing removes the oldest entry and hands its
//! reward to the character progression rule.

pub mod application;
pub mod domain;
