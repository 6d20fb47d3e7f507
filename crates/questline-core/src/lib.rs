//! Questline Core: shared domain abstractions.
//!
//! This crate defines the records, storage traits, and ordering primitives
//! that every other crate depends on. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod ledger;
pub mod record;
pub mod repository;
