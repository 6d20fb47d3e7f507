//! Shared test doubles and utilities for the Questline quest tracker.

mod clock;
mod repository;

pub use clock::{FixedClock, fixed_now};
pub use repository::{ContendedRecordStore, FailingRecordStore};
