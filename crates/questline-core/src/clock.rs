//! Clock abstraction used to stamp quest assignments.

use chrono::{DateTime, Utc};

/// Source of the `assigned_at` timestamp recorded when a quest is accepted.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
