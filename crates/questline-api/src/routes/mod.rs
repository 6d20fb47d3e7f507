//! Route modules organized by resource.

pub mod character;
pub mod health;
pub mod quest;
