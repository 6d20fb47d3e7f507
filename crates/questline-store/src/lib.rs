//! Questline record stores.
//!
//! [`PgRecordStore`] persists to PostgreSQL and serializes queue mutations
//! with a row lock on the owning character. [`InMemoryRecordStore`] keeps
//! everything in process memory behind one mutex per character queue.

pub mod memory_record_store;
pub mod migrate;
pub mod pg_record_store;

pub use memory_record_store::InMemoryRecordStore;
pub use migrate::run_migrations;
pub use pg_record_store::PgRecordStore;
