//! Local persistence for crmsync.
//!
//! The sync engine only needs a narrow surface from the local database:
//! read persons, fill in their undecided preferences, disable them, and
//! create/read/update the contact mapping cache. That surface is captured by
//! the [`PersonStore`] and [`MappingStore`] traits so the engine can run
//! against any backend.
//!
//! [`SqliteStore`] is the bundled implementation. Both uniqueness invariants
//! of the mapping cache (one row per person, one row per remote contact) are
//! enforced by `UNIQUE` constraints, and a violation surfaces as
//! [`StorageError::UniqueViolation`] so callers can tell a concurrent-sync
//! race apart from a real failure.

mod error;
mod sqlite;
mod store;

pub use error::{StorageError, StorageResult};
pub use sqlite::SqliteStore;
pub use store::{MappingStore, PersonStore};
