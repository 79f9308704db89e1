//! Core type definitions for crmsync.
//!
//! This crate defines the plain data shared by every other crate:
//! - Local person identifiers (UUID v7) and opaque remote CRM identifiers
//! - The local `Person` record and its tri-state newsletter `Preference`s
//! - The `ContactMapping` cache row linking a person to a remote contact
//!
//! Nothing here performs I/O. Storage lives in `crmsync-store`, the remote
//! API in `crmsync-client`.

mod ids;
mod mapping;
mod person;

pub use ids::{ContactId, ContactTagId, ListId, PersonId, TagId};
pub use mapping::{ContactMapping, ListStatus};
pub use person::{Person, PersonName, Preference};

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown list status: {0}")]
    InvalidListStatus(String),
}
