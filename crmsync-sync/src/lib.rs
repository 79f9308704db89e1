//! Contact reconciliation engine for crmsync.
//!
//! Keeps a remote CRM's contacts, list-subscription status and tag sets in
//! line with the local person records, one person at a time.
//!
//! # Architecture
//!
//! For every person the engine computes a *desired* state from local data
//! and compares it with the *cached* state in the person's
//! [`ContactMapping`](crmsync_types::ContactMapping), which mirrors what was
//! last pushed. Only the difference is sent to the CRM.
//!
//! ## Components
//!
//! - **Policy** ([`SyncContext`]): desired list status and tag ids, plus the
//!   list/tag catalog resolved once per batch
//! - **Resolver** ([`ContactResolver`]): finds, adopts or creates the
//!   person's remote contact
//! - **List sync** ([`ListStatusSync`]) and **tag sync** ([`TagSync`]):
//!   diff-based synchronizers
//! - **Orchestrator** ([`SyncPerson`]): sequences the above and classifies
//!   errors
//! - **Batch** ([`BatchRunner`]): fans out over many persons and collects a
//!   [`BatchSummary`]
//!
//! Data flows strictly downward; no component calls back up.

mod batch;
mod config;
mod error;
mod list_status;
mod person;
mod policy;
mod resolver;
mod tags;

pub use batch::{BatchRunner, BatchSummary, FailedPerson, FailureKind};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use list_status::ListStatusSync;
pub use person::{SyncOutcome, SyncPerson};
pub use policy::{ExpectedState, SyncContext, expected_list_status};
pub use resolver::{ContactResolver, Resolution};
pub use tags::TagSync;
