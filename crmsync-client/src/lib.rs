//! Remote CRM client for crmsync.
//!
//! The sync engine talks to the CRM exclusively through the [`CrmApi`] trait.
//! Two implementations ship with this crate:
//! - [`ActiveCampaignClient`]: the real HTTP client (ActiveCampaign API v3)
//! - [`mock::MockCrm`]: an in-memory CRM that records every call, for tests
//!
//! There is no retry or backoff. A failed call surfaces as an
//! [`ApiError`]; the batch caller decides whether to run the person again.

mod active_campaign;
mod api;
mod config;
mod error;
pub mod mock;
mod wire;

pub use active_campaign::ActiveCampaignClient;
pub use api::{ContactListMembership, ContactTag, CrmApi, NewContact, RemoteList, RemoteTag};
pub use config::CrmConfig;
pub use error::{ApiError, ApiResult};
