//! The CRM surface consumed by the sync engine.

use crate::error::ApiResult;
use async_trait::async_trait;
use crmsync_types::{ContactId, ContactTagId, ListId, ListStatus, TagId};

/// Fields for a contact being created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A contact's membership on one remote list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactListMembership {
    pub list_id: ListId,
    pub status: ListStatus,
}

impl ContactListMembership {
    pub fn is_subscribed(&self) -> bool {
        self.status == ListStatus::Synced
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.status == ListStatus::Unsubscribed
    }
}

/// A tag-to-contact association. `id` is the association id, which is what
/// removal must reference; `tag_id` is the tag itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactTag {
    pub id: ContactTagId,
    pub tag_id: TagId,
}

/// A list in the CRM account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteList {
    pub id: ListId,
    pub name: String,
}

/// A tag in the CRM account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTag {
    pub id: TagId,
    pub name: String,
}

/// Remote CRM operations. Every call suspends until the CRM answers or fails.
#[async_trait]
pub trait CrmApi: Send + Sync {
    /// Looks up a contact by email. The first match wins.
    async fn find_contact_by_email(&self, email: &str) -> ApiResult<Option<ContactId>>;

    /// Creates a contact and returns its id.
    async fn create_contact(&self, contact: &NewContact) -> ApiResult<ContactId>;

    /// Returns the contact's memberships on every list. Memberships in a state
    /// other than unconfirmed, synced or unsubscribed (e.g. bounced) are left out.
    async fn contact_lists(&self, contact_id: &ContactId) -> ApiResult<Vec<ContactListMembership>>;

    /// Returns every tag association on the contact.
    async fn contact_tags(&self, contact_id: &ContactId) -> ApiResult<Vec<ContactTag>>;

    /// Applies a tag to the contact.
    async fn apply_tag(&self, contact_id: &ContactId, tag_id: &TagId) -> ApiResult<()>;

    /// Removes a tag association by its association id.
    async fn remove_contact_tag(&self, association_id: &ContactTagId) -> ApiResult<()>;

    /// Sets the contact's status on a list.
    async fn set_list_status(
        &self,
        contact_id: &ContactId,
        list_id: &ListId,
        status: ListStatus,
    ) -> ApiResult<()>;

    /// Returns every list in the account.
    async fn lists(&self) -> ApiResult<Vec<RemoteList>>;

    /// Returns every tag in the account.
    async fn tags(&self) -> ApiResult<Vec<RemoteTag>>;
}
