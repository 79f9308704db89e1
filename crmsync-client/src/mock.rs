//! An in-memory CRM for testing.
//!
//! `MockCrm` keeps contacts, list memberships and tag associations in memory,
//! behaves like the real API for every `CrmApi` call, and records each call
//! so tests can assert exactly which remote operations a sync issued.

use crate::api::{ContactListMembership, ContactTag, CrmApi, NewContact, RemoteList, RemoteTag};
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use crmsync_types::{ContactId, ContactTagId, ListId, ListStatus, TagId};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// One recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrmCall {
    FindContact(String),
    CreateContact(NewContact),
    ContactLists(ContactId),
    ContactTags(ContactId),
    ApplyTag(ContactId, TagId),
    RemoveContactTag(ContactTagId),
    SetListStatus(ContactId, ListId, ListStatus),
    Lists,
    Tags,
}

impl CrmCall {
    /// Returns true for calls that change remote state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            CrmCall::CreateContact(_)
                | CrmCall::ApplyTag(..)
                | CrmCall::RemoveContactTag(_)
                | CrmCall::SetListStatus(..)
        )
    }
}

#[derive(Debug, Default)]
struct MockState {
    next_id: u64,
    contacts: Vec<(ContactId, NewContact)>,
    memberships: HashMap<ContactId, Vec<ContactListMembership>>,
    contact_tags: HashMap<ContactId, Vec<ContactTag>>,
    lists: Vec<RemoteList>,
    tags: Vec<RemoteTag>,
    rejected_emails: HashSet<String>,
    calls: Vec<CrmCall>,
}

impl MockState {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

/// In-memory `CrmApi` implementation.
#[derive(Debug, Default)]
pub struct MockCrm {
    state: Mutex<MockState>,
}

impl MockCrm {
    /// Creates an empty mock CRM.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds a pre-existing contact and returns its id.
    pub fn add_contact(&self, email: &str) -> ContactId {
        let mut state = self.state();
        let id = ContactId::new(state.next_id());
        let contact = NewContact {
            email: email.to_string(),
            first_name: String::new(),
            last_name: String::new(),
        };
        state.contacts.push((id.clone(), contact));
        id
    }

    /// Adds a list membership to an existing contact.
    pub fn add_membership(&self, contact_id: &ContactId, list_id: &ListId, status: ListStatus) {
        self.state()
            .memberships
            .entry(contact_id.clone())
            .or_default()
            .push(ContactListMembership {
                list_id: list_id.clone(),
                status,
            });
    }

    /// Attaches a tag to a contact and returns the association id.
    pub fn add_contact_tag(&self, contact_id: &ContactId, tag_id: &TagId) -> ContactTagId {
        let mut state = self.state();
        let id = ContactTagId::new(format!("ct-{}", state.next_id()));
        state
            .contact_tags
            .entry(contact_id.clone())
            .or_default()
            .push(ContactTag {
                id: id.clone(),
                tag_id: tag_id.clone(),
            });
        id
    }

    /// Drops a tag association behind the engine's back, as happens when a
    /// tag is deleted in the CRM.
    pub fn drop_contact_tag(&self, contact_id: &ContactId, tag_id: &TagId) {
        if let Some(tags) = self.state().contact_tags.get_mut(contact_id) {
            tags.retain(|ct| &ct.tag_id != tag_id);
        }
    }

    /// Adds a list to the account catalog.
    pub fn add_list(&self, id: &str, name: &str) {
        self.state().lists.push(RemoteList {
            id: ListId::new(id),
            name: name.to_string(),
        });
    }

    /// Adds a tag to the account catalog.
    pub fn add_tag(&self, id: &str, name: &str) {
        self.state().tags.push(RemoteTag {
            id: TagId::new(id),
            name: name.to_string(),
        });
    }

    /// Makes contact creation fail with an invalid-email error for `email`.
    pub fn reject_email(&self, email: &str) {
        self.state().rejected_emails.insert(email.to_string());
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> Vec<CrmCall> {
        self.state().calls.clone()
    }

    /// Only the calls that changed remote state.
    pub fn mutations(&self) -> Vec<CrmCall> {
        self.calls().into_iter().filter(CrmCall::is_mutation).collect()
    }

    /// Forgets recorded calls, keeping remote state.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Number of contacts in the mock.
    pub fn contact_count(&self) -> usize {
        self.state().contacts.len()
    }

    /// Current tag ids on a contact.
    pub fn tag_ids_of(&self, contact_id: &ContactId) -> Vec<TagId> {
        self.state()
            .contact_tags
            .get(contact_id)
            .map(|tags| tags.iter().map(|ct| ct.tag_id.clone()).collect())
            .unwrap_or_default()
    }

    fn record(&self, call: CrmCall) {
        self.state().calls.push(call);
    }
}

#[async_trait]
impl CrmApi for MockCrm {
    async fn find_contact_by_email(&self, email: &str) -> ApiResult<Option<ContactId>> {
        self.record(CrmCall::FindContact(email.to_string()));
        Ok(self
            .state()
            .contacts
            .iter()
            .find(|(_, c)| c.email == email)
            .map(|(id, _)| id.clone()))
    }

    async fn create_contact(&self, contact: &NewContact) -> ApiResult<ContactId> {
        self.record(CrmCall::CreateContact(contact.clone()));
        let mut state = self.state();
        if state.rejected_emails.contains(&contact.email) {
            return Err(ApiError::InvalidContactIdentifier(format!(
                "Email address is invalid: {}",
                contact.email
            )));
        }
        let id = ContactId::new(state.next_id());
        state.contacts.push((id.clone(), contact.clone()));
        Ok(id)
    }

    async fn contact_lists(&self, contact_id: &ContactId) -> ApiResult<Vec<ContactListMembership>> {
        self.record(CrmCall::ContactLists(contact_id.clone()));
        Ok(self
            .state()
            .memberships
            .get(contact_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn contact_tags(&self, contact_id: &ContactId) -> ApiResult<Vec<ContactTag>> {
        self.record(CrmCall::ContactTags(contact_id.clone()));
        Ok(self
            .state()
            .contact_tags
            .get(contact_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn apply_tag(&self, contact_id: &ContactId, tag_id: &TagId) -> ApiResult<()> {
        self.record(CrmCall::ApplyTag(contact_id.clone(), tag_id.clone()));
        self.add_contact_tag(contact_id, tag_id);
        Ok(())
    }

    async fn remove_contact_tag(&self, association_id: &ContactTagId) -> ApiResult<()> {
        self.record(CrmCall::RemoveContactTag(association_id.clone()));
        let mut state = self.state();
        for tags in state.contact_tags.values_mut() {
            if let Some(pos) = tags.iter().position(|ct| &ct.id == association_id) {
                tags.remove(pos);
                return Ok(());
            }
        }
        Err(ApiError::NotFound(format!("contactTag {association_id}")))
    }

    async fn set_list_status(
        &self,
        contact_id: &ContactId,
        list_id: &ListId,
        status: ListStatus,
    ) -> ApiResult<()> {
        self.record(CrmCall::SetListStatus(
            contact_id.clone(),
            list_id.clone(),
            status,
        ));
        let mut state = self.state();
        let memberships = state.memberships.entry(contact_id.clone()).or_default();
        memberships.retain(|m| &m.list_id != list_id);
        memberships.push(ContactListMembership {
            list_id: list_id.clone(),
            status,
        });
        Ok(())
    }

    async fn lists(&self) -> ApiResult<Vec<RemoteList>> {
        self.record(CrmCall::Lists);
        Ok(self.state().lists.clone())
    }

    async fn tags(&self) -> ApiResult<Vec<RemoteTag>> {
        self.record(CrmCall::Tags);
        Ok(self.state().tags.clone())
    }
}
