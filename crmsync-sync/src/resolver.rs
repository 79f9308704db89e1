//! Links a person to a remote contact: cached, adopted or newly created.

use crate::error::SyncResult;
use crate::policy::{SyncContext, expected_list_status};
use crmsync_client::{CrmApi, NewContact};
use crmsync_store::{MappingStore, PersonStore};
use crmsync_types::{ContactId, ContactMapping, Person, PersonName, TagId};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// How a person's mapping was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// An existing mapping was returned as-is.
    Cached,
    /// A contact with the person's email already existed remotely.
    Adopted,
    /// A new remote contact was created.
    Created,
}

/// Finds, adopts or creates the remote contact for a person.
pub struct ContactResolver<'a> {
    api: &'a dyn CrmApi,
    persons: &'a dyn PersonStore,
    mappings: &'a dyn MappingStore,
    context: &'a SyncContext,
}

impl<'a> ContactResolver<'a> {
    pub fn new(
        api: &'a dyn CrmApi,
        persons: &'a dyn PersonStore,
        mappings: &'a dyn MappingStore,
        context: &'a SyncContext,
    ) -> Self {
        Self {
            api,
            persons,
            mappings,
            context,
        }
    }

    /// Returns the person's mapping, trying in order: the cached mapping,
    /// adopting a remote contact with the same email, creating a contact.
    ///
    /// Adoption and creation may fill the person's unset preferences; the
    /// caller's `person` reflects that afterwards.
    pub async fn resolve(&self, person: &mut Person) -> SyncResult<(ContactMapping, Resolution)> {
        // Mapped contacts are assumed not to be deleted remotely.
        if let Some(mapping) = self.mappings.find_mapping_by_person(&person.id)? {
            return Ok((mapping, Resolution::Cached));
        }
        if let Some(mapping) = self.adopt_existing_contact(person).await? {
            return Ok((mapping, Resolution::Adopted));
        }
        let mapping = self.create_and_map_new_contact(person).await?;
        Ok((mapping, Resolution::Created))
    }

    async fn adopt_existing_contact(&self, person: &mut Person) -> SyncResult<Option<ContactMapping>> {
        let Some(contact_id) = self.api.find_contact_by_email(&person.email).await? else {
            return Ok(None);
        };

        if person.has_unset_preferences() {
            let memberships = self.api.contact_lists(&contact_id).await?;
            let (product, company) = self.context.infer_preferences(&memberships);
            self.fill_unset_preferences(
                person,
                product,
                company,
                &format!("inferred from contact {contact_id}'s list status"),
            )?;
        }

        let list_status = expected_list_status(person);
        self.api
            .set_list_status(&contact_id, self.context.synced_list_id(), list_status)
            .await?;
        let tag_ids = self.relevant_tag_ids(&contact_id).await?;

        // A stale row may still point at this contact, e.g. from a person
        // whose email has since changed.
        let removed = self.mappings.delete_mapping_by_contact(&contact_id)?;
        if removed > 0 {
            warn!("Removed {} stale mapping(s) for contact {}", removed, contact_id);
        }

        let mapping = ContactMapping::new(person.id, contact_id, list_status, tag_ids);
        self.mappings.create_mapping(&mapping)?;
        info!("Adopted existing contact for {}.", mapping);
        Ok(Some(mapping))
    }

    async fn relevant_tag_ids(&self, contact_id: &ContactId) -> SyncResult<BTreeSet<TagId>> {
        let tags = self.api.contact_tags(contact_id).await?;
        Ok(tags
            .into_iter()
            .map(|ct| ct.tag_id)
            .filter(|tag_id| self.context.is_relevant(tag_id))
            .collect())
    }

    async fn create_and_map_new_contact(&self, person: &mut Person) -> SyncResult<ContactMapping> {
        let name = PersonName::parse(&person.name);
        let contact_id = self
            .api
            .create_contact(&NewContact {
                email: person.email.clone(),
                first_name: name.first().to_string(),
                last_name: name.last().to_string(),
            })
            .await?;

        self.fill_unset_preferences(person, true, false, "default settings for new contact")?;

        let list_status = expected_list_status(person);
        self.api
            .set_list_status(&contact_id, self.context.synced_list_id(), list_status)
            .await?;

        // Tags are filled in by the tag synchronizer right after.
        let mapping = ContactMapping::new(person.id, contact_id, list_status, BTreeSet::new());
        self.mappings.create_mapping(&mapping)?;
        info!("Created new contact for {}.", mapping);
        Ok(mapping)
    }

    /// Preferences someone already decided on are never overwritten, e.g.
    /// when the mapping cache is cleared and rebuilt.
    fn fill_unset_preferences(
        &self,
        person: &mut Person,
        product: bool,
        company: bool,
        why: &str,
    ) -> SyncResult<()> {
        if !person.has_unset_preferences() {
            return Ok(());
        }
        self.persons.fill_unset_preferences(&person.id, product, company)?;
        if person.fill_unset_preferences(product, company) {
            info!(
                "Set newsletter preferences for person {} to product={:?}, company={:?} ({})",
                person.id, person.wants_product_newsletter, person.wants_company_newsletter, why
            );
        }
        Ok(())
    }
}
