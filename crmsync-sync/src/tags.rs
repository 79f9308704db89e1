//! Converges a mapping's cached tag set to the desired one.

use crate::error::SyncResult;
use crmsync_client::CrmApi;
use crmsync_store::MappingStore;
use crmsync_types::{ContactMapping, TagId};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Tag synchronizer.
///
/// Tags are applied by `(contact, tag)` but can only be removed through the
/// id of the contact-tag association, so removals need one extra read of the
/// contact's associations.
pub struct TagSync<'a> {
    api: &'a dyn CrmApi,
    mappings: &'a dyn MappingStore,
}

impl<'a> TagSync<'a> {
    pub fn new(api: &'a dyn CrmApi, mappings: &'a dyn MappingStore) -> Self {
        Self { api, mappings }
    }

    /// Applies missing tags, removes surplus ones, then caches `desired`.
    ///
    /// A surplus tag whose association no longer exists remotely (the tag was
    /// deleted in the CRM) is logged and skipped. The cache still records
    /// `desired`, since nothing short of recreating the tag could undo it.
    pub async fn sync(&self, mapping: &mut ContactMapping, desired: &BTreeSet<TagId>) -> SyncResult<()> {
        if &mapping.tag_ids == desired {
            return Ok(());
        }

        let to_apply: Vec<&TagId> = desired.difference(&mapping.tag_ids).collect();
        let to_remove: Vec<&TagId> = mapping.tag_ids.difference(desired).collect();
        info!(
            "{}: Updating tags. (current: {:?}, add: {:?}, remove: {:?})",
            mapping,
            mapping.tag_ids.iter().map(TagId::as_str).collect::<Vec<_>>(),
            to_apply.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            to_remove.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        );

        for tag_id in &to_apply {
            self.api.apply_tag(&mapping.contact_id, tag_id).await?;
        }

        if !to_remove.is_empty() {
            let associations = self.api.contact_tags(&mapping.contact_id).await?;
            for tag_id in &to_remove {
                match associations.iter().find(|ct| &ct.tag_id == *tag_id) {
                    Some(association) => self.api.remove_contact_tag(&association.id).await?,
                    None => warn!(
                        "Can't remove tag {} from {}; that contact tag association isn't found. Skipping.",
                        tag_id, mapping
                    ),
                }
            }
        }

        mapping.tag_ids = desired.clone();
        self.mappings.update_mapping(mapping)?;
        Ok(())
    }
}
