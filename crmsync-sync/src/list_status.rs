//! Converges a mapping's cached list status to the desired one.

use crate::error::SyncResult;
use crmsync_client::CrmApi;
use crmsync_store::MappingStore;
use crmsync_types::{ContactMapping, ListId, ListStatus};
use tracing::info;

/// List-status synchronizer for the engine's own list.
pub struct ListStatusSync<'a> {
    api: &'a dyn CrmApi,
    mappings: &'a dyn MappingStore,
    list_id: &'a ListId,
}

impl<'a> ListStatusSync<'a> {
    pub fn new(api: &'a dyn CrmApi, mappings: &'a dyn MappingStore, list_id: &'a ListId) -> Self {
        Self {
            api,
            mappings,
            list_id,
        }
    }

    /// Pushes `desired` if it differs from the cached status.
    ///
    /// The remote write happens before the cache write: if the process dies
    /// in between, the cache is stale and the next run pushes again.
    pub async fn sync(&self, mapping: &mut ContactMapping, desired: ListStatus) -> SyncResult<()> {
        if mapping.list_status == desired {
            return Ok(());
        }

        info!("{}: Updating list status to {}.", mapping, desired);
        self.api
            .set_list_status(&mapping.contact_id, self.list_id, desired)
            .await?;
        mapping.list_status = desired;
        self.mappings.update_mapping(mapping)?;
        Ok(())
    }
}
