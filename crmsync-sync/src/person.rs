//! Per-person orchestrator.

use crate::error::{SyncError, SyncResult};
use crate::list_status::ListStatusSync;
use crate::policy::SyncContext;
use crate::resolver::{ContactResolver, Resolution};
use crate::tags::TagSync;
use crmsync_client::{ApiError, CrmApi};
use crmsync_store::{MappingStore, PersonStore, StorageError};
use crmsync_types::{Person, PersonId};
use std::sync::Arc;
use tracing::{debug, warn};

/// What a call to [`SyncPerson::sync`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The person is flagged `sync_disabled`; nothing was touched.
    Skipped,
    /// The person is in line with the CRM.
    Synced(Resolution),
    /// The CRM rejected the person's email; the person is now flagged.
    Disabled,
}

/// Reconciles one person with the CRM.
///
/// Cheap to clone: every collaborator sits behind an `Arc`, so a batch can
/// hand one copy to each in-flight person.
#[derive(Clone)]
pub struct SyncPerson {
    api: Arc<dyn CrmApi>,
    persons: Arc<dyn PersonStore>,
    mappings: Arc<dyn MappingStore>,
    context: Arc<SyncContext>,
}

impl SyncPerson {
    pub fn new(
        api: Arc<dyn CrmApi>,
        persons: Arc<dyn PersonStore>,
        mappings: Arc<dyn MappingStore>,
        context: Arc<SyncContext>,
    ) -> Self {
        Self {
            api,
            persons,
            mappings,
            context,
        }
    }

    /// Brings the CRM in line with `person`.
    ///
    /// Running it again without any external change issues no mutating call.
    pub async fn sync(&self, person: &Person) -> SyncResult<SyncOutcome> {
        if person.sync_disabled {
            warn!("Person {} was flagged sync_disabled. Skipping.", person.id);
            return Ok(SyncOutcome::Skipped);
        }

        match self.reconcile(person.clone()).await {
            Ok(resolution) => Ok(SyncOutcome::Synced(resolution)),
            Err(e) => self.handle_error(person, e),
        }
    }

    /// Reloads the person from the store, then syncs them.
    pub async fn sync_by_id(&self, id: &PersonId) -> SyncResult<SyncOutcome> {
        let person = self
            .persons
            .get_person(id)?
            .ok_or_else(|| StorageError::NotFound(format!("person {id}")))?;
        self.sync(&person).await
    }

    async fn reconcile(&self, mut person: Person) -> SyncResult<Resolution> {
        let api = self.api.as_ref();
        let mappings = self.mappings.as_ref();

        let (mut mapping, resolution) =
            ContactResolver::new(api, self.persons.as_ref(), mappings, &self.context)
                .resolve(&mut person)
                .await?;
        debug!("Resolved {} ({:?})", mapping, resolution);

        // Preferences may have been filled in by the resolver.
        let expected = self.context.expected_state(&person);
        ListStatusSync::new(api, mappings, self.context.synced_list_id())
            .sync(&mut mapping, expected.list_status)
            .await?;
        TagSync::new(api, mappings)
            .sync(&mut mapping, &expected.tag_ids)
            .await?;

        if mapping.deactivated {
            mapping.deactivated = false;
            mappings.update_mapping(&mapping)?;
            warn!("Reactivated {}", mapping);
        }
        Ok(resolution)
    }

    fn handle_error(&self, person: &Person, error: SyncError) -> SyncResult<SyncOutcome> {
        match error {
            SyncError::Api(ApiError::InvalidContactIdentifier(reason)) => {
                self.persons.set_sync_disabled(&person.id)?;
                warn!(
                    "Disabled sync for person {}; the CRM rejected {:?}: {}",
                    person.id, person.email, reason
                );
                Ok(SyncOutcome::Disabled)
            }
            SyncError::Storage(source @ StorageError::UniqueViolation(_)) => {
                Err(SyncError::ConcurrentMapping {
                    person_id: person.id,
                    source,
                })
            }
            other => Err(other),
        }
    }
}
