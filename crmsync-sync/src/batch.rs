//! Batch driver: reconciles many persons with bounded concurrency.

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::person::{SyncOutcome, SyncPerson};
use crate::resolver::Resolution;
use crmsync_types::{Person, PersonId};
use futures::stream::{self, StreamExt};
use std::fmt;
use tracing::{error, info, warn};

/// Why a person failed to sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Lost a mapping race with a concurrent sync of the same person/contact.
    ConcurrentMapping,
    /// A CRM call failed.
    Api,
    /// The local store failed.
    Storage,
}

impl From<&SyncError> for FailureKind {
    fn from(e: &SyncError) -> Self {
        match e {
            SyncError::ConcurrentMapping { .. } => FailureKind::ConcurrentMapping,
            SyncError::Api(_) => FailureKind::Api,
            SyncError::Storage(_) => FailureKind::Storage,
        }
    }
}

/// A person whose sync failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPerson {
    pub person_id: PersonId,
    pub kind: FailureKind,
    pub message: String,
}

/// Tally of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Persons now in line with the CRM, including adopted and created ones.
    pub synced: usize,
    /// Of `synced`, persons matched to a pre-existing contact.
    pub adopted: usize,
    /// Of `synced`, persons for whom a contact was created.
    pub created: usize,
    pub skipped: usize,
    pub disabled: usize,
    pub failures: Vec<FailedPerson>,
}

impl BatchSummary {
    /// Returns true if no person failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, person_id: PersonId, result: Result<SyncOutcome, SyncError>) {
        match result {
            Ok(SyncOutcome::Synced(resolution)) => {
                self.synced += 1;
                match resolution {
                    Resolution::Adopted => self.adopted += 1,
                    Resolution::Created => self.created += 1,
                    Resolution::Cached => {}
                }
            }
            Ok(SyncOutcome::Skipped) => self.skipped += 1,
            Ok(SyncOutcome::Disabled) => self.disabled += 1,
            Err(e) => self.failures.push(FailedPerson {
                person_id,
                kind: FailureKind::from(&e),
                message: e.to_string(),
            }),
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} synced ({} adopted, {} created), {} skipped, {} disabled, {} failed",
            self.synced,
            self.adopted,
            self.created,
            self.skipped,
            self.disabled,
            self.failures.len()
        )
    }
}

/// Runs [`SyncPerson`] over a set of persons.
///
/// A failure for one person never stops the batch.
pub struct BatchRunner {
    sync: SyncPerson,
    concurrency: usize,
    retry_concurrent_mapping: bool,
}

impl BatchRunner {
    pub fn new(sync: SyncPerson, config: &SyncConfig) -> Self {
        Self {
            sync,
            concurrency: config.concurrency.max(1),
            retry_concurrent_mapping: config.retry_concurrent_mapping,
        }
    }

    /// Reconciles every person, at most `concurrency` at a time.
    pub async fn run(&self, persons: Vec<Person>) -> BatchSummary {
        info!(
            "Syncing {} person(s) with concurrency {}",
            persons.len(),
            self.concurrency
        );

        let results: Vec<_> = stream::iter(persons)
            .map(|person| async move {
                let result = self.sync_one(&person).await;
                (person.id, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut summary = BatchSummary::default();
        for (person_id, result) in results {
            if let Err(e) = &result {
                error!("Sync failed for person {}: {}", person_id, e);
            }
            summary.record(person_id, result);
        }
        info!("Batch finished: {}", summary);
        summary
    }

    async fn sync_one(&self, person: &Person) -> Result<SyncOutcome, SyncError> {
        match self.sync.sync(person).await {
            Err(e) if self.retry_concurrent_mapping && e.is_retryable() => {
                warn!("Retrying person {} after: {}", person.id, e);
                // The winning run may have filled preferences; start from the stored row.
                self.sync.sync_by_id(&person.id).await
            }
            result => result,
        }
    }
}
