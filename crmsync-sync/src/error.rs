//! Error types for the sync engine.

use crmsync_client::ApiError;
use crmsync_store::StorageError;
use crmsync_types::PersonId;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while reconciling a person.
#[derive(Debug, Error)]
pub enum SyncError {
    /// CRM call failed.
    #[error("CRM error: {0}")]
    Api(#[from] ApiError),

    /// Local store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Mapping creation hit a uniqueness constraint.
    #[error(
        "sync for person {person_id} failed with a unique key violation. This is fine if \
         the sync ran twice at once (e.g. while the contact mapping cache was being \
         rebuilt), otherwise it's a bug: {source}"
    )]
    ConcurrentMapping {
        person_id: PersonId,
        #[source]
        source: StorageError,
    },
}

impl SyncError {
    /// Returns true if running the person again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::ConcurrentMapping { .. })
    }
}
