//! Store traits consumed by the sync engine.

use crate::error::StorageResult;
use crmsync_types::{ContactId, ContactMapping, Person, PersonId};

/// Read/update access to local person records.
pub trait PersonStore: Send + Sync {
    /// Inserts a new person.
    fn insert_person(&self, person: &Person) -> StorageResult<()>;

    /// Loads a person by id.
    fn get_person(&self, id: &PersonId) -> StorageResult<Option<Person>>;

    /// Loads a person by email (exact match).
    fn find_person_by_email(&self, email: &str) -> StorageResult<Option<Person>>;

    /// Lists every person, in insertion order.
    fn list_persons(&self) -> StorageResult<Vec<Person>>;

    /// Writes `product` / `company` into whichever preference is still unset.
    /// A preference that is already decided is never overwritten.
    fn fill_unset_preferences(
        &self,
        id: &PersonId,
        product: bool,
        company: bool,
    ) -> StorageResult<()>;

    /// Flags the person so future runs skip it.
    fn set_sync_disabled(&self, id: &PersonId) -> StorageResult<()>;
}

/// CRUD access to the contact mapping cache.
pub trait MappingStore: Send + Sync {
    /// Loads the mapping for a person.
    fn find_mapping_by_person(&self, person_id: &PersonId)
    -> StorageResult<Option<ContactMapping>>;

    /// Loads the mapping pointing at a remote contact.
    fn find_mapping_by_contact(
        &self,
        contact_id: &ContactId,
    ) -> StorageResult<Option<ContactMapping>>;

    /// Creates a mapping. Fails with `UniqueViolation` if the person or the
    /// contact is already mapped.
    fn create_mapping(&self, mapping: &ContactMapping) -> StorageResult<()>;

    /// Overwrites the cached state of an existing mapping.
    fn update_mapping(&self, mapping: &ContactMapping) -> StorageResult<()>;

    /// Deletes any mapping pointing at the contact. Returns how many rows went.
    fn delete_mapping_by_contact(&self, contact_id: &ContactId) -> StorageResult<usize>;
}
