//! Shared fixtures for engine tests.

#![allow(dead_code)]

use crmsync_client::mock::MockCrm;
use crmsync_store::{MappingStore, PersonStore, SqliteStore};
use crmsync_sync::{SyncContext, SyncPerson};
use crmsync_types::{ContactMapping, ListId, Person, PersonId, TagId};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const SYNCED_LIST: &str = "1";
pub const COMPANY_NEWS_LIST: &str = "2";
pub const PRODUCT_TAG: &str = "7";
pub const COMPANY_TAG: &str = "12";
pub const DEACTIVATED_TAG: &str = "13";

/// Installs a test-friendly subscriber once per binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Catalog matching the ids of the `MockCrm` built by [`Harness::new`].
pub fn test_context() -> SyncContext {
    SyncContext::new(ListId::new(SYNCED_LIST))
        .with_company_news_list(ListId::new(COMPANY_NEWS_LIST))
        .with_product_newsletter_tag(TagId::new(PRODUCT_TAG))
        .with_company_newsletter_tag(TagId::new(COMPANY_TAG))
        .with_deactivated_tag(TagId::new(DEACTIVATED_TAG))
}

pub fn tag_set(ids: &[&str]) -> BTreeSet<TagId> {
    ids.iter().map(|id| TagId::new(*id)).collect()
}

/// Mock CRM, in-memory store and a context wired together.
pub struct Harness {
    pub crm: Arc<MockCrm>,
    pub store: SqliteStore,
    pub context: Arc<SyncContext>,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        let crm = MockCrm::new();
        crm.add_list(SYNCED_LIST, "crmsync");
        crm.add_list(COMPANY_NEWS_LIST, "Company News");
        crm.add_tag(PRODUCT_TAG, "newsletter:product");
        crm.add_tag(COMPANY_TAG, "newsletter:company");
        crm.add_tag(DEACTIVATED_TAG, "crmsync:deactivated");
        Self {
            crm: Arc::new(crm),
            store: SqliteStore::open_in_memory().unwrap(),
            context: Arc::new(test_context()),
        }
    }

    /// A `SyncPerson` over the harness collaborators.
    pub fn sync_person(&self) -> SyncPerson {
        self.sync_person_with_mappings(Arc::new(self.store.clone()))
    }

    /// Same as [`Harness::sync_person`] with a custom mapping store.
    pub fn sync_person_with_mappings(&self, mappings: Arc<dyn MappingStore>) -> SyncPerson {
        SyncPerson::new(
            self.crm.clone(),
            Arc::new(self.store.clone()),
            mappings,
            self.context.clone(),
        )
    }

    /// Stores a new person and returns it.
    pub fn insert(&self, email: &str, name: &str) -> Person {
        let person = Person::new(email, name);
        self.store.insert_person(&person).unwrap();
        person
    }

    pub fn reload(&self, id: &PersonId) -> Person {
        self.store.get_person(id).unwrap().unwrap()
    }

    pub fn mapping(&self, id: &PersonId) -> ContactMapping {
        self.store.find_mapping_by_person(id).unwrap().unwrap()
    }
}
