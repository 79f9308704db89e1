use crmsync_cli::{AppConfig, run, run_with};
use crmsync_client::mock::MockCrm;
use crmsync_store::{MappingStore, PersonStore, SqliteStore};
use crmsync_sync::SyncConfig;
use crmsync_types::{Person, PersonId};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

fn mock_crm() -> Arc<MockCrm> {
    let crm = MockCrm::new();
    crm.add_list("1", "crmsync");
    crm.add_tag("7", "newsletter:product");
    Arc::new(crm)
}

// ── Config ───────────────────────────────────────────────────────

#[test]
fn config_file_with_partial_sections() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "crm": {{ "api_base_url": "https://acme.api-us1.com", "api_token": "secret" }},
            "sync": {{ "concurrency": 8 }},
            "database_path": "/var/lib/crmsync/db.sqlite"
        }}"#
    )
    .unwrap();

    let config = AppConfig::from_json(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
    assert_eq!(config.crm.api_base_url, "https://acme.api-us1.com");
    assert_eq!(config.crm.api_token, "secret");
    assert_eq!(config.crm.timeout_secs, 30);
    assert_eq!(config.sync.concurrency, 8);
    assert_eq!(config.sync.synced_list_id, "1");
    assert_eq!(config.database_path, PathBuf::from("/var/lib/crmsync/db.sqlite"));
}

#[test]
fn empty_config_uses_defaults() {
    let config = AppConfig::from_json("{}").unwrap();
    assert_eq!(config.database_path, PathBuf::from("crmsync.db"));
    assert!(config.crm.api_token.is_empty());
}

#[test]
fn malformed_config_is_rejected() {
    assert!(AppConfig::from_json(r#"{"sync": {"concurrency": "many"}}"#).is_err());
}

#[test]
fn missing_config_file_names_the_path() {
    let err = AppConfig::load(std::path::Path::new("/nonexistent/crmsync.json")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/crmsync.json"));
}

#[test]
fn token_override_replaces_configured_token() {
    let mut config = AppConfig::default();
    config.crm.api_token = "from-file".to_string();

    let config = config.with_api_token_override(Some("from-env".to_string()));
    assert_eq!(config.crm.api_token, "from-env");

    let config = config.with_api_token_override(Some(String::new()));
    assert_eq!(config.crm.api_token, "from-env");

    let config = config.with_api_token_override(None);
    assert_eq!(config.crm.api_token, "from-env");
}

#[tokio::test]
async fn run_requires_a_token() {
    let err = run(&AppConfig::default(), None).await.unwrap_err();
    assert!(err.to_string().contains("no CRM API token"));
}

// ── Batch wiring ─────────────────────────────────────────────────

#[tokio::test]
async fn run_with_syncs_every_stored_person() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("crmsync.db")).unwrap();
    let first = Person::new("one@example.com", "One");
    let second = Person::new("two@example.com", "Two");
    store.insert_person(&first).unwrap();
    store.insert_person(&second).unwrap();
    let crm = mock_crm();

    let summary = run_with(crm.clone(), store.clone(), &SyncConfig::default(), None)
        .await
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.created, 2);
    assert_eq!(crm.contact_count(), 2);
    assert!(store.find_mapping_by_person(&second.id).unwrap().is_some());
}

#[tokio::test]
async fn run_with_single_person() {
    let store = SqliteStore::open_in_memory().unwrap();
    let first = Person::new("one@example.com", "One");
    let second = Person::new("two@example.com", "Two");
    store.insert_person(&first).unwrap();
    store.insert_person(&second).unwrap();
    let crm = mock_crm();

    let summary = run_with(crm.clone(), store.clone(), &SyncConfig::default(), Some(second.id))
        .await
        .unwrap();

    assert_eq!(summary.synced, 1);
    assert!(store.find_mapping_by_person(&first.id).unwrap().is_none());
    assert!(store.find_mapping_by_person(&second.id).unwrap().is_some());
}

#[tokio::test]
async fn run_with_unknown_person_fails() {
    let store = SqliteStore::open_in_memory().unwrap();
    let err = run_with(mock_crm(), store, &SyncConfig::default(), Some(PersonId::new()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}
