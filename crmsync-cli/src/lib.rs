//! Configuration and batch wiring for the `crmsync` binary.

use anyhow::{Context, Result, bail};
use crmsync_client::{ActiveCampaignClient, CrmApi, CrmConfig};
use crmsync_store::{PersonStore, SqliteStore};
use crmsync_sync::{BatchRunner, BatchSummary, SyncConfig, SyncContext, SyncPerson};
use crmsync_types::PersonId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Environment variable that overrides `crm.api_token`.
pub const API_TOKEN_ENV: &str = "CRMSYNC_API_TOKEN";

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub crm: CrmConfig,
    pub sync: SyncConfig,
    /// SQLite database holding persons and contact mappings.
    pub database_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            crm: CrmConfig::default(),
            sync: SyncConfig::default(),
            database_path: PathBuf::from("crmsync.db"),
        }
    }
}

impl AppConfig {
    /// Reads a JSON config file, then applies [`API_TOKEN_ENV`] if set.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_json(&raw)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config.with_api_token_override(std::env::var(API_TOKEN_ENV).ok()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Replaces the configured token with `token`, unless it is empty or absent.
    pub fn with_api_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.crm.api_token = token;
        }
        self
    }
}

/// Syncs every stored person (or just `person`) against the configured CRM.
pub async fn run(config: &AppConfig, person: Option<PersonId>) -> Result<BatchSummary> {
    if config.crm.api_token.is_empty() {
        bail!("no CRM API token configured (set crm.api_token or {API_TOKEN_ENV})");
    }
    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    let api = ActiveCampaignClient::new(&config.crm)?;
    info!("Using CRM at {}", api.base_url());
    run_with(Arc::new(api), store, &config.sync, person).await
}

/// Same as [`run`] with the CRM client and store supplied by the caller.
pub async fn run_with(
    api: Arc<dyn CrmApi>,
    store: SqliteStore,
    config: &SyncConfig,
    person: Option<PersonId>,
) -> Result<BatchSummary> {
    let context = SyncContext::load(api.as_ref(), config)
        .await
        .context("failed to load the CRM list and tag catalog")?;

    let persons = match person {
        Some(id) => vec![
            store
                .get_person(&id)?
                .with_context(|| format!("person {id} not found"))?,
        ],
        None => store.list_persons()?,
    };

    let sync = SyncPerson::new(
        api,
        Arc::new(store.clone()),
        Arc::new(store),
        Arc::new(context),
    );
    Ok(BatchRunner::new(sync, config).run(persons).await)
}
