//! Sync engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the sync engine.
///
/// List and tag names are resolved against the CRM catalog once per batch by
/// [`SyncContext::load`](crate::SyncContext::load).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Id of the list this engine owns; every mapped contact has a status on it.
    pub synced_list_id: String,
    /// Name of the legacy list whose subscribers default to company news.
    pub company_news_list: String,
    /// Tag for contacts wanting the product newsletter.
    pub product_newsletter_tag: String,
    /// Tag for contacts wanting the company newsletter.
    pub company_newsletter_tag: String,
    /// Tag applied by the deactivation job; removed when a person syncs again.
    pub deactivated_tag: String,
    /// Maximum persons reconciled at once.
    pub concurrency: usize,
    /// Re-run a person once after a concurrent-mapping race.
    pub retry_concurrent_mapping: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            synced_list_id: "1".to_string(),
            company_news_list: "Company News".to_string(),
            product_newsletter_tag: "newsletter:product".to_string(),
            company_newsletter_tag: "newsletter:company".to_string(),
            deactivated_tag: "crmsync:deactivated".to_string(),
            concurrency: 4,
            retry_concurrent_mapping: false,
        }
    }
}
