//! Connection settings for the CRM.

use serde::{Deserialize, Serialize};

/// ActiveCampaign connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    /// Account base URL (e.g. `https://acme.api-us1.com`).
    pub api_base_url: String,
    /// Value of the `Api-Token` header.
    pub api_token: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Page size for the list/tag catalog endpoints.
    pub page_size: usize,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost".to_string(),
            api_token: String::new(),
            timeout_secs: 30,
            page_size: 100,
        }
    }
}
