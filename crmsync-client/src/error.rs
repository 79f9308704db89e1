//! CRM client error types.

use thiserror::Error;

/// Result type for CRM calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while talking to the CRM.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The CRM refused the contact's identity (malformed or rejected email).
    #[error("CRM rejected the contact identifier: {0}")]
    InvalidContactIdentifier(String),

    #[error("CRM request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected CRM response: {0}")]
    UnexpectedResponse(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Returns true if the CRM rejected the contact's email.
    pub fn is_invalid_contact(&self) -> bool {
        matches!(self, ApiError::InvalidContactIdentifier(_))
    }

    /// Returns the HTTP status if the CRM answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
