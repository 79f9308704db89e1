//! The contact mapping: the engine's durable cache of what was last pushed.

use crate::ids::{ContactId, PersonId, TagId};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Status of a contact on the list the engine manages.
///
/// Variants correspond to the CRM's contact-list status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Unconfirmed,
    Synced,
    Unsubscribed,
}

impl ListStatus {
    /// The CRM wire code for this status.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            ListStatus::Unconfirmed => 0,
            ListStatus::Synced => 1,
            ListStatus::Unsubscribed => 2,
        }
    }

    /// Maps a CRM wire code back to a status.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ListStatus::Unconfirmed),
            1 => Some(ListStatus::Synced),
            2 => Some(ListStatus::Unsubscribed),
            _ => None,
        }
    }

    /// Stable name used for persistence.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ListStatus::Unconfirmed => "unconfirmed",
            ListStatus::Synced => "synced",
            ListStatus::Unsubscribed => "unsubscribed",
        }
    }
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unconfirmed" => Ok(ListStatus::Unconfirmed),
            "synced" => Ok(ListStatus::Synced),
            "unsubscribed" => Ok(ListStatus::Unsubscribed),
            other => Err(Error::InvalidListStatus(other.to_string())),
        }
    }
}

/// Links a local person to a remote contact, plus the last-pushed state.
///
/// At most one mapping exists per person and per remote contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMapping {
    pub person_id: PersonId,
    pub contact_id: ContactId,
    pub list_status: ListStatus,
    pub tag_ids: BTreeSet<TagId>,
    pub deactivated: bool,
}

impl ContactMapping {
    /// Creates an active mapping.
    pub fn new(
        person_id: PersonId,
        contact_id: ContactId,
        list_status: ListStatus,
        tag_ids: impl IntoIterator<Item = TagId>,
    ) -> Self {
        Self {
            person_id,
            contact_id,
            list_status,
            tag_ids: tag_ids.into_iter().collect(),
            deactivated: false,
        }
    }
}

impl fmt::Display for ContactMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "person {} / contact {}", self.person_id, self.contact_id)
    }
}
