//! The local person record and its newsletter preferences.

use crate::ids::PersonId;
use serde::{Deserialize, Serialize};

/// A tri-state newsletter preference.
///
/// `Unset` means nobody has decided yet. The sync engine may fill an `Unset`
/// preference with an inferred default, but never touches `Yes` or `No`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Preference {
    #[default]
    Unset,
    Yes,
    No,
}

impl Preference {
    /// Returns true if no decision has been recorded.
    #[must_use]
    pub fn is_unset(self) -> bool {
        self == Preference::Unset
    }

    /// Returns true only for an explicit opt-in.
    #[must_use]
    pub fn is_yes(self) -> bool {
        self == Preference::Yes
    }

    /// Returns `self` if decided, otherwise the given default.
    #[must_use]
    pub fn or_default_to(self, value: bool) -> Self {
        match self {
            Preference::Unset => Preference::from(value),
            decided => decided,
        }
    }
}

impl From<bool> for Preference {
    fn from(value: bool) -> Self {
        if value { Preference::Yes } else { Preference::No }
    }
}

impl From<Option<bool>> for Preference {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Preference::Unset, Preference::from)
    }
}

impl From<Preference> for Option<bool> {
    fn from(value: Preference) -> Self {
        match value {
            Preference::Unset => None,
            Preference::Yes => Some(true),
            Preference::No => Some(false),
        }
    }
}

/// A canonical local person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub email: String,
    /// Display name, split into first/last only when creating a remote contact.
    pub name: String,
    /// Set when the person must never be pushed to the CRM again
    /// (e.g. the CRM rejected their email).
    #[serde(default)]
    pub sync_disabled: bool,
    #[serde(default)]
    pub wants_product_newsletter: Preference,
    #[serde(default)]
    pub wants_company_newsletter: Preference,
}

impl Person {
    /// Creates a person with unset preferences and sync enabled.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PersonId::new(),
            email: email.into(),
            name: name.into(),
            sync_disabled: false,
            wants_product_newsletter: Preference::Unset,
            wants_company_newsletter: Preference::Unset,
        }
    }

    /// Returns true if either preference is still undecided.
    #[must_use]
    pub fn has_unset_preferences(&self) -> bool {
        self.wants_product_newsletter.is_unset() || self.wants_company_newsletter.is_unset()
    }

    /// Fills unset preferences with the given values. Decided preferences are
    /// left alone. Returns true if anything changed.
    pub fn fill_unset_preferences(&mut self, product: bool, company: bool) -> bool {
        let before = (self.wants_product_newsletter, self.wants_company_newsletter);
        self.wants_product_newsletter = self.wants_product_newsletter.or_default_to(product);
        self.wants_company_newsletter = self.wants_company_newsletter.or_default_to(company);
        before != (self.wants_product_newsletter, self.wants_company_newsletter)
    }
}

/// A display name split for the CRM's first/last name fields.
///
/// The first whitespace-separated segment is the first name and the rest is
/// the last name. A single-segment name becomes the first name in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    first: String,
    last: String,
}

impl PersonName {
    pub fn parse(full: &str) -> Self {
        let mut segments = full.split_whitespace();
        let first = segments.next().unwrap_or_default().to_string();
        let last = segments.collect::<Vec<_>>().join(" ");
        Self { first, last }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn last(&self) -> &str {
        &self.last
    }
}
