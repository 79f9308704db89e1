//! Desired-state policy and the per-batch list/tag catalog.

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crmsync_client::{ContactListMembership, CrmApi, RemoteTag};
use crmsync_types::{ListId, ListStatus, Person, TagId};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Desired list status for a person: synced while they want any newsletter.
/// An unset preference counts as not wanting it.
pub fn expected_list_status(person: &Person) -> ListStatus {
    if person.wants_product_newsletter.is_yes() || person.wants_company_newsletter.is_yes() {
        ListStatus::Synced
    } else {
        ListStatus::Unsubscribed
    }
}

/// What the CRM should hold for one person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedState {
    pub list_status: ListStatus,
    pub tag_ids: BTreeSet<TagId>,
}

/// Read-only catalog data shared by every reconciliation in a batch.
///
/// Build it once before fanning out (usually with [`SyncContext::load`]) and
/// share it behind an `Arc`. Nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContext {
    synced_list_id: ListId,
    company_news_list_id: Option<ListId>,
    product_newsletter_tag: Option<TagId>,
    company_newsletter_tag: Option<TagId>,
    deactivated_tag: Option<TagId>,
}

impl SyncContext {
    /// Creates a context with no catalog entries resolved.
    pub fn new(synced_list_id: ListId) -> Self {
        Self {
            synced_list_id,
            company_news_list_id: None,
            product_newsletter_tag: None,
            company_newsletter_tag: None,
            deactivated_tag: None,
        }
    }

    pub fn with_company_news_list(mut self, id: ListId) -> Self {
        self.company_news_list_id = Some(id);
        self
    }

    pub fn with_product_newsletter_tag(mut self, id: TagId) -> Self {
        self.product_newsletter_tag = Some(id);
        self
    }

    pub fn with_company_newsletter_tag(mut self, id: TagId) -> Self {
        self.company_newsletter_tag = Some(id);
        self
    }

    pub fn with_deactivated_tag(mut self, id: TagId) -> Self {
        self.deactivated_tag = Some(id);
        self
    }

    /// Resolves the configured list and tag names against the CRM catalog.
    /// Costs one `lists()` and one `tags()` call. Names missing from the
    /// catalog are logged and left unresolved.
    pub async fn load(api: &dyn CrmApi, config: &SyncConfig) -> SyncResult<Self> {
        let synced_list_id = ListId::new(config.synced_list_id.clone());
        let lists = api.lists().await?;

        if !lists.iter().any(|l| l.id == synced_list_id) {
            warn!("Synced list {} not found in the CRM account", synced_list_id);
        }
        let company_news_list_id = lists
            .iter()
            .find(|l| l.name == config.company_news_list)
            .map(|l| l.id.clone());
        if company_news_list_id.is_none() {
            warn!("List {:?} not found; company news defaults to off", config.company_news_list);
        }

        let tags = api.tags().await?;
        let context = Self {
            synced_list_id,
            company_news_list_id,
            product_newsletter_tag: find_tag(&tags, &config.product_newsletter_tag),
            company_newsletter_tag: find_tag(&tags, &config.company_newsletter_tag),
            deactivated_tag: find_tag(&tags, &config.deactivated_tag),
        };
        debug!("Loaded sync context: {:?}", context);
        Ok(context)
    }

    /// The list this engine owns.
    pub fn synced_list_id(&self) -> &ListId {
        &self.synced_list_id
    }

    /// The legacy company-news list, if it exists in the account.
    pub fn company_news_list_id(&self) -> Option<&ListId> {
        self.company_news_list_id.as_ref()
    }

    /// Every tag id the engine manages. Other tags on a contact are ignored.
    pub fn managed_tag_ids(&self) -> impl Iterator<Item = &TagId> {
        [
            &self.product_newsletter_tag,
            &self.company_newsletter_tag,
            &self.deactivated_tag,
        ]
        .into_iter()
        .flatten()
    }

    /// Returns true if the tag is managed by the engine.
    pub fn is_relevant(&self, tag_id: &TagId) -> bool {
        self.managed_tag_ids().any(|t| t == tag_id)
    }

    /// Desired tag ids for a person: one tag per newsletter they opted into.
    /// The deactivated tag is managed but never desired.
    pub fn expected_tag_ids(&self, person: &Person) -> BTreeSet<TagId> {
        let mut tags = BTreeSet::new();
        if person.wants_product_newsletter.is_yes() {
            tags.extend(self.product_newsletter_tag.clone());
        }
        if person.wants_company_newsletter.is_yes() {
            tags.extend(self.company_newsletter_tag.clone());
        }
        tags
    }

    /// Desired list status and tags for a person.
    pub fn expected_state(&self, person: &Person) -> ExpectedState {
        ExpectedState {
            list_status: expected_list_status(person),
            tag_ids: self.expected_tag_ids(person),
        }
    }

    /// Infers `(product, company)` newsletter defaults for a pre-existing
    /// contact from its memberships on other lists.
    ///
    /// Product news defaults on when the contact never unsubscribed from any
    /// list; unconfirmed memberships don't count against it. Company news
    /// additionally requires a subscription to the legacy company-news list.
    /// The synced list itself is ignored so a status this engine pushed
    /// earlier cannot feed back into the inference.
    pub fn infer_preferences(&self, memberships: &[ContactListMembership]) -> (bool, bool) {
        let relevant: Vec<&ContactListMembership> = memberships
            .iter()
            .filter(|m| m.list_id != self.synced_list_id)
            .collect();

        let no_unsubscribes = !relevant.iter().any(|m| m.is_unsubscribed());
        let on_company_news = relevant.iter().any(|m| {
            m.is_subscribed() && Some(&m.list_id) == self.company_news_list_id.as_ref()
        });
        (no_unsubscribes, no_unsubscribes && on_company_news)
    }
}

fn find_tag(tags: &[RemoteTag], name: &str) -> Option<TagId> {
    let found = tags.iter().find(|t| t.name == name).map(|t| t.id.clone());
    if found.is_none() {
        warn!("Tag {:?} not found in the CRM account", name);
    }
    found
}
