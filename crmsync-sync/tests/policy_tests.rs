mod common;

use common::{
    COMPANY_NEWS_LIST, COMPANY_TAG, DEACTIVATED_TAG, Harness, PRODUCT_TAG, SYNCED_LIST, tag_set,
    test_context,
};
use crmsync_client::ContactListMembership;
use crmsync_client::mock::CrmCall;
use crmsync_sync::{ExpectedState, SyncConfig, SyncContext, expected_list_status};
use crmsync_types::{ListId, ListStatus, Person, Preference, TagId};
use pretty_assertions::assert_eq;

fn person_with(product: Preference, company: Preference) -> Person {
    let mut person = Person::new("p@example.com", "P");
    person.wants_product_newsletter = product;
    person.wants_company_newsletter = company;
    person
}

fn membership(list: &str, status: ListStatus) -> ContactListMembership {
    ContactListMembership {
        list_id: ListId::new(list),
        status,
    }
}

// ── Expected state ───────────────────────────────────────────────

#[test]
fn list_status_follows_any_wanted_newsletter() {
    use Preference::*;
    let cases = [
        (Yes, Yes, ListStatus::Synced),
        (Yes, No, ListStatus::Synced),
        (No, Yes, ListStatus::Synced),
        (Unset, Yes, ListStatus::Synced),
        (No, No, ListStatus::Unsubscribed),
        (Unset, Unset, ListStatus::Unsubscribed),
        (No, Unset, ListStatus::Unsubscribed),
    ];
    for (product, company, expected) in cases {
        assert_eq!(
            expected_list_status(&person_with(product, company)),
            expected,
            "product={product:?} company={company:?}"
        );
    }
}

#[test]
fn expected_tags_follow_newsletter_preferences() {
    let context = test_context();
    assert_eq!(
        context.expected_tag_ids(&person_with(Preference::No, Preference::No)),
        tag_set(&[])
    );
    assert_eq!(
        context.expected_tag_ids(&person_with(Preference::Yes, Preference::No)),
        tag_set(&[PRODUCT_TAG])
    );
    assert_eq!(
        context.expected_tag_ids(&person_with(Preference::Unset, Preference::Yes)),
        tag_set(&[COMPANY_TAG])
    );
}

#[test]
fn expected_state_combines_status_and_tags() {
    let context = test_context();
    assert_eq!(
        context.expected_state(&person_with(Preference::Yes, Preference::Yes)),
        ExpectedState {
            list_status: ListStatus::Synced,
            tag_ids: tag_set(&[PRODUCT_TAG, COMPANY_TAG]),
        }
    );
}

#[test]
fn unresolved_tags_are_left_out() {
    let context = SyncContext::new(ListId::new(SYNCED_LIST));
    assert!(
        context
            .expected_tag_ids(&person_with(Preference::Yes, Preference::Yes))
            .is_empty()
    );
    assert_eq!(context.managed_tag_ids().count(), 0);
}

#[test]
fn deactivated_tag_is_relevant_but_never_expected() {
    let context = test_context();
    let deactivated = TagId::new(DEACTIVATED_TAG);
    assert!(context.is_relevant(&deactivated));
    assert!(!context.is_relevant(&TagId::new("99")));
    assert!(
        !context
            .expected_tag_ids(&person_with(Preference::Yes, Preference::Yes))
            .contains(&deactivated)
    );
}

// ── Preference inference ─────────────────────────────────────────

#[test]
fn no_memberships_means_product_news_only() {
    assert_eq!(test_context().infer_preferences(&[]), (true, false));
}

#[test]
fn company_news_subscribers_get_both() {
    let memberships = [
        membership(COMPANY_NEWS_LIST, ListStatus::Synced),
        membership("5", ListStatus::Synced),
    ];
    assert_eq!(test_context().infer_preferences(&memberships), (true, true));
}

#[test]
fn any_unsubscribe_turns_both_off() {
    let memberships = [
        membership(COMPANY_NEWS_LIST, ListStatus::Synced),
        membership("5", ListStatus::Unsubscribed),
    ];
    assert_eq!(test_context().infer_preferences(&memberships), (false, false));
}

#[test]
fn unconfirmed_memberships_are_neutral() {
    let memberships = [
        membership(COMPANY_NEWS_LIST, ListStatus::Synced),
        membership("5", ListStatus::Unconfirmed),
    ];
    assert_eq!(test_context().infer_preferences(&memberships), (true, true));

    let memberships = [membership(COMPANY_NEWS_LIST, ListStatus::Unconfirmed)];
    assert_eq!(test_context().infer_preferences(&memberships), (true, false));
}

#[test]
fn synced_list_status_is_ignored() {
    let memberships = [
        membership(SYNCED_LIST, ListStatus::Unsubscribed),
        membership(COMPANY_NEWS_LIST, ListStatus::Synced),
    ];
    assert_eq!(test_context().infer_preferences(&memberships), (true, true));
}

#[test]
fn missing_company_list_defaults_company_news_off() {
    let context = SyncContext::new(ListId::new(SYNCED_LIST));
    let memberships = [membership(COMPANY_NEWS_LIST, ListStatus::Synced)];
    assert_eq!(context.infer_preferences(&memberships), (true, false));
}

// ── Catalog loading ──────────────────────────────────────────────

#[tokio::test]
async fn load_resolves_names_with_two_calls() {
    let h = Harness::new();
    let context = SyncContext::load(h.crm.as_ref(), &SyncConfig::default())
        .await
        .unwrap();

    assert_eq!(context, test_context());
    assert_eq!(h.crm.calls(), vec![CrmCall::Lists, CrmCall::Tags]);
}

#[tokio::test]
async fn load_leaves_unknown_names_unresolved() {
    let h = Harness::new();
    let config = SyncConfig {
        company_news_list: "Gone".to_string(),
        company_newsletter_tag: "newsletter:gone".to_string(),
        ..SyncConfig::default()
    };
    let context = SyncContext::load(h.crm.as_ref(), &config).await.unwrap();

    assert_eq!(context.company_news_list_id(), None);
    assert!(!context.is_relevant(&TagId::new(COMPANY_TAG)));
    assert!(context.is_relevant(&TagId::new(PRODUCT_TAG)));
}

// ── Config ───────────────────────────────────────────────────────

#[test]
fn sync_config_defaults() {
    let config = SyncConfig::default();
    assert_eq!(config.synced_list_id, "1");
    assert_eq!(config.concurrency, 4);
    assert!(!config.retry_concurrent_mapping);
}

#[test]
fn sync_config_fills_missing_fields() {
    let config: SyncConfig =
        serde_json::from_str(r#"{"synced_list_id": "8", "concurrency": 16}"#).unwrap();
    assert_eq!(config.synced_list_id, "8");
    assert_eq!(config.concurrency, 16);
    assert_eq!(config.company_news_list, "Company News");
    assert_eq!(config.deactivated_tag, "crmsync:deactivated");
}
