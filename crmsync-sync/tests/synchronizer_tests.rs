mod common;

use common::{COMPANY_TAG, Harness, PRODUCT_TAG, SYNCED_LIST, tag_set};
use crmsync_client::mock::CrmCall;
use crmsync_store::MappingStore;
use crmsync_sync::{ListStatusSync, TagSync};
use crmsync_types::{ContactMapping, ContactTagId, ListId, ListStatus, TagId};
use pretty_assertions::assert_eq;

/// A tag the engine is told to want, outside the newsletter catalog.
const OTHER_TAG: &str = "9";

/// A stored mapping for a pre-existing contact carrying `tags`, plus the
/// association id of each tag in the same order.
fn mapped_contact(h: &Harness, tags: &[&str]) -> (ContactMapping, Vec<ContactTagId>) {
    let person = h.insert("tess@example.com", "Tess");
    let contact = h.crm.add_contact("tess@example.com");
    let associations = tags
        .iter()
        .map(|tag| h.crm.add_contact_tag(&contact, &TagId::new(*tag)))
        .collect();
    let mapping = ContactMapping::new(person.id, contact, ListStatus::Synced, tag_set(tags));
    h.store.create_mapping(&mapping).unwrap();
    h.crm.clear_calls();
    (mapping, associations)
}

// ── Tags ─────────────────────────────────────────────────────────

#[tokio::test]
async fn equal_tag_sets_issue_no_calls() {
    let h = Harness::new();
    let (mut mapping, _) = mapped_contact(&h, &[PRODUCT_TAG, OTHER_TAG]);

    TagSync::new(h.crm.as_ref(), &h.store)
        .sync(&mut mapping, &tag_set(&[OTHER_TAG, PRODUCT_TAG]))
        .await
        .unwrap();

    assert_eq!(h.crm.calls(), vec![]);
}

#[tokio::test]
async fn new_mapping_gets_every_desired_tag_without_a_lookup() {
    let h = Harness::new();
    let (mut mapping, _) = mapped_contact(&h, &[]);
    let contact = mapping.contact_id.clone();

    TagSync::new(h.crm.as_ref(), &h.store)
        .sync(&mut mapping, &tag_set(&[PRODUCT_TAG, OTHER_TAG]))
        .await
        .unwrap();

    assert_eq!(
        h.crm.calls(),
        vec![
            CrmCall::ApplyTag(contact.clone(), TagId::new(PRODUCT_TAG)),
            CrmCall::ApplyTag(contact.clone(), TagId::new(OTHER_TAG)),
        ]
    );
    assert_eq!(mapping.tag_ids, tag_set(&[PRODUCT_TAG, OTHER_TAG]));
}

#[tokio::test]
async fn tags_are_added_and_removed_by_association() {
    let h = Harness::new();
    let (mut mapping, associations) = mapped_contact(&h, &[PRODUCT_TAG, OTHER_TAG]);
    let product_association = associations[0].clone();
    let contact = mapping.contact_id.clone();

    TagSync::new(h.crm.as_ref(), &h.store)
        .sync(&mut mapping, &tag_set(&[OTHER_TAG, COMPANY_TAG]))
        .await
        .unwrap();

    let calls = h.crm.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], CrmCall::ApplyTag(contact.clone(), TagId::new(COMPANY_TAG)));
    assert_eq!(calls[1], CrmCall::ContactTags(contact.clone()));
    assert_eq!(calls[2], CrmCall::RemoveContactTag(product_association));

    let mut remote = h.crm.tag_ids_of(&contact);
    remote.sort();
    assert_eq!(remote, vec![TagId::new(COMPANY_TAG), TagId::new(OTHER_TAG)]);

    assert_eq!(mapping.tag_ids, tag_set(&[OTHER_TAG, COMPANY_TAG]));
    let stored = h.store.find_mapping_by_contact(&contact).unwrap().unwrap();
    assert_eq!(stored.tag_ids, mapping.tag_ids);
}

#[tokio::test]
async fn additions_alone_skip_the_association_lookup() {
    let h = Harness::new();
    let (mut mapping, _) = mapped_contact(&h, &[OTHER_TAG]);

    TagSync::new(h.crm.as_ref(), &h.store)
        .sync(&mut mapping, &tag_set(&[OTHER_TAG, PRODUCT_TAG]))
        .await
        .unwrap();

    assert!(
        !h.crm
            .calls()
            .iter()
            .any(|c| matches!(c, CrmCall::ContactTags(_)))
    );
}

#[tokio::test]
async fn several_removals_share_one_association_lookup() {
    let h = Harness::new();
    let (mut mapping, _) = mapped_contact(&h, &[PRODUCT_TAG, OTHER_TAG, COMPANY_TAG]);

    TagSync::new(h.crm.as_ref(), &h.store)
        .sync(&mut mapping, &tag_set(&[OTHER_TAG]))
        .await
        .unwrap();

    let calls = h.crm.calls();
    let lookups = calls
        .iter()
        .filter(|c| matches!(c, CrmCall::ContactTags(_)))
        .count();
    let removals = calls
        .iter()
        .filter(|c| matches!(c, CrmCall::RemoveContactTag(_)))
        .count();
    assert_eq!((lookups, removals), (1, 2));
    assert_eq!(h.crm.tag_ids_of(&mapping.contact_id), vec![TagId::new(OTHER_TAG)]);
}

// ── List status ──────────────────────────────────────────────────

#[tokio::test]
async fn equal_status_issues_no_calls() {
    let h = Harness::new();
    let (mut mapping, _) = mapped_contact(&h, &[]);
    let list = ListId::new(SYNCED_LIST);

    ListStatusSync::new(h.crm.as_ref(), &h.store, &list)
        .sync(&mut mapping, ListStatus::Synced)
        .await
        .unwrap();

    assert_eq!(h.crm.calls(), vec![]);
}

#[tokio::test]
async fn changed_status_is_pushed_then_cached() {
    let h = Harness::new();
    let (mut mapping, _) = mapped_contact(&h, &[]);
    let contact = mapping.contact_id.clone();
    let list = ListId::new(SYNCED_LIST);

    ListStatusSync::new(h.crm.as_ref(), &h.store, &list)
        .sync(&mut mapping, ListStatus::Unsubscribed)
        .await
        .unwrap();

    assert_eq!(
        h.crm.calls(),
        vec![CrmCall::SetListStatus(contact.clone(), list, ListStatus::Unsubscribed)]
    );
    let stored = h.store.find_mapping_by_contact(&contact).unwrap().unwrap();
    assert_eq!(stored.list_status, ListStatus::Unsubscribed);
}
