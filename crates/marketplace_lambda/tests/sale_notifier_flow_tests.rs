mod common;

use common::{listing, update, RecordingPush, RecordingStore};
use marketplace_core::listing::DEFAULT_CLICK_ACTION;
use marketplace_lambda::handlers::sale::{
    handle_listing_update, handle_stream_event, FailureStage, IdempotencyMode, PushOutcome,
    SaleNotifierConfig, SaleOutcome,
};
use serde_json::{json, Value};

fn stream_record(listing_id: &str, old_status: &str, new_status: &str) -> Value {
    json!({
        "eventName": "MODIFY",
        "eventSource": "aws:dynamodb",
        "dynamodb": {
            "Keys": {"listingId": {"S": listing_id}},
            "OldImage": {
                "status": {"S": old_status},
                "sellerId": {"S": "seller-1"},
                "title": {"S": "Vintage lamp"}
            },
            "NewImage": {
                "status": {"S": new_status},
                "sellerId": {"S": "seller-1"},
                "title": {"S": "Vintage lamp"}
            }
        }
    })
}

#[test]
fn sold_transition_writes_one_notification_and_pushes_to_token() {
    let store = RecordingStore::new().with_user("seller-1", Some("device-token-1"));
    let push = RecordingPush::new();

    let outcome = handle_listing_update(
        &update("listing-1", Some("active"), Some("sold")),
        &SaleNotifierConfig::default(),
        &store,
        &push,
    );

    let notifications = store.notifications();
    assert_eq!(notifications.len(), 1);
    let (owner, record) = &notifications[0];
    assert_eq!(owner, "seller-1");
    assert_eq!(record.listing_id, "listing-1");
    assert_eq!(record.title, "Item Sold!");
    assert_eq!(record.body, "Your item \"Vintage lamp\" has been sold!");
    assert!(!record.read);
    assert!(!record.created_at.is_empty());

    let messages = push.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].token, "device-token-1");
    assert_eq!(messages[0].title, record.title);
    assert_eq!(messages[0].body, record.body);
    assert_eq!(messages[0].click_action, DEFAULT_CLICK_ACTION);

    assert_eq!(
        outcome,
        SaleOutcome::Notified {
            listing_id: "listing-1".to_string(),
            seller_id: "seller-1".to_string(),
            notification_id: record.notification_id.clone(),
            push: PushOutcome::Sent,
        }
    );
}

#[test]
fn seller_without_token_gets_record_but_no_push() {
    let store = RecordingStore::new().with_user("seller-1", None);
    let push = RecordingPush::new();

    let outcome = handle_listing_update(
        &update("listing-1", Some("active"), Some("sold")),
        &SaleNotifierConfig::default(),
        &store,
        &push,
    );

    assert_eq!(store.notifications().len(), 1);
    assert!(push.messages().is_empty());
    assert!(matches!(
        outcome,
        SaleOutcome::Notified {
            push: PushOutcome::SkippedNoToken,
            ..
        }
    ));
}

#[test]
fn non_transitions_touch_nothing() {
    let cases = [
        (Some("sold"), Some("sold")),
        (Some("active"), Some("active")),
        (Some("sold"), Some("active")),
        (Some("active"), Some("reserved")),
        (None, None),
    ];

    for (before, after) in cases {
        let store = RecordingStore::new().with_user("seller-1", Some("device-token-1"));
        let push = RecordingPush::new();

        let outcome = handle_listing_update(
            &update("listing-1", before, after),
            &SaleNotifierConfig::default(),
            &store,
            &push,
        );

        assert_eq!(outcome, SaleOutcome::NotSoldTransition, "{before:?} -> {after:?}");
        assert!(store.lookups().is_empty());
        assert!(store.notifications().is_empty());
        assert!(push.messages().is_empty());
    }
}

#[test]
fn missing_seller_completes_without_writing() {
    let store = RecordingStore::new();
    let push = RecordingPush::new();

    let outcome = handle_listing_update(
        &update("listing-1", Some("active"), Some("sold")),
        &SaleNotifierConfig::default(),
        &store,
        &push,
    );

    assert_eq!(
        outcome,
        SaleOutcome::SellerNotFound {
            listing_id: "listing-1".to_string(),
            seller_id: "seller-1".to_string(),
        }
    );
    assert_eq!(store.lookups(), vec!["seller-1".to_string()]);
    assert!(store.notifications().is_empty());
    assert!(push.messages().is_empty());
}

#[test]
fn seller_id_is_looked_up_exactly_as_stored() {
    let store = RecordingStore::new().with_user(" seller-1 ", Some("device-token-1"));
    let push = RecordingPush::new();
    let mut padded = update("listing-1", Some("active"), Some("sold"));
    padded.after = listing(Some("sold"), " seller-1 ", "Vintage lamp");

    let outcome = handle_listing_update(&padded, &SaleNotifierConfig::default(), &store, &push);

    assert!(matches!(outcome, SaleOutcome::Notified { .. }));
    assert_eq!(store.lookups(), vec![" seller-1 ".to_string()]);
    let notifications = store.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].0, " seller-1 ");
    assert_eq!(push.messages().len(), 1);
}

#[test]
fn lookup_failure_is_swallowed() {
    let store = RecordingStore::new()
        .with_user("seller-1", Some("device-token-1"))
        .failing_lookup();
    let push = RecordingPush::new();

    let outcome = handle_listing_update(
        &update("listing-1", Some("active"), Some("sold")),
        &SaleNotifierConfig::default(),
        &store,
        &push,
    );

    assert!(matches!(
        outcome,
        SaleOutcome::Failed {
            stage: FailureStage::SellerLookup,
            ..
        }
    ));
    assert!(push.messages().is_empty());
}

#[test]
fn write_failure_prevents_push() {
    let store = RecordingStore::new()
        .with_user("seller-1", Some("device-token-1"))
        .failing_write();
    let push = RecordingPush::new();

    let outcome = handle_listing_update(
        &update("listing-1", Some("active"), Some("sold")),
        &SaleNotifierConfig::default(),
        &store,
        &push,
    );

    assert!(matches!(
        outcome,
        SaleOutcome::Failed {
            stage: FailureStage::NotificationWrite,
            ..
        }
    ));
    assert!(push.messages().is_empty());
}

#[test]
fn push_failure_keeps_written_record() {
    let store = RecordingStore::new().with_user("seller-1", Some("device-token-1"));
    let push = RecordingPush::failing();

    let outcome = handle_listing_update(
        &update("listing-1", Some("active"), Some("sold")),
        &SaleNotifierConfig::default(),
        &store,
        &push,
    );

    assert_eq!(store.notifications().len(), 1);
    assert_eq!(push.messages().len(), 1);
    assert!(matches!(
        outcome,
        SaleOutcome::Notified {
            push: PushOutcome::Failed { .. },
            ..
        }
    ));
}

#[test]
fn redelivery_duplicates_record_without_idempotency() {
    let store = RecordingStore::new().with_user("seller-1", Some("device-token-1"));
    let push = RecordingPush::new();
    let event = update("listing-1", Some("active"), Some("sold"));
    let config = SaleNotifierConfig::default();

    handle_listing_update(&event, &config, &store, &push);
    handle_listing_update(&event, &config, &store, &push);

    let notifications = store.notifications();
    assert_eq!(notifications.len(), 2);
    assert_ne!(
        notifications[0].1.notification_id,
        notifications[1].1.notification_id
    );
    assert_eq!(push.messages().len(), 2);
}

#[test]
fn listing_idempotency_drops_redelivery() {
    let store = RecordingStore::new().with_user("seller-1", Some("device-token-1"));
    let push = RecordingPush::new();
    let event = update("listing-1", Some("active"), Some("sold"));
    let config = SaleNotifierConfig {
        idempotency: IdempotencyMode::Listing,
        ..SaleNotifierConfig::default()
    };

    let first = handle_listing_update(&event, &config, &store, &push);
    let second = handle_listing_update(&event, &config, &store, &push);

    assert!(matches!(first, SaleOutcome::Notified { .. }));
    assert!(matches!(second, SaleOutcome::AlreadyNotified { .. }));
    assert_eq!(store.notifications().len(), 1);
    assert_eq!(push.messages().len(), 1);
}

#[test]
fn stream_event_processes_each_record_in_order() {
    let store = RecordingStore::new().with_user("seller-1", Some("device-token-1"));
    let push = RecordingPush::new();
    let event = json!({
        "Records": [
            stream_record("listing-1", "active", "sold"),
            stream_record("listing-2", "sold", "sold"),
            {"eventName": "INSERT", "eventSource": "aws:dynamodb", "dynamodb": {}},
            {"eventName": "MODIFY", "eventSource": "aws:dynamodb", "dynamodb": {"Keys": {}}},
            stream_record("listing-3", "active", "sold"),
        ]
    });

    let outcomes = handle_stream_event(&event, &SaleNotifierConfig::default(), &store, &push);

    assert_eq!(outcomes.len(), 5);
    assert!(matches!(outcomes[0], SaleOutcome::Notified { .. }));
    assert_eq!(outcomes[1], SaleOutcome::NotSoldTransition);
    assert_eq!(outcomes[2], SaleOutcome::NotSoldTransition);
    assert!(matches!(
        outcomes[3],
        SaleOutcome::Failed {
            stage: FailureStage::Decode,
            ..
        }
    ));
    assert!(matches!(outcomes[4], SaleOutcome::Notified { .. }));

    let listing_ids: Vec<String> = store
        .notifications()
        .into_iter()
        .map(|(_, record)| record.listing_id)
        .collect();
    assert_eq!(listing_ids, vec!["listing-1", "listing-3"]);
}

#[test]
fn stream_event_without_records_is_reported_not_raised() {
    let store = RecordingStore::new();
    let push = RecordingPush::new();

    let outcomes = handle_stream_event(
        &json!({"detail": "not a stream event"}),
        &SaleNotifierConfig::default(),
        &store,
        &push,
    );

    assert_eq!(outcomes.len(), 1);
    assert!(matches!(
        outcomes[0],
        SaleOutcome::Failed {
            stage: FailureStage::Decode,
            ..
        }
    ));
}
