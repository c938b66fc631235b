use folio_forms::{AppEvent, EventType, Notification, UpsertPayload};
use folio_runtime::EventBus;

fn upsert() -> AppEvent {
    AppEvent::ItemUpsert(UpsertPayload {
        id: Some("add-document".to_string()),
        focus: true,
        upserted_resource: "document".to_string(),
        notification: Notification::success("Document added"),
    })
}

#[test]
fn test_subscriber_gets_its_kinds_only() {
    let bus = EventBus::new();
    let upserts = bus.subscribe(&[EventType::ItemUpsert]);

    assert_eq!(bus.publish(AppEvent::error(None, Notification::error("oops"))), 0);
    assert_eq!(bus.publish(upsert()), 1);

    assert_eq!(upserts.try_recv().ok(), Some(upsert()));
    assert!(upserts.try_recv().is_err());
}

#[test]
fn test_empty_kind_list_receives_everything() {
    let bus = EventBus::new();
    let all = bus.subscribe(&[]);
    bus.publish(AppEvent::RepositoryItemSelected { id: "42".to_string() });
    bus.publish(upsert());

    let kinds: Vec<EventType> = all.try_iter().map(|e| e.event_type()).collect();
    assert_eq!(kinds, vec![EventType::RepositoryItemSelected, EventType::ItemUpsert]);
}

#[test]
fn test_dropped_receivers_are_forgotten() {
    let bus = EventBus::new();
    let kept = bus.subscribe(&EventType::all_events());
    drop(bus.subscribe(&[EventType::ItemUpsert]));
    assert_eq!(bus.subscriber_count(), 2);

    assert_eq!(bus.publish(upsert()), 1);
    assert_eq!(bus.subscriber_count(), 1);
    assert!(kept.try_recv().is_ok());
}

#[test]
fn test_clones_share_subscribers() {
    let bus = EventBus::new();
    let receiver = bus.subscribe(&[EventType::ErrorEvent]);
    let handle = bus.clone();
    handle.publish(AppEvent::error(Some("x".to_string()), Notification::error("failed")));

    let event = receiver.try_recv().expect("event not delivered");
    assert_eq!(event.notification().map(|n| n.message.as_str()), Some("failed"));
}

#[test]
fn test_selection_state() {
    let bus = EventBus::new();
    assert_eq!(bus.selected_item(), None);
    bus.publish(AppEvent::RepositoryItemSelected { id: "7".to_string() });
    assert_eq!(bus.selected_item(), Some("7".to_string()));
    bus.publish(AppEvent::RepositoryItemDeselected { id: "7".to_string() });
    assert_eq!(bus.selected_item(), None);
}

#[test]
fn test_event_wire_format() {
    let json = serde_json::to_value(upsert()).expect("Serialize error");
    assert_eq!(json["type"], "ITEM_UPSERT");
    assert_eq!(json["payload"]["upsertedResource"], "document");
    assert_eq!(json["payload"]["notification"]["type"], "success");

    let error = serde_json::to_value(AppEvent::error(None, Notification::error("x"))).expect("Serialize error");
    assert_eq!(error["type"], "ERROR_EVENT");
}
