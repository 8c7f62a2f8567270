use booking_messaging_service::error::AppError;
/// Unit tests for the messaging core
///
/// This test module covers:
/// - Model serialization/deserialization
/// - Status state machines (messages, bookings)
/// - Wire protocol tags
/// - Room registry fan-out behavior
use booking_messaging_service::models::*;
use booking_messaging_service::websocket::{RoomKey, RoomRegistry, WsInboundEvent, WsOutboundEvent};
use chrono::Utc;
use uuid::Uuid;

#[test]
fn test_message_status_serialization() {
    for status in [
        MessageStatus::Sent,
        MessageStatus::Received,
        MessageStatus::Read,
    ] {
        let json = serde_json::to_string(&status).unwrap();
        let deserialized: MessageStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}

#[test]
fn test_booking_status_serialization() {
    for status in [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Canceled,
        BookingStatus::Completed,
    ] {
        let json = serde_json::to_string(&status).unwrap();
        let deserialized: BookingStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}

#[test]
fn test_notification_kind_wire_names() {
    assert_eq!(
        serde_json::to_string(&NotificationKind::ChatMessage).unwrap(),
        "\"chat_message\""
    );
    assert_eq!(
        serde_json::to_string(&NotificationKind::Booking).unwrap(),
        "\"booking\""
    );
    assert_eq!(
        serde_json::to_string(&NotificationKind::Response).unwrap(),
        "\"response\""
    );
}

#[test]
fn test_message_status_ladder() {
    // Forward, one step at a time.
    assert!(MessageStatus::Sent.can_advance_to(MessageStatus::Received));
    assert!(MessageStatus::Received.can_advance_to(MessageStatus::Read));

    // Everything else is rejected.
    for (from, to) in [
        (MessageStatus::Sent, MessageStatus::Read),
        (MessageStatus::Read, MessageStatus::Received),
        (MessageStatus::Received, MessageStatus::Sent),
        (MessageStatus::Read, MessageStatus::Sent),
    ] {
        assert!(!from.can_advance_to(to), "{from:?} -> {to:?} must be rejected");
    }
}

#[test]
fn test_booking_state_machine_shape() {
    assert!(BookingStatus::Pending.can_respond());
    assert!(!BookingStatus::Confirmed.can_respond());
    assert!(!BookingStatus::Canceled.can_respond());
    assert!(!BookingStatus::Completed.can_respond());

    assert!(BookingStatus::Confirmed.can_complete());
    assert!(!BookingStatus::Pending.can_complete());
}

#[test]
fn test_canonical_pair_invariant() {
    for _ in 0..32 {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
        let (first, second) = canonical_pair(a, b);
        assert!(first <= second);
    }
}

#[test]
fn test_inbound_protocol_tags() {
    let user_id = Uuid::new_v4();
    let room_id = Uuid::new_v4();

    let frames = [
        format!(r#"{{"type":"joinUserRoom","user_id":"{user_id}"}}"#),
        format!(r#"{{"type":"joinRoom","room_id":"{room_id}"}}"#),
        format!(
            r#"{{"type":"sendMessage","room_id":"{room_id}","sender_id":"{user_id}","receiver_id":"{}","text":"hi"}}"#,
            Uuid::new_v4()
        ),
        format!(
            r#"{{"type":"typing","room_id":"{room_id}","user_id":"{user_id}","is_typing":true}}"#
        ),
        format!(
            r#"{{"type":"joinChat","service_id":"{}","user_id":"{user_id}","service_provider_id":"{}"}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        ),
    ];

    for frame in &frames {
        assert!(
            WsInboundEvent::from_json(frame).is_ok(),
            "frame must parse: {frame}"
        );
    }
}

#[test]
fn test_unknown_inbound_frame_is_rejected_at_the_boundary() {
    assert!(WsInboundEvent::from_json(r#"{"type":"adminReset"}"#).is_err());
    assert!(WsInboundEvent::from_json(r#"{"typ":"typing"}"#).is_err());
    assert!(WsInboundEvent::from_json("not json").is_err());
}

#[test]
fn test_outbound_message_event_carries_full_record() {
    let message = Message {
        id: Uuid::new_v4(),
        conversation_id: Uuid::new_v4(),
        sender_id: Uuid::new_v4(),
        receiver_id: Uuid::new_v4(),
        content: "hi".to_string(),
        status: MessageStatus::Sent,
        created_at: Utc::now(),
        edited_at: None,
    };

    let json = WsOutboundEvent::ReceiveMessage {
        message: message.clone(),
    }
    .to_json()
    .unwrap();

    assert!(json.contains(r#""type":"receive_message""#));
    assert!(json.contains(&message.id.to_string()));
    assert!(json.contains(r#""status":"sent""#));
}

#[test]
fn test_error_taxonomy_status_codes() {
    assert_eq!(AppError::Validation("x".into()).status_code(), 400);
    assert_eq!(AppError::Forbidden.status_code(), 403);
    assert_eq!(AppError::NotFound("message").status_code(), 404);
    assert_eq!(
        AppError::InvalidState {
            entity: "booking",
            from: "confirmed".into(),
            to: "canceled".into(),
        }
        .status_code(),
        409
    );
}

#[tokio::test]
async fn test_user_and_conversation_rooms_are_distinct() {
    let registry = RoomRegistry::new();
    let id = Uuid::new_v4();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let subscriber = registry.connect(tx).await;
    registry.join(subscriber, RoomKey::User(id)).await;

    // Same uuid, different room kind: must not deliver.
    let delivered = registry
        .emit_to_room(
            RoomKey::Conversation(id),
            &WsOutboundEvent::NotificationDeleted {
                notification_id: Uuid::new_v4(),
            },
        )
        .await;
    assert_eq!(delivered, 0);

    let delivered = registry
        .emit_to_user(
            id,
            &WsOutboundEvent::NotificationDeleted {
                notification_id: Uuid::new_v4(),
            },
        )
        .await;
    assert_eq!(delivered, 1);
    assert!(rx.recv().await.is_some());
}

#[tokio::test]
async fn test_chat_fanout_reaches_both_parties() {
    let registry = RoomRegistry::new();
    let conversation_id = Uuid::new_v4();

    let (tx_a, mut rx_a) = tokio::sync::mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = tokio::sync::mpsc::unbounded_channel();
    let a = registry.connect(tx_a).await;
    let b = registry.connect(tx_b).await;
    registry.join(a, RoomKey::Conversation(conversation_id)).await;
    registry.join(b, RoomKey::Conversation(conversation_id)).await;

    let message = Message {
        id: Uuid::new_v4(),
        conversation_id,
        sender_id: Uuid::new_v4(),
        receiver_id: Uuid::new_v4(),
        content: "hello there".to_string(),
        status: MessageStatus::Sent,
        created_at: Utc::now(),
        edited_at: None,
    };

    registry
        .emit_to_room(
            RoomKey::Conversation(conversation_id),
            &WsOutboundEvent::ReceiveMessage { message },
        )
        .await;

    for rx in [&mut rx_a, &mut rx_b] {
        let payload = rx.recv().await.unwrap();
        assert!(payload.contains("hello there"));
    }
}

#[test]
fn test_phone_validation_boundaries() {
    assert!(booking::phone_is_valid("+12025550123"));
    assert!(booking::phone_is_valid("0000000"));
    assert!(!booking::phone_is_valid("+"));
    assert!(!booking::phone_is_valid("123-456-7890"));
}
