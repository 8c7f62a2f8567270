use crate::models::{Booking, Conversation, Message, MessageStatus, Notification};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound WebSocket events from client to server
///
/// Payloads are tagged variants validated at the boundary; a frame that does
/// not parse into one of these never reaches the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    /// Subscribe to the personal notification room
    #[serde(rename = "joinUserRoom")]
    JoinUserRoom { user_id: Uuid },

    /// Subscribe to a conversation room by id
    #[serde(rename = "joinRoom")]
    JoinRoom { room_id: Uuid },

    /// Get-or-create the conversation with a service provider, then join it
    #[serde(rename = "joinChat")]
    JoinChat {
        service_id: Uuid,
        user_id: Uuid,
        service_provider_id: Uuid,
    },

    /// Submit a chat message
    #[serde(rename = "sendMessage")]
    SendMessage {
        room_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
        text: String,
    },

    /// Ephemeral typing indicator, not persisted
    #[serde(rename = "typing")]
    Typing {
        room_id: Uuid,
        user_id: Uuid,
        is_typing: bool,
    },
}

/// Outbound WebSocket events from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum WsOutboundEvent {
    /// Connection established confirmation
    #[serde(rename = "connected")]
    Connected { timestamp: i64 },

    /// The conversation requested via joinChat, after the room was joined
    #[serde(rename = "joinedChat")]
    JoinedChat { conversation: Conversation },

    /// Live delivery of a persisted message
    #[serde(rename = "receive_message")]
    ReceiveMessage { message: Message },

    /// Read-receipt propagation
    #[serde(rename = "message_status_update")]
    MessageStatusUpdate {
        message_id: Uuid,
        status: MessageStatus,
    },

    #[serde(rename = "typing")]
    Typing {
        room_id: Uuid,
        user_id: Uuid,
        is_typing: bool,
    },

    #[serde(rename = "new_notification")]
    NewNotification { notification: Notification },

    #[serde(rename = "notification_read")]
    NotificationRead { notification_id: Uuid },

    #[serde(rename = "all_notifications_read")]
    AllNotificationsRead { user_id: Uuid, updated: u64 },

    #[serde(rename = "notification_deleted")]
    NotificationDeleted { notification_id: Uuid },

    /// A booking request arrived for one of the provider's services
    #[serde(rename = "newBooking")]
    NewBooking { booking: Booking },

    /// The provider answered the customer's booking request
    #[serde(rename = "bookingResponse")]
    BookingResponse { booking: Booking },

    #[serde(rename = "error")]
    Error { code: String, message: String },
}

impl WsOutboundEvent {
    pub fn connected() -> Self {
        WsOutboundEvent::Connected {
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        WsOutboundEvent::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl WsInboundEvent {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_event_tags() {
        let user_id = Uuid::new_v4();
        let json = format!(r#"{{"type":"joinUserRoom","user_id":"{user_id}"}}"#);
        let evt = WsInboundEvent::from_json(&json).unwrap();
        assert_eq!(evt, WsInboundEvent::JoinUserRoom { user_id });
    }

    #[test]
    fn test_send_message_round_trip() {
        let evt = WsInboundEvent::SendMessage {
            room_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            receiver_id: Uuid::new_v4(),
            text: "hi".to_string(),
        };
        let json = serde_json::to_string(&evt).unwrap();
        assert!(json.contains(r#""type":"sendMessage""#));
        assert_eq!(WsInboundEvent::from_json(&json).unwrap(), evt);
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let json = r#"{"type":"dropAllTables"}"#;
        assert!(WsInboundEvent::from_json(json).is_err());
    }

    #[test]
    fn test_malformed_payload_is_rejected() {
        // joinRoom without its room_id
        let json = r#"{"type":"joinRoom"}"#;
        assert!(WsInboundEvent::from_json(json).is_err());
    }

    #[test]
    fn test_outbound_status_update_wire_format() {
        let message_id = Uuid::new_v4();
        let evt = WsOutboundEvent::MessageStatusUpdate {
            message_id,
            status: MessageStatus::Read,
        };
        let json = evt.to_json().unwrap();
        assert!(json.contains(r#""type":"message_status_update""#));
        assert!(json.contains(r#""status":"read""#));
    }

    #[test]
    fn test_outbound_booking_event_tags() {
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            event_id: None,
            date: chrono::Utc::now(),
            space: 2,
            phone_number: "+358401234567".to_string(),
            status: crate::models::BookingStatus::Pending,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let json = WsOutboundEvent::NewBooking {
            booking: booking.clone(),
        }
        .to_json()
        .unwrap();
        assert!(json.contains(r#""type":"newBooking""#));

        let json = WsOutboundEvent::BookingResponse { booking }.to_json().unwrap();
        assert!(json.contains(r#""type":"bookingResponse""#));
    }

    #[test]
    fn test_error_event_shape() {
        let json = WsOutboundEvent::error("FORBIDDEN", "not a member")
            .to_json()
            .unwrap();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains("FORBIDDEN"));
    }
}
