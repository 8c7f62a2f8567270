use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery status of a chat message.
///
/// Transitions are strictly forward: `sent -> received -> read`. A message
/// never moves backward and never skips a step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Received,
    Read,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Sent => "sent",
            MessageStatus::Received => "received",
            MessageStatus::Read => "read",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sent" => Some(MessageStatus::Sent),
            "received" => Some(MessageStatus::Received),
            "read" => Some(MessageStatus::Read),
            _ => None,
        }
    }

    /// The only status this one may advance to, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            MessageStatus::Sent => Some(MessageStatus::Received),
            MessageStatus::Received => Some(MessageStatus::Read),
            MessageStatus::Read => None,
        }
    }

    pub fn can_advance_to(&self, target: MessageStatus) -> bool {
        self.next() == Some(target)
    }
}

/// Message struct matching database schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            MessageStatus::Sent,
            MessageStatus::Received,
            MessageStatus::Read,
        ] {
            assert_eq!(MessageStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MessageStatus::parse("delivered"), None);
    }

    #[test]
    fn test_forward_transitions_only() {
        assert!(MessageStatus::Sent.can_advance_to(MessageStatus::Received));
        assert!(MessageStatus::Received.can_advance_to(MessageStatus::Read));

        // No skipping.
        assert!(!MessageStatus::Sent.can_advance_to(MessageStatus::Read));

        // No regression.
        assert!(!MessageStatus::Read.can_advance_to(MessageStatus::Received));
        assert!(!MessageStatus::Received.can_advance_to(MessageStatus::Sent));
        assert!(!MessageStatus::Read.can_advance_to(MessageStatus::Sent));

        // No self-transition.
        assert!(!MessageStatus::Sent.can_advance_to(MessageStatus::Sent));
    }

    #[test]
    fn test_read_is_terminal() {
        assert_eq!(MessageStatus::Read.next(), None);
    }

    #[test]
    fn test_status_serde_uses_lowercase() {
        let json = serde_json::to_string(&MessageStatus::Received).unwrap();
        assert_eq!(json, "\"received\"");
    }
}
