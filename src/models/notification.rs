use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A chat message was delivered to the recipient
    ChatMessage,
    /// A new booking request arrived for a provider's service
    Booking,
    /// A provider answered a booking request
    Response,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ChatMessage => "chat_message",
            NotificationKind::Booking => "booking",
            NotificationKind::Response => "response",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "chat_message" => Some(NotificationKind::ChatMessage),
            "booking" => Some(NotificationKind::Booking),
            "response" => Some(NotificationKind::Response),
            _ => None,
        }
    }
}

/// Notification priority level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// Low priority (batched delivery, can wait)
    Low,
    /// Normal priority (standard delivery)
    Normal,
    /// High priority (immediate delivery)
    High,
}

impl NotificationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPriority::Low => "low",
            NotificationPriority::Normal => "normal",
            NotificationPriority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(NotificationPriority::Low),
            "normal" => Some(NotificationPriority::Normal),
            "high" => Some(NotificationPriority::High),
            _ => None,
        }
    }
}

/// Core notification model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,

    /// Recipient user ID
    pub user_id: Uuid,

    pub title: String,

    pub message: String,

    pub kind: NotificationKind,

    /// Associated object ID (message, booking, ...)
    pub related_id: Option<Uuid>,

    pub priority: NotificationPriority,

    pub is_read: bool,

    pub read_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// Request to create a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub related_id: Option<Uuid>,
    #[serde(default = "default_priority")]
    pub priority: NotificationPriority,
}

fn default_priority() -> NotificationPriority {
    NotificationPriority::Normal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            NotificationKind::ChatMessage,
            NotificationKind::Booking,
            NotificationKind::Response,
        ] {
            assert_eq!(NotificationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationKind::parse("like"), None);
    }

    #[test]
    fn test_priority_round_trip() {
        for priority in [
            NotificationPriority::Low,
            NotificationPriority::Normal,
            NotificationPriority::High,
        ] {
            assert_eq!(NotificationPriority::parse(priority.as_str()), Some(priority));
        }
        assert_eq!(NotificationPriority::parse("urgent"), None);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(NotificationPriority::Low < NotificationPriority::Normal);
        assert!(NotificationPriority::Normal < NotificationPriority::High);
    }

    #[test]
    fn test_create_request_defaults_to_normal_priority() {
        let json = format!(
            r#"{{"user_id":"{}","title":"t","message":"m","kind":"booking","related_id":null}}"#,
            Uuid::new_v4()
        );
        let req: CreateNotification = serde_json::from_str(&json).unwrap();
        assert_eq!(req.priority, NotificationPriority::Normal);
    }
}
