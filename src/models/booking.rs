use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle status.
///
/// State machine: `pending -> confirmed -> completed`, or
/// `pending -> canceled`. `canceled` and `completed` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Canceled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Canceled => "canceled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "canceled" => Some(BookingStatus::Canceled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    /// Whether a provider response (confirm/cancel) is accepted from here.
    pub fn can_respond(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }

    /// Whether the booking can be marked completed from here.
    pub fn can_complete(&self) -> bool {
        matches!(self, BookingStatus::Confirmed)
    }
}

/// A provider's answer to a pending booking request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingDecision {
    Confirmed,
    Canceled,
}

impl BookingDecision {
    pub fn into_status(self) -> BookingStatus {
        match self {
            BookingDecision::Confirmed => BookingStatus::Confirmed,
            BookingDecision::Canceled => BookingStatus::Canceled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.into_status().as_str()
    }
}

/// Booking workflow record linking a customer, a provider's service and a status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub event_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub space: i32,
    pub phone_number: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// E.164-style phone check: optional leading `+`, then 7-15 digits.
pub fn phone_is_valid(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (7..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Canceled,
            BookingStatus::Completed,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("declined"), None);
    }

    #[test]
    fn test_only_pending_accepts_a_response() {
        assert!(BookingStatus::Pending.can_respond());
        assert!(!BookingStatus::Confirmed.can_respond());
        assert!(!BookingStatus::Canceled.can_respond());
        assert!(!BookingStatus::Completed.can_respond());
    }

    #[test]
    fn test_only_confirmed_can_complete() {
        assert!(BookingStatus::Confirmed.can_complete());
        assert!(!BookingStatus::Pending.can_complete());
        assert!(!BookingStatus::Canceled.can_complete());
        assert!(!BookingStatus::Completed.can_complete());
    }

    #[test]
    fn test_decision_maps_to_status() {
        assert_eq!(
            BookingDecision::Confirmed.into_status(),
            BookingStatus::Confirmed
        );
        assert_eq!(
            BookingDecision::Canceled.into_status(),
            BookingStatus::Canceled
        );
    }

    #[test]
    fn test_phone_validation() {
        assert!(phone_is_valid("+358401234567"));
        assert!(phone_is_valid("0401234567"));
        assert!(phone_is_valid("1234567"));

        assert!(!phone_is_valid("123456"));
        assert!(!phone_is_valid("+1234567890123456"));
        assert!(!phone_is_valid("call me"));
        assert!(!phone_is_valid("+358 40 123"));
        assert!(!phone_is_valid(""));
    }
}
