//! Shared error wire format for the Bookline platform services.
//!
//! Every HTTP error body uses the same [`ErrorResponse`] shape so clients can
//! route on `error_type`/`code` without caring which service answered.

use serde::{Deserialize, Serialize};

/// Unified API error response format (all services use this).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short error name, e.g. "Not Found".
    pub error: String,

    /// Human-readable message.
    pub message: String,

    /// HTTP status code.
    pub status: u16,

    /// Error class used for client-side routing, see [`error_types`].
    pub error_type: String,

    /// Stable machine code, see [`error_codes`].
    pub code: String,

    /// Extra detail, only populated in development environments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Request trace id for log correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    /// ISO 8601 timestamp.
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            details: None,
            trace_id: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_trace_id(mut self, trace_id: String) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}

/// Stable error codes, prefixed per resource.
pub mod error_codes {
    // Conversations / messaging
    pub const CONVERSATION_NOT_FOUND: &str = "CONVERSATION_NOT_FOUND";
    pub const MESSAGE_NOT_FOUND: &str = "MESSAGE_NOT_FOUND";
    pub const NOT_CONVERSATION_MEMBER: &str = "NOT_CONVERSATION_MEMBER";
    pub const INVALID_STATUS_TRANSITION: &str = "INVALID_STATUS_TRANSITION";

    // Notifications
    pub const NOTIFICATION_NOT_FOUND: &str = "NOTIFICATION_NOT_FOUND";

    // Bookings
    pub const BOOKING_NOT_FOUND: &str = "BOOKING_NOT_FOUND";
    pub const SERVICE_NOT_FOUND: &str = "SERVICE_NOT_FOUND";

    // Directory
    pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";

    // Generic
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Standard error classes.
pub mod error_types {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const AUTHORIZATION_ERROR: &str = "authorization_error";
    pub const NOT_FOUND_ERROR: &str = "not_found_error";
    pub const CONFLICT_ERROR: &str = "conflict_error";
    pub const INVALID_STATE_ERROR: &str = "invalid_state_error";
    pub const SERVER_ERROR: &str = "server_error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_creation() {
        let error = ErrorResponse::new(
            "Not Found",
            "Conversation not found",
            404,
            error_types::NOT_FOUND_ERROR,
            error_codes::CONVERSATION_NOT_FOUND,
        );

        assert_eq!(error.status, 404);
        assert_eq!(error.error_type, error_types::NOT_FOUND_ERROR);
        assert_eq!(error.code, error_codes::CONVERSATION_NOT_FOUND);
    }

    #[test]
    fn test_error_response_with_details() {
        let error = ErrorResponse::new(
            "Bad Request",
            "Invalid phone number",
            400,
            error_types::VALIDATION_ERROR,
            error_codes::VALIDATION_ERROR,
        )
        .with_details("Expected 7-15 digits".to_string());

        assert!(error.details.is_some());
    }

    #[test]
    fn test_optional_fields_are_skipped() {
        let error = ErrorResponse::new(
            "Conflict",
            "duplicate conversation",
            409,
            error_types::CONFLICT_ERROR,
            error_codes::CONFLICT,
        );

        let json = serde_json::to_string(&error).unwrap();
        assert!(!json.contains("details"));
        assert!(!json.contains("trace_id"));
    }
}
