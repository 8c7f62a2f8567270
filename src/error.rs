use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use error_types::{error_codes, error_types as error_classes, ErrorResponse};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error, Clone)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid {entity} status transition: {from} -> {to}")]
    InvalidState {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("database error: {0}")]
    Database(String),

    #[error("internal server error")]
    Internal,
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl AppError {
    /// Returns whether this error is retryable (e.g., pool timeout, broken connection)
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Database(msg) => {
                msg.contains("PoolTimedOut") || msg.contains("PoolClosed") || msg.contains("Io")
            }
            AppError::Internal => true,
            _ => false,
        }
    }

    /// Returns HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::Forbidden => 403,
            AppError::NotFound(_) => 404,
            AppError::Conflict(_) | AppError::InvalidState { .. } => 409,
            AppError::Config(_)
            | AppError::StartServer(_)
            | AppError::Database(_)
            | AppError::Internal => 500,
        }
    }

    fn error_class(&self) -> &'static str {
        match self {
            AppError::Validation(_) => error_classes::VALIDATION_ERROR,
            AppError::Forbidden => error_classes::AUTHORIZATION_ERROR,
            AppError::NotFound(_) => error_classes::NOT_FOUND_ERROR,
            AppError::Conflict(_) => error_classes::CONFLICT_ERROR,
            AppError::InvalidState { .. } => error_classes::INVALID_STATE_ERROR,
            _ => error_classes::SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => error_codes::VALIDATION_ERROR,
            AppError::Forbidden => error_codes::FORBIDDEN,
            AppError::NotFound(resource) => match *resource {
                "conversation" => error_codes::CONVERSATION_NOT_FOUND,
                "message" => error_codes::MESSAGE_NOT_FOUND,
                "notification" => error_codes::NOTIFICATION_NOT_FOUND,
                "booking" => error_codes::BOOKING_NOT_FOUND,
                "service" => error_codes::SERVICE_NOT_FOUND,
                "user" => error_codes::USER_NOT_FOUND,
                _ => error_codes::NOT_FOUND,
            },
            AppError::Conflict(_) => error_codes::CONFLICT,
            AppError::InvalidState { .. } => error_codes::INVALID_STATUS_TRANSITION,
            AppError::Database(_) => error_codes::DATABASE_ERROR,
            _ => error_codes::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse::new(
            self.error_code(),
            &self.to_string(),
            AppError::status_code(self),
            self.error_class(),
            self.error_code(),
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(AppError::status_code(self))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(ResponseError::status_code(self)).json(self.to_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Validation("x".into()).status_code(), 400);
        assert_eq!(AppError::Forbidden.status_code(), 403);
        assert_eq!(AppError::NotFound("booking").status_code(), 404);
        assert_eq!(AppError::Conflict("dup".into()).status_code(), 409);
        assert_eq!(
            AppError::InvalidState {
                entity: "booking",
                from: "confirmed".into(),
                to: "canceled".into(),
            }
            .status_code(),
            409
        );
        assert_eq!(AppError::Database("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_not_found_codes_are_resource_specific() {
        assert_eq!(
            AppError::NotFound("conversation").to_response().code,
            error_codes::CONVERSATION_NOT_FOUND
        );
        assert_eq!(
            AppError::NotFound("booking").to_response().code,
            error_codes::BOOKING_NOT_FOUND
        );
        assert_eq!(
            AppError::NotFound("widget").to_response().code,
            error_codes::NOT_FOUND
        );
    }

    #[test]
    fn test_retryable_detection() {
        assert!(AppError::Database("PoolTimedOut".into()).is_retryable());
        assert!(!AppError::Database("constraint violation".into()).is_retryable());
        assert!(!AppError::Forbidden.is_retryable());
    }
}
