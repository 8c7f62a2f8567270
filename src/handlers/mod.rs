pub mod bookings;
pub mod conversations;
pub mod messages;
pub mod notifications;
pub mod websocket;

use serde::Serialize;

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Register every HTTP route of the service
pub fn register_routes(cfg: &mut actix_web::web::ServiceConfig) {
    conversations::register_routes(cfg);
    messages::register_routes(cfg);
    notifications::register_routes(cfg);
    bookings::register_routes(cfg);
    websocket::register_routes(cfg);
}
