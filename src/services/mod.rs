pub mod booking_service;
pub mod conversation_service;
pub mod message_service;
pub mod notification_service;

pub use booking_service::{BookingWorkflow, CreateBooking};
pub use conversation_service::ConversationStore;
pub use message_service::MessagePipeline;
pub use notification_service::NotificationCenter;
