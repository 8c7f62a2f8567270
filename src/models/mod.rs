pub mod booking;
pub mod conversation;
pub mod message;
pub mod notification;

pub use booking::{Booking, BookingDecision, BookingStatus};
pub use conversation::{canonical_pair, Conversation};
pub use message::{Message, MessageStatus};
pub use notification::{CreateNotification, Notification, NotificationKind, NotificationPriority};
