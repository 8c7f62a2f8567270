use crate::config::Config;
use crate::directory::UserDirectory;
use crate::services::{BookingWorkflow, ConversationStore, MessagePipeline, NotificationCenter};
use crate::websocket::RoomRegistry;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub registry: RoomRegistry,
    pub config: Arc<Config>,
    pub directory: Arc<dyn UserDirectory>,
    pub conversations: Arc<ConversationStore>,
    pub messages: Arc<MessagePipeline>,
    pub notifications: Arc<NotificationCenter>,
    pub bookings: Arc<BookingWorkflow>,
}
