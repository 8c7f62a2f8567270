use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc::UnboundedSender, RwLock};
use uuid::Uuid;

pub mod message_types;
pub mod session;

pub use message_types::{WsInboundEvent, WsOutboundEvent};

/// Unique identifier for a live WebSocket subscriber
///
/// Each connection gets a unique subscriber ID when it registers, which
/// allows precise cleanup when the connection closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// A live-delivery channel clients subscribe to.
///
/// `User` is the personal notification room (`user:{id}`), `Conversation`
/// the chat room (`room:{conversationId}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomKey {
    User(Uuid),
    Conversation(Uuid),
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomKey::User(id) => write!(f, "user:{id}"),
            RoomKey::Conversation(id) => write!(f, "room:{id}"),
        }
    }
}

#[derive(Default)]
struct RegistryInner {
    /// subscriber -> live send handle
    senders: HashMap<SubscriberId, UnboundedSender<String>>,
    /// room -> subscribers currently joined
    rooms: HashMap<RoomKey, HashSet<SubscriberId>>,
    /// subscriber -> rooms it joined (reverse index for disconnect)
    memberships: HashMap<SubscriberId, HashSet<RoomKey>>,
}

impl RegistryInner {
    fn remove_from_room(&mut self, subscriber_id: SubscriberId, room: RoomKey) {
        if let Some(members) = self.rooms.get_mut(&room) {
            members.remove(&subscriber_id);
            if members.is_empty() {
                self.rooms.remove(&room);
            }
        }
        if let Some(rooms) = self.memberships.get_mut(&subscriber_id) {
            rooms.remove(&room);
        }
    }

    fn drop_subscriber(&mut self, subscriber_id: SubscriberId) {
        self.senders.remove(&subscriber_id);
        if let Some(rooms) = self.memberships.remove(&subscriber_id) {
            for room in rooms {
                if let Some(members) = self.rooms.get_mut(&room) {
                    members.remove(&subscriber_id);
                    if members.is_empty() {
                        self.rooms.remove(&room);
                    }
                }
            }
        }
    }
}

/// Registry of live connections and the rooms they joined
///
/// A user may hold several simultaneous connections (devices/tabs); emitting
/// to a user fans out to all of them. Emission is best effort: the persisted
/// row is the durable source of truth, the live push is a low-latency hint,
/// and delivery failures only ever evict dead senders.
#[derive(Default, Clone)]
pub struct RoomRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live connection handle. The caller keeps the receiving end.
    pub async fn connect(&self, sender: UnboundedSender<String>) -> SubscriberId {
        let subscriber_id = SubscriberId::new();
        let mut guard = self.inner.write().await;
        guard.senders.insert(subscriber_id, sender);
        guard.memberships.entry(subscriber_id).or_default();
        tracing::debug!(?subscriber_id, "subscriber connected");
        subscriber_id
    }

    /// Join a room. Idempotent; a no-op for unknown subscribers (the
    /// connection may have dropped while the join was in flight).
    pub async fn join(&self, subscriber_id: SubscriberId, room: RoomKey) {
        let mut guard = self.inner.write().await;
        if !guard.senders.contains_key(&subscriber_id) {
            return;
        }
        guard.rooms.entry(room).or_default().insert(subscriber_id);
        guard
            .memberships
            .entry(subscriber_id)
            .or_default()
            .insert(room);
        tracing::debug!(?subscriber_id, room = %room, "joined room");
    }

    /// Leave a room. Never errors when the subscriber was not joined.
    pub async fn leave(&self, subscriber_id: SubscriberId, room: RoomKey) {
        let mut guard = self.inner.write().await;
        guard.remove_from_room(subscriber_id, room);
    }

    /// Whether the subscriber currently has the room joined.
    pub async fn is_joined(&self, subscriber_id: SubscriberId, room: RoomKey) -> bool {
        let guard = self.inner.read().await;
        guard
            .rooms
            .get(&room)
            .map(|members| members.contains(&subscriber_id))
            .unwrap_or(false)
    }

    /// Drop a connection and every room membership it held.
    ///
    /// Must not throw if the subscriber was never joined anywhere; disconnect
    /// races with in-flight sends are expected.
    pub async fn disconnect(&self, subscriber_id: SubscriberId) {
        let mut guard = self.inner.write().await;
        guard.drop_subscriber(subscriber_id);
        tracing::debug!(?subscriber_id, "subscriber disconnected");
    }

    /// Emit an event to every live handle in a room.
    ///
    /// Dead senders found during the emit are evicted. Returns the number of
    /// handles the payload was handed to; zero is not an error (delivery to
    /// disconnected users is reconciled via pull).
    pub async fn emit_to_room(&self, room: RoomKey, event: &WsOutboundEvent) -> usize {
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(room = %room, error = %e, "failed to serialize outbound event");
                return 0;
            }
        };
        self.emit_json_to_room(room, payload).await
    }

    /// Emit an already-serialized payload to a room.
    pub async fn emit_json_to_room(&self, room: RoomKey, payload: String) -> usize {
        let mut guard = self.inner.write().await;

        let members: Vec<SubscriberId> = match guard.rooms.get(&room) {
            Some(members) => members.iter().copied().collect(),
            None => return 0,
        };

        let mut delivered = 0;
        let mut dead: Vec<SubscriberId> = Vec::new();
        for subscriber_id in members {
            match guard.senders.get(&subscriber_id) {
                Some(sender) if sender.send(payload.clone()).is_ok() => delivered += 1,
                _ => dead.push(subscriber_id),
            }
        }

        for subscriber_id in dead {
            guard.drop_subscriber(subscriber_id);
            tracing::debug!(?subscriber_id, room = %room, "evicted dead sender during emit");
        }

        delivered
    }

    /// Emit an event to all of a user's live connections.
    pub async fn emit_to_user(&self, user_id: Uuid, event: &WsOutboundEvent) -> usize {
        self.emit_to_room(RoomKey::User(user_id), event).await
    }

    /// Number of subscribers currently joined to a room.
    pub async fn subscriber_count(&self, room: RoomKey) -> usize {
        let guard = self.inner.read().await;
        guard.rooms.get(&room).map(|m| m.len()).unwrap_or(0)
    }

    /// Total number of live connections.
    pub async fn total_connections(&self) -> usize {
        let guard = self.inner.read().await;
        guard.senders.len()
    }

    /// Number of distinct user rooms with at least one subscriber.
    pub async fn connected_users_count(&self) -> usize {
        let guard = self.inner.read().await;
        guard
            .rooms
            .keys()
            .filter(|room| matches!(room, RoomKey::User(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn test_event() -> WsOutboundEvent {
        WsOutboundEvent::NotificationRead {
            notification_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_registry_starts_empty() {
        let registry = RoomRegistry::new();
        assert_eq!(registry.total_connections().await, 0);
        assert_eq!(registry.connected_users_count().await, 0);
    }

    #[tokio::test]
    async fn test_connect_and_join_user_room() {
        let registry = RoomRegistry::new();
        let user_id = Uuid::new_v4();
        let (tx, _rx) = mpsc::unbounded_channel();

        let subscriber = registry.connect(tx).await;
        registry.join(subscriber, RoomKey::User(user_id)).await;

        assert_eq!(registry.total_connections().await, 1);
        assert_eq!(registry.subscriber_count(RoomKey::User(user_id)).await, 1);
        assert_eq!(registry.connected_users_count().await, 1);
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        let registry = RoomRegistry::new();
        let user_id = Uuid::new_v4();
        let (tx, _rx) = mpsc::unbounded_channel();

        let subscriber = registry.connect(tx).await;
        registry.join(subscriber, RoomKey::User(user_id)).await;
        registry.join(subscriber, RoomKey::User(user_id)).await;

        assert_eq!(registry.subscriber_count(RoomKey::User(user_id)).await, 1);
    }

    #[tokio::test]
    async fn test_multiple_connections_same_user() {
        let registry = RoomRegistry::new();
        let user_id = Uuid::new_v4();
        let mut receivers = Vec::new();

        for _ in 0..3 {
            let (tx, rx) = mpsc::unbounded_channel();
            let subscriber = registry.connect(tx).await;
            registry.join(subscriber, RoomKey::User(user_id)).await;
            receivers.push(rx);
        }

        assert_eq!(registry.subscriber_count(RoomKey::User(user_id)).await, 3);
        assert_eq!(registry.connected_users_count().await, 1);

        let delivered = registry.emit_to_user(user_id, &test_event()).await;
        assert_eq!(delivered, 3);

        for rx in &mut receivers {
            assert!(rx.recv().await.is_some());
        }
    }

    #[tokio::test]
    async fn test_emit_to_conversation_room() {
        let registry = RoomRegistry::new();
        let conversation_id = Uuid::new_v4();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        let a = registry.connect(tx_a).await;
        let b = registry.connect(tx_b).await;
        registry.join(a, RoomKey::Conversation(conversation_id)).await;
        registry.join(b, RoomKey::Conversation(conversation_id)).await;

        let delivered = registry
            .emit_to_room(RoomKey::Conversation(conversation_id), &test_event())
            .await;
        assert_eq!(delivered, 2);

        let payload = rx_a.recv().await.unwrap();
        assert!(payload.contains("notification_read"));
        assert!(rx_b.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_emit_to_absent_user_is_ok() {
        let registry = RoomRegistry::new();
        let delivered = registry.emit_to_user(Uuid::new_v4(), &test_event()).await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_disconnect_cleans_all_rooms() {
        let registry = RoomRegistry::new();
        let user_id = Uuid::new_v4();
        let conversation_id = Uuid::new_v4();
        let (tx, _rx) = mpsc::unbounded_channel();

        let subscriber = registry.connect(tx).await;
        registry.join(subscriber, RoomKey::User(user_id)).await;
        registry.join(subscriber, RoomKey::Conversation(conversation_id)).await;

        registry.disconnect(subscriber).await;

        assert_eq!(registry.total_connections().await, 0);
        assert_eq!(registry.subscriber_count(RoomKey::User(user_id)).await, 0);
        assert_eq!(
            registry
                .subscriber_count(RoomKey::Conversation(conversation_id))
                .await,
            0
        );
    }

    #[tokio::test]
    async fn test_disconnect_of_unknown_subscriber_is_a_noop() {
        let registry = RoomRegistry::new();
        registry.disconnect(SubscriberId::new()).await;
        assert_eq!(registry.total_connections().await, 0);
    }

    #[tokio::test]
    async fn test_leave_without_join_is_a_noop() {
        let registry = RoomRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let subscriber = registry.connect(tx).await;

        registry.leave(subscriber, RoomKey::User(Uuid::new_v4())).await;
        assert_eq!(registry.total_connections().await, 1);
    }

    #[tokio::test]
    async fn test_dead_senders_are_evicted_during_emit() {
        let registry = RoomRegistry::new();
        let user_id = Uuid::new_v4();

        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        let live = registry.connect(tx_live).await;
        registry.join(live, RoomKey::User(user_id)).await;

        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        let dead = registry.connect(tx_dead).await;
        registry.join(dead, RoomKey::User(user_id)).await;
        drop(rx_dead);

        let delivered = registry.emit_to_user(user_id, &test_event()).await;
        assert_eq!(delivered, 1);
        assert!(rx_live.recv().await.is_some());

        // The dead connection is gone entirely, not just from this room.
        assert_eq!(registry.total_connections().await, 1);
        assert_eq!(registry.subscriber_count(RoomKey::User(user_id)).await, 1);
    }

    #[tokio::test]
    async fn test_is_joined() {
        let registry = RoomRegistry::new();
        let room = RoomKey::Conversation(Uuid::new_v4());
        let (tx, _rx) = mpsc::unbounded_channel();
        let subscriber = registry.connect(tx).await;

        assert!(!registry.is_joined(subscriber, room).await);
        registry.join(subscriber, room).await;
        assert!(registry.is_joined(subscriber, room).await);
        registry.leave(subscriber, room).await;
        assert!(!registry.is_joined(subscriber, room).await);
    }

    #[tokio::test]
    async fn test_join_after_disconnect_is_ignored() {
        let registry = RoomRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let subscriber = registry.connect(tx).await;
        registry.disconnect(subscriber).await;

        registry.join(subscriber, RoomKey::User(Uuid::new_v4())).await;
        assert_eq!(registry.connected_users_count().await, 0);
    }

    #[test]
    fn test_room_key_naming_convention() {
        let id = Uuid::new_v4();
        assert_eq!(RoomKey::User(id).to_string(), format!("user:{id}"));
        assert_eq!(RoomKey::Conversation(id).to_string(), format!("room:{id}"));
    }
}
