use crate::state::AppState;
use crate::websocket::{RoomKey, SubscriberId, WsInboundEvent, WsOutboundEvent};
use actix::{Actor, ActorContext, Addr, AsyncContext, Handler, Message as ActixMessage, StreamHandler};
use actix_web_actors::ws;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
/// How long before lack of client response causes a disconnect
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Payload forwarded from the room registry into the actor mailbox
#[derive(ActixMessage)]
#[rtype(result = "()")]
pub struct BroadcastMessage(pub String);

/// WebSocket session actor for one live client connection.
///
/// The session owns no business logic: inbound frames are parsed at the
/// boundary into [`WsInboundEvent`] and dispatched to the pipeline
/// components; everything the client should see comes back through the
/// registry sender that was registered for this session.
pub struct WsSession {
    user_id: Uuid,
    subscriber_id: SubscriberId,
    state: AppState,
    hb: Instant,
}

impl WsSession {
    pub fn new(user_id: Uuid, subscriber_id: SubscriberId, state: AppState) -> Self {
        Self {
            user_id,
            subscriber_id,
            state,
            hb: Instant::now(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                tracing::warn!(user_id = %act.user_id, "WebSocket heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

async fn handle_ws_event(
    state: AppState,
    user_id: Uuid,
    subscriber_id: SubscriberId,
    evt: WsInboundEvent,
    addr: Addr<WsSession>,
) {
    let result = dispatch_ws_event(&state, user_id, subscriber_id, evt).await;

    if let Err(e) = result {
        tracing::debug!(user_id = %user_id, error = %e, "rejected WebSocket event");
        let reply = WsOutboundEvent::error(
            e.to_response().code,
            e.to_string(),
        );
        if let Ok(json) = reply.to_json() {
            addr.do_send(BroadcastMessage(json));
        }
    }
}

async fn dispatch_ws_event(
    state: &AppState,
    user_id: Uuid,
    subscriber_id: SubscriberId,
    evt: WsInboundEvent,
) -> crate::error::AppResult<()> {
    match evt {
        WsInboundEvent::JoinUserRoom { user_id: claimed } => {
            // A session may only subscribe to its own notification room.
            if claimed != user_id {
                return Err(crate::error::AppError::Forbidden);
            }
            state
                .registry
                .join(subscriber_id, RoomKey::User(user_id))
                .await;
            Ok(())
        }

        WsInboundEvent::JoinRoom { room_id } => {
            if !state.conversations.is_member(room_id, user_id).await? {
                return Err(crate::error::AppError::Forbidden);
            }
            state
                .registry
                .join(subscriber_id, RoomKey::Conversation(room_id))
                .await;
            Ok(())
        }

        WsInboundEvent::JoinChat {
            service_id,
            user_id: claimed,
            service_provider_id,
        } => {
            if claimed != user_id {
                return Err(crate::error::AppError::Forbidden);
            }
            let conversation = state
                .conversations
                .get_or_create(user_id, service_provider_id)
                .await?;
            state
                .registry
                .join(subscriber_id, RoomKey::Conversation(conversation.id))
                .await;
            tracing::debug!(
                user_id = %user_id,
                service_id = %service_id,
                conversation_id = %conversation.id,
                "joined chat"
            );
            // Tell this session which room the chat landed in.
            state
                .registry
                .emit_to_room(
                    RoomKey::Conversation(conversation.id),
                    &WsOutboundEvent::JoinedChat { conversation },
                )
                .await;
            Ok(())
        }

        WsInboundEvent::SendMessage {
            room_id,
            sender_id,
            receiver_id,
            text,
        } => {
            if sender_id != user_id {
                return Err(crate::error::AppError::Forbidden);
            }
            state
                .messages
                .send(room_id, sender_id, receiver_id, &text)
                .await?;
            Ok(())
        }

        WsInboundEvent::Typing {
            room_id,
            user_id: claimed,
            is_typing,
        } => {
            // Ephemeral; only relayed for rooms this session actually joined.
            if claimed != user_id {
                return Err(crate::error::AppError::Forbidden);
            }
            let room = RoomKey::Conversation(room_id);
            if state.registry.is_joined(subscriber_id, room).await {
                state
                    .registry
                    .emit_to_room(
                        room,
                        &WsOutboundEvent::Typing {
                            room_id,
                            user_id,
                            is_typing,
                        },
                    )
                    .await;
            }
            Ok(())
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(user_id = %self.user_id, "WebSocket session started");
        self.hb(ctx);

        if let Ok(json) = WsOutboundEvent::connected().to_json() {
            ctx.text(json);
        }

        crate::metrics::ws_connection_opened();
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(user_id = %self.user_id, "WebSocket session stopped");

        let registry = self.state.registry.clone();
        let subscriber_id = self.subscriber_id;
        actix::spawn(async move {
            registry.disconnect(subscriber_id).await;
        });

        crate::metrics::ws_connection_closed();
    }
}

impl Handler<BroadcastMessage> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: BroadcastMessage, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match WsInboundEvent::from_json(&text) {
                Ok(evt) => {
                    let state = self.state.clone();
                    let user_id = self.user_id;
                    let subscriber_id = self.subscriber_id;
                    let addr = ctx.address();
                    actix::spawn(handle_ws_event(state, user_id, subscriber_id, evt, addr));
                }
                Err(e) => {
                    tracing::warn!(user_id = %self.user_id, error = %e, "unparseable WS frame");
                    if let Ok(json) =
                        WsOutboundEvent::error("VALIDATION_ERROR", "unrecognized event").to_json()
                    {
                        ctx.text(json);
                    }
                }
            },
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!("binary WebSocket messages not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::debug!(?reason, "WebSocket close received");
                ctx.stop();
            }
            _ => {}
        }
    }
}
