use super::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::websocket::session::{BroadcastMessage, WsSession};
use crate::websocket::RoomKey;
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub user_id: Uuid,
}

/// WebSocket upgrade endpoint
///
/// GET /ws?user_id=...
///
/// The connection is registered with the room registry before the actor
/// starts, and the registry's receiving end is bridged into the actor
/// mailbox so every room emit reaches this client.
pub async fn ws_entry(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    query: web::Query<WsParams>,
) -> Result<HttpResponse, actix_web::Error> {
    let params = query.into_inner();

    if !state.directory.user_exists(params.user_id).await? {
        return Err(AppError::Validation(format!(
            "user {} does not exist",
            params.user_id
        ))
        .into());
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    let subscriber_id = state.registry.connect(tx).await;

    let session = WsSession::new(params.user_id, subscriber_id, state.as_ref().clone());
    let (addr, resp) = ws::WsResponseBuilder::new(session, &req, stream).start_with_addr()?;

    // Bridge registry emits into the WebSocket actor.
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            addr.do_send(BroadcastMessage(payload));
        }
    });

    Ok(resp)
}

/// GET /api/v1/ws/status/{user_id}
pub async fn ws_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    let connection_count = state.registry.subscriber_count(RoomKey::User(user_id)).await;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(json!({
        "user_id": user_id.to_string(),
        "connected": connection_count > 0,
        "connection_count": connection_count,
    }))))
}

/// GET /api/v1/ws/metrics
pub async fn ws_metrics(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let total_connections = state.registry.total_connections().await;
    let connected_users = state.registry.connected_users_count().await;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(json!({
        "total_connections": total_connections,
        "connected_users": connected_users,
    }))))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws", web::get().to(ws_entry)).service(
        web::scope("/api/v1/ws")
            .route("/status/{user_id}", web::get().to(ws_status))
            .route("/metrics", web::get().to(ws_metrics)),
    );
}
