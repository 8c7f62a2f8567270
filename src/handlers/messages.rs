use super::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::models::MessageStatus;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SendMessagePayload {
    pub room_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct EditMessagePayload {
    pub sender_id: Uuid,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteMessageParams {
    pub sender_id: Uuid,
}

/// POST /api/v1/messages
pub async fn send_message(
    state: web::Data<AppState>,
    req: web::Json<SendMessagePayload>,
) -> AppResult<HttpResponse> {
    let message = state
        .messages
        .send(req.room_id, req.sender_id, req.receiver_id, &req.text)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(message)))
}

/// GET /api/v1/messages/room/{room_id}
pub async fn list_messages(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let messages = state
        .messages
        .list_by_conversation(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(messages)))
}

/// PUT /api/v1/messages/{id}/status
pub async fn update_message_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateStatusPayload>,
) -> AppResult<HttpResponse> {
    let status = MessageStatus::parse(&req.status)
        .ok_or_else(|| AppError::Validation(format!("unknown message status: {}", req.status)))?;
    let message = state
        .messages
        .update_status(path.into_inner(), status)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(message)))
}

/// PUT /api/v1/messages/{id}
pub async fn edit_message(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<EditMessagePayload>,
) -> AppResult<HttpResponse> {
    let message = state
        .messages
        .edit(path.into_inner(), req.sender_id, &req.text)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(message)))
}

/// DELETE /api/v1/messages/{id}?sender_id=...
pub async fn delete_message(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    params: web::Query<DeleteMessageParams>,
) -> AppResult<HttpResponse> {
    state
        .messages
        .delete(path.into_inner(), params.sender_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "deleted": true }))))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/messages")
            .route("", web::post().to(send_message))
            .route("/room/{room_id}", web::get().to(list_messages))
            .route("/{id}/status", web::put().to(update_message_status))
            .route("/{id}", web::put().to(edit_message))
            .route("/{id}", web::delete().to(delete_message)),
    );
}
