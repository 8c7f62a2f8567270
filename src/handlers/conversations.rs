use super::ApiResponse;
use crate::error::AppResult;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateConversationPayload {
    pub user_a: Uuid,
    pub user_b: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PatchConversationPayload {
    pub last_message: Option<String>,
}

/// Get-or-create the conversation between two users
///
/// POST /api/v1/conversations
pub async fn create_conversation(
    state: web::Data<AppState>,
    req: web::Json<CreateConversationPayload>,
) -> AppResult<HttpResponse> {
    let conversation = state
        .conversations
        .get_or_create(req.user_a, req.user_b)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(conversation)))
}

/// GET /api/v1/conversations/{id}
pub async fn get_conversation(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let conversation = state.conversations.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(conversation)))
}

/// GET /api/v1/conversations/user/{user_id}
pub async fn list_conversations(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let conversations = state.conversations.list_for_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(conversations)))
}

/// PATCH /api/v1/conversations/{id}
pub async fn update_conversation(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<PatchConversationPayload>,
) -> AppResult<HttpResponse> {
    let conversation = state
        .conversations
        .update(path.into_inner(), req.into_inner().last_message)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(conversation)))
}

/// DELETE /api/v1/conversations/{id}
pub async fn delete_conversation(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.conversations.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "deleted": true }))))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/conversations")
            .route("", web::post().to(create_conversation))
            .route("/user/{user_id}", web::get().to(list_conversations))
            .route("/{id}", web::get().to(get_conversation))
            .route("/{id}", web::patch().to(update_conversation))
            .route("/{id}", web::delete().to(delete_conversation)),
    );
}
