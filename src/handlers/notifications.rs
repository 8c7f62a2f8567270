use super::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::models::{CreateNotification, NotificationKind, NotificationPriority};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateNotificationPayload {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub related_id: Option<Uuid>,
    pub priority: Option<String>,
}

/// POST /api/v1/notifications
pub async fn create_notification(
    state: web::Data<AppState>,
    req: web::Json<CreateNotificationPayload>,
) -> AppResult<HttpResponse> {
    let kind = NotificationKind::parse(&req.kind)
        .ok_or_else(|| AppError::Validation(format!("unknown notification kind: {}", req.kind)))?;
    let priority = match req.priority.as_deref() {
        Some(p) => NotificationPriority::parse(p)
            .ok_or_else(|| AppError::Validation(format!("unknown priority: {p}")))?,
        None => NotificationPriority::Normal,
    };

    let notification = state
        .notifications
        .create(CreateNotification {
            user_id: req.user_id,
            title: req.title.clone(),
            message: req.message.clone(),
            kind,
            related_id: req.related_id,
            priority,
        })
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(notification)))
}

/// GET /api/v1/notifications/user/{user_id}
pub async fn list_notifications(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let notifications = state.notifications.list_for_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(notifications)))
}

/// GET /api/v1/notifications/user/{user_id}/unread-count
pub async fn unread_count(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let count = state.notifications.unread_count(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(json!({ "unread": count }))))
}

/// PUT /api/v1/notifications/{id}/read
pub async fn mark_as_read(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let notification = state.notifications.mark_read(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(notification)))
}

/// PUT /api/v1/notifications/user/{user_id}/read-all
pub async fn mark_all_read(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let updated = state.notifications.mark_all_read(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(json!({ "updated": updated }))))
}

/// DELETE /api/v1/notifications/{id}
pub async fn delete_notification(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.notifications.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(json!({ "deleted": true }))))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/notifications")
            .route("", web::post().to(create_notification))
            .route("/user/{user_id}", web::get().to(list_notifications))
            .route("/user/{user_id}/unread-count", web::get().to(unread_count))
            .route("/user/{user_id}/read-all", web::put().to(mark_all_read))
            .route("/{id}/read", web::put().to(mark_as_read))
            .route("/{id}", web::delete().to(delete_notification)),
    );
}
