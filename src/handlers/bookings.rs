use super::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::models::BookingDecision;
use crate::services::CreateBooking;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RespondPayload {
    pub decision: String,
    pub responder_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CompletePayload {
    pub responder_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PatchBookingPayload {
    pub date: Option<DateTime<Utc>>,
    pub space: Option<i32>,
    pub phone_number: Option<String>,
}

/// POST /api/v1/bookings
pub async fn create_booking(
    state: web::Data<AppState>,
    req: web::Json<CreateBooking>,
) -> AppResult<HttpResponse> {
    let booking = state.bookings.create(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(booking)))
}

/// GET /api/v1/bookings/{id}
pub async fn get_booking(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let booking = state.bookings.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(booking)))
}

/// GET /api/v1/bookings/user/{user_id}
pub async fn list_bookings_for_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let bookings = state.bookings.list_for_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(bookings)))
}

/// GET /api/v1/bookings/provider/{provider_id}
pub async fn list_bookings_for_provider(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let bookings = state.bookings.list_for_provider(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(bookings)))
}

/// PUT /api/v1/bookings/{id}/respond
pub async fn respond_booking(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<RespondPayload>,
) -> AppResult<HttpResponse> {
    let decision = match req.decision.as_str() {
        "confirmed" => BookingDecision::Confirmed,
        "canceled" => BookingDecision::Canceled,
        other => {
            return Err(AppError::Validation(format!(
                "decision must be confirmed or canceled, got {other}"
            )))
        }
    };

    let booking = state
        .bookings
        .respond(path.into_inner(), decision, req.responder_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(booking)))
}

/// PUT /api/v1/bookings/{id}/complete
pub async fn complete_booking(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<CompletePayload>,
) -> AppResult<HttpResponse> {
    let booking = state
        .bookings
        .complete(path.into_inner(), req.responder_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(booking)))
}

/// PATCH /api/v1/bookings/{id}
pub async fn update_booking(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<PatchBookingPayload>,
) -> AppResult<HttpResponse> {
    let payload = req.into_inner();
    let booking = state
        .bookings
        .update(
            path.into_inner(),
            payload.date,
            payload.space,
            payload.phone_number,
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(booking)))
}

/// DELETE /api/v1/bookings/{id}
pub async fn delete_booking(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.bookings.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(json!({ "deleted": true }))))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/bookings")
            .route("", web::post().to(create_booking))
            .route("/user/{user_id}", web::get().to(list_bookings_for_user))
            .route(
                "/provider/{provider_id}",
                web::get().to(list_bookings_for_provider),
            )
            .route("/{id}/respond", web::put().to(respond_booking))
            .route("/{id}/complete", web::put().to(complete_booking))
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}", web::patch().to(update_booking))
            .route("/{id}", web::delete().to(delete_booking)),
    );
}
