use crate::directory::{PaymentLedger, ServiceListing, UserDirectory};
use crate::error::{AppError, AppResult};
use crate::models::booking::phone_is_valid;
use crate::models::{
    Booking, BookingDecision, BookingStatus, CreateNotification, NotificationKind,
    NotificationPriority,
};
use crate::services::NotificationCenter;
use crate::websocket::{RoomRegistry, WsOutboundEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

/// Drives booking status transitions and the paired notifications to
/// customer and provider.
///
/// Every transition is one guarded row update followed by a notification and
/// a best-effort push, in that order. If the status write does not land,
/// nothing else happens, so the booking is never left ambiguous.
pub struct BookingWorkflow {
    db: PgPool,
    registry: RoomRegistry,
    notifications: Arc<NotificationCenter>,
    directory: Arc<dyn UserDirectory>,
    ledger: Arc<dyn PaymentLedger>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBooking {
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub event_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    #[serde(default = "default_space")]
    pub space: i32,
    pub phone_number: String,
}

fn default_space() -> i32 {
    1
}

fn booking_from_row(row: &PgRow) -> AppResult<Booking> {
    let status_str: String = row.get("status");

    Ok(Booking {
        id: row.get("id"),
        user_id: row.get("user_id"),
        service_id: row.get("service_id"),
        event_id: row.get("event_id"),
        date: row.get("date"),
        space: row.get("space"),
        phone_number: row.get("phone_number"),
        status: BookingStatus::parse(&status_str)
            .ok_or_else(|| AppError::Database(format!("unknown booking status: {status_str}")))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const BOOKING_COLUMNS: &str =
    "id, user_id, service_id, event_id, date, space, phone_number, status, created_at, updated_at";

impl BookingWorkflow {
    pub fn new(
        db: PgPool,
        registry: RoomRegistry,
        notifications: Arc<NotificationCenter>,
        directory: Arc<dyn UserDirectory>,
        ledger: Arc<dyn PaymentLedger>,
    ) -> Self {
        Self {
            db,
            registry,
            notifications,
            directory,
            ledger,
        }
    }

    fn validate_request(date: DateTime<Utc>, space: i32, phone_number: &str) -> AppResult<()> {
        if date <= Utc::now() {
            return Err(AppError::Validation(
                "booking date must be in the future".to_string(),
            ));
        }
        if space < 1 {
            return Err(AppError::Validation(
                "space must be at least 1".to_string(),
            ));
        }
        if !phone_is_valid(phone_number) {
            return Err(AppError::Validation(format!(
                "invalid phone number: {phone_number}"
            )));
        }
        Ok(())
    }

    async fn resolve_listing(&self, service_id: Uuid) -> AppResult<ServiceListing> {
        self.ledger
            .resolve_service(service_id)
            .await?
            .ok_or(AppError::NotFound("service"))
    }

    /// Create a pending booking and notify the service's provider.
    pub async fn create(&self, req: CreateBooking) -> AppResult<Booking> {
        Self::validate_request(req.date, req.space, &req.phone_number)?;

        if !self.directory.user_exists(req.user_id).await? {
            return Err(AppError::Validation(format!(
                "user {} does not exist",
                req.user_id
            )));
        }
        let listing = self.resolve_listing(req.service_id).await?;

        let row = sqlx::query(&format!(
            "INSERT INTO bookings (id, user_id, service_id, event_id, date, space, phone_number, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.user_id)
        .bind(req.service_id)
        .bind(req.event_id)
        .bind(req.date)
        .bind(req.space)
        .bind(&req.phone_number)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("insert booking: {e}")))?;

        let booking = booking_from_row(&row)?;

        tracing::info!(
            booking_id = %booking.id,
            user_id = %booking.user_id,
            service_id = %booking.service_id,
            "booking created"
        );

        self.notifications
            .create(CreateNotification {
                user_id: listing.provider_id,
                title: "New booking request".to_string(),
                message: format!("New booking request for {}", listing.title),
                kind: NotificationKind::Booking,
                related_id: Some(booking.id),
                priority: NotificationPriority::High,
            })
            .await?;

        self.registry
            .emit_to_user(
                listing.provider_id,
                &WsOutboundEvent::NewBooking {
                    booking: booking.clone(),
                },
            )
            .await;

        Ok(booking)
    }

    pub async fn get(&self, booking_id: Uuid) -> AppResult<Booking> {
        let row = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("get booking: {e}")))?;

        match row {
            Some(row) => booking_from_row(&row),
            None => Err(AppError::NotFound("booking")),
        }
    }

    /// Answer a pending booking request.
    ///
    /// Only the provider the booking's service belongs to may respond, and
    /// only from `pending`. The guarded update makes a lost race surface as
    /// an invalid transition instead of a double response.
    pub async fn respond(
        &self,
        booking_id: Uuid,
        decision: BookingDecision,
        responder_id: Uuid,
    ) -> AppResult<Booking> {
        let booking = self.get(booking_id).await?;
        let listing = self.resolve_listing(booking.service_id).await?;
        if responder_id != listing.provider_id {
            return Err(AppError::Forbidden);
        }

        let next = decision.into_status();
        let updated = self
            .transition(booking_id, BookingStatus::Pending, next, booking.status)
            .await?;

        self.notifications
            .create(CreateNotification {
                user_id: updated.user_id,
                title: format!("Booking {}", next.as_str()),
                message: format!("Your booking for {} was {}", listing.title, next.as_str()),
                kind: NotificationKind::Response,
                related_id: Some(updated.id),
                priority: NotificationPriority::High,
            })
            .await?;

        self.registry
            .emit_to_user(
                updated.user_id,
                &WsOutboundEvent::BookingResponse {
                    booking: updated.clone(),
                },
            )
            .await;

        Ok(updated)
    }

    /// Close out a confirmed booking after the event took place.
    pub async fn complete(&self, booking_id: Uuid, responder_id: Uuid) -> AppResult<Booking> {
        let booking = self.get(booking_id).await?;
        let listing = self.resolve_listing(booking.service_id).await?;
        if responder_id != listing.provider_id {
            return Err(AppError::Forbidden);
        }

        let updated = self
            .transition(
                booking_id,
                BookingStatus::Confirmed,
                BookingStatus::Completed,
                booking.status,
            )
            .await?;

        self.notifications
            .create(CreateNotification {
                user_id: updated.user_id,
                title: "Booking completed".to_string(),
                message: format!("Your booking for {} was completed", listing.title),
                kind: NotificationKind::Response,
                related_id: Some(updated.id),
                priority: NotificationPriority::Normal,
            })
            .await?;

        self.registry
            .emit_to_user(
                updated.user_id,
                &WsOutboundEvent::BookingResponse {
                    booking: updated.clone(),
                },
            )
            .await;

        Ok(updated)
    }

    /// Single guarded status write. `observed` is only used for the error
    /// message when the row moved underneath us.
    async fn transition(
        &self,
        booking_id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        observed: BookingStatus,
    ) -> AppResult<Booking> {
        let row = sqlx::query(&format!(
            "UPDATE bookings
             SET status = $2, updated_at = NOW()
             WHERE id = $1 AND status = $3
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id)
        .bind(next.as_str())
        .bind(expected.as_str())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("booking transition: {e}")))?;

        match row {
            Some(row) => booking_from_row(&row),
            None => Err(AppError::InvalidState {
                entity: "booking",
                from: observed.as_str().to_string(),
                to: next.as_str().to_string(),
            }),
        }
    }

    /// Patch a booking's details. Only allowed while still pending.
    pub async fn update(
        &self,
        booking_id: Uuid,
        date: Option<DateTime<Utc>>,
        space: Option<i32>,
        phone_number: Option<String>,
    ) -> AppResult<Booking> {
        let booking = self.get(booking_id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(AppError::InvalidState {
                entity: "booking",
                from: booking.status.as_str().to_string(),
                to: "updated".to_string(),
            });
        }

        let date = date.unwrap_or(booking.date);
        let space = space.unwrap_or(booking.space);
        let phone_number = phone_number.unwrap_or(booking.phone_number);
        Self::validate_request(date, space, &phone_number)?;

        let row = sqlx::query(&format!(
            "UPDATE bookings
             SET date = $2, space = $3, phone_number = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id)
        .bind(date)
        .bind(space)
        .bind(&phone_number)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("update booking: {e}")))?;

        booking_from_row(&row)
    }

    pub async fn delete(&self, booking_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking_id)
            .execute(&self.db)
            .await
            .map_err(|e| AppError::Database(format!("delete booking: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("booking"));
        }

        Ok(())
    }

    /// Bookings placed by a customer, newest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
             WHERE user_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("list bookings: {e}")))?;

        rows.iter().map(booking_from_row).collect()
    }

    /// Bookings addressed to a provider (across all of their services).
    pub async fn list_for_provider(&self, provider_id: Uuid) -> AppResult<Vec<Booking>> {
        let service_ids = self.ledger.services_of(provider_id).await?;
        if service_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
             WHERE service_id = ANY($1)
             ORDER BY created_at DESC"
        ))
        .bind(&service_ids)
        .fetch_all(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("list provider bookings: {e}")))?;

        rows.iter().map(booking_from_row).collect()
    }
}
