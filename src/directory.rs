//! Seams to the platform-owned user and service catalogs.
//!
//! The messaging core never writes these tables; it only resolves ids before
//! acting on them, the same way the chat pipeline validates counterparties
//! through an injected client. Tests substitute in-memory implementations.

use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceListing {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub title: String,
}

/// Resolves user ids to display info.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, user_id: Uuid) -> AppResult<bool>;
    async fn lookup(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;
}

/// Resolves service ids to their listing (provider, title).
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    async fn resolve_service(&self, service_id: Uuid) -> AppResult<Option<ServiceListing>>;
    async fn services_of(&self, provider_id: Uuid) -> AppResult<Vec<Uuid>>;
}

/// Directory backed by the platform's `users` table.
pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn user_exists(&self, user_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::Database(format!("user_exists: {e}")))?;
        Ok(row.is_some())
    }

    async fn lookup(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query("SELECT id, display_name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::Database(format!("lookup user: {e}")))?;

        Ok(row.map(|r| UserProfile {
            id: r.get("id"),
            display_name: r.get("display_name"),
        }))
    }
}

/// Ledger backed by the platform's `services` table.
pub struct PgPaymentLedger {
    db: PgPool,
}

impl PgPaymentLedger {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentLedger for PgPaymentLedger {
    async fn resolve_service(&self, service_id: Uuid) -> AppResult<Option<ServiceListing>> {
        let row = sqlx::query("SELECT id, provider_id, title FROM services WHERE id = $1")
            .bind(service_id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::Database(format!("resolve_service: {e}")))?;

        Ok(row.map(|r| ServiceListing {
            id: r.get("id"),
            provider_id: r.get("provider_id"),
            title: r.get("title"),
        }))
    }

    async fn services_of(&self, provider_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows = sqlx::query("SELECT id FROM services WHERE provider_id = $1")
            .bind(provider_id)
            .fetch_all(&self.db)
            .await
            .map_err(|e| AppError::Database(format!("services_of: {e}")))?;

        Ok(rows.into_iter().map(|r| r.get("id")).collect())
    }
}
