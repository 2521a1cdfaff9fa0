// libs/appointment-cell/src/services/store.rs
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::{filter_value, SupabaseClient, SupabaseError};

use crate::models::Booking;

/// A booking with this confirmation id already exists. Stores return it
/// inside `anyhow::Error` so the caller can retry with a fresh id.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Duplicate confirmation id {0}")]
pub struct DuplicateConfirmationId(pub String);

/// Persistence for confirmed bookings. Records are append-only.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<()>;

    async fn list_for_specialist(&self, specialist_id: &str) -> Result<Vec<Booking>>;
}

pub struct SupabaseBookingStore {
    supabase: SupabaseClient,
    table: String,
}

impl SupabaseBookingStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            table: config.appointments_table.clone(),
        }
    }
}

#[async_trait]
impl BookingStore for SupabaseBookingStore {
    async fn insert(&self, booking: &Booking) -> Result<()> {
        let path = format!("/rest/v1/{}", self.table);

        let created: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            &path,
            Some(serde_json::to_value(booking)?),
            Some(SupabaseClient::return_representation()),
        ).await
        .map_err(|e| {
            if matches!(e.downcast_ref::<SupabaseError>(), Some(SupabaseError::Conflict(_))) {
                DuplicateConfirmationId(booking.confirmation_id.clone()).into()
            } else {
                e
            }
        })?;

        if created.is_empty() {
            return Err(anyhow!("Failed to create booking {}", booking.confirmation_id));
        }

        debug!("Booking {} stored", booking.confirmation_id);
        Ok(())
    }

    async fn list_for_specialist(&self, specialist_id: &str) -> Result<Vec<Booking>> {
        let path = format!(
            "/rest/v1/{}?doctor_id=eq.{}&order=slot_starts_at.asc",
            self.table,
            filter_value(specialist_id),
        );
        self.supabase.request(Method::GET, &path, None).await
    }
}

#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: Mutex<Vec<Booking>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Result<Vec<Booking>> {
        self.bookings.lock()
            .map(|bookings| bookings.clone())
            .map_err(|_| anyhow!("booking lock poisoned"))
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert(&self, booking: &Booking) -> Result<()> {
        let mut bookings = self.bookings.lock()
            .map_err(|_| anyhow!("booking lock poisoned"))?;

        if bookings.iter().any(|existing| existing.confirmation_id == booking.confirmation_id) {
            return Err(DuplicateConfirmationId(booking.confirmation_id.clone()).into());
        }

        bookings.push(booking.clone());
        Ok(())
    }

    async fn list_for_specialist(&self, specialist_id: &str) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self.all()?
            .into_iter()
            .filter(|booking| booking.specialist_id == specialist_id)
            .collect();
        bookings.sort_by(|a, b| a.slot_starts_at.cmp(&b.slot_starts_at));
        Ok(bookings)
    }
}
