// libs/doctor-cell/src/services/schedule.rs
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::{filter_value, SupabaseClient};

use crate::models::{Slot, SlotStatus};

/// Per-specialist slot lists. Mutation only happens through conditional writes.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn list_open_slots(&self, specialist_id: &str) -> Result<Vec<Slot>>;

    /// Marks the slot Booked under `hold_id`, only if its status is still
    /// `expected`. Returns `false` when the precondition no longer holds.
    async fn try_book(
        &self,
        specialist_id: &str,
        slot_id: &str,
        expected: SlotStatus,
        hold_id: &str,
    ) -> Result<bool>;

    /// Conditional Booked -> Open, applied only while the slot is still held
    /// by `hold_id`. Safe to call when it is unknown whether `try_book` applied.
    async fn release(&self, specialist_id: &str, slot_id: &str, hold_id: &str) -> Result<bool>;
}

pub struct SupabaseScheduleStore {
    supabase: SupabaseClient,
    table: String,
}

impl SupabaseScheduleStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            table: config.doctor_slots_table.clone(),
        }
    }

    /// PATCH filtered on the current state; PostgREST echoes back only the
    /// rows it changed, so an empty representation means the condition failed.
    async fn conditional_update(
        &self,
        specialist_id: &str,
        slot_id: &str,
        condition: &str,
        change: Value,
    ) -> Result<bool> {
        let path = format!(
            "/rest/v1/{}?slot_id=eq.{}&doctor_id=eq.{}&{}",
            self.table,
            filter_value(slot_id),
            filter_value(specialist_id),
            condition,
        );

        let updated: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(change),
            Some(SupabaseClient::return_representation()),
        ).await?;

        let applied = !updated.is_empty();
        debug!(
            "Conditional update on slot {} for doctor {} where {}: applied={}",
            slot_id, specialist_id, condition, applied
        );
        Ok(applied)
    }
}

#[async_trait]
impl ScheduleStore for SupabaseScheduleStore {
    async fn list_open_slots(&self, specialist_id: &str) -> Result<Vec<Slot>> {
        let path = format!(
            "/rest/v1/{}?doctor_id=eq.{}&status=eq.open&order=starts_at.asc",
            self.table,
            filter_value(specialist_id),
        );
        let slots: Vec<Slot> = self.supabase.request(Method::GET, &path, None).await?;
        debug!("Found {} open slots for doctor {}", slots.len(), specialist_id);
        Ok(slots)
    }

    async fn try_book(
        &self,
        specialist_id: &str,
        slot_id: &str,
        expected: SlotStatus,
        hold_id: &str,
    ) -> Result<bool> {
        self.conditional_update(
            specialist_id,
            slot_id,
            &format!("status=eq.{}", expected),
            json!({ "status": SlotStatus::Booked.as_str(), "hold_id": hold_id }),
        ).await
    }

    async fn release(&self, specialist_id: &str, slot_id: &str, hold_id: &str) -> Result<bool> {
        info!("Releasing slot {} for doctor {}", slot_id, specialist_id);
        self.conditional_update(
            specialist_id,
            slot_id,
            &format!("status=eq.{}&hold_id=eq.{}", SlotStatus::Booked, filter_value(hold_id)),
            json!({ "status": SlotStatus::Open.as_str(), "hold_id": null }),
        ).await
    }
}
