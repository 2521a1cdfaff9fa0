// libs/doctor-cell/src/services/memory.rs
//
// In-process stores for local development and tests.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Timelike, Utc};

use crate::models::{Slot, SlotStatus, Specialist};
use crate::services::directory::DirectoryStore;
use crate::services::schedule::ScheduleStore;

#[derive(Default)]
pub struct InMemoryDirectoryStore {
    specialists: RwLock<Vec<Specialist>>,
}

impl InMemoryDirectoryStore {
    pub fn new(specialists: Vec<Specialist>) -> Self {
        Self { specialists: RwLock::new(specialists) }
    }

    pub fn insert(&self, specialist: Specialist) -> Result<()> {
        let mut specialists = self.specialists.write()
            .map_err(|_| anyhow!("directory lock poisoned"))?;
        specialists.retain(|existing| existing.id != specialist.id);
        specialists.push(specialist);
        Ok(())
    }

    fn snapshot(&self) -> Result<Vec<Specialist>> {
        self.specialists.read()
            .map(|specialists| specialists.clone())
            .map_err(|_| anyhow!("directory lock poisoned"))
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn query(&self, specialty: &str, location: &str) -> Result<Vec<Specialist>> {
        let mut matches: Vec<Specialist> = self.snapshot()?
            .into_iter()
            .filter(|specialist| specialist.matches(specialty, location))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matches)
    }

    async fn get(&self, specialist_id: &str) -> Result<Option<Specialist>> {
        Ok(self.snapshot()?
            .into_iter()
            .find(|specialist| specialist.id == specialist_id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Specialist>> {
        let wanted = name.trim().to_lowercase();
        let mut specialists = self.snapshot()?;
        specialists.sort_by(|a, b| a.name.cmp(&b.name));

        if let Some(exact) = specialists.iter().find(|s| s.name.to_lowercase() == wanted) {
            return Ok(Some(exact.clone()));
        }

        Ok(specialists.into_iter()
            .find(|s| s.name.to_lowercase().contains(&wanted)))
    }
}

/// Slot lists keyed by specialist id. Conditional writes compare and swap
/// under a single mutex.
#[derive(Default)]
pub struct InMemoryScheduleStore {
    slots: Mutex<HashMap<String, Vec<Slot>>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, slot: Slot) -> Result<()> {
        let mut slots = self.slots.lock()
            .map_err(|_| anyhow!("schedule lock poisoned"))?;
        let entry = slots.entry(slot.specialist_id.clone()).or_default();
        entry.retain(|existing| existing.id != slot.id);
        entry.push(slot);
        Ok(())
    }

    /// Every slot for the specialist regardless of status.
    pub fn all_slots(&self, specialist_id: &str) -> Result<Vec<Slot>> {
        let slots = self.slots.lock()
            .map_err(|_| anyhow!("schedule lock poisoned"))?;
        Ok(slots.get(specialist_id).cloned().unwrap_or_default())
    }

    fn book_if(
        &self,
        specialist_id: &str,
        slot_id: &str,
        expected: SlotStatus,
        hold_id: &str,
    ) -> Result<bool> {
        self.update_slot(specialist_id, slot_id, |slot| {
            if slot.status != expected {
                return false;
            }
            slot.status = SlotStatus::Booked;
            slot.hold_id = Some(hold_id.to_string());
            true
        })
    }

    fn release_if_held(&self, specialist_id: &str, slot_id: &str, hold_id: &str) -> Result<bool> {
        self.update_slot(specialist_id, slot_id, |slot| {
            if slot.status != SlotStatus::Booked || slot.hold_id.as_deref() != Some(hold_id) {
                return false;
            }
            slot.status = SlotStatus::Open;
            slot.hold_id = None;
            true
        })
    }

    /// Runs `apply` on the slot while holding the lock; unknown slots are a no-op.
    fn update_slot(
        &self,
        specialist_id: &str,
        slot_id: &str,
        apply: impl FnOnce(&mut Slot) -> bool,
    ) -> Result<bool> {
        let mut slots = self.slots.lock()
            .map_err(|_| anyhow!("schedule lock poisoned"))?;

        Ok(slots.get_mut(specialist_id)
            .and_then(|list| list.iter_mut().find(|slot| slot.id == slot_id))
            .map(apply)
            .unwrap_or(false))
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn list_open_slots(&self, specialist_id: &str) -> Result<Vec<Slot>> {
        Ok(self.all_slots(specialist_id)?
            .into_iter()
            .filter(Slot::is_open)
            .collect())
    }

    async fn try_book(
        &self,
        specialist_id: &str,
        slot_id: &str,
        expected: SlotStatus,
        hold_id: &str,
    ) -> Result<bool> {
        self.book_if(specialist_id, slot_id, expected, hold_id)
    }

    async fn release(&self, specialist_id: &str, slot_id: &str, hold_id: &str) -> Result<bool> {
        self.release_if_held(specialist_id, slot_id, hold_id)
    }
}

/// Sample directory used when no Supabase project is configured.
pub fn demo_stores(now: DateTime<Utc>) -> Result<(InMemoryDirectoryStore, InMemoryScheduleStore)> {
    let specialists = vec![
        Specialist::new("DOC-001", "Dr. Sarah Mehta", "Pulmonology", "Pune"),
        Specialist::new("DOC-002", "Dr. Arjun Rao", "Cardiology", "Pune"),
        Specialist::new("DOC-003", "Dr. Priya Nair", "Cardiology", "Mumbai"),
        Specialist::new("DOC-004", "Dr. Kavita Shah", "Dermatology", "Bengaluru"),
        Specialist::new("DOC-005", "Dr. Rohan Desai", "General Medicine", "Pune"),
    ];

    let tomorrow = (now + Duration::days(1))
        .with_hour(9)
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .ok_or_else(|| anyhow!("failed to compute demo schedule start"))?;

    let schedule = InMemoryScheduleStore::new();
    for (doctor_index, specialist) in specialists.iter().enumerate() {
        for slot_index in 0..4i64 {
            let starts_at = tomorrow
                + Duration::days(slot_index / 2)
                + Duration::minutes(30 * doctor_index as i64 + 270 * (slot_index % 2));
            schedule.insert(Slot::open(
                &format!("{}-S{}", specialist.id, slot_index + 1),
                &specialist.id,
                starts_at,
            ))?;
        }
    }

    Ok((InMemoryDirectoryStore::new(specialists), schedule))
}
