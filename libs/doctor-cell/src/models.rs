use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Maximum number of upcoming slots shown next to each search result.
pub const NEXT_SLOTS_PER_SPECIALIST: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialist {
    #[serde(rename = "doctor_id")]
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub location: String,
}

impl Specialist {
    pub fn new(id: &str, name: &str, specialty: &str, location: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            specialty: specialty.to_string(),
            location: location.to_string(),
        }
    }

    /// Case-insensitive for any script, like Postgres `ilike`.
    pub fn matches(&self, specialty: &str, location: &str) -> bool {
        same_text(&self.specialty, specialty) && same_text(&self.location, location)
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Open,
    Booked,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Open => "open",
            SlotStatus::Booked => "booked",
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(rename = "slot_id")]
    pub id: String,
    #[serde(rename = "doctor_id")]
    pub specialist_id: String,
    pub starts_at: DateTime<Utc>,
    pub status: SlotStatus,
    /// Token of the reservation that booked the slot. Releases must present it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_id: Option<String>,
}

impl Slot {
    pub fn open(id: &str, specialist_id: &str, starts_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            specialist_id: specialist_id.to_string(),
            starts_at,
            status: SlotStatus::Open,
            hold_id: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == SlotStatus::Open
    }
}

/// A slot as presented to a requester. `number` is only meaningful for the
/// listing it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedSlot {
    pub number: usize,
    pub slot: Slot,
}

/// Numbers open slots 1..N in ascending start order.
pub fn number_open_slots(mut slots: Vec<Slot>, now: DateTime<Utc>) -> Vec<NumberedSlot> {
    slots.retain(|slot| slot.is_open() && slot.starts_at > now);
    slots.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then_with(|| a.id.cmp(&b.id)));

    slots.into_iter()
        .enumerate()
        .map(|(index, slot)| NumberedSlot { number: index + 1, slot })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialistMatch {
    pub specialist: Specialist,
    pub next_available_slots: Vec<Slot>,
}

impl SpecialistMatch {
    pub fn first_available(&self) -> Option<DateTime<Utc>> {
        self.next_available_slots.first().map(|slot| slot.starts_at)
    }
}

/// Identifies a specialist by id or by display name; the id wins when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistRef {
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
}

impl SpecialistRef {
    pub fn by_id(id: &str) -> Self {
        Self { doctor_id: Some(id.to_string()), doctor_name: None }
    }

    pub fn by_name(name: &str) -> Self {
        Self { doctor_id: None, doctor_name: Some(name.to_string()) }
    }

    pub fn id(&self) -> Option<&str> {
        non_blank(self.doctor_id.as_deref())
    }

    pub fn name(&self) -> Option<&str> {
        non_blank(self.doctor_name.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeslotListing {
    pub specialist: Specialist,
    pub slots: Vec<NumberedSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialistSearchQuery {
    pub specialty: Option<String>,
    pub location: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DoctorError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Doctor not found: {0}")]
    NotFound(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),
}

impl From<DoctorError> for shared_models::error::AppError {
    fn from(error: DoctorError) -> Self {
        use shared_models::error::AppError;

        match error {
            DoctorError::InvalidRequest(msg) => AppError::BadRequest(msg),
            DoctorError::NotFound(msg) => AppError::NotFound(format!("Doctor not found: {}", msg)),
            DoctorError::DependencyUnavailable(msg) => AppError::ExternalService(msg),
        }
    }
}
