use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::models::{DoctorError, Slot, Specialist};
use shared_models::error::AppError;

/// Display format used in confirmations, e.g. "October 23, 2099 at 09:30 AM".
pub const APPOINTMENT_TIME_FORMAT: &str = "%B %d, %Y at %I:%M %p";

pub fn format_appointment_time(at: DateTime<Utc>) -> String {
    at.format(APPOINTMENT_TIME_FORMAT).to_string()
}

/// Short uppercase reference read back to the requester.
pub fn generate_confirmation_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

/// Confirmed reservation. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub confirmation_id: String,
    #[serde(rename = "doctor_id")]
    pub specialist_id: String,
    pub slot_id: String,
    pub slot_starts_at: DateTime<Utc>,
    #[serde(rename = "user_name")]
    pub requester_name: Option<String>,
    #[serde(rename = "user_email")]
    pub requester_email: Option<String>,
    pub symptoms_summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        specialist: &Specialist,
        slot: &Slot,
        request: &BookSlotRequest,
        symptoms_summary: Option<String>,
    ) -> Self {
        Self {
            confirmation_id: generate_confirmation_id(),
            specialist_id: specialist.id.clone(),
            slot_id: slot.id.clone(),
            slot_starts_at: slot.starts_at,
            requester_name: request.requester_name(),
            requester_email: request.requester_email(),
            symptoms_summary,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSlotRequest {
    pub doctor_id: String,
    /// 1-based position in the doctor's current open-slot listing.
    pub selected_slot: usize,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

impl BookSlotRequest {
    pub fn new(doctor_id: &str, selected_slot: usize) -> Self {
        Self {
            doctor_id: doctor_id.to_string(),
            selected_slot,
            user_name: None,
            user_email: None,
        }
    }

    pub fn with_requester(mut self, name: Option<&str>, email: Option<&str>) -> Self {
        self.user_name = name.map(str::to_string);
        self.user_email = email.map(str::to_string);
        self
    }

    pub fn requester_name(&self) -> Option<String> {
        non_blank(self.user_name.as_deref())
    }

    pub fn requester_email(&self) -> Option<String> {
        non_blank(self.user_email.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// HTTP body for a booking: the request plus the caller's session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentBody {
    #[serde(flatten)]
    pub booking: BookSlotRequest,
    #[serde(default)]
    pub session: SessionContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking: Booking,
    pub slot_number: usize,
    pub doctor_name: String,
    pub specialty: String,
    pub appointment_time: String,
    pub message: String,
    pub symptoms_summary: Option<String>,
    pub extraction_summary: Option<String>,
    pub notification_sent: bool,
}

/// Payload handed to the notifier after a successful booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationNotice {
    pub unique_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_summary: Option<String>,
    pub specialist_type: String,
    pub doctor_name: String,
    pub appointment_time: String,
}

/// Conversation state carried between coordinator calls. The caller owns it;
/// the coordinator only reads and updates the value it is handed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms_summary: Option<String>,
}

impl SessionContext {
    const SESSION_ID: &'static str = "session_id";
    const REQUESTER_ID: &'static str = "requester_id";
    const CURRENT_SPECIALTY: &'static str = "current_specialty";
    const SYMPTOMS_SUMMARY: &'static str = "symptoms_summary";

    /// Reads the context out of agent session attributes. An explicit
    /// `session_id` attribute wins over the agent's own session id.
    pub fn from_attributes(attributes: &HashMap<String, String>, agent_session_id: Option<&str>) -> Self {
        let get = |key: &str| non_blank(attributes.get(key).map(String::as_str));

        Self {
            session_id: get(Self::SESSION_ID).or_else(|| non_blank(agent_session_id)),
            requester_id: get(Self::REQUESTER_ID),
            current_specialty: get(Self::CURRENT_SPECIALTY),
            symptoms_summary: get(Self::SYMPTOMS_SUMMARY),
        }
    }

    /// Writes the context back over a copy of the incoming attributes.
    pub fn apply_to(&self, attributes: &mut HashMap<String, String>) {
        let fields = [
            (Self::SESSION_ID, &self.session_id),
            (Self::REQUESTER_ID, &self.requester_id),
            (Self::CURRENT_SPECIALTY, &self.current_specialty),
            (Self::SYMPTOMS_SUMMARY, &self.symptoms_summary),
        ];

        for (key, value) in fields {
            if let Some(value) = value {
                attributes.insert(key.to_string(), value.clone());
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppointmentError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Doctor not found: {0}")]
    NotFound(String),

    #[error("Slot {slot_number} is not available ({open_slots} open slots)")]
    SlotUnavailable { slot_number: usize, open_slots: usize },

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),
}

impl From<DoctorError> for AppointmentError {
    fn from(error: DoctorError) -> Self {
        match error {
            DoctorError::InvalidRequest(msg) => AppointmentError::InvalidRequest(msg),
            DoctorError::NotFound(msg) => AppointmentError::NotFound(msg),
            DoctorError::DependencyUnavailable(msg) => AppointmentError::DependencyUnavailable(msg),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(error: AppointmentError) -> Self {
        match error {
            AppointmentError::InvalidRequest(msg) => AppError::BadRequest(msg),
            AppointmentError::NotFound(msg) => AppError::NotFound(format!("Doctor not found: {}", msg)),
            e @ AppointmentError::SlotUnavailable { .. } => AppError::Conflict(e.to_string()),
            AppointmentError::DependencyUnavailable(msg) => AppError::ExternalService(msg),
        }
    }
}
