// libs/appointment-cell/src/agent.rs
//
// Action-group events sent by the conversational agent. Every outcome,
// including failures, is answered with a text body the agent reads back.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use doctor_cell::models::SpecialistRef;

use crate::models::{format_appointment_time, AppointmentError, BookSlotRequest, SessionContext};
use crate::services::AppointmentCoordinator;

pub const FIND_DOCTORS: &str = "get_doctors_by_specialty";
pub const LIST_TIMESLOTS: &str = "get_doctor_timeslots";
pub const BOOK_SLOT: &str = "book_appointment_slot";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionParameter {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentActionEvent {
    pub action_group: String,
    pub function: String,
    #[serde(default = "default_message_version")]
    pub message_version: Value,
    #[serde(default)]
    pub parameters: Vec<ActionParameter>,
    #[serde(default)]
    pub session_attributes: HashMap<String, String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub input_text: Option<String>,
}

fn default_message_version() -> Value {
    json!(1)
}

impl AgentActionEvent {
    /// Non-blank parameter value by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters.iter()
            .find(|p| p.name == name)
            .map(|p| p.value.trim())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentActionResponse {
    pub response: ActionResponse,
    pub message_version: Value,
    pub session_attributes: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub action_group: String,
    pub function: String,
    pub function_response: FunctionResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub response_body: ResponseBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "TEXT")]
    pub text: TextBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}

impl AgentActionResponse {
    pub fn body(&self) -> &str {
        &self.response.function_response.response_body.text.body
    }
}

pub async fn dispatch(coordinator: &AppointmentCoordinator, event: AgentActionEvent) -> AgentActionResponse {
    info!("Agent action {} / {}", event.action_group, event.function);

    let mut session = SessionContext::from_attributes(&event.session_attributes, event.session_id.as_deref());

    let body = match event.function.as_str() {
        FIND_DOCTORS => match (event.param("specialty"), event.param("location")) {
            (Some(specialty), Some(location)) => {
                find_doctors(coordinator, specialty, location, &mut session, event.input_text.as_deref()).await
            }
            _ => missing_parameters(&event),
        },
        LIST_TIMESLOTS => match specialist_ref(&event) {
            Some(specialist) => list_timeslots(coordinator, &specialist).await,
            None => missing_parameters(&event),
        },
        BOOK_SLOT => match (specialist_ref(&event), event.param("selected_slot")) {
            (Some(specialist), Some(selected_slot)) => {
                book_slot(coordinator, &event, &specialist, selected_slot, &session).await
            }
            _ => missing_parameters(&event),
        },
        _ => missing_parameters(&event),
    };

    let mut session_attributes = event.session_attributes.clone();
    session.apply_to(&mut session_attributes);

    AgentActionResponse {
        response: ActionResponse {
            action_group: event.action_group,
            function: event.function,
            function_response: FunctionResponse {
                response_body: ResponseBody { text: TextBody { body } },
            },
        },
        message_version: event.message_version,
        session_attributes,
    }
}

fn specialist_ref(event: &AgentActionEvent) -> Option<SpecialistRef> {
    let specialist = SpecialistRef {
        doctor_id: event.param("doctor_id").map(str::to_string),
        doctor_name: event.param("doctor_name").map(str::to_string),
    };

    (specialist.id().is_some() || specialist.name().is_some()).then_some(specialist)
}

fn missing_parameters(event: &AgentActionEvent) -> String {
    let message = format!(
        "Missing or invalid parameters for function '{}'. Please provide the required parameters.",
        event.function
    );
    error!("{} Parameters: {:?}", message, event.parameters);
    message
}

async fn find_doctors(
    coordinator: &AppointmentCoordinator,
    specialty: &str,
    location: &str,
    session: &mut SessionContext,
    input_text: Option<&str>,
) -> String {
    match coordinator.find_specialists(specialty, location, session, input_text).await {
        Ok(matches) => {
            let doctors: Vec<Value> = matches.iter()
                .map(|m| json!({
                    "doctor_id": m.specialist.id,
                    "name": m.specialist.name,
                    "specialty": m.specialist.specialty,
                    "location": m.specialist.location,
                    "next_available_timeslots": m.next_available_slots.iter()
                        .map(|slot| slot.starts_at.format("%Y-%m-%dT%H:%M:%SZ").to_string())
                        .collect::<Vec<_>>(),
                }))
                .collect();

            json!({ "doctors": doctors }).to_string()
        }
        Err(e) => error_text(&e, "search for doctors"),
    }
}

async fn list_timeslots(coordinator: &AppointmentCoordinator, specialist: &SpecialistRef) -> String {
    match coordinator.list_timeslots(specialist).await {
        Ok(listing) => {
            let slots: Vec<Value> = listing.slots.iter()
                .map(|numbered| json!({
                    "slot_number": numbered.number,
                    "timestamp": numbered.slot.starts_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                    "display": format_appointment_time(numbered.slot.starts_at),
                }))
                .collect();

            json!({
                "doctor_id": listing.specialist.id,
                "doctor_name": listing.specialist.name,
                "next_available_timeslots": slots,
            })
            .to_string()
        }
        Err(AppointmentError::NotFound(_)) => "Doctor not found. Please try again.".to_string(),
        Err(e) => error_text(&e, "list timeslots"),
    }
}

async fn book_slot(
    coordinator: &AppointmentCoordinator,
    event: &AgentActionEvent,
    specialist: &SpecialistRef,
    selected_slot: &str,
    session: &SessionContext,
) -> String {
    let Ok(slot_number) = selected_slot.parse::<usize>() else {
        warn!("Unparseable slot number '{}'", selected_slot);
        return "Invalid slot number format. Please provide a number.".to_string();
    };

    let specialist = match coordinator.resolve_specialist(specialist).await {
        Ok(specialist) => specialist,
        Err(AppointmentError::NotFound(_)) => {
            return "Doctor not found. Unable to book appointment.".to_string();
        }
        Err(e) => return error_text(&e, "book the appointment"),
    };

    let request = BookSlotRequest::new(&specialist.id, slot_number)
        .with_requester(event.param("user_name"), event.param("user_email"));

    match coordinator.book_slot(&request, session).await {
        Ok(confirmation) => confirmation.message,
        Err(e) => error_text(&e, "book the appointment"),
    }
}

fn error_text(error: &AppointmentError, action: &str) -> String {
    match error {
        AppointmentError::InvalidRequest(msg) => format!("Unable to {}: {}.", action, msg),
        AppointmentError::NotFound(_) => "Doctor not found. Please try again.".to_string(),
        AppointmentError::SlotUnavailable { open_slots: 0, .. } => {
            "No available timeslots found for this doctor.".to_string()
        }
        AppointmentError::SlotUnavailable { open_slots, .. } => format!(
            "Unable to book this slot. It may have been taken by another patient. \
             Please select a different slot from 1 to {}.",
            open_slots
        ),
        AppointmentError::DependencyUnavailable(msg) => {
            error!("Dependency failure during {}: {}", action, msg);
            "An error occurred while processing your request. Please try again later.".to_string()
        }
    }
}
