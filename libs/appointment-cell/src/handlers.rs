use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::agent::{self, AgentActionEvent, AgentActionResponse};
use crate::models::{BookAppointmentBody, BookingConfirmation};
use crate::services::AppointmentCoordinator;

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub doctor_id: String,
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(coordinator): State<Arc<AppointmentCoordinator>>,
    Json(body): Json<BookAppointmentBody>,
) -> Result<Json<BookingConfirmation>, AppError> {
    let confirmation = coordinator.book_slot(&body.booking, &body.session).await?;
    Ok(Json(confirmation))
}

#[axum::debug_handler]
pub async fn list_bookings(
    State(coordinator): State<Arc<AppointmentCoordinator>>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Value>, AppError> {
    let bookings = coordinator.bookings_for(&query.doctor_id).await?;

    Ok(Json(json!({
        "doctor_id": query.doctor_id,
        "bookings": bookings,
        "total": bookings.len()
    })))
}

#[axum::debug_handler]
pub async fn dispatch_agent_action(
    State(coordinator): State<Arc<AppointmentCoordinator>>,
    Json(event): Json<AgentActionEvent>,
) -> Json<AgentActionResponse> {
    Json(agent::dispatch(&coordinator, event).await)
}
