use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{SpecialistRef, SpecialistSearchQuery};
use crate::services::{AvailabilityService, DoctorMatchingService, DirectoryStore, ScheduleStore};

/// Shared state for the doctor routes.
#[derive(Clone)]
pub struct DoctorState {
    pub matching: DoctorMatchingService,
    pub availability: AvailabilityService,
}

impl DoctorState {
    pub fn new(directory: Arc<dyn DirectoryStore>, schedule: Arc<dyn ScheduleStore>) -> Self {
        let availability = AvailabilityService::new(Arc::clone(&directory), schedule);
        let matching = DoctorMatchingService::new(directory, availability.clone());
        Self { matching, availability }
    }
}

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<Arc<DoctorState>>,
    Query(query): Query<SpecialistSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let specialty = query.specialty.unwrap_or_default();
    let location = query.location.unwrap_or_default();

    let doctors = state.matching.find_specialists(&specialty, &location).await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_timeslots(
    State(state): State<Arc<DoctorState>>,
    Query(specialist): Query<SpecialistRef>,
) -> Result<Json<Value>, AppError> {
    let listing = state.availability.list_timeslots(&specialist).await?;

    Ok(Json(json!({
        "doctor_id": listing.specialist.id,
        "doctor_name": listing.specialist.name,
        "specialty": listing.specialist.specialty,
        "available_slots": listing.slots,
        "total_slots": listing.slots.len()
    })))
}
