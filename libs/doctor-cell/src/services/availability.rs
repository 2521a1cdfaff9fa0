// libs/doctor-cell/src/services/availability.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::models::{
    number_open_slots, DoctorError, NumberedSlot, Specialist, SpecialistRef, TimeslotListing,
};
use crate::services::directory::DirectoryStore;
use crate::services::schedule::ScheduleStore;

#[derive(Clone)]
pub struct AvailabilityService {
    directory: Arc<dyn DirectoryStore>,
    schedule: Arc<dyn ScheduleStore>,
}

impl AvailabilityService {
    pub fn new(directory: Arc<dyn DirectoryStore>, schedule: Arc<dyn ScheduleStore>) -> Self {
        Self { directory, schedule }
    }

    pub fn schedule(&self) -> &Arc<dyn ScheduleStore> {
        &self.schedule
    }

    /// Resolve a specialist by id, or by display name when no id is given.
    pub async fn resolve_specialist(&self, specialist: &SpecialistRef) -> Result<Specialist, DoctorError> {
        if let Some(id) = specialist.id() {
            return self.get_specialist(id).await;
        }

        let name = specialist.name().ok_or_else(|| {
            DoctorError::InvalidRequest("either doctor_id or doctor_name is required".to_string())
        })?;

        debug!("Resolving doctor by name: {}", name);
        self.directory.find_by_name(name).await
            .map_err(|e| DoctorError::DependencyUnavailable(e.to_string()))?
            .ok_or_else(|| DoctorError::NotFound(name.to_string()))
    }

    pub async fn get_specialist(&self, specialist_id: &str) -> Result<Specialist, DoctorError> {
        self.directory.get(specialist_id).await
            .map_err(|e| DoctorError::DependencyUnavailable(e.to_string()))?
            .ok_or_else(|| DoctorError::NotFound(specialist_id.to_string()))
    }

    /// Current open future slots for a specialist, numbered 1..N by start time.
    /// The numbering is recomputed on every call.
    pub async fn numbered_open_slots(&self, specialist_id: &str) -> Result<Vec<NumberedSlot>, DoctorError> {
        let slots = self.schedule.list_open_slots(specialist_id).await
            .map_err(|e| DoctorError::DependencyUnavailable(e.to_string()))?;

        let fetched = slots.len();
        let numbered = number_open_slots(slots, Utc::now());
        if numbered.len() < fetched {
            warn!(
                "Dropped {} booked or past slots from listing for doctor {}",
                fetched - numbered.len(),
                specialist_id
            );
        }

        Ok(numbered)
    }

    pub async fn list_timeslots(&self, specialist: &SpecialistRef) -> Result<TimeslotListing, DoctorError> {
        let specialist = self.resolve_specialist(specialist).await?;
        let slots = self.numbered_open_slots(&specialist.id).await?;

        debug!("Doctor {} has {} open slots", specialist.id, slots.len());

        Ok(TimeslotListing { specialist, slots })
    }
}
