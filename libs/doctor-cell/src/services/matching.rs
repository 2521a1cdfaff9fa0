// libs/doctor-cell/src/services/matching.rs
use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{DoctorError, SpecialistMatch, NEXT_SLOTS_PER_SPECIALIST};
use crate::services::availability::AvailabilityService;
use crate::services::directory::DirectoryStore;

#[derive(Clone)]
pub struct DoctorMatchingService {
    directory: Arc<dyn DirectoryStore>,
    availability_service: AvailabilityService,
}

impl DoctorMatchingService {
    pub fn new(directory: Arc<dyn DirectoryStore>, availability_service: AvailabilityService) -> Self {
        Self { directory, availability_service }
    }

    /// Specialists matching specialty and location, each with up to three of
    /// their soonest open slots, soonest first. No match is an empty list.
    pub async fn find_specialists(
        &self,
        specialty: &str,
        location: &str,
    ) -> Result<Vec<SpecialistMatch>, DoctorError> {
        let specialty = specialty.trim();
        let location = location.trim();

        if specialty.is_empty() {
            return Err(DoctorError::InvalidRequest("specialty is required".to_string()));
        }
        if location.is_empty() {
            return Err(DoctorError::InvalidRequest("location is required".to_string()));
        }

        debug!("Finding {} doctors in {}", specialty, location);

        let candidates = self.directory.query(specialty, location).await
            .map_err(|e| DoctorError::DependencyUnavailable(e.to_string()))?;

        let mut matches = Vec::with_capacity(candidates.len());
        for specialist in candidates {
            // Stores may be looser than we are about casing or whitespace.
            if !specialist.matches(specialty, location) {
                continue;
            }

            let next_available_slots = self.availability_service
                .numbered_open_slots(&specialist.id).await?
                .into_iter()
                .take(NEXT_SLOTS_PER_SPECIALIST)
                .map(|numbered| numbered.slot)
                .collect();

            matches.push(SpecialistMatch { specialist, next_available_slots });
        }

        matches.sort_by(compare_by_first_available);

        info!("Found {} {} doctors in {}", matches.len(), specialty, location);

        Ok(matches)
    }
}

fn compare_by_first_available(a: &SpecialistMatch, b: &SpecialistMatch) -> Ordering {
    match (a.first_available(), b.first_available()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.specialist.name.cmp(&b.specialist.name))
}
