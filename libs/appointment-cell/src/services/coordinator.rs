// libs/appointment-cell/src/services/coordinator.rs
use std::sync::Arc;

use tracing::debug;

use doctor_cell::models::{Specialist, SpecialistMatch, SpecialistRef, TimeslotListing};
use doctor_cell::services::{
    AvailabilityService, DirectoryStore, DoctorMatchingService, ScheduleStore,
};

use crate::models::{AppointmentError, BookSlotRequest, Booking, BookingConfirmation, SessionContext};
use crate::services::booking::AppointmentBookingService;
use crate::services::notifier::Notifier;
use crate::services::store::BookingStore;
use crate::services::summary::MedicalSummaryStore;

/// Entry point for the booking workflow: find specialists, list their slots,
/// reserve one. Every call is independent; state lives in the stores and in
/// the `SessionContext` the caller passes in.
pub struct AppointmentCoordinator {
    matching: DoctorMatchingService,
    availability: AvailabilityService,
    booking: AppointmentBookingService,
    bookings: Arc<dyn BookingStore>,
}

impl AppointmentCoordinator {
    pub fn new(
        directory: Arc<dyn DirectoryStore>,
        schedule: Arc<dyn ScheduleStore>,
        bookings: Arc<dyn BookingStore>,
        summaries: Arc<dyn MedicalSummaryStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let availability = AvailabilityService::new(Arc::clone(&directory), schedule);
        let matching = DoctorMatchingService::new(directory, availability.clone());
        let booking = AppointmentBookingService::new(
            availability.clone(),
            Arc::clone(&bookings),
            summaries,
            notifier,
        );

        Self {
            matching,
            availability,
            booking,
            bookings,
        }
    }

    /// Matching specialists with their next open slots. Also records the
    /// specialty in the session and seeds or captures a symptom summary.
    pub async fn find_specialists(
        &self,
        specialty: &str,
        location: &str,
        session: &mut SessionContext,
        input_text: Option<&str>,
    ) -> Result<Vec<SpecialistMatch>, AppointmentError> {
        let matches = self.matching.find_specialists(specialty, location).await?;
        session.note_search(specialty, input_text);

        debug!("Session specialty now {:?}", session.current_specialty);
        Ok(matches)
    }

    pub async fn list_timeslots(&self, specialist: &SpecialistRef) -> Result<TimeslotListing, AppointmentError> {
        Ok(self.availability.list_timeslots(specialist).await?)
    }

    pub async fn resolve_specialist(&self, specialist: &SpecialistRef) -> Result<Specialist, AppointmentError> {
        Ok(self.availability.resolve_specialist(specialist).await?)
    }

    pub async fn book_slot(
        &self,
        request: &BookSlotRequest,
        session: &SessionContext,
    ) -> Result<BookingConfirmation, AppointmentError> {
        self.booking.book_slot(request, session).await
    }

    pub async fn bookings_for(&self, specialist_id: &str) -> Result<Vec<Booking>, AppointmentError> {
        let specialist = self.availability.get_specialist(specialist_id).await?;

        self.bookings.list_for_specialist(&specialist.id).await
            .map_err(|e| AppointmentError::DependencyUnavailable(e.to_string()))
    }
}
