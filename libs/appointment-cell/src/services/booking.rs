// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn, Instrument, Span};
use uuid::Uuid;

use doctor_cell::models::{NumberedSlot, SlotStatus, Specialist};
use doctor_cell::services::AvailabilityService;

use crate::models::{
    format_appointment_time, generate_confirmation_id, AppointmentError, BookSlotRequest, Booking,
    BookingConfirmation, ConfirmationNotice, SessionContext,
};
use crate::services::notifier::Notifier;
use crate::services::store::{BookingStore, DuplicateConfirmationId};
use crate::services::summary::MedicalSummaryStore;

/// Fresh confirmation ids tried before a duplicate-id failure is reported.
const MAX_CONFIRMATION_ID_ATTEMPTS: usize = 3;

/// Reserves a slot and records the booking. The slot transition is a
/// conditional write on the schedule store; there is no client-side locking.
#[derive(Clone)]
pub struct AppointmentBookingService {
    availability: AvailabilityService,
    bookings: Arc<dyn BookingStore>,
    summaries: Arc<dyn MedicalSummaryStore>,
    notifier: Arc<dyn Notifier>,
}

impl AppointmentBookingService {
    pub fn new(
        availability: AvailabilityService,
        bookings: Arc<dyn BookingStore>,
        summaries: Arc<dyn MedicalSummaryStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            availability,
            bookings,
            summaries,
            notifier,
        }
    }

    #[instrument(skip(self, request, session), fields(doctor_id = %request.doctor_id, selected_slot = request.selected_slot))]
    pub async fn book_slot(
        &self,
        request: &BookSlotRequest,
        session: &SessionContext,
    ) -> Result<BookingConfirmation, AppointmentError> {
        let doctor_id = request.doctor_id.trim();
        if doctor_id.is_empty() {
            return Err(AppointmentError::InvalidRequest("doctor_id is required".to_string()));
        }

        let specialist = self.availability.get_specialist(doctor_id).await?;

        // Never trust the caller's numbering: re-list and re-number now.
        let listing = self.availability.numbered_open_slots(&specialist.id).await?;
        let chosen = select_slot(&listing, request.selected_slot)?.clone();
        let slot_number = chosen.number;

        // Reserve and record run as their own task: if the caller is dropped
        // between the two writes the task still finishes or compensates.
        let service = self.clone();
        let reservation = Reservation {
            specialist: specialist.clone(),
            chosen,
            request: request.clone(),
            symptoms_summary: session.symptoms_summary.clone(),
            open_slots: listing.len(),
        };
        let booking = tokio::spawn(
            async move { service.reserve_and_record(reservation).await }
                .instrument(Span::current()),
        )
        .await
        .map_err(|e| AppointmentError::DependencyUnavailable(format!("booking task failed: {}", e)))??;

        info!(
            "Booked slot {} ({}) with doctor {} - confirmation {}",
            slot_number, booking.slot_starts_at, specialist.id, booking.confirmation_id
        );

        let extraction_summary = self.extraction_summary(session).await;
        Ok(self.confirm(booking, slot_number, &specialist, extraction_summary).await)
    }

    /// Conditional Open -> Booked under a fresh hold token, then the booking
    /// record. Every failure after the write may have applied releases the hold.
    async fn reserve_and_record(&self, reservation: Reservation) -> Result<Booking, AppointmentError> {
        let Reservation { specialist, chosen, request, symptoms_summary, open_slots } = reservation;
        let hold_id = Uuid::new_v4().to_string();

        let reserved = self.availability.schedule()
            .try_book(&specialist.id, &chosen.slot.id, SlotStatus::Open, &hold_id)
            .await;

        match reserved {
            Ok(true) => {}
            Ok(false) => {
                warn!("Slot {} for doctor {} was taken concurrently", chosen.slot.id, specialist.id);
                return Err(AppointmentError::SlotUnavailable {
                    slot_number: chosen.number,
                    open_slots: open_slots.saturating_sub(1),
                });
            }
            Err(e) => {
                // The write may have landed even though its response did not.
                error!("Reserving slot {} failed: {}", chosen.slot.id, e);
                self.release_hold(&specialist.id, &chosen.slot.id, &hold_id).await;
                return Err(AppointmentError::DependencyUnavailable(e.to_string()));
            }
        }

        let mut booking = Booking::new(&specialist, &chosen.slot, &request, symptoms_summary);
        self.record_booking(&mut booking, &hold_id).await?;
        Ok(booking)
    }

    /// Writes the booking record, retrying with a new confirmation id on a
    /// duplicate. Any other failure releases the hold so a booked slot never
    /// exists without its booking.
    async fn record_booking(&self, booking: &mut Booking, hold_id: &str) -> Result<(), AppointmentError> {
        let mut attempts = 1;

        loop {
            let Err(store_error) = self.bookings.insert(booking).await else {
                return Ok(());
            };

            if store_error.is::<DuplicateConfirmationId>() && attempts < MAX_CONFIRMATION_ID_ATTEMPTS {
                attempts += 1;
                let fresh_id = generate_confirmation_id();
                warn!("Confirmation id {} already used, retrying as {}", booking.confirmation_id, fresh_id);
                booking.confirmation_id = fresh_id;
                continue;
            }

            error!("Failed to store booking {}: {}", booking.confirmation_id, store_error);
            self.release_hold(&booking.specialist_id, &booking.slot_id, hold_id).await;

            return Err(AppointmentError::DependencyUnavailable(format!(
                "could not record booking: {}",
                store_error
            )));
        }
    }

    async fn release_hold(&self, specialist_id: &str, slot_id: &str, hold_id: &str) {
        match self.availability.schedule().release(specialist_id, slot_id, hold_id).await {
            Ok(true) => info!("Released slot {} after failed booking", slot_id),
            Ok(false) => debug!("Slot {} was not held by {}, nothing to release", slot_id, hold_id),
            Err(e) => error!("Failed to release slot {}: {}", slot_id, e),
        }
    }

    async fn extraction_summary(&self, session: &SessionContext) -> Option<String> {
        let session_id = session.session_id.as_deref()?;

        match self.summaries.fetch(session_id).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Medical summary lookup failed for session {}: {}", session_id, e);
                None
            }
        }
    }

    async fn confirm(
        &self,
        booking: Booking,
        slot_number: usize,
        specialist: &Specialist,
        extraction_summary: Option<String>,
    ) -> BookingConfirmation {
        let appointment_time = format_appointment_time(booking.slot_starts_at);

        let notification_sent = match &booking.requester_email {
            Some(_) => {
                let notice = ConfirmationNotice {
                    unique_id: booking.confirmation_id.clone(),
                    user_name: booking.requester_name.clone(),
                    user_email: booking.requester_email.clone(),
                    symptoms_summary: booking.symptoms_summary.clone(),
                    extraction_summary: extraction_summary.clone(),
                    specialist_type: specialist.specialty.clone(),
                    doctor_name: specialist.name.clone(),
                    appointment_time: appointment_time.clone(),
                };

                match self.notifier.notify(&notice).await {
                    Ok(sent) => sent,
                    Err(e) => {
                        error!("Confirmation notice for {} failed: {}", booking.confirmation_id, e);
                        false
                    }
                }
            }
            None => {
                debug!("No requester email for {}, skipping notification", booking.confirmation_id);
                false
            }
        };

        let message = confirmation_message(
            slot_number,
            &appointment_time,
            specialist,
            &booking.confirmation_id,
            notification_sent,
        );

        BookingConfirmation {
            symptoms_summary: booking.symptoms_summary.clone(),
            booking,
            slot_number,
            doctor_name: specialist.name.clone(),
            specialty: specialist.specialty.clone(),
            appointment_time,
            message,
            extraction_summary,
            notification_sent,
        }
    }
}

/// Everything the detached reservation task needs, owned.
struct Reservation {
    specialist: Specialist,
    chosen: NumberedSlot,
    request: BookSlotRequest,
    symptoms_summary: Option<String>,
    open_slots: usize,
}

/// Resolves a 1-based slot number against a fresh listing.
fn select_slot(listing: &[NumberedSlot], slot_number: usize) -> Result<&NumberedSlot, AppointmentError> {
    listing.iter()
        .find(|numbered| numbered.number == slot_number)
        .ok_or(AppointmentError::SlotUnavailable {
            slot_number,
            open_slots: listing.len(),
        })
}

fn confirmation_message(
    slot_number: usize,
    appointment_time: &str,
    specialist: &Specialist,
    confirmation_id: &str,
    notification_sent: bool,
) -> String {
    let email_status = if notification_sent {
        " A confirmation email has been sent to your email address."
    } else {
        ""
    };

    format!(
        "You have successfully scheduled Slot {}: {} with {} ({}).\n\
         Your appointment confirmation ID is: {}\n\
         Your appointment has been confirmed and the slot has been reserved for you.{}\n\
         If you need further assistance, please let me know.",
        slot_number,
        appointment_time,
        specialist.name,
        specialist.specialty,
        confirmation_id,
        email_status,
    )
}
