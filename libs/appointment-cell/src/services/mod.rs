pub mod booking;
pub mod coordinator;
pub mod notifier;
pub mod session;
pub mod store;
pub mod summary;

pub use booking::AppointmentBookingService;
pub use coordinator::AppointmentCoordinator;
pub use notifier::{HttpNotifier, LogNotifier, Notifier};
pub use store::{BookingStore, DuplicateConfirmationId, InMemoryBookingStore, SupabaseBookingStore};
pub use summary::{InMemoryMedicalSummaryStore, MedicalSummaryStore, SupabaseMedicalSummaryStore};
