pub mod directory;
pub mod schedule;
pub mod memory;
pub mod availability;
pub mod matching;

pub use directory::{DirectoryStore, SupabaseDirectoryStore};
pub use schedule::{ScheduleStore, SupabaseScheduleStore};
pub use memory::{InMemoryDirectoryStore, InMemoryScheduleStore};
pub use availability::AvailabilityService;
pub use matching::DoctorMatchingService;
