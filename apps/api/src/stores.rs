use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use appointment_cell::services::{
    BookingStore, HttpNotifier, InMemoryBookingStore, InMemoryMedicalSummaryStore, LogNotifier,
    MedicalSummaryStore, Notifier, SupabaseBookingStore, SupabaseMedicalSummaryStore,
};
use doctor_cell::services::{
    memory::demo_stores, DirectoryStore, ScheduleStore, SupabaseDirectoryStore,
    SupabaseScheduleStore,
};
use shared_config::AppConfig;

/// Backends selected from configuration.
pub struct Stores {
    pub directory: Arc<dyn DirectoryStore>,
    pub schedule: Arc<dyn ScheduleStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub summaries: Arc<dyn MedicalSummaryStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl Stores {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let notifier: Arc<dyn Notifier> = match &config.notification_url {
            Some(url) => {
                info!("Sending confirmations to {}", url);
                Arc::new(HttpNotifier::new(url)?)
            }
            None => Arc::new(LogNotifier),
        };

        if config.is_configured() {
            info!("Using Supabase stores at {}", config.supabase_url);
            return Ok(Self {
                directory: Arc::new(SupabaseDirectoryStore::new(config)),
                schedule: Arc::new(SupabaseScheduleStore::new(config)),
                bookings: Arc::new(SupabaseBookingStore::new(config)),
                summaries: Arc::new(SupabaseMedicalSummaryStore::new(config)),
                notifier,
            });
        }

        warn!("Using in-memory demo stores; bookings are lost on restart");
        let (directory, schedule) = demo_stores(Utc::now())?;

        Ok(Self {
            directory: Arc::new(directory),
            schedule: Arc::new(schedule),
            bookings: Arc::new(InMemoryBookingStore::new()),
            summaries: Arc::new(InMemoryMedicalSummaryStore::new()),
            notifier,
        })
    }
}
