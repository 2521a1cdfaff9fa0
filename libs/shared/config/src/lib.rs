use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub doctors_table: String,
    pub doctor_slots_table: String,
    pub appointments_table: String,
    pub medical_summary_table: String,
    pub notification_url: Option<String>,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            doctors_table: "doctors".to_string(),
            doctor_slots_table: "doctor_slots".to_string(),
            appointments_table: "appointments".to_string(),
            medical_summary_table: "medical_summaries".to_string(),
            notification_url: None,
            server_port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            doctors_table: table_name("DOCTORS_TABLE_NAME", defaults.doctors_table),
            doctor_slots_table: table_name("DOCTOR_SLOTS_TABLE_NAME", defaults.doctor_slots_table),
            appointments_table: table_name("APPOINTMENTS_TABLE_NAME", defaults.appointments_table),
            medical_summary_table: table_name("MEDICAL_SUMMARY_TABLE_NAME", defaults.medical_summary_table),
            notification_url: env::var("NOTIFICATION_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|port| match port.parse() {
                    Ok(port) => Some(port),
                    Err(_) => {
                        warn!("SERVER_PORT '{}' is not a valid port, using default", port);
                        None
                    }
                })
                .unwrap_or(defaults.server_port),
        };

        if !config.is_configured() {
            warn!("Supabase not configured - falling back to in-memory stores");
        }

        if config.notification_url.is_none() {
            warn!("NOTIFICATION_URL not set, confirmations will only be logged");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    pub fn is_notification_configured(&self) -> bool {
        self.notification_url.is_some()
    }
}

fn table_name(var: &str, default: String) -> String {
    env::var(var)
        .ok()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| {
            warn!("{} not set, using default '{}'", var, default);
            default
        })
}
