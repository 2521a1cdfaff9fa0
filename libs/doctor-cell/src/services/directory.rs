// libs/doctor-cell/src/services/directory.rs
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::{filter_value, ilike_pattern, SupabaseClient};

use crate::models::Specialist;

/// Read access to specialist records.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// All specialists whose specialty and location match, ignoring case.
    async fn query(&self, specialty: &str, location: &str) -> Result<Vec<Specialist>>;

    async fn get(&self, specialist_id: &str) -> Result<Option<Specialist>>;

    /// Exact (case-insensitive) name match first, then a substring match.
    async fn find_by_name(&self, name: &str) -> Result<Option<Specialist>>;
}

const SPECIALIST_COLUMNS: &str = "doctor_id,name,specialty,location";

pub struct SupabaseDirectoryStore {
    supabase: SupabaseClient,
    table: String,
}

impl SupabaseDirectoryStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            table: config.doctors_table.clone(),
        }
    }

    async fn fetch(&self, filters: &str) -> Result<Vec<Specialist>> {
        let path = format!(
            "/rest/v1/{}?{}&select={}&order=name.asc",
            self.table, filters, SPECIALIST_COLUMNS
        );
        self.supabase.request(Method::GET, &path, None).await
    }
}

#[async_trait]
impl DirectoryStore for SupabaseDirectoryStore {
    async fn query(&self, specialty: &str, location: &str) -> Result<Vec<Specialist>> {
        debug!("Querying doctors for specialty '{}' in '{}'", specialty, location);

        let filters = format!(
            "specialty=ilike.{}&location=ilike.{}",
            ilike_pattern(specialty.trim(), false),
            ilike_pattern(location.trim(), false),
        );
        self.fetch(&filters).await
    }

    async fn get(&self, specialist_id: &str) -> Result<Option<Specialist>> {
        let filters = format!("doctor_id=eq.{}&limit=1", filter_value(specialist_id));
        Ok(self.fetch(&filters).await?.into_iter().next())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Specialist>> {
        let exact = format!("name=ilike.{}&limit=1", ilike_pattern(name.trim(), false));
        if let Some(specialist) = self.fetch(&exact).await?.into_iter().next() {
            return Ok(Some(specialist));
        }

        debug!("No exact name match for '{}', trying partial match", name);
        let partial = format!("name=ilike.{}&limit=1", ilike_pattern(name.trim(), true));
        Ok(self.fetch(&partial).await?.into_iter().next())
    }
}
