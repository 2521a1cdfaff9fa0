// libs/appointment-cell/src/services/summary.rs
use std::collections::HashMap;
use std::sync::OnceLock;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::{filter_value, SupabaseClient};

/// Report summaries produced by the document-extraction agent, keyed by the
/// conversation session that uploaded the report.
#[async_trait]
pub trait MedicalSummaryStore: Send + Sync {
    async fn fetch(&self, session_id: &str) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct MedicalSummaryRow {
    #[serde(default)]
    key_value: Vec<String>,
}

pub struct SupabaseMedicalSummaryStore {
    supabase: SupabaseClient,
    table: String,
}

impl SupabaseMedicalSummaryStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            table: config.medical_summary_table.clone(),
        }
    }
}

#[async_trait]
impl MedicalSummaryStore for SupabaseMedicalSummaryStore {
    async fn fetch(&self, session_id: &str) -> Result<Option<String>> {
        let path = format!(
            "/rest/v1/{}?submission_id=eq.{}&select=key_value&limit=1",
            self.table,
            filter_value(session_id),
        );

        let rows: Vec<MedicalSummaryRow> = self.supabase.request(Method::GET, &path, None).await?;
        let summary = rows.into_iter()
            .next()
            .and_then(|row| row.key_value.into_iter().next())
            .and_then(|raw| clean_summary(&raw));

        debug!("Medical summary for session {}: found={}", session_id, summary.is_some());
        Ok(summary)
    }
}

#[derive(Default)]
pub struct InMemoryMedicalSummaryStore {
    summaries: HashMap<String, String>,
}

impl InMemoryMedicalSummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(mut self, session_id: &str, summary: &str) -> Self {
        self.summaries.insert(session_id.to_string(), summary.to_string());
        self
    }
}

#[async_trait]
impl MedicalSummaryStore for InMemoryMedicalSummaryStore {
    async fn fetch(&self, session_id: &str) -> Result<Option<String>> {
        Ok(self.summaries.get(session_id).and_then(|raw| clean_summary(raw)))
    }
}

fn bold_markers() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold marker pattern is valid"))
}

/// Drops markdown bold markers the extraction agent emits. Blank summaries
/// are treated as missing.
pub fn clean_summary(raw: &str) -> Option<String> {
    let cleaned = bold_markers().replace_all(raw, "$1");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
