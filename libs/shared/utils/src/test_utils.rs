use serde_json::json;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub notification_url: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            notification_url: None,
        }
    }
}

impl TestConfig {
    /// Points the Supabase client at a mock server.
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_notification_url(mut self, url: &str) -> Self {
        self.notification_url = Some(url.to_string());
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            notification_url: self.notification_url.clone(),
            ..AppConfig::default()
        }
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_response(doctor_id: &str, name: &str, specialty: &str, location: &str) -> serde_json::Value {
        json!({
            "doctor_id": doctor_id,
            "name": name,
            "specialty": specialty,
            "location": location
        })
    }

    pub fn slot_response(slot_id: &str, doctor_id: &str, starts_at: &str, status: &str) -> serde_json::Value {
        json!({
            "slot_id": slot_id,
            "doctor_id": doctor_id,
            "starts_at": starts_at,
            "status": status
        })
    }

    pub fn appointment_response(confirmation_id: &str, doctor_id: &str, slot_id: &str) -> serde_json::Value {
        json!({
            "confirmation_id": confirmation_id,
            "doctor_id": doctor_id,
            "slot_id": slot_id,
            "slot_starts_at": "2099-10-23T09:30:00Z",
            "user_name": "Jane",
            "user_email": "jane@x.com",
            "symptoms_summary": null,
            "created_at": "2099-10-01T00:00:00Z"
        })
    }

    pub fn medical_summary_response(submission_id: &str, summary: &str) -> serde_json::Value {
        json!({
            "submission_id": submission_id,
            "key_value": [summary]
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
