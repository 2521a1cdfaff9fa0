// libs/appointment-cell/tests/store_test.rs
use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};

use appointment_cell::models::{Booking, ConfirmationNotice};
use appointment_cell::services::{
    BookingStore, DuplicateConfirmationId, HttpNotifier, MedicalSummaryStore, Notifier, SupabaseBookingStore,
    SupabaseMedicalSummaryStore,
};
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn sample_booking() -> Booking {
    Booking {
        confirmation_id: "A1B2C3D4".to_string(),
        specialist_id: "DOC-1".to_string(),
        slot_id: "S1".to_string(),
        slot_starts_at: Utc.with_ymd_and_hms(2099, 10, 23, 9, 30, 0).unwrap(),
        requester_name: Some("Jane".to_string()),
        requester_email: Some("jane@x.com".to_string()),
        symptoms_summary: None,
        created_at: Utc.with_ymd_and_hms(2099, 10, 1, 0, 0, 0).unwrap(),
    }
}

fn sample_notice() -> ConfirmationNotice {
    ConfirmationNotice {
        unique_id: "A1B2C3D4".to_string(),
        user_name: Some("Jane".to_string()),
        user_email: Some("jane@x.com".to_string()),
        symptoms_summary: None,
        extraction_summary: None,
        specialist_type: "Pulmonology".to_string(),
        doctor_name: "Dr. Sarah Mehta".to_string(),
        appointment_time: "October 23, 2099 at 09:30 AM".to_string(),
    }
}

#[tokio::test]
async fn test_booking_insert_posts_record() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({
            "confirmation_id": "A1B2C3D4",
            "doctor_id": "DOC-1",
            "user_email": "jane@x.com"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::appointment_response("A1B2C3D4", "DOC-1", "S1")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = SupabaseBookingStore::new(&config);
    store.insert(&sample_booking()).await.unwrap();
}

#[tokio::test]
async fn test_booking_insert_conflict_is_duplicate_id() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(
            MockSupabaseResponses::error_response("duplicate key value", "23505")
        ))
        .mount(&mock_server)
        .await;

    let store = SupabaseBookingStore::new(&config);
    let error = store.insert(&sample_booking()).await.unwrap_err();
    assert_eq!(
        error.downcast_ref::<DuplicateConfirmationId>(),
        Some(&DuplicateConfirmationId("A1B2C3D4".to_string()))
    );
}

#[tokio::test]
async fn test_booking_insert_outage_is_not_a_duplicate() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let store = SupabaseBookingStore::new(&config);
    let error = store.insert(&sample_booking()).await.unwrap_err();
    assert!(!error.is::<DuplicateConfirmationId>());
}

#[tokio::test]
async fn test_bookings_listed_per_doctor() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.DOC-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response("A1B2C3D4", "DOC-1", "S1")
        ])))
        .mount(&mock_server)
        .await;

    let store = SupabaseBookingStore::new(&config);
    let bookings = store.list_for_specialist("DOC-1").await.unwrap();

    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].confirmation_id, "A1B2C3D4");
    assert_eq!(bookings[0].requester_name.as_deref(), Some("Jane"));
    assert_eq!(bookings[0].symptoms_summary, None);
}

#[tokio::test]
async fn test_medical_summary_fetch_strips_bold() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("GET"))
        .and(path("/rest/v1/medical_summaries"))
        .and(query_param("submission_id", "eq.sess-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::medical_summary_response("sess-1", "**SpO2**: 94%")
        ])))
        .mount(&mock_server)
        .await;

    let store = SupabaseMedicalSummaryStore::new(&config);
    assert_eq!(store.fetch("sess-1").await.unwrap().as_deref(), Some("SpO2: 94%"));
}

#[tokio::test]
async fn test_medical_summary_absent_is_none() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("GET"))
        .and(path("/rest/v1/medical_summaries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let store = SupabaseMedicalSummaryStore::new(&config);
    assert_eq!(store.fetch("sess-2").await.unwrap(), None);
}

#[tokio::test]
async fn test_http_notifier_posts_camel_case_notice() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/notify"))
        .and(body_partial_json(json!({
            "uniqueId": "A1B2C3D4",
            "userEmail": "jane@x.com",
            "specialistType": "Pulmonology",
            "appointmentTime": "October 23, 2099 at 09:30 AM"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let notifier = HttpNotifier::new(&format!("{}/notify", mock_server.uri())).unwrap();
    assert!(notifier.notify(&sample_notice()).await.unwrap());
}

#[tokio::test]
async fn test_http_notifier_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/notify"))
        .respond_with(ResponseTemplate::new(500).set_body_string("mail relay down"))
        .mount(&mock_server)
        .await;

    let notifier = HttpNotifier::new(&format!("{}/notify", mock_server.uri())).unwrap();
    let error = notifier.notify(&sample_notice()).await.unwrap_err();
    assert!(error.to_string().contains("mail relay down"));
}
