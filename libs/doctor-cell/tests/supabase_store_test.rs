// libs/doctor-cell/tests/supabase_store_test.rs
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_json, header, method, path, query_param};

use doctor_cell::models::SlotStatus;
use doctor_cell::services::{
    DirectoryStore, ScheduleStore, SupabaseDirectoryStore, SupabaseScheduleStore,
};
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

#[tokio::test]
async fn test_directory_query_uses_case_insensitive_filters() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("specialty", "ilike.Pulmonology"))
        .and(query_param("location", "ilike.Pune"))
        .and(header("apikey", "test-service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_response("DOC-1", "Dr. Sarah Mehta", "Pulmonology", "Pune")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = SupabaseDirectoryStore::new(&config);
    let specialists = store.query("Pulmonology", "Pune").await.unwrap();

    assert_eq!(specialists.len(), 1);
    assert_eq!(specialists[0].id, "DOC-1");
    assert_eq!(specialists[0].name, "Dr. Sarah Mehta");
}

#[tokio::test]
async fn test_directory_get_missing_is_none() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("doctor_id", "eq.DOC-404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let store = SupabaseDirectoryStore::new(&config);
    assert!(store.get("DOC-404").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_by_name_falls_back_to_partial_match() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("name", "ilike.Mehta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("name", "ilike.*Mehta*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_response("DOC-1", "Dr. Sarah Mehta", "Pulmonology", "Pune")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = SupabaseDirectoryStore::new(&config);
    let specialist = store.find_by_name("Mehta").await.unwrap().unwrap();

    assert_eq!(specialist.id, "DOC-1");
}

#[tokio::test]
async fn test_list_open_slots_filters_on_status() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_slots"))
        .and(query_param("doctor_id", "eq.DOC-1"))
        .and(query_param("status", "eq.open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response("S1", "DOC-1", "2099-10-23T09:30:00Z", "open"),
            MockSupabaseResponses::slot_response("S2", "DOC-1", "2099-10-23T14:00:00Z", "open")
        ])))
        .mount(&mock_server)
        .await;

    let store = SupabaseScheduleStore::new(&config);
    let slots = store.list_open_slots("DOC-1").await.unwrap();

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].id, "S1");
    assert_eq!(slots[1].status, SlotStatus::Open);
}

#[tokio::test]
async fn test_try_book_is_a_conditional_patch() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctor_slots"))
        .and(query_param("slot_id", "eq.S1"))
        .and(query_param("doctor_id", "eq.DOC-1"))
        .and(query_param("status", "eq.open"))
        .and(header("Prefer", "return=representation"))
        .and(body_json(json!({ "status": "booked", "hold_id": "hold-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response("S1", "DOC-1", "2099-10-23T09:30:00Z", "booked")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = SupabaseScheduleStore::new(&config);
    assert!(store.try_book("DOC-1", "S1", SlotStatus::Open, "hold-1").await.unwrap());
}

#[tokio::test]
async fn test_try_book_lost_race_returns_false() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctor_slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let store = SupabaseScheduleStore::new(&config);
    assert!(!store.try_book("DOC-1", "S1", SlotStatus::Open, "hold-1").await.unwrap());
}

#[tokio::test]
async fn test_release_reopens_booked_slot() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctor_slots"))
        .and(query_param("status", "eq.booked"))
        .and(query_param("hold_id", "eq.hold-1"))
        .and(body_json(json!({ "status": "open", "hold_id": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response("S1", "DOC-1", "2099-10-23T09:30:00Z", "open")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = SupabaseScheduleStore::new(&config);
    assert!(store.release("DOC-1", "S1", "hold-1").await.unwrap());
}

#[tokio::test]
async fn test_store_outage_is_an_error() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_slots"))
        .respond_with(ResponseTemplate::new(503).set_body_json(
            MockSupabaseResponses::error_response("upstream down", "PGRST000")
        ))
        .mount(&mock_server)
        .await;

    let store = SupabaseScheduleStore::new(&config);
    assert!(store.list_open_slots("DOC-1").await.is_err());
}
