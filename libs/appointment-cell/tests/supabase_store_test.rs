use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::{
    Appointment, AppointmentRepository, AppointmentStatus, PetDirectory, RepositoryError, ServiceType,
    SupabaseAppointmentRepository, SupabasePetDirectory, TimeInterval,
};
use shared_database::supabase::SupabaseClient;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn client(server: &MockServer) -> Arc<SupabaseClient> {
    let config = TestConfig::with_supabase(&server.uri()).to_app_config();
    Arc::new(SupabaseClient::new(&config))
}

fn new_appointment() -> Appointment {
    let created = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
    Appointment {
        id: Uuid::new_v4(),
        pet_id: Uuid::new_v4(),
        owner_user_id: Uuid::new_v4(),
        start_time: Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
        end_time: Utc.with_ymd_and_hms(2025, 6, 1, 10, 45, 0).unwrap(),
        service_type: ServiceType::Routine,
        status: AppointmentStatus::Pending,
        notes: None,
        created_at: created,
        updated_at: created,
    }
}

fn row_for(appointment: &Appointment) -> serde_json::Value {
    MockSupabaseResponses::appointment_response(
        &appointment.id.to_string(),
        &appointment.pet_id.to_string(),
        &appointment.owner_user_id.to_string(),
        "2025-06-01T10:00:00Z",
        "2025-06-01T10:45:00Z",
        "pending",
    )
}

#[tokio::test]
async fn test_pet_directory_reads_owner() {
    let server = MockServer::start().await;
    let (pet, owner) = (Uuid::new_v4(), Uuid::new_v4());
    Mock::given(method("GET"))
        .and(path("/rest/v1/pets"))
        .and(query_param("id", format!("eq.{}", pet)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::pet_response(&pet.to_string(), &owner.to_string())
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/pets"))
        .and(query_param("owner_id", format!("eq.{}", owner)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::pet_response(&pet.to_string(), &owner.to_string())
        ])))
        .mount(&server)
        .await;

    let directory = SupabasePetDirectory::new(client(&server));

    assert_eq!(directory.pet_owner(pet).await.unwrap(), Some(owner));
    assert!(directory.pets_owned_by(owner).await.unwrap().contains(&pet));
}

#[tokio::test]
async fn test_missing_pet_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let directory = SupabasePetDirectory::new(client(&server));

    assert_eq!(directory.pet_owner(Uuid::new_v4()).await.unwrap(), None);
}

#[tokio::test]
async fn test_insert_writes_user_id_column() {
    let server = MockServer::start().await;
    let appointment = new_appointment();
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "user_id": appointment.owner_user_id,
            "status": "pending",
            "service_type": "routine"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row_for(&appointment)])))
        .expect(1)
        .mount(&server)
        .await;

    let stored = SupabaseAppointmentRepository::new(client(&server))
        .insert(appointment.clone())
        .await
        .unwrap();

    assert_eq!(stored.id, appointment.id);
    assert_eq!(stored.owner_user_id, appointment.owner_user_id);
}

#[tokio::test]
async fn test_exclusion_violation_becomes_overlap() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(MockSupabaseResponses::error_response(
            "23P01",
            "conflicting key value violates exclusion constraint \"appointments_no_overlap\"",
        )))
        .mount(&server)
        .await;

    let result = SupabaseAppointmentRepository::new(client(&server))
        .insert(new_appointment())
        .await;

    assert_matches!(result, Err(RepositoryError::OverlapViolation));
}

#[tokio::test]
async fn test_serialization_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(500).set_body_json(MockSupabaseResponses::error_response(
            "40001",
            "could not serialize access due to concurrent update",
        )))
        .mount(&server)
        .await;

    let result = SupabaseAppointmentRepository::new(client(&server))
        .update(new_appointment())
        .await;

    assert_matches!(result, Err(RepositoryError::SerializationFailure));
}

#[tokio::test]
async fn test_update_of_missing_row_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = SupabaseAppointmentRepository::new(client(&server))
        .update(new_appointment())
        .await;

    assert_matches!(result, Err(RepositoryError::NotFound));
}

#[tokio::test]
async fn test_active_overlapping_queries_active_rows_only() {
    let server = MockServer::start().await;
    let existing = new_appointment();
    let excluded = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "in.(pending,confirmed)"))
        .and(query_param("start_time", "lt.2025-06-01T11:00:00+00:00"))
        .and(query_param("end_time", "gt.2025-06-01T10:30:00+00:00"))
        .and(query_param("id", format!("neq.{}", excluded)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row_for(&existing)])))
        .mount(&server)
        .await;

    let interval = TimeInterval {
        start: Utc.with_ymd_and_hms(2025, 6, 1, 10, 30, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap(),
    };
    let rows = SupabaseAppointmentRepository::new(client(&server))
        .active_overlapping(&interval, Some(excluded))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, existing.id);
}

#[tokio::test]
async fn test_get_returns_none_for_unknown_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let found = SupabaseAppointmentRepository::new(client(&server))
        .get(Uuid::new_v4())
        .await
        .unwrap();

    assert!(found.is_none());
}
