//! Integration tests for the HTTP API over the in-memory store

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wardline::adapters::memory::MemoryStore;
use wardline::api::{self, AppState};
use wardline::config::parse_config;

const FRONT_DESK: &str = "fd-token";
const DOCTOR: &str = "doc-token";
const HR: &str = "hr-token";

const CONFIG: &str = r#"
database_target = "memory"

[[auth.tokens]]
name = "front-desk"
token = "fd-token"
role = "front_desk"

[[auth.tokens]]
name = "dr-okafor"
token = "doc-token"
role = "doctor"

[[auth.tokens]]
name = "hr-office"
token = "hr-token"
role = "hr"
"#;

fn app_from(config: &str) -> Router {
    let config = parse_config(config).unwrap();
    let state = AppState::new(Arc::new(MemoryStore::new()), &config);
    api::router(state, &config.server).unwrap()
}

fn app() -> Router {
    app_from(CONFIG)
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn register(app: &Router, name: &str) -> i64 {
    let (status, body) = call(
        app,
        Method::POST,
        "/patients",
        Some(FRONT_DESK),
        Some(json!({ "name": name, "email": "patient@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["patient"]["id"].as_i64().unwrap()
}

async fn add_bed(app: &Router, number: &str, ward: &str) -> i64 {
    let (status, body) = call(
        app,
        Method::POST,
        "/beds",
        Some(HR),
        Some(json!({ "bed_number": number, "ward": ward })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["bed"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let (status, body) = call(&app(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_missing_and_unknown_tokens() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/patients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = call(&app, Method::GET, "/patients", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admit_and_discharge_flow() {
    let app = app();
    let patient_id = register(&app, "Chidi Nwosu").await;
    let bed_id = add_bed(&app, "B-009", "General").await;

    let (status, body) = call(
        &app,
        Method::GET,
        "/beds?status=available&ward=general",
        Some(DOCTOR),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["beds"].as_array().unwrap().len(), 1);

    let admit = json!({
        "patient_id": patient_id,
        "doctor_id": 2,
        "bed_id": bed_id,
        "diagnosis": "flu"
    });
    let (status, body) = call(
        &app,
        Method::POST,
        "/admissions",
        Some(DOCTOR),
        Some(admit.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Patient admitted successfully");
    assert_eq!(body["admission"]["status"], "Active");
    let admission_id = body["admission"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        Method::POST,
        "/admissions",
        Some(FRONT_DESK),
        Some(admit),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Patient already admitted");

    let (status, body) = call(&app, Method::GET, "/beds/occupancy", Some(HR), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["occupancy"]["occupied"], 1);
    assert_eq!(body["occupancy"]["occupancy_pct"], 100);

    let (status, body) = call(
        &app,
        Method::GET,
        "/admissions?status=active",
        Some(HR),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["admissions"].as_array().unwrap().len(), 1);

    let uri = format!("/admissions/{admission_id}/discharge");
    let (status, body) = call(&app, Method::POST, &uri, Some(DOCTOR), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["admission"]["status"], "Discharged");
    assert!(body["admission"]["discharge_date"].is_string());

    let (status, _) = call(&app, Method::POST, &uri, Some(DOCTOR), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = call(&app, Method::GET, "/beds", Some(HR), None).await;
    assert_eq!(body["beds"][0]["status"], "Available");
    assert!(body["beds"][0]["patient_id"].is_null());

    let uri = format!("/patients/{patient_id}/admissions");
    let (status, body) = call(&app, Method::GET, &uri, Some(HR), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["admissions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_roles_are_enforced() {
    let app = app();
    let patient_id = register(&app, "Amara Bello").await;
    let bed_id = add_bed(&app, "B-001", "General").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/admissions",
        Some(HR),
        Some(json!({
            "patient_id": patient_id,
            "doctor_id": 2,
            "bed_id": bed_id,
            "diagnosis": "flu"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = call(
        &app,
        Method::POST,
        "/beds",
        Some(DOCTOR),
        Some(json!({ "bed_number": "B-002", "ward": "General" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_admit_requests() {
    let app = app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/admissions",
        Some(DOCTOR),
        Some(json!({ "patient_id": 1, "doctor_id": 2, "bed_id": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation error: diagnosis is required");

    let (status, body) = call(
        &app,
        Method::POST,
        "/admissions",
        Some(DOCTOR),
        Some(json!({ "patient_id": "five", "doctor_id": 2, "bed_id": 3, "diagnosis": "flu" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = call(
        &app,
        Method::POST,
        "/admissions",
        Some(DOCTOR),
        Some(json!({ "patient_id": 1, "doctor_id": 2, "bed_id": 3, "diagnosis": "flu\u{0}" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Validation error: diagnosis must not contain NUL characters"
    );

    let (status, _) = call(
        &app,
        Method::POST,
        "/admissions/abc/discharge",
        Some(DOCTOR),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_ids_are_404() {
    let app = app();
    let bed_id = add_bed(&app, "B-001", "General").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/admissions",
        Some(DOCTOR),
        Some(json!({ "patient_id": 77, "doctor_id": 2, "bed_id": bed_id, "diagnosis": "flu" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Patient 77 not found");

    let (status, _) = call(&app, Method::GET, "/patients/77", Some(HR), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::POST,
        "/admissions/12/discharge",
        Some(DOCTOR),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admissions_of_unknown_patient_is_empty_list() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/patients/77/admissions", Some(HR), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["admissions"], json!([]));
}

#[tokio::test]
async fn test_no_available_beds_is_404() {
    let app = app();
    let bed_id = add_bed(&app, "B-001", "General").await;
    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/beds/{bed_id}/status"),
        Some(HR),
        Some(json!({ "status": "Maintenance" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        Method::GET,
        "/beds?status=available",
        Some(DOCTOR),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No beds currently available");

    // Other filters may legitimately be empty
    let (status, body) = call(&app, Method::GET, "/beds?status=reserved", Some(DOCTOR), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["beds"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_manual_bed_status_rules() {
    let app = app();
    let bed_id = add_bed(&app, "B-001", "General").await;
    let uri = format!("/beds/{bed_id}/status");

    let (status, _) = call(
        &app,
        Method::PUT,
        &uri,
        Some(HR),
        Some(json!({ "status": "Occupied" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(
        &app,
        Method::PUT,
        &uri,
        Some(HR),
        Some(json!({ "status": "empty" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = call(
        &app,
        Method::PUT,
        &uri,
        Some(FRONT_DESK),
        Some(json!({ "status": "Reserved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bed"]["status"], "Reserved");
}

#[tokio::test]
async fn test_census_route_is_not_an_id() {
    let app = app();
    register(&app, "Tunde Ade").await;

    let (status, body) = call(&app, Method::GET, "/patients/census", Some(HR), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["census"]["total"], 1);
    assert_eq!(body["census"]["waiting"], 1);
}

#[tokio::test]
async fn test_auth_disabled_allows_anonymous_admin() {
    let app = app_from(
        r#"
database_target = "memory"
[auth]
enabled = false
"#,
    );
    let (status, _) = call(
        &app,
        Method::POST,
        "/beds",
        None,
        Some(json!({ "bed_number": "B-001", "ward": "ICU" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_malformed_query_uses_envelope() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::GET,
        "/beds?status=available&status=reserved",
        Some(DOCTOR),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("status"), "{body}");

    let (status, body) = call(&app, Method::GET, "/admissions?status=lost", Some(HR), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/wards", Some(HR), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No route for /wards");

    let (status, body) = call(&app, Method::DELETE, "/beds", Some(HR), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_edit_patient_demographics() {
    let app = app();
    let patient_id = register(&app, "Kemi Adebayo").await;
    let bed_id = add_bed(&app, "B-001", "General").await;
    let (status, _) = call(
        &app,
        Method::POST,
        "/admissions",
        Some(DOCTOR),
        Some(json!({
            "patient_id": patient_id,
            "doctor_id": 2,
            "bed_id": bed_id,
            "diagnosis": "malaria"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/patients/{patient_id}");
    let (status, body) = call(
        &app,
        Method::PUT,
        &uri,
        Some(FRONT_DESK),
        Some(json!({ "name": "Kemi Adebayo-Cole", "phone": "+234 801 000 0000" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["patient"]["name"], "Kemi Adebayo-Cole");
    assert_eq!(body["patient"]["phone"], "+234 801 000 0000");
    assert_eq!(body["patient"]["status"], "Admitted");

    // Status belongs to admission and discharge
    let (status, body) = call(
        &app,
        Method::PUT,
        &uri,
        Some(FRONT_DESK),
        Some(json!({ "name": "Kemi", "status": "Discharged" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let (_, body) = call(&app, Method::GET, &uri, Some(HR), None).await;
    assert_eq!(body["patient"]["status"], "Admitted");
    assert_eq!(body["patient"]["name"], "Kemi Adebayo-Cole");

    let (status, _) = call(&app, Method::PUT, &uri, Some(HR), Some(json!({ "name": "X" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        Method::PUT,
        "/patients/77",
        Some(DOCTOR),
        Some(json!({ "name": "Nobody" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
