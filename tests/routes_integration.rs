//! Integration tests for the HTTP API surface.
#![cfg(feature = "http-server")]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;

use chrono::{NaiveDate, NaiveTime};
use cts_rust::config::EngineConfig;
use cts_rust::db::repositories::LocalRepository;
use cts_rust::db::repository::{
    FullRepository, ModuleRepository, RoomRepository, StaffRepository, TimeslotRepository,
};
use cts_rust::http::{create_router, AppState};

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

/// Build a router over a seeded repository; returns the router and the
/// ids needed to craft request bodies.
async fn test_app() -> (Router, serde_json::Value) {
    let repo = Arc::new(LocalRepository::new());

    let dept = cts_rust::api::DepartmentId::new(1);
    let course = repo.insert_course("Computer Science", dept);
    let module = repo
        .insert_module("Algorithms", course.id, dept)
        .await
        .unwrap();
    let staff = repo.insert_staff("Dr. Frost", dept).await.unwrap();
    let room = repo
        .insert_room("R1", 40, "lecture", cts_rust::api::BuildingId::new(1))
        .await
        .unwrap();
    let slot = repo
        .insert_timeslot(time(10, 0), time(11, 0))
        .await
        .unwrap();
    repo.insert_timeslot(time(11, 0), time(12, 0)).await.unwrap();
    repo.insert_timeslot(time(14, 0), time(15, 0)).await.unwrap();

    let ids = serde_json::json!({
        "module_id": module.id.value(),
        "staff_id": staff.id.value(),
        "room_id": room.id.value(),
        "timeslot_id": slot.id.value(),
    });

    let state = AppState::new(repo as Arc<dyn FullRepository>, EngineConfig::default());
    (create_router(state), ids)
}

async fn post_json(router: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (router, _) = test_app().await;
    let (status, body) = get_json(router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["repository"], "connected");
}

#[tokio::test]
async fn test_check_constraints_rejects_missing_fields() {
    let (router, _) = test_app().await;
    let (status, body) = post_json(router, "/v1/constraints/check", serde_json::json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_check_constraints_reports_schedulable() {
    let (router, ids) = test_app().await;
    let body = serde_json::json!({
        "room_id": ids["room_id"],
        "staff_id": ids["staff_id"],
        "date": monday().to_string(),
        "timeslot_id": ids["timeslot_id"],
        "student_count": 10,
    });
    let (status, body) = post_json(router, "/v1/constraints/check", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_schedule"], true);
    assert!(body["hard_violations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_check_constraints_reports_capacity_violation() {
    let (router, ids) = test_app().await;
    let body = serde_json::json!({
        "room_id": ids["room_id"],
        "staff_id": ids["staff_id"],
        "date": monday().to_string(),
        "timeslot_id": ids["timeslot_id"],
        "student_count": 100,
    });
    let (status, body) = post_json(router, "/v1/constraints/check", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_schedule"], false);
    let violations = body["hard_violations"].as_array().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["constraint"], "room_capacity");
}

#[tokio::test]
async fn test_schedule_event_endpoint() {
    let (router, ids) = test_app().await;
    let body = serde_json::json!({
        "title": "Algorithms lecture",
        "module_id": ids["module_id"],
        "required_capacity": 10,
        "duration_minutes": 60,
        "preferred_date": monday().to_string(),
        "preferred_start": "10:00:00",
    });
    let (status, body) = post_json(router, "/v1/scheduler/event", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true, "{}", body);
    assert_eq!(body["event"]["title"], "Algorithms lecture");
    assert_eq!(body["event"]["date"], monday().to_string());
}

#[tokio::test]
async fn test_schedule_event_structured_failure() {
    let (router, ids) = test_app().await;
    // Nothing seats 500 students: a structured failure, not an error.
    let body = serde_json::json!({
        "title": "Graduation",
        "module_id": ids["module_id"],
        "required_capacity": 500,
    });
    let (status, body) = post_json(router, "/v1/scheduler/event", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "no rooms with sufficient capacity");
}

#[tokio::test]
async fn test_batch_endpoint() {
    let (router, ids) = test_app().await;
    let body = serde_json::json!({
        "events": [
            { "title": "small", "module_id": ids["module_id"], "student_count": 5 },
            { "title": "large", "module_id": ids["module_id"], "student_count": 30 },
        ],
        "preferences": { "duration_minutes": 60 },
    });
    let (status, body) = post_json(router, "/v1/scheduler/batch", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_success"], 2);
    assert_eq!(body["total_failure"], 0);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    // Priority ordering: the larger class schedules first.
    assert_eq!(results[0]["request"]["title"], "large");
}

#[tokio::test]
async fn test_batch_endpoint_rejects_bad_entry() {
    let (router, _) = test_app().await;
    let body = serde_json::json!({
        "events": [ { "title": "no module" } ],
    });
    let (status, body) = post_json(router, "/v1/scheduler/batch", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("events[0]"));
}

#[tokio::test]
async fn test_list_timeslots() {
    let (router, _) = test_app().await;
    let (status, body) = get_json(router, "/v1/timeslots").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["timeslots"].as_array().unwrap().len(), 3);
}
