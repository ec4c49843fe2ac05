//! End-to-end smoke tests for the full bizdeskd stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, real
//! store, real service, real axum router) and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot`. No TCP port is bound.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use bizdesk_adapter_http_axum::router;
use bizdesk_adapter_http_axum::state::AppState;
use bizdesk_adapter_storage_sqlite_sqlx::{Config, Database, SqliteAutomationStore};
use bizdesk_app::services::schedule_service::ScheduleService;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

async fn seed(pool: &SqlitePool) {
    sqlx::query("INSERT INTO tenants (id, name, utc_offset_seconds) VALUES ('acme', 'Acme', 3600)")
        .execute(pool)
        .await
        .unwrap();

    let automations = [
        ("A1", "Daily report", "SCHEDULABLE", Some("2024-01-05T09:00:00Z"), Some(24.0)),
        ("A2", "Paused sync", "DISABLED", Some("2024-01-05T09:00:00Z"), Some(1.0)),
        ("A3", "Month end close", "SCHEDULABLE", Some("2024-01-31T23:30:00Z"), None),
        ("A4", "Broken import", "SCHEDULABLE", Some("not a date"), Some(1.0)),
    ];
    for (id, name, status, next_execution_time, repeat_interval) in automations {
        sqlx::query(
            "INSERT INTO automations (id, tenant_id, name, status, next_execution_time, repeat_interval) \
             VALUES (?, 'acme', ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(status)
        .bind(next_execution_time)
        .bind(repeat_interval)
        .execute(pool)
        .await
        .unwrap();
    }
}

/// Seeded in-memory `SQLite` database with migrations applied.
async fn database() -> Database {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");

    seed(db.pool()).await;
    db
}

/// Build a fully-wired router on top of `db`.
fn router_for(db: &Database) -> axum::Router {
    let store = SqliteAutomationStore::new(db.pool().clone());
    router::build(AppState::new(ScheduleService::new(store)))
}

async fn app() -> axum::Router {
    router_for(&database().await)
}

async fn get_json_from(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body: Value =
        serde_json::from_slice(&resp.into_body().collect().await.unwrap().to_bytes()).unwrap();
    (status, body)
}

async fn get_json(uri: &str) -> (StatusCode, Value) {
    get_json_from(app().await, uri).await
}

fn occurrence_count(day: &Value) -> usize {
    day["occurrences"].as_array().unwrap().len()
}

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let resp = app()
        .await
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_project_daily_automation_over_january() {
    let (status, body) = get_json("/api/tenants/acme/calendar?year=2024&month=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant"]["utc_offset_seconds"], 3600);
    assert_eq!(body["days_in_month"], 31);
    assert_eq!(body["leading_blank_days"], 1);

    let days = body["days"].as_array().unwrap();
    let total: usize = days.iter().map(occurrence_count).sum();
    assert_eq!(total, 27);
    assert_eq!(occurrence_count(&days[3]), 0);
    assert_eq!(occurrence_count(&days[4]), 1);
    assert_eq!(occurrence_count(&days[30]), 1);
}

#[tokio::test]
async fn should_bucket_by_tenant_local_day() {
    let (status, body) = get_json("/api/tenants/acme/calendar?year=2024&month=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["days_in_month"], 29);
    assert_eq!(body["leading_blank_days"], 4);

    let days = body["days"].as_array().unwrap();
    let first = &days[0]["occurrences"];
    assert_eq!(first[0]["automation_id"], "A3");
    assert_eq!(first[0]["timestamp"], "2024-01-31T23:30:00Z");
    assert_eq!(first[1]["automation_id"], "A1");

    let total: usize = days.iter().map(occurrence_count).sum();
    assert_eq!(total, 30);
}

#[tokio::test]
async fn should_exclude_disabled_and_warn_about_unreadable_anchor() {
    let (_, body) = get_json("/api/tenants/acme/calendar?year=2024&month=1").await;

    let ids: Vec<&str> = body["days"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|d| d["occurrences"].as_array().unwrap())
        .map(|o| o["automation_id"].as_str().unwrap())
        .collect();
    assert!(!ids.contains(&"A2"));

    assert_eq!(
        body["warnings"],
        serde_json::json!([{
            "kind": "skipped",
            "automation_id": "A4",
            "reason": { "type": "missing_anchor" }
        }])
    );
    assert_eq!(body["truncated"], false);
}

#[tokio::test]
async fn should_list_occurrences_for_window() {
    let (status, body) = get_json(
        "/api/tenants/acme/occurrences?from=2024-01-31T00:00:00Z&to=2024-02-01T12:00:00Z",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let listed: Vec<(&str, &str)> = body["occurrences"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| {
            (
                o["automation_id"].as_str().unwrap(),
                o["timestamp"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        listed,
        vec![
            ("A1", "2024-01-31T09:00:00Z"),
            ("A3", "2024-01-31T23:30:00Z"),
            ("A1", "2024-02-01T09:00:00Z"),
        ]
    );
}

#[tokio::test]
async fn should_return_not_found_for_unknown_tenant() {
    let (status, body) = get_json("/api/tenants/globex/calendar?year=2024&month=1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Tenant globex not found");
}

#[tokio::test]
async fn should_return_bad_request_for_invalid_window() {
    let (status, _) = get_json(
        "/api/tenants/acme/occurrences?from=2024-02-01T00:00:00Z&to=2024-01-01T00:00:00Z",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_keep_projecting_next_to_malformed_rows() {
    let db = database().await;
    for (id, name, repeat_interval) in [
        ("A5", "Wordy interval", "'every day'"),
        ("  ", "Blank id", "1.0"),
        ("A6", "", "1.0"),
    ] {
        sqlx::query(&format!(
            "INSERT INTO automations (id, tenant_id, name, status, next_execution_time, repeat_interval) \
             VALUES (?, 'acme', ?, 'SCHEDULABLE', '2024-01-05T09:00:00Z', {repeat_interval})"
        ))
        .bind(id)
        .bind(name)
        .execute(db.pool())
        .await
        .unwrap();
    }

    let (status, body) =
        get_json_from(router_for(&db), "/api/tenants/acme/calendar?year=2024&month=1").await;

    assert_eq!(status, StatusCode::OK);
    let days = body["days"].as_array().unwrap();
    let total: usize = days.iter().map(occurrence_count).sum();
    assert_eq!(total, 27);

    let warnings = body["warnings"].as_array().unwrap();
    let wordy = warnings
        .iter()
        .find(|w| w["automation_id"] == "A5")
        .unwrap();
    assert_eq!(wordy["kind"], "skipped");
    assert_eq!(wordy["reason"]["type"], "invalid_interval");
    assert!(warnings.iter().all(|w| w["automation_id"] != "A6"));
}
