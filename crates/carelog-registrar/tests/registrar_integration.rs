//! End-to-end registration against an in-process mock record store

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use carelog_domain::traits::Credentials;
use carelog_domain::{CareLogCandidate, FailureKind, ImportBatch, RunStatus, Score, SubjectId, TimeSlot};
use carelog_gatekeeper::Gatekeeper;
use carelog_registrar::{Registrar, RegistrarConfig, RegistrarError};
use carelog_sdk::RecordStoreClient;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const TOKEN: &str = "registrar-token";

#[derive(Default)]
struct StoreState {
    logins: AtomicUsize,
    created: Mutex<Vec<Value>>,
}

async fn token(State(state): State<Arc<StoreState>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    state.logins.fetch_add(1, Ordering::SeqCst);
    if body["password"] == "secret" {
        (StatusCode::OK, Json(json!({"access": TOKEN})))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"detail": "bad credentials"})))
    }
}

async fn animals() -> Json<Value> {
    Json(json!({"count": 1, "results": [{"id": 12, "name": "Mochi"}]}))
}

async fn care_logs(
    State(state): State<Arc<StoreState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let bearer = format!("Bearer {}", TOKEN);
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(bearer.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "invalid token"})));
    }
    let mut created = state.created.lock().unwrap();
    let duplicate = created
        .iter()
        .any(|c| c["log_date"] == body["log_date"] && c["time_slot"] == body["time_slot"]);
    if duplicate {
        return (StatusCode::CONFLICT, Json(json!({"detail": "entry exists"})));
    }
    created.push(body);
    (StatusCode::CREATED, Json(json!({"id": created.len()})))
}

async fn start_store() -> (String, Arc<StoreState>) {
    let state = Arc::new(StoreState::default());
    let router = Router::new()
        .route("/api/token/", post(token))
        .route("/api/animals/", get(animals))
        .route("/api/care-logs/", post(care_logs))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

fn record(subject: u64, day: u32, slot: TimeSlot) -> CareLogCandidate {
    CareLogCandidate::new(
        SubjectId::new(subject).unwrap(),
        NaiveDate::from_ymd_opt(2024, 11, day).unwrap(),
        slot,
        Score::PRESENT,
        Score::DEFAULT,
        true,
        true,
        Some("Stool: yes / Note: ate well".to_string()),
    )
}

fn stage(dir: &TempDir, records: Vec<CareLogCandidate>) -> PathBuf {
    let subject = records.first().map(|r| r.subject_id.value()).unwrap_or(12);
    let path = dir
        .path()
        .join("staged-batches")
        .join(format!("{}_2024-11-14_2024-11-15.json", subject));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, ImportBatch::from_records(records).to_json_pretty().unwrap()).unwrap();
    path
}

fn registrar(base: &str, password: &str) -> Registrar<RecordStoreClient> {
    Registrar::new(
        RecordStoreClient::new(base).unwrap(),
        Credentials::new("operator", password),
        Gatekeeper::default_config(),
        RegistrarConfig {
            retry_delay_ms: 10,
            ..RegistrarConfig::default()
        },
    )
}

#[tokio::test]
async fn test_registers_batch_over_http() {
    let (base, state) = start_store().await;
    let dir = TempDir::new().unwrap();
    let path = stage(
        &dir,
        vec![
            record(12, 14, TimeSlot::Morning),
            record(12, 14, TimeSlot::Noon),
            record(12, 14, TimeSlot::Evening),
        ],
    );

    let outcome = registrar(&base, "secret").register_file(&path).await.unwrap();

    assert_eq!(outcome.status(), RunStatus::Succeeded);
    assert_eq!(outcome.succeeded, 3);
    assert_eq!(state.logins.load(Ordering::SeqCst), 1);
    let created = state.created.lock().unwrap();
    assert_eq!(created[0]["recorder_label"], "OCR Import");
    assert_eq!(created[0]["from_paper"], true);
    assert_eq!(created[2]["time_slot"], "evening");
    assert_eq!(created[0]["notes"], "Stool: yes / Note: ate well");
    assert!(dir.path().join("staged-batches/processed/12_2024-11-14_2024-11-15.json").exists());
}

#[tokio::test]
async fn test_existing_entry_is_reported_as_conflict() {
    let (base, state) = start_store().await;
    let dir = TempDir::new().unwrap();
    let path = stage(
        &dir,
        vec![
            record(12, 14, TimeSlot::Morning),
            record(12, 14, TimeSlot::Morning),
            record(12, 15, TimeSlot::Morning),
        ],
    );

    let outcome = registrar(&base, "secret").register_file(&path).await.unwrap();

    assert_eq!(outcome.status(), RunStatus::Partial);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].index, 1);
    assert_eq!(outcome.failures[0].kind, FailureKind::Conflict);
    assert_eq!(state.created.lock().unwrap().len(), 2);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_bad_password_persists_nothing() {
    let (base, state) = start_store().await;
    let dir = TempDir::new().unwrap();
    let path = stage(&dir, vec![record(12, 14, TimeSlot::Morning)]);

    let result = registrar(&base, "wrong").register_file(&path).await;

    assert!(matches!(result, Err(RegistrarError::Authentication(_))));
    assert!(state.created.lock().unwrap().is_empty());
    assert!(path.exists());
}

#[tokio::test]
async fn test_unknown_subject_over_http() {
    let (base, state) = start_store().await;
    let dir = TempDir::new().unwrap();
    let path = stage(&dir, vec![record(99, 14, TimeSlot::Morning)]);

    let result = registrar(&base, "secret").register_file(&path).await;

    assert!(matches!(result, Err(RegistrarError::UnknownSubject(_))));
    assert!(state.created.lock().unwrap().is_empty());
    assert!(path.exists());
}
