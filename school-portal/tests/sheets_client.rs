use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use school_core::retry::RetryConfig;
use school_portal::config::{SheetNames, SheetsSettings};
use school_portal::services::{RosterError, RosterSource, SheetsClient};
use secrecy::Secret;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fails the first `failures` requests with 503, then serves fixed values.
#[derive(Clone)]
struct MockSheets {
    calls: Arc<AtomicUsize>,
    failures: usize,
}

async fn values(
    State(mock): State<MockSheets>,
    Path((spreadsheet, sheet)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let call = mock.calls.fetch_add(1, Ordering::SeqCst);
    if params.get("key").map(String::as_str) != Some("test-key") || spreadsheet != "sheet-1" {
        return (StatusCode::FORBIDDEN, Json(json!({}))).into_response();
    }
    if call < mock.failures {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({}))).into_response();
    }

    let body = match sheet.as_str() {
        "Enseignants" => json!({
            "range": "Enseignants!A1:Z1000",
            "values": [
                ["ID", "Email", "FirstName", "LastName"],
                ["t1", "anne.martin@ecole.fr", "Anne", "Martin"],
                [],
                ["t2", "paul.durand@ecole.fr"]
            ]
        }),
        "Notes" | "Notes T1/T2" => json!({
            "values": [
                ["StudentID", "Subject", "Grade", "Date"],
                ["s1", "Maths", "14,5", "2024-03-01"],
                ["s2", "Maths", 12, "2024-03-01"]
            ]
        }),
        "Parents" => json!({
            "values": [
                ["ID", "Email"],
                ["p1", ""]
            ]
        }),
        _ => json!({ "range": "Empty!A1:Z1000" }),
    };
    Json(body).into_response()
}

async fn spawn_mock(failures: usize) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/:spreadsheet/values/:sheet", get(values))
        .with_state(MockSheets {
            calls: calls.clone(),
            failures,
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", address), calls)
}

fn client_with_names(base_url: String, max_attempts: u32, names: SheetNames) -> SheetsClient {
    let settings = SheetsSettings {
        base_url,
        spreadsheet_id: "sheet-1".to_string(),
        api_key: Secret::new("test-key".to_string()),
        request_timeout_secs: 5,
        names,
    };
    SheetsClient::new(settings, RetryConfig::new(max_attempts, Duration::from_millis(10))).unwrap()
}

fn client(base_url: String, max_attempts: u32) -> SheetsClient {
    client_with_names(base_url, max_attempts, SheetNames::default())
}

#[tokio::test]
async fn reads_rows_by_header_and_skips_blank_lines() {
    let (base_url, calls) = spawn_mock(0).await;
    let teachers = client(base_url, 3).teachers().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(teachers.len(), 2);
    assert_eq!(teachers[0].display_name(), "Anne Martin");
    assert_eq!(teachers[1].id, "t2");
    assert_eq!(teachers[1].first_name, None);
}

#[tokio::test]
async fn parses_numbers_and_decimal_commas() {
    let (base_url, _) = spawn_mock(0).await;
    let grades = client(base_url, 3).grades().await.unwrap();

    assert_eq!(grades[0].grade, 14.5);
    assert_eq!(grades[1].grade, 12.0);
}

#[tokio::test]
async fn sheet_without_values_is_empty() {
    let (base_url, _) = spawn_mock(0).await;
    let classes = client(base_url, 3).classes().await.unwrap();
    assert!(classes.is_empty());
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let (base_url, calls) = spawn_mock(2).await;
    let teachers = client(base_url, 3).teachers().await.unwrap();

    assert_eq!(teachers.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_retries_report_a_lookup_failure() {
    let (base_url, calls) = spawn_mock(5).await;
    let err = client(base_url, 3).teachers().await.unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    match err {
        RosterError::Lookup {
            sheet, attempts, ..
        } => {
            assert_eq!(sheet, "Enseignants");
            assert_eq!(attempts, 3);
        }
        other => panic!("expected lookup failure, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_required_field_is_malformed() {
    let (base_url, _) = spawn_mock(0).await;
    let err = client(base_url, 3).parents().await.unwrap_err();

    match err {
        RosterError::MalformedRecord(record) => {
            assert_eq!(record.sheet, "Parents");
            assert_eq!(record.row, 2);
            assert_eq!(record.field, "Email");
        }
        other => panic!("expected malformed record, got {:?}", other),
    }
}

#[tokio::test]
async fn sheet_names_with_reserved_characters_reach_the_right_sheet() {
    let (base_url, calls) = spawn_mock(0).await;
    let names = SheetNames {
        grades: "Notes T1/T2".to_string(),
        ..SheetNames::default()
    };
    let grades = client_with_names(base_url, 1, names).grades().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(grades.len(), 2);
    assert_eq!(grades[0].grade, 14.5);
}
