//! HTTP resource store tests against a mock server
//!
//! Exercises the wire behavior of the HTTP backend: URL layout, basic
//! authentication, absence handling, the retry policy, and the batch
//! transaction endpoint.

use beacon::adapters::store::{
    HttpResourceStore, QueryFilter, ResourceKind, ResourceStore, StoreOp,
};
use beacon::config::{secret_string, RetryConfig, StoreBackend, StoreConfig};
use beacon::domain::{BeaconError, StoreError};
use chrono::{TimeZone, Utc};
use serde_json::json;

// "svc:hunter2"
const BASIC_AUTH: &str = "Basic c3ZjOmh1bnRlcjI=";

fn store_config(base_url: &str, max_retries: usize) -> StoreConfig {
    StoreConfig {
        backend: StoreBackend::Http,
        base_url: Some(base_url.to_string()),
        username: Some("svc".to_string()),
        password: Some(secret_string("hunter2".to_string())),
        tls_verify: true,
        timeout_seconds: 5,
        retry: RetryConfig {
            max_retries,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 1.0,
        },
    }
}

fn store(server: &mockito::ServerGuard, max_retries: usize) -> HttpResourceStore {
    HttpResourceStore::new(&store_config(&server.url(), max_retries)).unwrap()
}

#[tokio::test]
async fn test_read_sends_basic_auth_and_decodes_document() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/facility/loc-1")
        .match_header("authorization", BASIC_AUTH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "loc-1", "name": "General"}"#)
        .create_async()
        .await;

    let store = store(&server, 1);
    let document = store
        .read(ResourceKind::Facility, "loc-1")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(document["name"], "General");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_read_absent_document_is_none() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/aggregate-report/missing")
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/aggregate-report/withdrawn")
        .with_status(410)
        .create_async()
        .await;

    let store = store(&server, 1);
    assert!(store
        .read(ResourceKind::AggregateReport, "missing")
        .await
        .unwrap()
        .is_none());
    assert!(store
        .read(ResourceKind::AggregateReport, "withdrawn")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_server_errors_are_retried_to_exhaustion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/measure/m1")
        .with_status(503)
        .with_body("unavailable")
        .expect(3)
        .create_async()
        .await;

    let store = store(&server, 3);
    let err = store.read(ResourceKind::Measure, "m1").await.unwrap_err();

    assert!(matches!(
        err,
        BeaconError::Store(StoreError::ServerError { status: 503, .. })
    ));
    // One initial attempt plus two retries
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_read_is_an_authentication_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/measure/m1")
        .with_status(401)
        .with_body("bad credentials")
        .create_async()
        .await;

    let store = store(&server, 1);
    let err = store.read(ResourceKind::Measure, "m1").await.unwrap_err();
    assert!(matches!(
        err,
        BeaconError::Store(StoreError::AuthenticationFailed(_))
    ));
}

#[tokio::test]
async fn test_write_puts_document_at_kind_path() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/job/job-1")
        .match_header("authorization", BASIC_AUTH)
        .match_body(mockito::Matcher::Json(json!({"id": "job-1", "status": "in_progress"})))
        .with_status(200)
        .create_async()
        .await;

    let store = store(&server, 1);
    store
        .write(
            ResourceKind::Job,
            "job-1",
            &json!({"id": "job-1", "status": "in_progress"}),
        )
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_query_passes_filter_as_parameters() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/census-list")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("facility".into(), "loc-1".into()),
            mockito::Matcher::Regex("period_start=".into()),
            mockito::Matcher::Regex("period_end=".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"entries": [{"id": "c1"}, {"id": "c2"}]}"#)
        .create_async()
        .await;

    let filter = QueryFilter::new().field("facility", "loc-1").overlapping(
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 59).unwrap(),
    );

    let store = store(&server, 1);
    let documents = store
        .query(ResourceKind::CensusList, &filter)
        .await
        .unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["id"], "c1");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_query_without_entries_array_is_invalid() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/census-list")
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .create_async()
        .await;

    let store = store(&server, 1);
    let err = store
        .query(ResourceKind::CensusList, &QueryFilter::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BeaconError::Store(StoreError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_transaction_posts_batch() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/batch")
        .match_header("authorization", BASIC_AUTH)
        .with_status(200)
        .create_async()
        .await;

    let store = store(&server, 1);
    store
        .transaction(vec![
            StoreOp::Put {
                kind: ResourceKind::AggregateReport,
                id: "r1".to_string(),
                document: json!({"id": "r1"}),
            },
            StoreOp::Put {
                kind: ResourceKind::ReportManifest,
                id: "r1".to_string(),
                document: json!({"master_id": "r1"}),
            },
        ])
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_transaction_writes_nothing_visible() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/batch")
        .with_status(422)
        .with_body("malformed operation")
        .create_async()
        .await;

    let store = store(&server, 1);
    let err = store
        .transaction(vec![StoreOp::Put {
            kind: ResourceKind::AggregateReport,
            id: "r1".to_string(),
            document: json!({"id": "r1"}),
        }])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BeaconError::Store(StoreError::TransactionFailed(_))
    ));
}

#[tokio::test]
async fn test_duplicate_create_maps_conflict_and_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/batch")
        .with_status(409)
        .with_body("report-manifest/r1 already exists")
        .expect(1)
        .create_async()
        .await;

    let store = store(&server, 3);
    let err = store
        .transaction(vec![StoreOp::Create {
            kind: ResourceKind::ReportManifest,
            id: "r1".to_string(),
            document: json!({"master_id": "r1"}),
        }])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BeaconError::Store(StoreError::DocumentExists(_))
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_tolerates_absent_document() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/job/gone")
        .with_status(404)
        .create_async()
        .await;

    let store = store(&server, 1);
    store.delete(ResourceKind::Job, "gone").await.unwrap();
}

#[tokio::test]
async fn test_connection_check_hits_health_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .create_async()
        .await;

    let store = store(&server, 1);
    store.test_connection().await.unwrap();
    mock.assert_async().await;
}
