//! End-to-end compaction against an in-process HTTP server.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, post};
use serde_json::{Value, json};

use ravenadm_client::{
    AdminTransport, CompactError, CompactionInitiator, HttpTransport, MonitorConfig,
    StatusCallback, TransportError,
};
use ravenadm_core::{CompactState, CompactStatus, DatabaseName};

#[derive(Default)]
struct ServerState {
    requests: Vec<String>,
    compact_bodies: Vec<Bytes>,
    delete_status: Option<StatusCode>,
    compact_failure: Option<(StatusCode, String)>,
    status_documents: HashMap<String, VecDeque<Value>>,
}

type Shared = Arc<Mutex<ServerState>>;

type Params = Query<HashMap<String, String>>;

async fn delete_doc(State(state): State<Shared>, Query(params): Params) -> StatusCode {
    let key = params.get("id").cloned().unwrap_or_default();
    let mut state = state.lock().unwrap();
    state.requests.push(format!("DELETE {key}"));
    state.delete_status.unwrap_or(StatusCode::NO_CONTENT)
}

async fn get_doc(State(state): State<Shared>, Query(params): Params) -> Response {
    let key = params.get("id").cloned().unwrap_or_default();
    let mut state = state.lock().unwrap();
    state.requests.push(format!("GET {key}"));
    match state
        .status_documents
        .get_mut(&key)
        .and_then(VecDeque::pop_front)
    {
        Some(doc) => (
            [
                (header::ETAG, "\"01000000-0000-0001-0000-000000000007\""),
                (header::LAST_MODIFIED, "Sun, 18 Oct 2026 10:00:00 GMT"),
            ],
            axum::Json(doc),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn compact(
    State(state): State<Shared>,
    Query(query): Params,
    body: Bytes,
) -> Response {
    let mut state = state.lock().unwrap();
    let database = query.get("database").cloned().unwrap_or_default();
    state.requests.push(format!("POST compact {database}"));
    state.compact_bodies.push(body);
    match state.compact_failure.clone() {
        Some((status, body)) => (status, body).into_response(),
        None => StatusCode::OK.into_response(),
    }
}

async fn spawn_server(state: Shared) -> String {
    let app = Router::new()
        .route("/docs", delete(delete_doc).get(get_doc))
        .route("/admin/compact", post(compact))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{addr}")
}

fn initiator(base_url: &str) -> CompactionInitiator {
    let transport = Arc::new(HttpTransport::new(base_url, Duration::from_secs(5)).expect("transport"));
    CompactionInitiator::new(
        transport,
        MonitorConfig {
            poll_interval: Duration::from_millis(5),
            max_consecutive_failures: 3,
        },
    )
}

fn recorder() -> (StatusCallback, Arc<Mutex<Vec<CompactStatus>>>) {
    let seen: Arc<Mutex<Vec<CompactStatus>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: StatusCallback = Arc::new(move |status| sink.lock().unwrap().push(status));
    (callback, seen)
}

#[tokio::test]
async fn compaction_runs_to_completion() {
    let state = Shared::default();
    state.lock().unwrap().status_documents.insert(
        "Raven/Database/Compact/Status/foo".to_string(),
        VecDeque::from([
            json!({ "Messages": ["Compacting"], "State": "Running" }),
            json!({ "Messages": ["Compacting", "Done"], "State": "Completed" }),
        ]),
    );
    let base_url = spawn_server(state.clone()).await;
    let (callback, seen) = recorder();

    let job = initiator(&base_url)
        .start(DatabaseName::new("foo").unwrap(), callback)
        .await
        .expect("compaction accepted");
    job.wait().await.expect("compaction completed");

    let state = state.lock().unwrap();
    assert_eq!(state.requests[0], "DELETE Raven/Database/Compact/Status/foo");
    assert_eq!(state.requests[1], "POST compact foo");
    assert!(state.requests[2..]
        .iter()
        .all(|r| r == "GET Raven/Database/Compact/Status/foo"));
    assert!(state.compact_bodies.iter().all(Bytes::is_empty));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].state, CompactState::Completed);
}

#[tokio::test]
async fn target_is_url_encoded_in_query() {
    let state = Shared::default();
    state.lock().unwrap().status_documents.insert(
        "Raven/Database/Compact/Status/north wind".to_string(),
        VecDeque::from([json!({ "Messages": [], "State": "Completed" })]),
    );
    let base_url = spawn_server(state.clone()).await;
    let (callback, _seen) = recorder();

    initiator(&base_url)
        .start(DatabaseName::new("north wind").unwrap(), callback)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(state
        .lock()
        .unwrap()
        .requests
        .contains(&"POST compact north wind".to_string()));
}

#[tokio::test]
async fn rejected_compaction_reports_server_error() {
    let state = Shared::default();
    state.lock().unwrap().compact_failure = Some((
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"Url":"/admin/compact?database=foo","Error":"disk full"}"#.to_string(),
    ));
    let base_url = spawn_server(state.clone()).await;
    let (callback, seen) = recorder();

    let err = initiator(&base_url)
        .start(DatabaseName::new("foo").unwrap(), callback)
        .await
        .unwrap_err();

    match err {
        CompactError::CompactRequest {
            message,
            source: TransportError::Status { status, .. },
            ..
        } => {
            assert_eq!(message, "disk full");
            assert_eq!(status, 500);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(*seen.lock().unwrap(), vec![CompactStatus::faulted("disk full")]);
}

#[tokio::test]
async fn failed_status_delete_stops_before_compact() {
    let state = Shared::default();
    state.lock().unwrap().delete_status = Some(StatusCode::SERVICE_UNAVAILABLE);
    let base_url = spawn_server(state.clone()).await;
    let (callback, seen) = recorder();

    let err = initiator(&base_url)
        .start(DatabaseName::new("foo").unwrap(), callback)
        .await
        .unwrap_err();

    assert!(matches!(err, CompactError::StatusDocumentDelete { .. }));
    assert_eq!(state.lock().unwrap().requests.len(), 1);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_server_fails_delete() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let (callback, seen) = recorder();

    let err = initiator(&format!("http://{addr}"))
        .start(DatabaseName::new("foo").unwrap(), callback)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CompactError::StatusDocumentDelete {
            source: TransportError::Request { .. },
            ..
        }
    ));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_document_is_none_and_missing_delete_succeeds() {
    let state = Shared::default();
    state.lock().unwrap().delete_status = Some(StatusCode::NOT_FOUND);
    let base_url = spawn_server(state).await;
    let transport = HttpTransport::new(&base_url, Duration::from_secs(5)).unwrap();

    let doc = transport
        .get_document("Raven/Database/Compact/Status/none")
        .await
        .unwrap();
    assert!(doc.is_none());

    transport
        .delete_document("Raven/Database/Compact/Status/none")
        .await
        .unwrap();
}

#[tokio::test]
async fn fetched_document_carries_write_metadata() {
    let state = Shared::default();
    state.lock().unwrap().status_documents.insert(
        "Raven/Database/Compact/Status/foo".to_string(),
        VecDeque::from([json!({ "Messages": [], "State": "Running" })]),
    );
    let base_url = spawn_server(state).await;
    let transport = HttpTransport::new(&base_url, Duration::from_secs(5)).unwrap();

    let doc = transport
        .get_document("Raven/Database/Compact/Status/foo")
        .await
        .unwrap()
        .expect("document exists");

    assert_eq!(doc.body["State"], "Running");
    assert_eq!(
        doc.etag.as_deref(),
        Some("01000000-0000-0001-0000-000000000007")
    );
    assert_eq!(
        doc.last_modified.as_deref(),
        Some("Sun, 18 Oct 2026 10:00:00 GMT")
    );
}

#[tokio::test]
async fn dot_segment_target_reaches_its_own_status_document() {
    let state = Shared::default();
    state.lock().unwrap().status_documents.insert(
        "Raven/Database/Compact/Status/a/../b".to_string(),
        VecDeque::from([json!({ "Messages": ["done"], "State": "Completed" })]),
    );
    let base_url = spawn_server(state.clone()).await;
    let (callback, seen) = recorder();

    initiator(&base_url)
        .start(DatabaseName::new("a/../b").unwrap(), callback)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    let state = state.lock().unwrap();
    assert_eq!(state.requests[0], "DELETE Raven/Database/Compact/Status/a/../b");
    assert_eq!(state.requests[1], "POST compact a/../b");
    assert_eq!(seen.lock().unwrap()[0].messages, vec!["done".to_string()]);
}
