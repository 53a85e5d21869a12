use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use pipeshell_core::{ActivityApi, ActivityDraft, ActivityField, ActivityId, ShellError};
use pipeshell_crm::HttpActivityClient;
use serde_json::{json, Value};

#[derive(Clone, Debug)]
struct RecordedRequest {
    method: Method,
    path: String,
    api_token: Option<String>,
    body: Option<Value>,
}

#[derive(Clone, Default)]
struct Recorder {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    create_status: Arc<Mutex<Option<StatusCode>>>,
}

impl Recorder {
    fn record(&self, method: Method, path: String, query: &HashMap<String, String>, body: Option<Value>) {
        let request =
            RecordedRequest { method, path, api_token: query.get("api_token").cloned(), body };
        self.requests.lock().expect("recorder lock").push(request);
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("recorder lock").clone()
    }
}

async fn list(
    State(recorder): State<Recorder>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    recorder.record(Method::GET, "/v1/activities".to_string(), &query, None);
    Json(json!({"success": true, "data": [{"id": 1}, {"id": 2}]}))
}

async fn create(
    State(recorder): State<Recorder>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    recorder.record(Method::POST, "/v1/activities".to_string(), &query, Some(body.clone()));
    let status = recorder.create_status.lock().expect("status lock").unwrap_or(StatusCode::CREATED);
    (status, Json(json!({"success": status == StatusCode::CREATED, "data": body})))
}

async fn fetch(
    State(recorder): State<Recorder>,
    Path(id): Path<u64>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    recorder.record(Method::GET, format!("/v1/activities/{id}"), &query, None);
    Json(json!({"success": true, "data": {"id": id}}))
}

async fn update(
    State(recorder): State<Recorder>,
    Path(id): Path<u64>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorder.record(Method::PUT, format!("/v1/activities/{id}"), &query, Some(body));
    Json(json!({"success": true, "data": {"id": id}}))
}

async fn remove(
    State(recorder): State<Recorder>,
    Path(id): Path<u64>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    recorder.record(Method::DELETE, format!("/v1/activities/{id}"), &query, None);
    Json(json!({"success": true, "data": {"id": id}}))
}

async fn spawn_server(recorder: Recorder) -> String {
    let app = Router::new()
        .route("/v1/activities", get(list).post(create))
        .route("/v1/activities/{id}", get(fetch).put(update).delete(remove))
        .with_state(recorder);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let address = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{address}")
}

fn client_for(base_url: &str) -> HttpActivityClient {
    HttpActivityClient::new(base_url, "test-token".to_string().into())
}

#[tokio::test]
async fn list_all_sends_token_as_query_parameter() {
    let recorder = Recorder::default();
    let base_url = spawn_server(recorder.clone()).await;

    let response = client_for(&base_url).list_all().await.expect("list succeeds");

    assert!(response.is_success());
    assert_eq!(response.body, Some(json!({"success": true, "data": [{"id": 1}, {"id": 2}]})));
    let requests = recorder.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].path, "/v1/activities");
    assert_eq!(requests[0].api_token.as_deref(), Some("test-token"));
}

#[tokio::test]
async fn item_operations_address_the_activity_id() {
    let recorder = Recorder::default();
    let base_url = spawn_server(recorder.clone()).await;
    let client = client_for(&base_url);

    let mut draft = ActivityDraft::default();
    draft.set(ActivityField::Subject, "Call client").expect("subject");
    draft.set(ActivityField::DueDate, "2025-01-10").expect("date");

    client.get_by_id(ActivityId(25)).await.expect("get succeeds");
    let updated = client.update(ActivityId(52), &draft).await.expect("update succeeds");
    client.delete(ActivityId(30)).await.expect("delete succeeds");

    assert!(updated.is_success());
    let requests = recorder.requests();
    let summary =
        requests.iter().map(|request| (request.method.clone(), request.path.clone())).collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            (Method::GET, "/v1/activities/25".to_string()),
            (Method::PUT, "/v1/activities/52".to_string()),
            (Method::DELETE, "/v1/activities/30".to_string()),
        ]
    );
    assert_eq!(requests[1].body, Some(json!({"subject": "Call client", "due_date": "2025-01-10"})));
}

#[tokio::test]
async fn create_posts_participants_as_objects() {
    let recorder = Recorder::default();
    let base_url = spawn_server(recorder.clone()).await;

    let mut draft = ActivityDraft::default();
    draft.set(ActivityField::DealId, "2").expect("deal");
    draft
        .set(ActivityField::Participants, "person_id=5, primary_flag=True; person_id=7, primary_flag=False")
        .expect("participants");

    let response = client_for(&base_url).create(&draft).await.expect("create succeeds");

    assert_eq!(response.status, 201);
    assert!(response.remote_error.is_none());
    let body = recorder.requests()[0].body.clone().expect("create sends a body");
    assert_eq!(
        body,
        json!({
            "deal_id": 2,
            "participants": [
                {"person_id": 5, "primary_flag": true},
                {"person_id": 7, "primary_flag": false}
            ]
        })
    );
    let echoed: ActivityDraft = serde_json::from_value(body).expect("body decodes to a draft");
    assert_eq!(echoed, draft);
}

#[tokio::test]
async fn create_with_non_created_status_reports_remote_error_and_keeps_body() {
    let recorder = Recorder::default();
    *recorder.create_status.lock().expect("status lock") = Some(StatusCode::BAD_REQUEST);
    let base_url = spawn_server(recorder.clone()).await;

    let response =
        client_for(&base_url).create(&ActivityDraft::default()).await.expect("call completes");

    let error = response.remote_error.clone().expect("remote error reported");
    assert_eq!(error.status, 400);
    assert!(error.body.contains("\"success\":false"));
    assert_eq!(response.body.as_ref().and_then(|body| body.get("success")), Some(&json!(false)));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error_without_token() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("address");
    drop(listener);

    let error = client_for(&format!("http://{address}")).list_all().await.unwrap_err();

    match error {
        ShellError::Transport(message) => assert!(!message.contains("test-token")),
        other => panic!("expected transport error, got {other:?}"),
    }
}
