//! Gateway handler unit tests

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use secrecy::SecretString;
use serde_json::json;

use skydock::deploy::dispatcher::Dispatcher;
use skydock::deploy::executor::Orchestrator;
use skydock::gateway::handlers::{deploy_handler, health_handler};
use skydock::gateway::state::GatewayState;
use skydock::models::request::RawDeployRequest;

use crate::common::{sample_payload, temp_store, MockGenerator, MockHost, RecordingNotifier, OWNER};

const SECRET: &str = "s3cret";

struct Harness {
    state: Arc<GatewayState>,
    notifier: Arc<RecordingNotifier>,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let (store, dir) = temp_store().await;
    let store = Arc::new(store);
    let notifier = Arc::new(RecordingNotifier::new(true));
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(MockHost::new()),
        Arc::new(MockGenerator::new()),
        notifier.clone(),
        store.clone(),
        OWNER.to_string(),
    ));

    let state = Arc::new(GatewayState::new(
        SecretString::from(SECRET.to_string()),
        OWNER.to_string(),
        store,
        Arc::new(Dispatcher::new()),
        orchestrator,
        notifier.clone(),
    ));

    Harness {
        state,
        notifier,
        _dir: dir,
    }
}

fn raw_request(body: serde_json::Value) -> RawDeployRequest {
    serde_json::from_value(body).unwrap()
}

fn full_body() -> serde_json::Value {
    json!({
        "email": "dev@example.com",
        "task": "demo",
        "round": 1,
        "brief": "Build a dashboard",
        "nonce": "n1",
        "secret": SECRET,
    })
}

async fn body_json(response: Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_reports_operational() {
    let (status, body) = body_json(health_handler().await.into_response()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "operational");
    assert_eq!(body["version"], "1.2.0");
}

#[tokio::test]
async fn test_bad_secret_is_rejected_without_side_effects() {
    let h = harness().await;

    let mut body = full_body();
    body["secret"] = json!("wrong");
    let response = deploy_handler(State(h.state.clone()), Json(raw_request(body))).await;
    let (status, reply) = body_json(response).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply, json!({"error": "Invalid authentication credentials"}));
    assert!(h.state.store.is_empty().await);
    assert_eq!(h.state.dispatcher.in_flight().await, 0);
}

#[tokio::test]
async fn test_missing_fields_rejected_in_order() {
    let h = harness().await;

    for (drop_field, expected) in [
        ("email", "Missing required field: email"),
        ("task", "Missing required field: task"),
        ("round", "Missing required field: round"),
    ] {
        let mut body = full_body();
        body.as_object_mut().unwrap().remove(drop_field);

        let response = deploy_handler(State(h.state.clone()), Json(raw_request(body))).await;
        let (status, reply) = body_json(response).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply, json!({"error": expected}));
    }

    // Rejections schedule nothing and write nothing
    assert!(h.state.store.is_empty().await);
    assert_eq!(h.state.dispatcher.in_flight().await, 0);
}

#[tokio::test]
async fn test_duplicate_request_replays_cached_result() {
    let h = harness().await;

    let cached = sample_payload(1);
    h.state
        .store
        .upsert("dev@example.com::demo::round1::noncen1", cached.clone())
        .await
        .unwrap();

    let mut body = full_body();
    body["evaluation_url"] = json!("http://callback.example/notify");
    let response = deploy_handler(State(h.state.clone()), Json(raw_request(body))).await;
    let (status, reply) = body_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["status"], "success");
    assert_eq!(reply["note"], "duplicate request handled and re-notified");
    assert_eq!(reply["pages_url"], format!("https://{}.github.io/demo/", OWNER));
    assert_eq!(reply["repo_url"], format!("https://github.com/{}/demo", OWNER));
    assert_eq!(reply["cached_result"], serde_json::to_value(&cached).unwrap());

    // The stored payload was re-delivered, nothing was re-run
    let delivered = h.notifier.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].1, cached);
    assert_eq!(h.state.dispatcher.in_flight().await, 0);
    assert_eq!(h.state.store.len().await, 1);
}

#[tokio::test]
async fn test_duplicate_without_evaluation_url_skips_notification() {
    let h = harness().await;
    h.state
        .store
        .upsert("dev@example.com::demo::round1::noncen1", sample_payload(1))
        .await
        .unwrap();

    let response = deploy_handler(State(h.state.clone()), Json(raw_request(full_body()))).await;
    let (status, _reply) = body_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert!(h.notifier.delivered().is_empty());
}

#[tokio::test]
async fn test_fresh_request_is_acknowledged_and_dispatched() {
    let h = harness().await;

    let response = deploy_handler(State(h.state.clone()), Json(raw_request(full_body()))).await;
    let (status, reply) = body_json(response).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(reply["status"], "processing");
    assert_eq!(reply["note"], "deployment initiated for round 1");
    assert_eq!(reply["task_id"], "demo");
    assert_eq!(
        reply["expected_pages_url"],
        format!("https://{}.github.io/demo/", OWNER)
    );
    assert_eq!(
        reply["expected_repo_url"],
        format!("https://github.com/{}/demo", OWNER)
    );

    // The background run completes and persists its record
    h.state.dispatcher.drain().await;
    assert!(h
        .state
        .store
        .lookup("dev@example.com::demo::round1::noncen1")
        .await
        .is_some());
}

#[tokio::test]
async fn test_second_identical_request_runs_orchestration_once() {
    let h = harness().await;

    let first = deploy_handler(State(h.state.clone()), Json(raw_request(full_body()))).await;
    assert_eq!(first.status(), StatusCode::ACCEPTED);
    h.state.dispatcher.drain().await;

    let stored = h
        .state
        .store
        .lookup("dev@example.com::demo::round1::noncen1")
        .await
        .unwrap();

    let second = deploy_handler(State(h.state.clone()), Json(raw_request(full_body()))).await;
    let (status, reply) = body_json(second).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["cached_result"], serde_json::to_value(&stored).unwrap());
    assert_eq!(h.state.dispatcher.in_flight().await, 0);
    assert_eq!(h.state.store.len().await, 1);
}
