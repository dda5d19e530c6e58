//! Integration tests for the HTTP surface.

use std::sync::{Arc, OnceLock};

use api::AppState;
use api::config::Config;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, Arc<AppState>) {
    let state = api::create_default_state(&Config::default()).unwrap();
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_job(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/jobs")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();
    let (status, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["worker"], "saga-worker");
    assert_eq!(json["job_types"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, state) = setup();
    let (status, json) = send(
        &app,
        post_job(json!({
            "job_type": "apply-discount",
            "variables": {"discount": 10, "orderTotal": 20.0}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    state.runtime.poll_once().await.unwrap();

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("worker_job_outcomes_total"));
}

#[tokio::test]
async fn test_create_and_complete_job() {
    let (app, state) = setup();
    let (status, created) = send(
        &app,
        post_job(json!({
            "job_type": "apply-discount",
            "process_instance_key": 11,
            "variables": {"discount": 20, "orderTotal": 100.0}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["process_instance_key"], 11);
    let key = created["job_key"].as_i64().unwrap();

    let (status, job) = send(&app, get(&format!("/jobs/{key}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["state"], "activatable");
    assert_eq!(job["retries"], 3);

    state.runtime.poll_once().await.unwrap();

    let (_, job) = send(&app, get(&format!("/jobs/{key}"))).await;
    assert_eq!(job["state"], "completed");
    assert_eq!(job["variables"]["discountedAmount"], 80.0);
}

#[tokio::test]
async fn test_business_error_visible_in_job_state() {
    let (app, state) = setup();
    let (_, created) = send(
        &app,
        post_job(json!({
            "job_type": "credit-deduction",
            "variables": {"customerId": "cust-ab", "orderTotal": 70.0}
        })),
    )
    .await;
    let key = created["job_key"].as_i64().unwrap();

    state.runtime.poll_once().await.unwrap();

    let (_, job) = send(&app, get(&format!("/jobs/{key}"))).await;
    assert_eq!(job["state"], "error_thrown");
    assert_eq!(job["code"], "invalidCustomerId");
}

#[tokio::test]
async fn test_unknown_job_type_is_rejected() {
    let (app, _) = setup();
    let (status, json) = send(
        &app,
        post_job(json!({"job_type": "ship-order", "variables": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("ship-order"));
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let (app, _) = setup();
    let (status, _) = send(&app, get("/jobs/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_process_instance() {
    let (app, _) = setup();
    let (_, created) = send(
        &app,
        post_job(json!({
            "job_type": "payment-completion",
            "process_instance_key": 42,
            "variables": {"orderId": "order-42"}
        })),
    )
    .await;
    let key = created["job_key"].as_i64().unwrap();

    let cancel = || {
        Request::builder()
            .method("DELETE")
            .uri("/process-instances/42")
            .body(Body::empty())
            .unwrap()
    };
    let (status, json) = send(&app, cancel()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["jobs_removed"], 1);

    let (status, _) = send(&app, get(&format!("/jobs/{key}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, cancel()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_published_messages() {
    let (app, state) = setup();
    send(
        &app,
        post_job(json!({
            "job_type": "payment-completion",
            "variables": {"orderId": "order-5"}
        })),
    )
    .await;
    state.runtime.poll_once().await.unwrap();

    let (status, messages) = send(&app, get("/messages")).await;
    assert_eq!(status, StatusCode::OK);
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["name"], "paymentCompletedMessage");
    assert_eq!(messages[0]["correlation_key"], "order-5");
    assert_eq!(messages[0]["variables"]["orderId"], "order-5");
}
