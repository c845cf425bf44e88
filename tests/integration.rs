#![cfg(feature = "sim")]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use digirail::appstate::AppState;
use digirail::device::DeviceController;
use digirail::http;
use digirail::poll_task::poll_once;
use digirail::transport::TransportError;
use digirail::transport::sim::SimulatedTransport;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn get(state: &AppState, uri: &str) -> (StatusCode, Option<Value>) {
    let response = http::router(state.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).ok();
    (status, json)
}

#[tokio::test]
async fn simulated_device_configures_and_polls() {
    let sim = SimulatedTransport::digirail_2a();
    let mut controller = DeviceController::connect(sim.clone(), 1).await.unwrap();

    assert_eq!(controller.input_unit(1).unwrap().to_string(), "degC");
    assert_eq!(controller.input_unit(2).unwrap().to_string(), "V");

    let result = controller.poll().await.unwrap();

    assert_eq!(result.in1(), Some(21.5));
    assert_eq!(result.in2(), Some(5.0));
    assert_eq!(sim.requests(), vec![(21, 2), (26, 2), (14, 2)]);
}

#[tokio::test]
async fn configuration_failure_aborts_connect() {
    let sim = SimulatedTransport::digirail_2a();
    sim.fail_next(1);

    let result = DeviceController::connect(sim.clone(), 1).await;

    assert!(matches!(result, Err(TransportError::Other(_))));
    assert_eq!(sim.requests(), vec![(21, 2)]);
}

#[tokio::test]
async fn failed_poll_keeps_previous_report() {
    let sim = SimulatedTransport::digirail_2a();
    let mut controller = DeviceController::connect(sim.clone(), 1).await.unwrap();
    let state = AppState::new(controller.summary());

    assert!(poll_once(&mut controller, &state).await);

    sim.set_register(14, 300);
    sim.fail_next(1);
    assert!(!poll_once(&mut controller, &state).await);
    let report = state.report.lock().unwrap().clone().unwrap();
    assert_eq!(report.readings.in1(), Some(21.5));

    assert!(poll_once(&mut controller, &state).await);
    let report = state.report.lock().unwrap().clone().unwrap();
    assert_eq!(report.readings.in1(), Some(30.0));
}

#[tokio::test]
async fn data_endpoint_serves_latest_report() {
    let sim = SimulatedTransport::digirail_2a();
    let mut controller = DeviceController::connect(sim, 4).await.unwrap();
    let state = AppState::new(controller.summary());

    let (status, _) = get(&state, "/data").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(poll_once(&mut controller, &state).await);

    let (status, json) = get(&state, "/data").await;
    let json = json.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["address"], json!(4));
    assert_eq!(json["readings"], json!({ "in1": 21.5, "in2": 5.0 }));
}

#[tokio::test]
async fn disabled_channel_is_reported_as_null() {
    let sim = SimulatedTransport::digirail_2a().with_channel(2, -1, 0, 999);
    let mut controller = DeviceController::connect(sim, 1).await.unwrap();
    let state = AppState::new(controller.summary());

    assert!(poll_once(&mut controller, &state).await);

    let (_, json) = get(&state, "/data").await;
    assert_eq!(json.unwrap()["readings"], json!({ "in1": 21.5, "in2": null }));

    let (status, json) = get(&state, "/channels").await;
    let json = json.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["output"], json!("in1"));
    assert_eq!(json[0]["category"], json!("Temperature"));
    assert_eq!(json[0]["unit"], json!("degC"));
    assert_eq!(json[1]["category"], json!("Disabled"));
    assert_eq!(json[1]["unit"], Value::Null);
}

#[tokio::test]
async fn heartbeat_reports_last_poll() {
    let sim = SimulatedTransport::digirail_2a();
    let mut controller = DeviceController::connect(sim, 1).await.unwrap();
    let state = AppState::new(controller.summary());

    let (_, json) = get(&state, "/heartbeat").await;
    let json = json.unwrap();
    assert_eq!(json["status"], json!("alive"));
    assert_eq!(json["last_poll"], Value::Null);

    assert!(poll_once(&mut controller, &state).await);

    let (_, json) = get(&state, "/heartbeat").await;
    assert!(json.unwrap()["last_poll"].is_string());
}
