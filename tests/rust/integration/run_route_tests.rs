use axum::http::StatusCode;
use pylog_check::client::{ClientError, PluginClient, PYTHON_RUN_ROUTE};
use pylog_check::config::ClientConfig;
use pylog_check::scenario::{LogScenario, ScenarioError, ScenarioReport};
use reqwest::Method;
use serde_json::json;

use super::mock_server::{log_records, MockServer, Reply, STANDARD_LOGS};

async fn run_standard(server: &MockServer) -> Result<ScenarioReport, ScenarioError> {
    let client = PluginClient::new(&server.config()).expect("client");
    LogScenario::standard().run(&client).await
}

#[tokio::test]
async fn standard_scenario_passes_against_conforming_server() {
    let server = MockServer::start(Reply::Json(
        StatusCode::OK,
        json!({"logs": log_records(&STANDARD_LOGS), "result": null}),
    ))
    .await;

    let report = run_standard(&server).await.expect("scenario should pass");
    assert_eq!(report.checked, 5);
    assert_eq!(report.pending.len(), 1);
    assert_eq!(report.pending[0].index, 5);
    assert_eq!(report.result_marker(), "success");

    let received = server.received();
    server.shutdown().await;

    assert_eq!(received.len(), 1, "exactly one request is sent");
    assert_eq!(received[0].query, None, "no query parameters");
    assert_eq!(
        received[0].body,
        json!({"source": LogScenario::standard().script().source()})
    );
}

#[tokio::test]
async fn compact_map_rendering_is_a_mismatch() {
    let mut logs = STANDARD_LOGS.to_vec();
    logs[1] = "{\"patate\": 2.44}";
    let server = MockServer::start(Reply::Json(
        StatusCode::OK,
        json!({"logs": log_records(&logs)}),
    ))
    .await;

    let err = run_standard(&server).await.unwrap_err();
    server.shutdown().await;

    match err {
        ScenarioError::Mismatch {
            index,
            expected,
            actual,
        } => {
            assert_eq!(index, 1);
            assert_eq!(expected, "{\n    \"patate\": 2.44\n}");
            assert_eq!(actual, "{\"patate\": 2.44}");
        }
        other => panic!("expected a mismatch, got {other}"),
    }
}

#[tokio::test]
async fn malformed_pending_record_does_not_decide_the_verdict() {
    let mut logs = log_records(&STANDARD_LOGS[..5]);
    logs.as_array_mut()
        .expect("records array")
        .push(json!({"s": "logs"}));
    let server = MockServer::start(Reply::Json(StatusCode::OK, json!({"logs": logs}))).await;

    let report = run_standard(&server).await.expect("scenario should pass");
    server.shutdown().await;

    assert_eq!(report.checked, 5);
    assert_eq!(report.pending[0].observed, Some(json!({"s": "logs"})));
}

#[tokio::test]
async fn non_json_response_fails() {
    let server = MockServer::start(Reply::Text(StatusCode::OK, "plugin exploded")).await;

    let err = run_standard(&server).await.unwrap_err();
    server.shutdown().await;

    assert!(matches!(
        err,
        ScenarioError::Client(ClientError::Decode { status: 200, .. })
    ));
}

#[tokio::test]
async fn missing_logs_key_fails() {
    let server = MockServer::start(Reply::Json(StatusCode::OK, json!({"result": "ok"}))).await;

    let err = run_standard(&server).await.unwrap_err();
    server.shutdown().await;

    assert!(matches!(err, ScenarioError::LogsAbsent));
}

#[tokio::test]
async fn too_few_logs_fails() {
    let server = MockServer::start(Reply::Json(
        StatusCode::OK,
        json!({"logs": log_records(&STANDARD_LOGS[..3])}),
    ))
    .await;

    let err = run_standard(&server).await.unwrap_err();
    server.shutdown().await;

    assert!(matches!(
        err,
        ScenarioError::TooFewLogs {
            expected: 5,
            actual: 3
        }
    ));
}

#[tokio::test]
async fn script_exception_is_reported() {
    let server = MockServer::start(Reply::Json(
        StatusCode::BAD_REQUEST,
        json!({
            "logs": log_records(&["patate"]),
            "exception": {"message": "TypeError: log() takes no keyword arguments", "where": "<string>:3"}
        }),
    ))
    .await;

    let err = run_standard(&server).await.unwrap_err();
    server.shutdown().await;

    match err {
        ScenarioError::ScriptFailed { message } => assert!(message.starts_with("TypeError")),
        other => panic!("expected a script failure, got {other}"),
    }
}

#[tokio::test]
async fn perform_passes_params_and_keeps_raw_body() {
    let server = MockServer::start(Reply::Json(StatusCode::CREATED, json!({"logs": []}))).await;
    let client = PluginClient::new(&server.config()).expect("client");

    let params = vec![("sync".to_string(), "true".to_string())];
    let response = client
        .perform(Method::POST, PYTHON_RUN_ROUTE, &params, &json!({"source": "pass"}))
        .await
        .expect("perform");

    let received = server.received();
    server.shutdown().await;

    assert_eq!(response.status_code, 201);
    assert!(response.is_success());
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert_eq!(response.response, r#"{"logs":[]}"#);
    assert_eq!(received[0].query.as_deref(), Some("sync=true"));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Grab a free port, then release it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let config = ClientConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: 2,
        ..Default::default()
    };
    let client = PluginClient::new(&config).expect("client");
    let err = LogScenario::standard().run(&client).await.unwrap_err();

    assert!(matches!(
        err,
        ScenarioError::Client(ClientError::Transport { .. })
    ));
}
