mod support;

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use message_contract::config::EndpointMap;
use message_contract::domain::Message;
use message_contract::http::{BaseConfig, HttpExecutor, RequestInput};
use message_contract::scenarios::{Scenario, ScenarioRunner};
use message_contract::testing::RunMode;
use message_contract::cases::{send_missing_field_cases, IdSource};
use message_contract::HarnessError;

use support::StubService;

/// Accepts connections and never answers.
fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
            if held.len() > 16 {
                break;
            }
        }
        thread::sleep(Duration::from_secs(5));
    });
    format!("http://{addr}")
}

/// An address nothing listens on.
fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Answers every request with `status_line`, an empty body and a closed
/// connection.
fn raw_status_server(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }
            let mut body = vec![0; content_length];
            let _ = reader.read_exact(&mut body);
            let response = format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn status_line_keeps_the_served_reason_phrase() {
    let base = Arc::new(BaseConfig::new(raw_status_server("HTTP/1.1 400 Invalid Payload")));
    let executor = HttpExecutor::new(Arc::clone(&base)).unwrap();

    let outcome = executor
        .execute(&RequestInput::get(base.endpoint("send")))
        .await
        .unwrap();
    assert_eq!(outcome.status_code, 400);
    assert_eq!(outcome.status_line, "HTTP/1.1 400 Invalid Payload");
}

#[tokio::test]
async fn non_standard_reason_fails_status_line_check() {
    let runner = ScenarioRunner::new(
        Arc::new(BaseConfig::new(raw_status_server("HTTP/1.1 400 Invalid Payload"))),
        Arc::new(EndpointMap::default()),
    )
    .unwrap();

    let case = &send_missing_field_cases()[0];
    let failure = runner
        .run_case(Scenario::SendMessageMissingField, case)
        .await
        .unwrap_err();
    match failure.source {
        HarnessError::Assertion(mismatch) => {
            assert_eq!(mismatch.field, "status_line");
            assert_eq!(mismatch.expected, "Bad Request");
            assert_eq!(mismatch.actual, "HTTP/1.1 400 Invalid Payload");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn status_line_has_version_code_and_reason() {
    let stub = StubService::start(|_| (204, String::new()));
    let base = Arc::new(BaseConfig::new(stub.base_uri.clone()));
    let executor = HttpExecutor::new(Arc::clone(&base)).unwrap();

    let outcome = executor
        .execute(&RequestInput::get(base.endpoint("cancel").with_query("3")))
        .await
        .unwrap();

    assert_eq!(outcome.status_code, 204);
    assert_eq!(outcome.status_line, "HTTP/1.1 204 No Content");
    assert!(outcome.body.is_empty());
    assert_eq!(stub.requests()[0].url, "/v3/cancel?3");
}

#[tokio::test]
async fn post_sends_json_body() {
    let stub = StubService::start(|_| (200, "[]".to_string()));
    let base = Arc::new(BaseConfig::new(stub.base_uri.clone()));
    let executor = HttpExecutor::new(Arc::clone(&base)).unwrap();

    let request = RequestInput::post_json(base.endpoint("/send"), &Message::new(Some(9), "x", true)).unwrap();
    let outcome = executor.execute(&request).await.unwrap();

    assert_eq!(outcome.messages().unwrap(), Vec::<Message>::new());
    let recorded = &stub.requests()[0];
    assert_eq!(recorded.method, "POST");
    assert_eq!(recorded.path(), "/v3/send");
    assert_eq!(recorded.content_type.as_deref(), Some("application/json"));
    assert_eq!(recorded.body, r#"{"id":9,"text":"x","important":true}"#);
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let base = Arc::new(BaseConfig::new(closed_port()));
    let executor = HttpExecutor::new(Arc::clone(&base)).unwrap();

    let err = executor
        .execute(&RequestInput::get(base.endpoint("cancel")))
        .await
        .unwrap_err();
    assert!(matches!(err, HarnessError::Transport(_)), "{err}");
}

#[tokio::test]
async fn base_deadline_turns_hang_into_timeout() {
    let base = Arc::new(BaseConfig::new(silent_server()).with_deadline(Duration::from_millis(200)));
    let executor = HttpExecutor::new(Arc::clone(&base)).unwrap();

    let err = executor
        .execute(&RequestInput::get(base.endpoint("cancel")))
        .await
        .unwrap_err();
    match err {
        HarnessError::Timeout { after } => assert_eq!(after, Duration::from_millis(200)),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn per_call_deadline_overrides_base() {
    let base = Arc::new(BaseConfig::new(silent_server()).with_deadline(Duration::from_secs(30)));
    let executor = HttpExecutor::new(Arc::clone(&base)).unwrap();

    let request = RequestInput::get(base.endpoint("cancel")).with_deadline(Duration::from_millis(150));
    let err = executor.execute(&request).await.unwrap_err();
    match err {
        HarnessError::Timeout { after } => assert_eq!(after, Duration::from_millis(150)),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn invalid_base_uri_fails_before_sending() {
    let base = Arc::new(BaseConfig::new("::not-a-uri"));
    let executor = HttpExecutor::new(Arc::clone(&base)).unwrap();

    let err = executor
        .execute(&RequestInput::get(base.endpoint("x")))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_url");
}

#[tokio::test]
async fn unreachable_service_fails_every_case_with_transport() {
    let runner = ScenarioRunner::new(
        Arc::new(BaseConfig::new(closed_port())),
        Arc::new(EndpointMap::default()),
    )
    .unwrap();

    let report = runner
        .run_suite(&Scenario::ALL, &IdSource::Fixed(vec![0]), RunMode::Parallel)
        .await;

    assert_eq!(report.total, 5);
    assert_eq!(report.failed, 5);
    assert!(report
        .results
        .iter()
        .all(|r| r.error_kind.as_deref() == Some("transport")));
}
