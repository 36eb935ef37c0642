//! Integration tests for the remote-write client over plain TCP
//!
//! Each test runs a loopback endpoint on its own thread and pushes to it
//! through `TcpConnector`.

mod common;

use common::{response, spawn_plain};
use promwrite::http::TcpConnector;
use promwrite::{EncodedPayload, RemoteWriteClient, SendError, SendOutcome};

fn client(port: u16) -> RemoteWriteClient<TcpConnector> {
    let mut client = RemoteWriteClient::new(TcpConnector::new());
    client.set_url("http://127.0.0.1");
    client.set_path("/api/v1/write");
    client.set_port(port);
    client
}

fn payload() -> EncodedPayload {
    EncodedPayload::new(b"\xff\x06\x00\x00sNaPpY".to_vec())
}

#[test]
fn test_push_success() {
    let (port, server) = spawn_plain(vec![vec![response(204, &[])]]);

    let mut client = client(port);
    client.set_user("tenant");
    client.set_password("secret");
    client.begin().unwrap();

    let outcome = client.send(&payload());
    assert!(outcome.is_success(), "{:?}", outcome);

    let requests = server.join().unwrap();
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    assert_eq!(request.method(), "POST");
    assert_eq!(request.uri(), "/api/v1/write");
    assert_eq!(request.body(), payload().as_bytes());

    let headers = request.headers();
    assert_eq!(headers.get("Host"), Some(format!("127.0.0.1:{}", port).as_str()));
    assert_eq!(headers.get("Content-Type"), Some("application/x-protobuf"));
    assert_eq!(headers.get("Content-Encoding"), Some("snappy"));
    assert_eq!(headers.get("X-Prometheus-Remote-Write-Version"), Some("0.1.0"));
    assert_eq!(headers.get("Authorization"), Some("Basic dGVuYW50OnNlY3JldA=="));
    assert!(headers
        .get("User-Agent")
        .is_some_and(|ua| ua.starts_with("promwrite/")));
}

#[test]
fn test_keep_alive_reuses_session() {
    let script = vec![vec![
        response(200, &[]),
        response(200, &[]),
        response(200, &[]),
    ]];
    let (port, server) = spawn_plain(script);

    let mut client = client(port);
    client.begin().unwrap();

    for _ in 0..3 {
        assert!(client.send(&payload()).is_success());
    }

    assert_eq!(server.join().unwrap().len(), 3);
    assert_eq!(client.connect_count(), 1);
    assert_eq!(client.connection().unwrap().sessions_opened(), 1);
}

#[test]
fn test_connection_close_opens_new_session() {
    let script = vec![
        vec![response(200, &[("Connection", "close")])],
        vec![response(200, &[("Connection", "close")])],
    ];
    let (port, server) = spawn_plain(script);

    let mut client = client(port);
    client.begin().unwrap();

    assert!(client.send(&payload()).is_success());
    assert!(client.send(&payload()).is_success());

    assert_eq!(server.join().unwrap().len(), 2);
    assert_eq!(client.connect_count(), 1);
    assert_eq!(client.connection().unwrap().sessions_opened(), 2);
}

#[test]
fn test_status_classes() {
    let script = vec![vec![
        response(400, &[]),
        response(429, &[]),
        response(500, &[]),
        response(503, &[("Retry-After", "30")]),
        response(302, &[("Location", "/elsewhere")]),
    ]];
    let (port, server) = spawn_plain(script);

    let mut client = client(port);
    client.begin().unwrap();

    let outcome = client.send(&payload());
    assert!(outcome.is_permanent());
    assert!(outcome.message().unwrap().contains("4xx response"));

    assert!(client.send(&payload()).is_permanent());

    let outcome = client.send(&payload());
    assert!(outcome.is_retryable());
    assert!(outcome
        .message()
        .unwrap()
        .contains("5xx or unexpected status code"));

    assert!(client.send(&payload()).is_retryable());

    match client.send(&payload()) {
        SendOutcome::RetryableFailure(SendError::UnexpectedStatus(status)) => {
            assert_eq!(status.code(), 302)
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    server.join().unwrap();
}

#[test]
fn test_unreachable_endpoint_is_retryable() {
    // Bind then drop to get a port with nothing listening
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut client = client(port);
    client.begin().unwrap();

    let outcome = client.send(&payload());
    assert!(matches!(
        outcome,
        SendOutcome::RetryableFailure(SendError::Transport(_))
    ));
    assert_eq!(client.connect_count(), 1);
}

#[test]
fn test_server_hangup_is_retryable_then_recovers() {
    let script = vec![vec![], vec![response(200, &[])]];
    let (port, server) = spawn_plain(script);

    let mut client = client(port);
    client.begin().unwrap();

    // The first connection is closed without a response
    assert!(client.send(&payload()).is_retryable());
    assert!(client.send(&payload()).is_success());

    assert_eq!(server.join().unwrap().len(), 1);
}

#[test]
fn test_interim_response_does_not_leak_into_next_send() {
    let mut interim = b"HTTP/1.1 100 Continue\r\n\r\n".to_vec();
    interim.extend_from_slice(&response(200, &[]));
    let script = vec![vec![interim], vec![response(400, &[])]];
    let (port, server) = spawn_plain(script);

    let mut client = client(port);
    client.begin().unwrap();

    match client.send(&payload()) {
        SendOutcome::RetryableFailure(SendError::UnexpectedStatus(status)) => {
            assert_eq!(status.code(), 100)
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    // The 200 left behind on the first session belongs to the first push
    let outcome = client.send(&payload());
    assert!(outcome.is_permanent(), "{:?}", outcome);

    assert_eq!(server.join().unwrap().len(), 2);
    assert_eq!(client.connection().unwrap().sessions_opened(), 2);
}
