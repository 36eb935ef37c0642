//! Loopback remote-write endpoint for integration tests

#![allow(dead_code)]

use promwrite::http::{HttpRequest, HttpResponse, RequestParser, Status};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// Empty-bodied HTTP/1.1 response on the wire
pub fn response(code: u16, headers: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = HttpResponse::builder()
        .status(Status::new(code).unwrap())
        .header("Content-Length", "0");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.build().to_wire()
}

/// Read one request per scripted response and answer it
///
/// Returns the requests in the order they arrived.
pub fn serve_connection<S: Read + Write>(stream: &mut S, responses: &[Vec<u8>]) -> Vec<HttpRequest> {
    let mut parser = RequestParser::new();
    let mut requests = Vec::new();
    let mut buf = [0u8; 4096];

    for response in responses {
        let mut chunk: &[u8] = &[];
        let request = loop {
            if let Some(request) = parser.parse(chunk).unwrap() {
                break request;
            }
            let n = stream.read(&mut buf).unwrap();
            assert!(n > 0, "client closed before sending a request");
            chunk = &buf[..n];
        };
        parser.next_request();
        requests.push(request);

        stream.write_all(response).unwrap();
        stream.flush().unwrap();
    }

    requests
}

/// Plain TCP endpoint on 127.0.0.1
///
/// `script` holds the responses for each accepted connection in turn. The
/// server closes a connection once its responses are used up.
pub fn spawn_plain(script: Vec<Vec<Vec<u8>>>) -> (u16, JoinHandle<Vec<HttpRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for responses in script {
            let (mut stream, _) = listener.accept().unwrap();
            requests.extend(serve_connection(&mut stream, &responses));
        }
        requests
    });

    (port, handle)
}
