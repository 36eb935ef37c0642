//! Send path benchmarks
//!
//! Measures the pieces of a push:
//! - request head encoding
//! - response parsing
//! - full `send()` over a keep-alive loopback connection, by payload size
//!
//! Run with: cargo bench --bench send_path

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use promwrite::http::{HttpRequest, RequestParser, ResponseParser, TcpConnector};
use promwrite::{EncodedPayload, RemoteWriteClient};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

const NO_CONTENT: &[u8] = b"HTTP/1.1 204 No Content\r\n\r\n";

/// Answer every request on `stream` with 204 until the client hangs up
fn serve(mut stream: TcpStream) {
    let mut parser = RequestParser::new();
    let mut buf = vec![0u8; 64 * 1024];
    let mut chunk_len = 0;

    loop {
        match parser.parse(&buf[..chunk_len]) {
            Ok(Some(_)) => {
                parser.next_request();
                chunk_len = 0;
                if stream.write_all(NO_CONTENT).is_err() {
                    return;
                }
                continue;
            }
            Ok(None) => {}
            Err(_) => return,
        }

        chunk_len = match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
    }
}

fn spawn_endpoint() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || serve(stream));
        }
    });

    port
}

fn bench_request_head(c: &mut Criterion) {
    let request = HttpRequest::post("/api/v1/write")
        .header("Host", "prometheus.example.com")
        .header("User-Agent", "promwrite/0.1.0")
        .header("Content-Type", "application/x-protobuf")
        .header("Content-Encoding", "snappy")
        .header("X-Prometheus-Remote-Write-Version", "0.1.0")
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .body(vec![0u8; 1024])
        .build();

    c.bench_function("request_head_to_wire", |b| {
        b.iter(|| black_box(request.head_to_wire()));
    });
}

fn bench_response_parse(c: &mut Criterion) {
    let wire = b"HTTP/1.1 400 Bad Request\r\n\
                 Content-Type: text/plain\r\n\
                 Content-Length: 34\r\n\
                 \r\n\
                 out of order sample for series up\n";

    c.bench_function("response_parse", |b| {
        let mut parser = ResponseParser::new();
        b.iter(|| {
            parser.reset();
            black_box(parser.parse(black_box(wire)).unwrap());
        });
    });
}

fn bench_send(c: &mut Criterion) {
    let port = spawn_endpoint();

    let mut client = RemoteWriteClient::new(TcpConnector::new());
    client.set_url("127.0.0.1");
    client.set_path("/api/v1/write");
    client.set_port(port);
    client.begin().unwrap();

    let mut group = c.benchmark_group("send");
    for size in [1024usize, 64 * 1024, 512 * 1024] {
        let payload = EncodedPayload::new(vec![0x5au8; size]);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| {
                let outcome = client.send(payload);
                assert!(outcome.is_success());
            });
        });
    }
    group.finish();
}

criterion_group! {
    name = codec;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = bench_request_head, bench_response_parse
}

criterion_group! {
    name = send_path;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(50);
    targets = bench_send
}

criterion_main!(codec, send_path);
