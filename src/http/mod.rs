//! Blocking HTTP/1.1 transport for remote-write pushes
//!
//! This module provides the small HTTP client the remote-write client sends
//! through. It only needs to write one POST and read back one response per
//! exchange, over a connection that may be kept alive between exchanges.
//!
//! # Architecture
//!
//! The HTTP layer uses a session operations abstraction so that plain TCP
//! and TLS connections look the same to the client code:
//!
//! - `SessionOps` trait defines operations (poll, read, write, close)
//! - `HttpSession` polls with a timeout before every read and write
//! - `Connector` opens new sessions to a host and port on demand
//!
//! # Examples
//!
//! ```no_run
//! use promwrite::http::{Connector, HttpClient, HttpRequest, TcpConnector};
//! use std::time::Duration;
//!
//! let mut connector = TcpConnector::new();
//! let session = connector
//!     .connect("127.0.0.1", 9090, Duration::from_secs(5))
//!     .unwrap();
//! let mut client = HttpClient::new(session);
//!
//! let request = HttpRequest::post("/api/v1/write")
//!     .header("Host", "127.0.0.1:9090")
//!     .body(vec![0u8; 4])
//!     .build();
//! let response = client.exchange(&request).unwrap();
//! println!("status: {}", response.status());
//! ```

pub mod chunked;
pub mod client;
pub mod connector;
pub mod headers;
pub mod message;
pub mod net;
pub mod parser;
pub mod session;
pub mod tls;

pub use client::HttpClient;
pub use connector::{Connector, TcpConnector};
pub use headers::Headers;
pub use message::{HttpRequest, HttpResponse, Status, Version};
pub use parser::{RequestParser, ResponseParser};
pub use session::{FdSessionOps, HttpSession, PollEvents, SessionOps};

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP operation errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] tls::TlsError),

    #[error("Could not resolve {0}")]
    Resolve(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    #[error("Invalid HTTP status: {0}")]
    InvalidStatus(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(String),

    #[error("Incomplete message")]
    Incomplete,

    #[error("Timeout")]
    Timeout,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Maximum number of headers per message
pub const MAX_HEADERS: usize = 64;

/// Largest response body the client will buffer
///
/// Remote-write endpoints answer with at most a short error text.
pub const MAX_RESPONSE_BODY: usize = 64 * 1024;

/// CRLF line ending
pub const CRLF: &str = "\r\n";
