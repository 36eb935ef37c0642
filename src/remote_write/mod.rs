//! Remote-write client
//!
//! [`RemoteWriteClient`] takes a caller-supplied [`Connector`], checks its
//! configuration once in `begin()`, and then POSTs encoded payloads,
//! classifying each response into a [`SendOutcome`]:
//!
//! | Response                         | Outcome            |
//! |----------------------------------|--------------------|
//! | 2xx                              | `Success`          |
//! | 4xx                              | `PermanentFailure` |
//! | 1xx, 3xx, 5xx, transport failure | `RetryableFailure` |
//!
//! Payload and configuration problems are permanent and never reach the
//! network.
//!
//! [`Connector`]: crate::http::Connector

use std::time::Duration;

mod client;
mod config;
mod connection;
mod error;
mod outcome;
mod payload;

#[cfg(test)]
mod mock;

pub use client::RemoteWriteClient;
pub use config::{ClientConfig, Scheme, Target, DEFAULT_MAX_PAYLOAD_SIZE};
pub use connection::Connection;
pub use error::{ConfigError, PayloadError, SendError};
pub use outcome::SendOutcome;
pub use payload::{EncodedPayload, PayloadSource};

/// Bound on connect, handshake and every read or write of a send
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(15_000);

/// `User-Agent` header value, carrying the crate version
pub const USER_AGENT: &str = concat!("promwrite/", env!("CARGO_PKG_VERSION"));

/// Body media type: a protobuf `WriteRequest`
pub const CONTENT_TYPE: &str = "application/x-protobuf";

/// Body compression: snappy block format
pub const CONTENT_ENCODING: &str = "snappy";

/// Remote-write protocol version announced on every request
pub const REMOTE_WRITE_VERSION: &str = "0.1.0";
