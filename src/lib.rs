//! promwrite - Prometheus remote-write client
//!
//! This crate POSTs pre-encoded remote-write payloads (snappy-compressed
//! protobuf) to a remote-write endpoint over HTTPS and tells the caller
//! whether a failed push is worth retrying.
//!
//! The [`http`] module is the blocking HTTP/1.1 transport (plain TCP or
//! OpenSSL TLS sessions), and [`remote_write`] is the client built on it.

pub mod http;
pub mod remote_write;

pub use remote_write::{
    ClientConfig, ConfigError, EncodedPayload, PayloadError, PayloadSource, RemoteWriteClient,
    SendError, SendOutcome,
};
