//! TLS support for HTTPS remote-write endpoints
//!
//! The TLS layer plugs into the session operations abstraction:
//!
//! 1. `TlsConfig` holds the OpenSSL client context (versions, trust, SNI)
//! 2. `TlsSessionOps` implements `SessionOps` for encrypted I/O
//! 3. `TlsConnector` opens TCP connections and runs the handshake
//!
//! # Examples
//!
//! ```no_run
//! use promwrite::http::tls::{TlsConfig, TlsConnector, TlsVersion};
//! use promwrite::RemoteWriteClient;
//!
//! let tls_config = TlsConfig::client()
//!     .unwrap()
//!     .version_range(TlsVersion::Tls12, TlsVersion::Tls13)
//!     .unwrap()
//!     .build();
//!
//! let mut client = RemoteWriteClient::new(TlsConnector::new(tls_config));
//! client.set_url("prometheus.example.com");
//! client.set_path("/api/v1/write");
//! client.set_port(443);
//! client.begin().unwrap();
//! ```

pub mod config;
pub mod session;

pub use config::{ClientConfigBuilder, TlsConfig, TlsError, TlsVersion};
pub use session::TlsSessionOps;

use crate::http::connector::Connector;
use crate::http::net;
use std::time::Duration;

/// Result type for TLS operations
pub type Result<T> = std::result::Result<T, TlsError>;

/// Connector producing OpenSSL TLS sessions
#[derive(Debug, Clone)]
pub struct TlsConnector {
    config: TlsConfig,
}

impl TlsConnector {
    pub fn new(config: TlsConfig) -> Self {
        TlsConnector { config }
    }

    pub fn config(&self) -> &TlsConfig {
        &self.config
    }
}

impl Connector for TlsConnector {
    type Session = TlsSessionOps;

    fn is_secure(&self) -> bool {
        true
    }

    fn connect(
        &mut self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> crate::http::Result<TlsSessionOps> {
        let stream = net::connect(host, port, timeout)?;
        Ok(TlsSessionOps::connect(stream, &self.config, host, timeout)?)
    }
}
