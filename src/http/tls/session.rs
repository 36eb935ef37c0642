//! TLS session operations
//!
//! This module implements the SessionOps trait for TLS connections,
//! so the HTTP client runs unchanged over an encrypted stream.

use super::config::{TlsConfig, TlsError};
use crate::http::session::{poll_fd, PollEvents, SessionOps};
use crate::http::{Error, Result as HttpResult};
use openssl::ssl::{Ssl, SslStream};
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::os::fd::AsRawFd;
use std::time::Duration;

/// TLS session operations
///
/// Wraps an OpenSSL SslStream and provides poll/read/write/close operations.
pub struct TlsSessionOps {
    stream: SslStream<TcpStream>,
    failed: bool,
}

impl TlsSessionOps {
    /// Perform a client handshake over a connected TCP stream
    ///
    /// `host` is used for SNI (unless the config overrides it) and for
    /// certificate hostname verification. The handshake is bounded by
    /// `timeout`.
    pub fn connect(
        tcp_stream: TcpStream,
        config: &TlsConfig,
        host: &str,
        timeout: Duration,
    ) -> Result<Self, TlsError> {
        let mut ssl = Ssl::new(&config.ctx)?;

        let servername = config.servername().unwrap_or(host);
        // SNI is only defined for DNS names
        if servername.parse::<std::net::IpAddr>().is_err() {
            ssl.set_hostname(servername)?;
        }

        if config.verify_peer() {
            let param = ssl.param_mut();
            match host.parse::<std::net::IpAddr>() {
                Ok(ip) => param.set_ip(ip)?,
                Err(_) => param.set_host(host)?,
            }
        }

        // OpenSSL blocks until a whole record arrives, which poll() cannot
        // see; the socket timeouts bound the handshake and every later
        // read and write
        tcp_stream.set_read_timeout(Some(timeout))?;
        tcp_stream.set_write_timeout(Some(timeout))?;

        let stream = ssl
            .connect(tcp_stream)
            .map_err(|e| TlsError::HandshakeFailed(e.to_string()))?;

        log::debug!(
            "TLS handshake with {} complete: {}",
            host,
            stream.ssl().version_str()
        );

        Ok(TlsSessionOps {
            stream,
            failed: false,
        })
    }

    /// Negotiated protocol version, e.g. "TLSv1.3"
    pub fn version(&self) -> &'static str {
        self.stream.ssl().version_str()
    }

    pub fn get_ref(&self) -> &TcpStream {
        self.stream.get_ref()
    }

    /// Mark the session failed; a socket timeout becomes [`Error::Timeout`]
    fn io_error(&mut self, e: io::Error) -> Error {
        self.failed = true;
        match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Error::Timeout,
            _ => Error::Io(e),
        }
    }
}

impl SessionOps for TlsSessionOps {
    fn poll(&self, events: PollEvents, timeout: Option<Duration>) -> HttpResult<bool> {
        // Decrypted bytes may already be buffered inside OpenSSL
        if events == PollEvents::Read && self.stream.ssl().pending() > 0 {
            return Ok(true);
        }

        poll_fd(self.stream.get_ref().as_raw_fd(), events, timeout)
    }

    fn read(&mut self, buf: &mut [u8]) -> HttpResult<usize> {
        match self.stream.read(buf) {
            Ok(n) => Ok(n),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write(&mut self, buf: &[u8]) -> HttpResult<usize> {
        match self.stream.write(buf) {
            Ok(n) => Ok(n),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn close(&mut self) -> HttpResult<()> {
        // close_notify only makes sense on a healthy session
        if !self.failed {
            if let Err(e) = self.stream.shutdown() {
                log::debug!("TLS close_notify failed: {}", e);
            }
        }

        match self.stream.get_mut().shutdown(Shutdown::Both) {
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other.map_err(Error::from),
        }
    }
}
