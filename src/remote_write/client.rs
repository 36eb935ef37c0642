//! Remote-write client

use super::config::ClientConfig;
use super::connection::Connection;
use super::error::{ConfigError, PayloadError, SendError};
use super::outcome::{classify_status, SendOutcome};
use super::payload::PayloadSource;
use super::{CONTENT_ENCODING, CONTENT_TYPE, REMOTE_WRITE_VERSION, REQUEST_TIMEOUT, USER_AGENT};
use crate::http::{Connector, Headers};
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use bytes::{Bytes, BytesMut};
use std::fmt;
use std::io::Write;

/// Pushes encoded payloads to one remote-write endpoint
///
/// Configure with the setters, call [`begin`](Self::begin) once, then call
/// [`send`](Self::send) as often as needed. Every operation blocks and
/// takes `&mut self`; the client is not meant to be shared between threads.
///
/// # Examples
///
/// ```no_run
/// use promwrite::http::tls::{TlsConfig, TlsConnector};
/// use promwrite::{EncodedPayload, RemoteWriteClient};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let tls = TlsConfig::client()?.build();
/// let mut client = RemoteWriteClient::new(TlsConnector::new(tls));
/// client.set_url("prometheus-prod-01.grafana.net");
/// client.set_path("/api/prom/push");
/// client.set_port(443);
/// client.set_user("123456");
/// client.set_password("api-key");
/// client.begin()?;
///
/// let payload = EncodedPayload::new(vec![0u8; 16]);
/// let outcome = client.send(&payload);
/// if outcome.is_retryable() {
///     // try again later
/// }
/// # Ok(())
/// # }
/// ```
pub struct RemoteWriteClient<C: Connector> {
    connector: C,
    config: ClientConfig,
    connection: Option<Connection<C::Session>>,
    connect_count: u32,
    debug: DebugSink,
}

impl<C: Connector> RemoteWriteClient<C> {
    pub fn new(connector: C) -> Self {
        Self::with_config(connector, ClientConfig::default())
    }

    pub fn with_config(connector: C, config: ClientConfig) -> Self {
        RemoteWriteClient {
            connector,
            config,
            connection: None,
            connect_count: 0,
            debug: DebugSink(None),
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.config.set_url(url);
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.config.set_path(path);
    }

    pub fn set_port(&mut self, port: u16) {
        self.config.set_port(port);
    }

    pub fn set_user(&mut self, user: impl Into<String>) {
        self.config.set_user(user);
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.config.set_password(password);
    }

    pub fn set_max_payload_size(&mut self, max: usize) {
        self.config.set_max_payload_size(max);
    }

    /// Write human-readable trace lines to `sink`
    ///
    /// Write errors on the sink are ignored.
    pub fn set_debug<W: Write + Send + 'static>(&mut self, sink: W) {
        self.debug = DebugSink(Some(Box::new(sink)));
    }

    /// Validate the configuration and create the connection context
    ///
    /// No network I/O happens here; the first [`send`](Self::send) opens
    /// the session. Calling `begin` again replaces the context and picks up
    /// any setter calls made since.
    pub fn begin(&mut self) -> Result<(), ConfigError> {
        let secure = self.connector.is_secure();
        let target = match self
            .config
            .target()
            .and_then(|target| target.check_scheme(secure).map(|()| target))
        {
            Ok(target) => target,
            Err(err) => {
                self.debug.line(format_args!("begin failed: {}", err));
                return Err(err);
            }
        };

        let mut headers = Headers::new();
        headers.insert("Host", target.authority(secure));
        headers.insert("User-Agent", USER_AGENT);
        headers.insert("Content-Type", CONTENT_TYPE);
        headers.insert("Content-Encoding", CONTENT_ENCODING);
        headers.insert("X-Prometheus-Remote-Write-Version", REMOTE_WRITE_VERSION);
        if let Some((user, password)) = self.config.credentials() {
            let token = BASE64_STANDARD.encode(format!("{}:{}", user, password));
            headers.insert("Authorization", format!("Basic {}", token));
        }

        let url = target.url(secure);
        self.connection = Some(Connection::new(target, headers, REQUEST_TIMEOUT));
        self.connect_count = self.connect_count.saturating_add(1);

        log::debug!("remote-write client ready for {}", url);
        self.debug.line(format_args!("Connecting to {}", url));
        Ok(())
    }

    /// Encode `payload` and POST it
    ///
    /// Never retries. See [`SendOutcome`] for how failures are split.
    pub fn send<P: PayloadSource + ?Sized>(&mut self, payload: &P) -> SendOutcome {
        let Some(connection) = self.connection.as_mut() else {
            self.debug.line(format_args!("send called before begin"));
            return SendOutcome::PermanentFailure(ConfigError::NotStarted.into());
        };

        let body = match encode(payload, self.config.max_payload_size()) {
            Ok(body) => body,
            Err(err) => {
                log::warn!("remote-write payload rejected: {}", err);
                self.debug.line(format_args!("Error creating write request: {}", err));
                return SendOutcome::PermanentFailure(err);
            }
        };

        log::debug!("sending {} bytes to remote-write endpoint", body.len());
        self.debug.line(format_args!("Sending to remote-write endpoint"));

        let outcome = match connection.post(&mut self.connector, body) {
            Ok(response) => classify_status(response.status()),
            Err(err) => SendOutcome::RetryableFailure(SendError::Transport(err)),
        };

        match outcome.error() {
            None => self.debug.line(format_args!("Sent successfully")),
            Some(err) => {
                log::warn!("remote-write send failed: {}", err);
                match err.status() {
                    Some(status) => self
                        .debug
                        .line(format_args!("Failed to send, status code {}", status.code())),
                    None => self.debug.line(format_args!("Failed to send: {}", err)),
                }
            }
        }

        outcome
    }

    /// Number of successful [`begin`](Self::begin) calls
    pub fn connect_count(&self) -> u32 {
        self.connect_count
    }

    pub fn is_started(&self) -> bool {
        self.connection.is_some()
    }

    pub fn connection(&self) -> Option<&Connection<C::Session>> {
        self.connection.as_ref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }
}

impl<C: Connector + fmt::Debug> fmt::Debug for RemoteWriteClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteWriteClient")
            .field("connector", &self.connector)
            .field("config", &self.config)
            .field("connection", &self.connection)
            .field("connect_count", &self.connect_count)
            .finish_non_exhaustive()
    }
}

/// Ask the payload source for its bytes
fn encode<P: PayloadSource + ?Sized>(payload: &P, max: usize) -> Result<Bytes, SendError> {
    let size = payload.buffer_size();
    if size > max {
        return Err(SendError::PayloadTooLarge { size, max });
    }
    if size == 0 {
        return Err(PayloadError::new("payload source reported an empty buffer").into());
    }

    let mut buf = BytesMut::zeroed(size);
    let len = payload.serialize(&mut buf[..])?;
    if len == 0 {
        return Err(PayloadError::new("payload source wrote no bytes").into());
    }
    if len > size {
        return Err(PayloadError::new(format!(
            "payload source claims {} bytes in a {} byte buffer",
            len, size
        ))
        .into());
    }

    buf.truncate(len);
    Ok(buf.freeze())
}

struct DebugSink(Option<Box<dyn Write + Send>>);

impl DebugSink {
    fn line(&mut self, args: fmt::Arguments<'_>) {
        let Some(sink) = self.0.as_mut() else {
            return;
        };
        if let Err(err) = sink.write_fmt(args).and_then(|()| sink.write_all(b"\n")) {
            log::debug!("debug sink write failed: {}", err);
        }
    }
}
