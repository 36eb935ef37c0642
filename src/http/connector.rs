//! Connectors open new sessions to an endpoint
//!
//! The remote-write client never opens sockets on its own: the caller hands
//! it a connector, and the client asks that connector for a session
//! whenever it has no open one.

use super::session::{FdSessionOps, SessionOps};
use super::{net, Result};
use std::time::Duration;

/// Opens sessions to `host:port`
pub trait Connector {
    type Session: SessionOps;

    /// Whether sessions from this connector are encrypted
    ///
    /// Decides which URL scheme (`https` or `http`) the connector serves.
    fn is_secure(&self) -> bool;

    /// Open a new session
    ///
    /// `timeout` bounds the TCP connect and any handshake.
    fn connect(&mut self, host: &str, port: u16, timeout: Duration) -> Result<Self::Session>;
}

impl<C: Connector + ?Sized> Connector for Box<C> {
    type Session = C::Session;

    fn is_secure(&self) -> bool {
        (**self).is_secure()
    }

    fn connect(&mut self, host: &str, port: u16, timeout: Duration) -> Result<Self::Session> {
        (**self).connect(host, port, timeout)
    }
}

/// Plain TCP connector
///
/// For plaintext endpoints such as a sidecar on localhost.
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    _private: (),
}

impl TcpConnector {
    pub fn new() -> Self {
        TcpConnector { _private: () }
    }
}

impl Connector for TcpConnector {
    type Session = FdSessionOps;

    fn is_secure(&self) -> bool {
        false
    }

    fn connect(&mut self, host: &str, port: u16, timeout: Duration) -> Result<FdSessionOps> {
        let stream = net::connect(host, port, timeout)?;
        Ok(FdSessionOps::new(stream))
    }
}
