//! TCP connection setup
//!
//! Resolves a host name and connects to the first address that answers,
//! with a connect timeout per address.

use super::{Error, Result};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Connect to `host:port`, trying every resolved address in order
pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|_| Error::Resolve(format!("{}:{}", host, port)))?
        .collect();

    let mut last_err = None;
    for addr in &addrs {
        match connect_addr(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                log::debug!("connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| Error::Resolve(format!("{}:{}", host, port))))
}

fn connect_addr(addr: &SocketAddr, timeout: Duration) -> Result<TcpStream> {
    let socket = Socket::new(Domain::for_address(*addr), Type::STREAM, Some(Protocol::TCP))?;

    // Remote-write bodies go out as one write; don't hold back the tail
    socket.set_nodelay(true)?;
    socket.set_keepalive(true)?;
    socket.connect_timeout(&SockAddr::from(*addr), timeout)?;

    Ok(socket.into())
}
