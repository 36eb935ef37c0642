//! HTTP client implementation
//!
//! One request, one response, in lockstep over a single session.

use super::{Error, HttpRequest, HttpResponse, HttpSession, ResponseParser, Result, SessionOps};
use std::time::Duration;

const READ_CHUNK: usize = 4096;

/// HTTP client
///
/// Provides methods for sending requests and receiving responses.
pub struct HttpClient<S: SessionOps> {
    session: HttpSession<S>,
    parser: ResponseParser,
    read_buf: Box<[u8]>,
}

impl<S: SessionOps> HttpClient<S> {
    /// Create a new HTTP client with a session
    pub fn new(session: S) -> Self {
        HttpClient {
            session: HttpSession::new(session),
            parser: ResponseParser::new(),
            read_buf: vec![0u8; READ_CHUNK].into_boxed_slice(),
        }
    }

    /// Set the timeout for each read and write
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.session.set_timeout(Some(timeout));
    }

    /// Write a complete request
    pub fn send_request(&mut self, request: &HttpRequest) -> Result<()> {
        self.session.write_all(&request.head_to_wire())?;
        self.session.write_all(request.body())
    }

    /// Read one complete response
    pub fn receive_response(&mut self) -> Result<HttpResponse> {
        self.parser.reset();

        loop {
            let n = self.session.read(&mut self.read_buf)?;

            if n == 0 {
                return self.parser.finish()?.ok_or(Error::ConnectionClosed);
            }

            if let Some(response) = self.parser.parse(&self.read_buf[..n])? {
                return Ok(response);
            }
        }
    }

    /// Send a request and wait for its response
    pub fn exchange(&mut self, request: &HttpRequest) -> Result<HttpResponse> {
        self.send_request(request)?;
        self.receive_response()
    }

    /// Bytes received past the end of the last response
    pub fn buffered_len(&self) -> usize {
        self.parser.buffered_len()
    }

    /// Close the connection
    pub fn close(&mut self) -> Result<()> {
        self.session.close()
    }

    pub fn session(&self) -> &HttpSession<S> {
        &self.session
    }
}
