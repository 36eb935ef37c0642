//! In-memory connector for unit tests
//!
//! Sessions parse what the client writes with `RequestParser`, record each
//! request, and answer it with the next scripted response. With nothing
//! scripted a session reads EOF.

use crate::http::{
    self, Connector, HttpRequest, HttpResponse, PollEvents, RequestParser, SessionOps, Status,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
pub(crate) struct MockState {
    pub connects: usize,
    pub closes: usize,
    pub refuse: bool,
    pub requests: Vec<HttpRequest>,
    pub responses: VecDeque<Vec<u8>>,
}

#[derive(Clone, Default)]
pub(crate) struct MockConnector {
    state: Rc<RefCell<MockState>>,
    secure: bool,
}

impl MockConnector {
    pub fn new() -> Self {
        MockConnector {
            state: Rc::default(),
            secure: true,
        }
    }

    pub fn plain() -> Self {
        MockConnector {
            secure: false,
            ..Self::new()
        }
    }

    pub fn state(&self) -> std::cell::RefMut<'_, MockState> {
        self.state.borrow_mut()
    }

    /// Queue an empty-bodied response with the given status and headers
    pub fn respond(&self, code: u16, headers: &[(&str, &str)]) {
        let mut builder = HttpResponse::builder()
            .status(Status::new(code).unwrap())
            .header("Content-Length", "0");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.respond_raw(builder.build().to_wire());
    }

    /// Queue bytes written back verbatim after the next request
    pub fn respond_raw(&self, wire: impl Into<Vec<u8>>) {
        self.state().responses.push_back(wire.into());
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.borrow().requests.clone()
    }

    pub fn connects(&self) -> usize {
        self.state.borrow().connects
    }
}

impl Connector for MockConnector {
    type Session = MockSession;

    fn is_secure(&self) -> bool {
        self.secure
    }

    fn connect(&mut self, _host: &str, _port: u16, _timeout: Duration) -> http::Result<MockSession> {
        let mut state = self.state.borrow_mut();
        if state.refuse {
            return Err(http::Error::Io(std::io::Error::from(
                std::io::ErrorKind::ConnectionRefused,
            )));
        }
        state.connects += 1;

        Ok(MockSession {
            state: Rc::clone(&self.state),
            parser: RequestParser::new(),
            pending: Vec::new(),
        })
    }
}

pub(crate) struct MockSession {
    state: Rc<RefCell<MockState>>,
    parser: RequestParser,
    pending: Vec<u8>,
}

impl SessionOps for MockSession {
    fn poll(&self, _events: PollEvents, _timeout: Option<Duration>) -> http::Result<bool> {
        Ok(true)
    }

    fn read(&mut self, buf: &mut [u8]) -> http::Result<usize> {
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> http::Result<usize> {
        if let Some(request) = self.parser.parse(buf)? {
            self.parser.next_request();

            let mut state = self.state.borrow_mut();
            state.requests.push(request);
            if let Some(response) = state.responses.pop_front() {
                self.pending.extend_from_slice(&response);
            }
        }
        Ok(buf.len())
    }

    fn close(&mut self) -> http::Result<()> {
        self.state.borrow_mut().closes += 1;
        Ok(())
    }
}
