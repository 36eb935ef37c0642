//! Connection context
//!
//! A `Connection` is created by `begin()` and reused for every send. It
//! holds the target and the headers every request carries, and opens a
//! transport session lazily, keeping it open between sends while the
//! server allows it.

use super::config::Target;
use crate::http::{
    Connector, Error, Headers, HttpClient, HttpRequest, HttpResponse, Result, SessionOps,
};
use bytes::Bytes;
use std::time::Duration;

pub struct Connection<S: SessionOps> {
    target: Target,
    headers: Headers,
    timeout: Duration,
    client: Option<HttpClient<S>>,
    sessions_opened: u32,
}

impl<S: SessionOps> Connection<S> {
    pub(crate) fn new(target: Target, headers: Headers, timeout: Duration) -> Self {
        Connection {
            target,
            headers,
            timeout,
            client: None,
            sessions_opened: 0,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Headers sent with every request
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    /// Number of transport sessions this context has opened
    pub fn sessions_opened(&self) -> u32 {
        self.sessions_opened
    }

    /// POST `body` to the target and wait for the response
    ///
    /// Any transport error drops the open session, so the next call
    /// reconnects. So does a response after which the session cannot carry
    /// another exchange: `Connection: close`, an interim 1xx status, or
    /// unread bytes left behind the response.
    pub(crate) fn post<C>(&mut self, connector: &mut C, body: Bytes) -> Result<HttpResponse>
    where
        C: Connector<Session = S>,
    {
        let request = HttpRequest::post(self.target.path())
            .headers(&self.headers)
            .body(body)
            .build();

        self.open(connector)?;
        let client = self.client.as_mut().ok_or(Error::ConnectionClosed)?;

        match client.exchange(&request) {
            Ok(response) => {
                let reusable = response.keep_alive()
                    && response.status().class() != 1
                    && client.buffered_len() == 0;
                if !reusable {
                    self.disconnect();
                }
                Ok(response)
            }
            Err(err) => {
                self.disconnect();
                Err(err)
            }
        }
    }

    fn open<C>(&mut self, connector: &mut C) -> Result<()>
    where
        C: Connector<Session = S>,
    {
        if self.client.is_some() {
            log::debug!("reusing connection to {}", self.target.host());
            return Ok(());
        }

        let session = connector.connect(self.target.host(), self.target.port(), self.timeout)?;
        let mut client = HttpClient::new(session);
        client.set_timeout(self.timeout);

        self.sessions_opened = self.sessions_opened.saturating_add(1);
        log::debug!(
            "opened connection to {}:{}",
            self.target.host(),
            self.target.port()
        );

        self.client = Some(client);
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(mut client) = self.client.take() {
            if let Err(err) = client.close() {
                log::debug!("error closing connection: {}", err);
            }
        }
    }
}

impl<S: SessionOps> Drop for Connection<S> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl<S: SessionOps> std::fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("target", &self.target)
            .field("timeout", &self.timeout)
            .field("open", &self.is_open())
            .field("sessions_opened", &self.sessions_opened)
            .finish_non_exhaustive()
    }
}
