//! HTTP message parsing
//!
//! Incremental parsers for responses (read by the client) and POST
//! requests (read by loopback test endpoints).

use super::chunked::{find_crlf, ChunkedDecoder};
use super::message::METHOD_POST;
use super::{Error, Headers, HttpRequest, HttpResponse, Result, Status, Version, MAX_RESPONSE_BODY};

/// Parse HTTP request line
///
/// Format: METHOD URI VERSION
pub fn parse_request_line(line: &str) -> Result<(String, String, Version)> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    if parts.len() != 3 {
        return Err(Error::Parse(format!(
            "Invalid request line: expected 3 parts, got {}",
            parts.len()
        )));
    }

    let version = Version::from_str(parts[2])?;
    Ok((parts[0].to_string(), parts[1].to_string(), version))
}

/// Parse HTTP response status line
///
/// Format: VERSION STATUS [REASON]
pub fn parse_status_line(line: &str) -> Result<(Version, Status, String)> {
    let parts: Vec<&str> = line.splitn(3, ' ').collect();

    if parts.len() < 2 {
        return Err(Error::Parse(format!(
            "Invalid status line: expected at least 2 parts, got {}",
            parts.len()
        )));
    }

    let version = Version::from_str(parts[0])?;
    let status_code = parts[1]
        .parse::<u16>()
        .map_err(|_| Error::Parse(format!("Invalid status code: {}", parts[1])))?;
    let status = Status::new(status_code)?;
    let reason = match parts.get(2) {
        Some(reason) => reason.to_string(),
        None => status.reason_phrase().to_string(),
    };

    Ok((version, status, reason))
}

fn parse_content_length(headers: &Headers) -> Result<Option<usize>> {
    headers
        .get("Content-Length")
        .map(|cl| {
            cl.parse::<usize>()
                .map_err(|_| Error::Parse(format!("Invalid Content-Length: {}", cl)))
        })
        .transpose()
}

/// Consume header lines from `buffer` until the empty line
///
/// Returns `true` once the header block is complete.
fn parse_header_block(buffer: &mut Vec<u8>, headers: &mut Headers) -> Result<bool> {
    while let Some(crlf_pos) = find_crlf(buffer) {
        if crlf_pos == 0 {
            buffer.drain(..2);
            return Ok(true);
        }

        let line = String::from_utf8_lossy(&buffer[..crlf_pos]).to_string();
        buffer.drain(..crlf_pos + 2);

        let (name, value) = Headers::parse_header_line(&line)?;
        headers.insert(name, value);
    }
    Ok(false)
}

/// How the end of a response body is found
#[derive(Debug)]
enum BodyFraming {
    Length(usize),
    Chunked(ChunkedDecoder),
    UntilClose,
}

#[derive(Debug)]
enum ResponseState {
    StatusLine,
    Headers,
    Body(BodyFraming),
    Complete,
}

/// HTTP response parser
#[derive(Debug)]
pub struct ResponseParser {
    state: ResponseState,
    buffer: Vec<u8>,
    version: Version,
    status: Option<Status>,
    reason: String,
    headers: Headers,
    body: Vec<u8>,
}

impl ResponseParser {
    pub fn new() -> Self {
        ResponseParser {
            state: ResponseState::StatusLine,
            buffer: Vec::new(),
            version: Version::default(),
            status: None,
            reason: String::new(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Feed data to the parser
    ///
    /// Returns Ok(Some(response)) when a complete response is parsed,
    /// Ok(None) if more data is needed, or Err on parse error.
    pub fn parse(&mut self, data: &[u8]) -> Result<Option<HttpResponse>> {
        self.buffer.extend_from_slice(data);

        loop {
            match &mut self.state {
                ResponseState::StatusLine => {
                    let Some(crlf_pos) = find_crlf(&self.buffer) else {
                        return Ok(None);
                    };
                    let line = String::from_utf8_lossy(&self.buffer[..crlf_pos]).to_string();
                    self.buffer.drain(..crlf_pos + 2);

                    let (version, status, reason) = parse_status_line(&line)?;
                    self.version = version;
                    self.status = Some(status);
                    self.reason = reason;
                    self.state = ResponseState::Headers;
                }

                ResponseState::Headers => {
                    if !parse_header_block(&mut self.buffer, &mut self.headers)? {
                        return Ok(None);
                    }
                    self.state = self.body_framing()?;
                }

                ResponseState::Body(BodyFraming::Length(length)) => {
                    let length = *length;
                    if self.buffer.len() < length {
                        return Ok(None);
                    }
                    self.body = self.buffer.drain(..length).collect();
                    return Ok(Some(self.complete(false)));
                }

                ResponseState::Body(BodyFraming::Chunked(decoder)) => {
                    let consumed = decoder.decode(&self.buffer, &mut self.body)?;
                    self.buffer.drain(..consumed);
                    if self.body.len() > MAX_RESPONSE_BODY {
                        return Err(Error::Protocol("Response body too large".to_string()));
                    }
                    if !decoder.is_complete() {
                        return Ok(None);
                    }
                    return Ok(Some(self.complete(false)));
                }

                ResponseState::Body(BodyFraming::UntilClose) => {
                    self.body.append(&mut self.buffer);
                    if self.body.len() > MAX_RESPONSE_BODY {
                        return Err(Error::Protocol("Response body too large".to_string()));
                    }
                    return Ok(None);
                }

                ResponseState::Complete => return Ok(None),
            }
        }
    }

    /// Signal that the peer closed the connection
    ///
    /// Completes a response whose body is delimited by connection close.
    /// Returns Ok(None) if nothing was received, and
    /// [`Error::ConnectionClosed`] if the response was cut short.
    pub fn finish(&mut self) -> Result<Option<HttpResponse>> {
        match self.state {
            ResponseState::StatusLine if self.buffer.is_empty() => Ok(None),
            ResponseState::Body(BodyFraming::UntilClose) => Ok(Some(self.complete(true))),
            _ => Err(Error::ConnectionClosed),
        }
    }

    fn body_framing(&self) -> Result<ResponseState> {
        let status = self.status.ok_or(Error::Incomplete)?;
        if status.is_bodiless() {
            return Ok(ResponseState::Body(BodyFraming::Length(0)));
        }

        if self.headers.has_token("Transfer-Encoding", "chunked") {
            return Ok(ResponseState::Body(BodyFraming::Chunked(
                ChunkedDecoder::new(),
            )));
        }

        match parse_content_length(&self.headers)? {
            Some(length) if length > MAX_RESPONSE_BODY => {
                Err(Error::Protocol("Response body too large".to_string()))
            }
            Some(length) => Ok(ResponseState::Body(BodyFraming::Length(length))),
            None => Ok(ResponseState::Body(BodyFraming::UntilClose)),
        }
    }

    fn complete(&mut self, close_delimited: bool) -> HttpResponse {
        self.state = ResponseState::Complete;
        HttpResponse::builder()
            .version(self.version)
            .status(self.status.unwrap_or(Status::OK))
            .reason(std::mem::take(&mut self.reason))
            .headers(std::mem::take(&mut self.headers))
            .body(std::mem::take(&mut self.body))
            .close_delimited(close_delimited)
            .build()
    }

    /// Bytes fed to the parser but not yet part of a response
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Reset the parser for the next response
    ///
    /// Buffered bytes are discarded, so a session with
    /// [`buffered_len`](Self::buffered_len) above zero must not be reused.
    pub fn reset(&mut self) {
        self.state = ResponseState::StatusLine;
        self.buffer.clear();
        self.version = Version::default();
        self.status = None;
        self.reason.clear();
        self.headers.clear();
        self.body.clear();
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RequestState {
    RequestLine,
    Headers,
    Body,
    Complete,
}

/// HTTP POST request parser
///
/// Only `Content-Length` framed POST requests are accepted, which is what
/// the client writes.
pub struct RequestParser {
    state: RequestState,
    buffer: Vec<u8>,
    uri: String,
    version: Version,
    headers: Headers,
}

impl RequestParser {
    pub fn new() -> Self {
        RequestParser {
            state: RequestState::RequestLine,
            buffer: Vec::new(),
            uri: String::new(),
            version: Version::default(),
            headers: Headers::new(),
        }
    }

    /// Feed data to the parser
    pub fn parse(&mut self, data: &[u8]) -> Result<Option<HttpRequest>> {
        self.buffer.extend_from_slice(data);

        loop {
            match self.state {
                RequestState::RequestLine => {
                    let Some(crlf_pos) = find_crlf(&self.buffer) else {
                        return Ok(None);
                    };
                    let line = String::from_utf8_lossy(&self.buffer[..crlf_pos]).to_string();
                    self.buffer.drain(..crlf_pos + 2);

                    let (method, uri, version) = parse_request_line(&line)?;
                    if method != METHOD_POST {
                        return Err(Error::Protocol(format!("Unsupported method: {}", method)));
                    }
                    self.uri = uri;
                    self.version = version;
                    self.state = RequestState::Headers;
                }

                RequestState::Headers => {
                    if !parse_header_block(&mut self.buffer, &mut self.headers)? {
                        return Ok(None);
                    }
                    self.state = RequestState::Body;
                }

                RequestState::Body => {
                    let length = parse_content_length(&self.headers)?.ok_or_else(|| {
                        Error::Protocol("POST request without Content-Length".to_string())
                    })?;
                    if self.buffer.len() < length {
                        return Ok(None);
                    }

                    let body: Vec<u8> = self.buffer.drain(..length).collect();
                    self.state = RequestState::Complete;

                    let request = HttpRequest::post(std::mem::take(&mut self.uri))
                        .version(self.version)
                        .headers(&self.headers)
                        .body(body)
                        .build();
                    return Ok(Some(request));
                }

                RequestState::Complete => return Ok(None),
            }
        }
    }

    /// Prepare for the next request, keeping bytes already received for it
    pub fn next_request(&mut self) {
        self.state = RequestState::RequestLine;
        self.uri.clear();
        self.version = Version::default();
        self.headers.clear();
    }
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}
