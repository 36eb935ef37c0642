//! Client configuration and target validation

use super::error::ConfigError;
use std::fmt;

/// Default upper bound on an encoded payload
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Where and as whom to push
///
/// Setters only store values. Everything is checked by
/// [`RemoteWriteClient::begin`](super::RemoteWriteClient::begin).
#[derive(Clone)]
pub struct ClientConfig {
    url: Option<String>,
    path: Option<String>,
    port: u16,
    user: Option<String>,
    password: Option<String>,
    max_payload_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            url: None,
            path: None,
            port: 0,
            user: None,
            password: None,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host of the endpoint, optionally prefixed with `https://` or `http://`
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
    }

    /// Request path, e.g. `/api/v1/write`
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Basic auth user; only used together with a password
    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user = Some(user.into());
    }

    /// Basic auth password; only used together with a user
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = Some(password.into());
    }

    pub fn set_max_payload_size(&mut self, max: usize) {
        self.max_payload_size = max;
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.set_url(url);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.set_path(path);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.set_port(port);
        self
    }

    pub fn with_basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.set_user(user);
        self.set_password(password);
        self
    }

    pub fn with_max_payload_size(mut self, max: usize) -> Self {
        self.set_max_payload_size(max);
        self
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    /// User and password, when both are set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.user, &self.password) {
            (Some(user), Some(password)) => Some((user, password)),
            _ => None,
        }
    }

    /// Check required fields and parse the target
    pub fn target(&self) -> Result<Target, ConfigError> {
        let url = self
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingUrl)?;
        let path = self
            .path
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingPath)?;
        if self.port == 0 {
            return Err(ConfigError::MissingPort);
        }

        Target::parse(url, self.port, path)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("path", &self.path)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("max_payload_size", &self.max_payload_size)
            .finish()
    }
}

/// URL scheme given explicitly in the configured url
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// Validated endpoint: host, port and path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    scheme: Option<Scheme>,
    host: String,
    port: u16,
    path: String,
}

impl Target {
    /// Parse a configured url, port and path
    ///
    /// The url names a host only: an optional `http://`/`https://` prefix
    /// and one trailing `/` are accepted, but not a path, a port or
    /// credentials. IPv6 literals go in brackets.
    pub fn parse(url: &str, port: u16, path: &str) -> Result<Self, ConfigError> {
        let invalid = |msg: &str| ConfigError::InvalidTarget(format!("{}: {:?}", msg, url));

        let (scheme, rest) = match url.split_once("://") {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("https") => {
                (Some(Scheme::Https), rest)
            }
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("http") => {
                (Some(Scheme::Http), rest)
            }
            Some(_) => return Err(invalid("unsupported url scheme")),
            None => (None, url),
        };

        let host = rest.strip_suffix('/').unwrap_or(rest);
        if host.is_empty() {
            return Err(invalid("url has no host"));
        }
        if host.chars().any(|c| c.is_whitespace() || c == '/' || c == '@') {
            return Err(invalid("url must name a host only"));
        }

        let host = match host.strip_prefix('[') {
            Some(v6) => v6
                .strip_suffix(']')
                .filter(|v6| v6.parse::<std::net::Ipv6Addr>().is_ok())
                .ok_or_else(|| invalid("malformed IPv6 literal"))?,
            None if host.contains(':') => return Err(invalid("set the port with set_port()")),
            None => host,
        };

        if !path.starts_with('/') || path.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidTarget(format!(
                "path must start with '/' and contain no whitespace: {:?}",
                path
            )));
        }

        Ok(Target {
            scheme,
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }

    /// Scheme written in the url, if any
    pub fn scheme(&self) -> Option<Scheme> {
        self.scheme
    }

    /// Host name or IP address, without brackets
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Check that an explicit url scheme matches the transport
    pub fn check_scheme(&self, secure: bool) -> Result<(), ConfigError> {
        let transport = if secure { Scheme::Https } else { Scheme::Http };
        match self.scheme {
            Some(scheme) if scheme != transport => Err(ConfigError::SchemeMismatch {
                scheme: scheme.as_str(),
                transport: if secure { "TLS" } else { "plain TCP" },
            }),
            _ => Ok(()),
        }
    }

    /// Value for the `Host` header
    ///
    /// The port is left out when it is the default for the transport.
    pub fn authority(&self, secure: bool) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        let default_port = if secure { 443 } else { 80 };
        if self.port == default_port {
            host
        } else {
            format!("{}:{}", host, self.port)
        }
    }

    /// Full URL, for logs
    pub fn url(&self, secure: bool) -> String {
        let scheme = if secure { "https" } else { "http" };
        format!("{}://{}{}", scheme, self.authority(secure), self.path)
    }
}
