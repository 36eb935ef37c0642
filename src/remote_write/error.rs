//! Error types for configuration and sending

use crate::http::{self, Status};

/// Configuration problems, detected by `begin()` before any network I/O
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("you must set a url with set_url()")]
    MissingUrl,

    #[error("you must set a path with set_path()")]
    MissingPath,

    #[error("you must set a port with set_port()")]
    MissingPort,

    #[error("invalid remote-write target: {0}")]
    InvalidTarget(String),

    #[error("url scheme {scheme} does not match the {transport} transport")]
    SchemeMismatch {
        scheme: &'static str,
        transport: &'static str,
    },

    #[error("client not started: call begin() before send()")]
    NotStarted,
}

/// Failure reported by a payload source while serializing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PayloadError {
    message: String,
}

impl PayloadError {
    pub fn new(message: impl Into<String>) -> Self {
        PayloadError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Why a send did not succeed
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("payload needs {size} bytes, more than the {max} byte limit")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("failed to send to remote-write endpoint, 4xx response: {0}")]
    ClientError(Status),

    #[error("failed to send to remote-write endpoint, 5xx or unexpected status code: {0}")]
    UnexpectedStatus(Status),

    #[error("failed to send to remote-write endpoint, 5xx or unexpected status code: {0}")]
    Transport(#[from] http::Error),
}

impl SendError {
    /// HTTP status of the response that caused the failure, if one arrived
    pub fn status(&self) -> Option<Status> {
        match self {
            SendError::ClientError(status) | SendError::UnexpectedStatus(status) => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_field() {
        assert!(ConfigError::MissingUrl.to_string().contains("set_url"));
        assert!(ConfigError::MissingPath.to_string().contains("set_path"));
        assert!(ConfigError::MissingPort.to_string().contains("set_port"));
    }

    #[test]
    fn test_payload_error_message_passes_through() {
        let err = SendError::from(PayloadError::new("too many series"));
        assert_eq!(err.to_string(), "too many series");
    }

    #[test]
    fn test_status_messages() {
        let err = SendError::ClientError(Status::new(400).unwrap());
        assert!(err.to_string().contains("4xx response"));
        assert_eq!(err.status().map(|s| s.code()), Some(400));

        let err = SendError::Transport(http::Error::Timeout);
        assert!(err.to_string().contains("5xx or unexpected status code"));
        assert_eq!(err.status(), None);
    }
}
