//! Result of a single send

use super::error::SendError;
use crate::http::Status;

/// What happened to one push, and whether pushing again may help
///
/// The client never retries on its own; acting on
/// [`RetryableFailure`](SendOutcome::RetryableFailure) is up to the caller.
#[derive(Debug)]
#[must_use]
pub enum SendOutcome {
    /// The endpoint accepted the payload (2xx)
    Success,
    /// Server error, unexpected status or transport failure
    RetryableFailure(SendError),
    /// Client error (4xx), bad payload or bad configuration
    PermanentFailure(SendError),
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SendOutcome::Success)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, SendOutcome::RetryableFailure(_))
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, SendOutcome::PermanentFailure(_))
    }

    pub fn error(&self) -> Option<&SendError> {
        match self {
            SendOutcome::Success => None,
            SendOutcome::RetryableFailure(err) | SendOutcome::PermanentFailure(err) => Some(err),
        }
    }

    /// Human-readable reason for a failure
    pub fn message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    pub fn into_result(self) -> Result<(), SendError> {
        match self {
            SendOutcome::Success => Ok(()),
            SendOutcome::RetryableFailure(err) | SendOutcome::PermanentFailure(err) => Err(err),
        }
    }
}

/// Classify a response status by its leading digit
///
/// * **2xx** → [`SendOutcome::Success`]
/// * **4xx** → [`SendOutcome::PermanentFailure`], resending the same
///   payload gets the same answer
/// * **anything else** → [`SendOutcome::RetryableFailure`]
pub(crate) fn classify_status(status: Status) -> SendOutcome {
    match status.class() {
        2 => SendOutcome::Success,
        4 => SendOutcome::PermanentFailure(SendError::ClientError(status)),
        _ => SendOutcome::RetryableFailure(SendError::UnexpectedStatus(status)),
    }
}
