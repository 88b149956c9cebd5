//! Client error taxonomy.
//!
//! Three kinds, each with a different user-facing remediation:
//! authentication faults need reconfiguration, request faults clear up on
//! a later poll, and an ineligible account needs a different account.

use thiserror::Error;

/// Errors raised by [`crate::Client`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Credential, token, or TLS failure.
    ///
    /// TLS/certificate failures are deliberately classified here rather
    /// than as request faults: connectivity to the vendor over TLS is an
    /// authentication precondition.
    #[error("authentication failed: {reason}")]
    Auth { reason: String },

    /// HTTP or network fault on an authenticated call. `status` is the
    /// HTTP status when one was received, `None` for transport and parse
    /// failures.
    #[error("request failed: {message}")]
    Request {
        status: Option<u16>,
        message: String,
    },

    /// Authentication succeeded but the account is not a timecard user.
    #[error("account is not a timecard user")]
    NotTimecardUser,
}

impl ClientError {
    pub(crate) fn auth(reason: impl Into<String>) -> Self {
        Self::Auth {
            reason: reason.into(),
        }
    }

    pub(crate) fn request(message: impl Into<String>) -> Self {
        Self::Request {
            status: None,
            message: message.into(),
        }
    }

    pub(crate) fn status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        };
        Self::Request {
            status: Some(status),
            message,
        }
    }

    /// Whether this error calls for reconfiguration rather than a retry.
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}
