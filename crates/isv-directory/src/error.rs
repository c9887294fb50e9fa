//! Error types for directory and reconciliation operations.

use thiserror::Error;

/// Result alias for Directory Client operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Result alias for reconciler operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors raised while talking to the directory.
///
/// There is no "not found" variant. Lookups return `Ok(None)` for a missing
/// user or group, so an `Err` means the directory state could not be
/// determined or a mutation was refused.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Token acquisition failed.
    #[error("authentication error: {0}")]
    AuthError(String),

    /// The directory rejected the bearer token (401/403).
    #[error("directory refused credentials (HTTP {status}): {detail}")]
    Unauthorized { status: u16, detail: String },

    /// Connection, timeout, or body-read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// A success response whose body could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The directory refused the request.
    #[error("directory rejected request (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// A create succeeded without returning a resource identifier.
    #[error("directory response carried no resource id")]
    MissingIdentifier,

    /// Client could not be built from the supplied configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DirectoryError {
    /// Whether this is a business-level refusal rather than a failure to
    /// reach or understand the directory.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::MissingIdentifier)
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DirectoryError::Protocol(e.to_string())
        } else if e.is_timeout() {
            DirectoryError::Transport(format!("request timed out: {e}"))
        } else {
            DirectoryError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(e: serde_json::Error) -> Self {
        DirectoryError::Protocol(format!("failed to parse response: {e}"))
    }
}

/// Errors that abort a reconciliation operation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The directory could not be queried or understood.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Creating an absent user failed; onboarding cannot continue.
    #[error("failed to create user {email}: {source}")]
    UserCreation {
        email: String,
        #[source]
        source: DirectoryError,
    },
}
