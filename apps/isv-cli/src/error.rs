//! CLI error types and exit codes

use isv_directory::{DirectoryError, ReconcileError};
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success (including "already has access" and a negative lookup)
/// - 1: Operation failed (user creation, offboarding)
/// - 2: Authentication failed
/// - 3: Network or protocol error
/// - 4: Validation error
/// - 5: Directory rejected a read
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Directory refused credentials (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected directory response: {0}")]
    Protocol(String),

    #[error("Directory error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to create user {email}: {message}")]
    UserCreation { email: String, message: String },

    #[error("Offboarding failed: {0}")]
    OffboardFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UserCreation { .. }
            | CliError::OffboardFailed(_)
            | CliError::Config(_) => 1,
            CliError::AuthenticationFailed(_) | CliError::Unauthorized { .. } => 2,
            CliError::Network(_) | CliError::Protocol(_) => 3,
            CliError::Validation(_) => 4,
            CliError::Api { .. } => 5,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::AuthenticationFailed(_) => {
                Some("Check --api-id and --api-key (ISV_API_ID / ISV_API_KEY).")
            }
            CliError::Unauthorized { .. } => {
                Some("Make sure the API client is entitled to manage users and groups.")
            }
            CliError::Network(_) => Some("Check --tenant and your network connection."),
            _ => None,
        }
    }
}

impl From<DirectoryError> for CliError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::AuthError(message) => CliError::AuthenticationFailed(message),
            DirectoryError::Unauthorized { status, detail } => CliError::Unauthorized {
                status,
                message: detail,
            },
            DirectoryError::Transport(message) => CliError::Network(message),
            DirectoryError::Protocol(message) => CliError::Protocol(message),
            DirectoryError::Rejected { status, detail } => CliError::Api {
                status,
                message: detail,
            },
            e @ DirectoryError::MissingIdentifier => CliError::Protocol(e.to_string()),
            DirectoryError::InvalidConfig(message) => CliError::Config(message),
        }
    }
}

impl From<ReconcileError> for CliError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::Directory(e) => e.into(),
            ReconcileError::UserCreation { email, source } => CliError::UserCreation {
                email,
                message: source.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Config(format!("I/O error: {}", e))
    }
}
