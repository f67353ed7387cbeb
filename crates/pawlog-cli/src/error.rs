use std::io;

use pawlog_core::auth::AuthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] pawlog_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid pet ID: {0}")]
    InvalidPetId(String),
    #[error("Invalid date '{0}': expected YYYY-MM-DD or RFC 3339")]
    InvalidDate(String),
    #[error("{0}")]
    InvalidCondition(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    LoadFailed(String),
    /// The failure was already shown as a notice; only the exit status remains.
    #[error("command failed")]
    AlreadyReported,
}

impl CliError {
    /// Line for stderr, or `None` when the failure was already shown.
    pub fn report(&self) -> Option<String> {
        match self {
            Self::AlreadyReported => None,
            other => Some(format!("Error: {other}")),
        }
    }
}
