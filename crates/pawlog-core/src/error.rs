//! Error types for pawlog-core

use thiserror::Error;

use crate::auth::AuthError;

/// Result type alias using pawlog-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pawlog-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// No signed-in principal could be resolved
    #[error("User not logged in")]
    NotAuthenticated,

    /// Requested record does not resolve for the current principal.
    /// Record lookups return `Ok(None)`; shells raise this once absence is final.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Required input missing; raised before any network call
    #[error("{0}")]
    Validation(String),

    /// The backend rejected the operation
    #[error("{0}")]
    Gateway(String),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A round trip exceeded the configured timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Auth subsystem error
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Coarse error taxonomy surfaced to screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotAuthenticated,
    NotFound,
    Validation,
    Gateway,
}

impl Error {
    /// Collapse the error onto the four kinds a screen reacts to.
    ///
    /// `Config` counts as `Validation`: it is bad local input, caught before
    /// any request leaves the process.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthenticated => ErrorKind::NotAuthenticated,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) | Self::Config(_) => ErrorKind::Validation,
            Self::Gateway(_)
            | Self::Http(_)
            | Self::Timeout(_)
            | Self::Serialization(_)
            | Self::Auth(_) => ErrorKind::Gateway,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_maps_transport_failures_to_gateway() {
        assert_eq!(Error::Timeout(10).kind(), ErrorKind::Gateway);
        assert_eq!(
            Error::Gateway("insert rejected".to_string()).kind(),
            ErrorKind::Gateway
        );
        assert_eq!(Error::NotAuthenticated.kind(), ErrorKind::NotAuthenticated);
    }

    #[test]
    fn local_input_errors_are_validation_and_absence_is_not_found() {
        assert_eq!(
            Error::Config("SUPABASE_URL must use http or https".to_string()).kind(),
            ErrorKind::Validation
        );
        let missing = Error::NotFound("pet 0190".to_string());
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert_eq!(missing.to_string(), "Not found: pet 0190");
    }

    #[test]
    fn validation_message_is_displayed_verbatim() {
        let error = Error::Validation("Notes are required".to_string());
        assert_eq!(error.to_string(), "Notes are required");
    }
}
