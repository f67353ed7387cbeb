//! Account sessions: who is signed in, where the session is kept, and the
//! GoTrue client that issues it.

mod client;
mod session;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::unix_timestamp_now;

pub use client::AuthClient;
pub use session::{SessionManager, SessionSource, SessionState};

/// Sessions this close to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The signed-in owner; `id` is what `owner_id` columns hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// Tokens for one signed-in owner. `expires_at` is unix seconds.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= unix_timestamp_now()
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Projects that require email confirmation answer sign-up without tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    ConfirmationRequired,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingCredential(&'static str),
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },
    #[error("Auth service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Auth response is missing {0}")]
    MalformedResponse(&'static str),
    #[error("Session data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Session storage failed: {0}")]
    SecureStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Where a session survives between runs.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

/// Process-local session persistence; forgets everything on exit.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<AuthSession>>>,
}

impl MemorySessionStore {
    pub fn with_session(session: AuthSession) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(session))),
        }
    }

    fn slot(&self) -> AuthResult<MutexGuard<'_, Option<AuthSession>>> {
        self.slot
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }
}

impl SessionPersistence for MemorySessionStore {
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        Ok(self.slot()?.clone())
    }

    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        *self.slot()? = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> AuthResult<()> {
        self.slot()?.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn session_expiring_in(secs: i64) -> AuthSession {
        AuthSession {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_at: unix_timestamp_now() + secs,
            user: AuthUser {
                id: "owner-a".to_string(),
                email: None,
            },
        }
    }

    #[test]
    fn sessions_inside_the_margin_count_as_expired() {
        assert!(session_expiring_in(30).is_expired());
        assert!(!session_expiring_in(600).is_expired());
    }

    #[test]
    fn memory_store_clears_only_on_request() {
        let store = MemorySessionStore::with_session(session_expiring_in(600));
        let copy = store.clone();
        assert_eq!(copy.load_session().unwrap().unwrap().user.id, "owner-a");

        store.clear_session().unwrap();
        assert!(copy.load_session().unwrap().is_none());
        store.clear_session().unwrap();
    }

    #[test]
    fn rejection_reads_as_message_and_status() {
        let error = AuthError::Rejected {
            status: 400,
            message: "Invalid login credentials".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid login credentials (HTTP 400)");
        assert_eq!(
            AuthError::MissingCredential("Password").to_string(),
            "Password is required"
        );
    }
}
