//! Live session state with change notification.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use super::{AuthClient, AuthResult, AuthSession, AuthUser, SessionPersistence, SignUpOutcome};

/// Session lifecycle gating which screens are reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    Authenticating,
    SignedIn(AuthSession),
}

impl SessionState {
    pub const fn session(&self) -> Option<&AuthSession> {
        match self {
            Self::SignedIn(session) => Some(session),
            Self::SignedOut | Self::Authenticating => None,
        }
    }
}

/// Anything that can hand out the current session right before a request.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn active_session(&self) -> Option<AuthSession>;
}

/// Owns the auth client and publishes every session transition.
#[derive(Clone)]
pub struct SessionManager<S: SessionPersistence> {
    client: AuthClient<S>,
    state: Arc<watch::Sender<SessionState>>,
}

impl<S: SessionPersistence> SessionManager<S> {
    pub fn new(client: AuthClient<S>) -> Self {
        let (state, _) = watch::channel(SessionState::SignedOut);
        Self {
            client,
            state: Arc::new(state),
        }
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_session(&self) -> Option<AuthSession> {
        self.state.borrow().session().cloned()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.current_session().map(|session| session.user)
    }

    /// Restore a persisted session, refreshing it once if expired.
    pub async fn initialize(&self) -> AuthResult<SessionState> {
        self.publish(SessionState::Authenticating);
        match self.client.restore_session().await {
            Ok(session) => Ok(self.publish(session.map_or(SessionState::SignedOut, SessionState::SignedIn))),
            Err(error) => {
                self.publish(SessionState::SignedOut);
                Err(error)
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        self.publish(SessionState::Authenticating);
        match self.client.sign_in(email, password).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user.id, "Signed in");
                self.publish(SessionState::SignedIn(session.clone()));
                Ok(session)
            }
            Err(error) => {
                self.publish(SessionState::SignedOut);
                Err(error)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        self.publish(SessionState::Authenticating);
        match self.client.sign_up(email, password).await {
            Ok(SignUpOutcome::SignedIn(session)) => {
                self.publish(SessionState::SignedIn(session.clone()));
                Ok(SignUpOutcome::SignedIn(session))
            }
            Ok(SignUpOutcome::ConfirmationRequired) => {
                self.publish(SessionState::SignedOut);
                Ok(SignUpOutcome::ConfirmationRequired)
            }
            Err(error) => {
                self.publish(SessionState::SignedOut);
                Err(error)
            }
        }
    }

    /// Revoke the session remotely and forget it locally. A failed revoke
    /// leaves the session in place.
    pub async fn sign_out(&self) -> AuthResult<()> {
        if let Some(session) = self.current_session() {
            self.client.sign_out(&session.access_token).await?;
        } else {
            self.client.store().clear_session()?;
        }
        self.publish(SessionState::SignedOut);
        Ok(())
    }

    fn publish(&self, state: SessionState) -> SessionState {
        self.state.send_replace(state.clone());
        state
    }
}

#[async_trait]
impl<S: SessionPersistence> SessionSource for SessionManager<S> {
    async fn active_session(&self) -> Option<AuthSession> {
        let session = self.current_session()?;
        if !session.is_expired() {
            return Some(session);
        }

        match self.client.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => {
                self.publish(SessionState::SignedIn(refreshed.clone()));
                Some(refreshed)
            }
            Err(error) => {
                tracing::warn!("Session refresh failed, signing out: {}", error);
                if let Err(error) = self.client.store().clear_session() {
                    tracing::warn!("Failed to clear stored session: {}", error);
                }
                self.publish(SessionState::SignedOut);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySessionStore;
    use crate::config::ClientConfig;
    use crate::util::unix_timestamp_now;

    fn session(expires_at: i64) -> AuthSession {
        AuthSession {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_at,
            user: AuthUser {
                id: "owner-a".to_string(),
                email: Some("a@example.com".to_string()),
            },
        }
    }

    fn manager(store: MemorySessionStore) -> SessionManager<MemorySessionStore> {
        // Port 9 (discard) refuses connections, so any network call fails fast.
        let config = ClientConfig::new("http://127.0.0.1:9", "anon")
            .unwrap()
            .with_timeout_secs(2);
        SessionManager::new(AuthClient::new(&config, store).unwrap())
    }

    #[tokio::test]
    async fn initialize_without_stored_session_is_signed_out() {
        let manager = manager(MemorySessionStore::default());
        let state = manager.initialize().await.unwrap();
        assert_eq!(state, SessionState::SignedOut);
        assert!(manager.current_user().is_none());
    }

    #[tokio::test]
    async fn initialize_restores_unexpired_session_and_notifies() {
        let stored = session(unix_timestamp_now() + 3600);
        let manager = manager(MemorySessionStore::with_session(stored.clone()));
        let mut changes = manager.subscribe();

        manager.initialize().await.unwrap();

        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), SessionState::SignedIn(stored));
        assert_eq!(manager.current_user().unwrap().id, "owner-a");
    }

    #[tokio::test]
    async fn expired_session_that_cannot_refresh_is_cleared() {
        let store = MemorySessionStore::with_session(session(0));
        let manager = manager(store.clone());

        let state = manager.initialize().await.unwrap();

        assert_eq!(state, SessionState::SignedOut);
        assert!(store.load_session().unwrap().is_none());
    }

    #[tokio::test]
    async fn sign_in_with_blank_credentials_returns_to_signed_out() {
        let manager = manager(MemorySessionStore::default());
        assert!(manager.sign_in(" ", "secret").await.is_err());
        assert_eq!(manager.state(), SessionState::SignedOut);
    }
}
