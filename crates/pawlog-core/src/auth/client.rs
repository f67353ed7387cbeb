//! GoTrue (`/auth/v1`) client.

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{AuthError, AuthResult, AuthSession, AuthUser, SessionPersistence, SignUpOutcome};
use crate::config::ClientConfig;
use crate::util::{compact_text, unix_timestamp_now};

/// Issues, refreshes, and revokes sessions, keeping `store` in step.
#[derive(Clone)]
pub struct AuthClient<S: SessionPersistence> {
    auth_url: String,
    anon_key: String,
    http: Client,
    store: S,
}

/// Body of a `POST /token` call; the variant picks `grant_type`.
#[derive(Serialize)]
#[serde(untagged)]
enum Grant<'a> {
    Password { email: &'a str, password: &'a str },
    RefreshToken { refresh_token: &'a str },
}

impl Grant<'_> {
    const fn grant_type(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }
}

impl<S: SessionPersistence> AuthClient<S> {
    pub fn new(config: &ClientConfig, store: S) -> AuthResult<Self> {
        Ok(Self {
            auth_url: config.auth_url(),
            anon_key: config.supabase_anon_key.clone(),
            http: Client::builder().timeout(config.timeout()).build()?,
            store,
        })
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Stored session, refreshed once if it has expired. A refresh the
    /// backend refuses drops the stored session.
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(stored) = self.store.load_session()? else {
            return Ok(None);
        };
        if !stored.is_expired() {
            return Ok(Some(stored));
        }
        match self.refresh_session(&stored.refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                tracing::warn!(user_id = %stored.user.id, "Dropping stored session: {}", error);
                self.store.clear_session()?;
                Ok(None)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        let email = required(email, "Email")?.trim();
        let password = required(password, "Password")?;
        let response = self
            .http
            .post(format!("{}/signup", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        match accepted(response).await?.into_session()? {
            Some(session) => {
                self.store.save_session(&session)?;
                Ok(SignUpOutcome::SignedIn(session))
            }
            None => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let email = required(email, "Email")?.trim();
        let password = required(password, "Password")?;
        self.token_grant(Grant::Password { email, password }).await
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        let refresh_token = required(refresh_token, "Refresh token")?.trim();
        self.token_grant(Grant::RefreshToken { refresh_token }).await
    }

    /// Revoke `access_token` and forget the stored session. An already
    /// invalid token (401) still counts as signed out.
    pub async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .http
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            accepted(response).await?;
        }
        self.store.clear_session()
    }

    async fn token_grant(&self, grant: Grant<'_>) -> AuthResult<AuthSession> {
        tracing::debug!(grant_type = grant.grant_type(), "Requesting session");
        let response = self
            .http
            .post(format!("{}/token", self.auth_url))
            .query(&[("grant_type", grant.grant_type())])
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&grant)
            .send()
            .await?;
        let session = accepted(response)
            .await?
            .into_session()?
            .ok_or(AuthError::MalformedResponse("access_token"))?;
        self.store.save_session(&session)?;
        Ok(session)
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> AuthResult<&'a str> {
    if value.trim().is_empty() {
        Err(AuthError::MissingCredential(field))
    } else {
        Ok(value)
    }
}

/// Token payload; sign-up answers with the bare user when confirmation
/// is still pending, so every field is optional.
#[derive(Debug, Default, Deserialize)]
struct TokenPayload {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<UserPayload>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    email: Option<String>,
}

impl TokenPayload {
    fn into_session(self) -> AuthResult<Option<AuthSession>> {
        let Some(access_token) = self.access_token else {
            return Ok(None);
        };
        let expires_at = self
            .expires_at
            .or_else(|| {
                self.expires_in
                    .map(|secs| unix_timestamp_now().saturating_add(secs))
            })
            .ok_or(AuthError::MalformedResponse("expires_at"))?;
        let user = self.user.ok_or(AuthError::MalformedResponse("user"))?;
        Ok(Some(AuthSession {
            access_token,
            refresh_token: self
                .refresh_token
                .ok_or(AuthError::MalformedResponse("refresh_token"))?,
            expires_at,
            user: AuthUser {
                id: user.id,
                email: user.email,
            },
        }))
    }
}

/// GoTrue reports failures under several keys depending on the endpoint.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

async fn accepted(response: Response) -> AuthResult<TokenPayload> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(rejection(status, &body));
    }
    if body.trim().is_empty() {
        return Ok(TokenPayload::default());
    }
    Ok(serde_json::from_str(&body)?)
}

fn rejection(status: StatusCode, body: &str) -> AuthError {
    let message = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|payload| {
            payload
                .msg
                .or(payload.message)
                .or(payload.error_description)
                .or(payload.error)
        })
        .map_or_else(|| compact_text(body), |message| compact_text(&message));
    AuthError::Rejected {
        status: status.as_u16(),
        message: if message.is_empty() {
            "Request rejected".to_string()
        } else {
            message
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::auth::MemorySessionStore;

    #[test]
    fn grants_carry_their_own_fields() {
        let password = Grant::Password {
            email: "owner@example.com",
            password: "hunter2",
        };
        let refresh = Grant::RefreshToken {
            refresh_token: "rt-1",
        };
        assert_eq!(password.grant_type(), "password");
        assert_eq!(
            serde_json::to_value(&password).unwrap(),
            json!({"email": "owner@example.com", "password": "hunter2"})
        );
        assert_eq!(refresh.grant_type(), "refresh_token");
        assert_eq!(
            serde_json::to_value(&refresh).unwrap(),
            json!({"refresh_token": "rt-1"})
        );
    }

    #[test]
    fn expires_in_is_anchored_to_now() {
        let payload: TokenPayload = serde_json::from_value(json!({
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "user": {"id": "owner-a", "email": "a@example.com"}
        }))
        .unwrap();
        let session = payload.into_session().unwrap().unwrap();
        assert!(session.expires_at >= unix_timestamp_now() + 3590);
        assert!(!session.is_expired());
    }

    #[test]
    fn bare_user_means_no_session_yet() {
        let payload: TokenPayload = serde_json::from_value(json!({
            "id": "owner-a",
            "email": "a@example.com",
            "confirmation_sent_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(payload.into_session().unwrap().is_none());
    }

    #[test]
    fn token_without_refresh_token_is_malformed() {
        let payload: TokenPayload = serde_json::from_value(json!({
            "access_token": "at",
            "expires_at": 1,
            "user": {"id": "owner-a"}
        }))
        .unwrap();
        assert!(matches!(
            payload.into_session(),
            Err(AuthError::MalformedResponse("refresh_token"))
        ));
    }

    #[test]
    fn rejection_picks_the_first_message_field() {
        let error = rejection(
            StatusCode::BAD_REQUEST,
            r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#,
        );
        assert_eq!(error.to_string(), "Invalid login credentials (HTTP 400)");

        let error = rejection(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Refresh Token Not Found"}"#,
        );
        assert_eq!(error.to_string(), "Refresh Token Not Found (HTTP 400)");

        assert_eq!(
            rejection(StatusCode::BAD_GATEWAY, "  ").to_string(),
            "Request rejected (HTTP 502)"
        );
    }

    #[tokio::test]
    async fn blank_credentials_fail_without_a_request() {
        // Nothing listens on the discard port; any request would error differently.
        let config = ClientConfig::new("http://127.0.0.1:9", "anon").unwrap();
        let client = AuthClient::new(&config, MemorySessionStore::default()).unwrap();

        assert!(matches!(
            client.sign_in("  ", "pw").await,
            Err(AuthError::MissingCredential("Email"))
        ));
        assert!(matches!(
            client.sign_up("owner@example.com", "").await,
            Err(AuthError::MissingCredential("Password"))
        ));
        assert!(matches!(
            client.refresh_session("").await,
            Err(AuthError::MissingCredential("Refresh token"))
        ));
    }
}
