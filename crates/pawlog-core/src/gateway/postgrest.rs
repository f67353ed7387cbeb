//! Supabase PostgREST implementation of the gateway.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::{Order, Query, RemoteGateway};
use crate::auth::{AuthSession, AuthUser, SessionSource};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::util::compact_text;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const NO_ROWS_CODE: &str = "PGRST116";
const RETRY_BASE_DELAY_MS: u64 = 200;

/// Gateway that runs every request as the live session's user.
#[derive(Clone)]
pub struct PostgrestGateway {
    rest_url: String,
    anon_key: String,
    timeout_secs: u64,
    read_retries: u32,
    client: Client,
    session: Arc<dyn SessionSource>,
}

impl PostgrestGateway {
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionSource>) -> Result<Self> {
        Ok(Self {
            rest_url: config.rest_url(),
            anon_key: config.supabase_anon_key.clone(),
            timeout_secs: config.timeout_secs,
            read_retries: config.read_retries,
            client: Client::builder().timeout(config.timeout()).build()?,
            session,
        })
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let session: AuthSession = self
            .session
            .active_session()
            .await
            .ok_or(Error::NotAuthenticated)?;
        Ok(request
            .header("apikey", &self.anon_key)
            .bearer_auth(session.access_token))
    }

    fn read_request(&self, query: &Query, accept: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/{}", self.rest_url, query.table_name()))
            .query(&query_pairs(query))
            .header(ACCEPT, accept)
    }

    /// Send with bounded retries on connect failures, timeouts, and 5xx.
    async fn execute(&self, request: RequestBuilder, retries: u32) -> Result<Response> {
        let mut attempt = 0;
        loop {
            let Some(current) = request.try_clone() else {
                return request.send().await.map_err(|error| self.transport_error(error));
            };
            match current.send().await {
                Ok(response) if response.status().is_server_error() && attempt < retries => {
                    tracing::warn!(
                        status = response.status().as_u16(),
                        attempt,
                        "Backend returned server error, retrying"
                    );
                }
                Ok(response) => return Ok(response),
                Err(error) if attempt < retries && (error.is_timeout() || error.is_connect()) => {
                    tracing::warn!(attempt, "Request failed ({}), retrying", error);
                }
                Err(error) => return Err(self.transport_error(error)),
            }
            attempt += 1;
            tokio::time::sleep(retry_delay(attempt)).await;
        }
    }

    /// The client timeout also covers the body, so reads map the same way.
    async fn read_body(&self, response: Response) -> Result<String> {
        response
            .text()
            .await
            .map_err(|error| self.transport_error(error))
    }

    fn transport_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Timeout(self.timeout_secs)
        } else {
            Error::Http(error)
        }
    }
}

#[async_trait]
impl RemoteGateway for PostgrestGateway {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        Ok(self.session.active_session().await.map(|session| session.user))
    }

    async fn select(&self, query: &Query) -> Result<Vec<Value>> {
        tracing::debug!(table = query.table_name(), "select");
        let request = self
            .authorized(self.read_request(query, "application/json"))
            .await?;
        let response = self.execute(request, self.read_retries).await?;
        let status = response.status();
        let body = self.read_body(response).await?;
        if !status.is_success() {
            return Err(error_for_status(status, &body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn select_single(&self, query: &Query) -> Result<Option<Value>> {
        tracing::debug!(table = query.table_name(), "select single");
        let request = self.authorized(self.read_request(query, SINGLE_OBJECT)).await?;
        let response = self.execute(request, self.read_retries).await?;
        let status = response.status();
        let body = self.read_body(response).await?;
        if status == StatusCode::NOT_ACCEPTABLE && is_no_rows(&body) {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(error_for_status(status, &body));
        }
        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        tracing::debug!(table, "insert");
        let request = self
            .authorized(
                self.client
                    .post(format!("{}/{}", self.rest_url, table))
                    .header(CONTENT_TYPE, "application/json")
                    .header(ACCEPT, "application/json")
                    .header("Prefer", "return=representation")
                    .json(&vec![row]),
            )
            .await?;
        let response = self.execute(request, 0).await?;
        let status = response.status();
        let body = self.read_body(response).await?;
        if !status.is_success() {
            return Err(error_for_status(status, &body));
        }
        let mut rows: Vec<Value> = serde_json::from_str(&body)?;
        if rows.is_empty() {
            return Err(Error::Gateway(format!("Insert into {table} returned no rows")));
        }
        Ok(rows.swap_remove(0))
    }
}

/// Query-string pairs for a select, e.g. `select=*`, `owner_id=eq.x`,
/// `order=created_at.desc`.
pub(crate) fn query_pairs(query: &Query) -> Vec<(String, String)> {
    let columns: String = query.columns().split_whitespace().collect();
    let mut pairs = vec![("select".to_string(), columns)];
    for (column, value) in query.filters() {
        pairs.push((column.clone(), format!("eq.{value}")));
    }
    if let Some((column, order)) = query.ordering() {
        let direction = match order {
            Order::Ascending => "asc",
            Order::Descending => "desc",
        };
        pairs.push(("order".to_string(), format!("{column}.{direction}")));
    }
    pairs
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorResponse {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

fn is_no_rows(body: &str) -> bool {
    serde_json::from_str::<PostgrestErrorResponse>(body)
        .ok()
        .and_then(|payload| payload.code)
        .is_some_and(|code| code == NO_ROWS_CODE)
}

pub(crate) fn error_for_status(status: StatusCode, body: &str) -> Error {
    if status == StatusCode::UNAUTHORIZED {
        return Error::NotAuthenticated;
    }
    if let Ok(payload) = serde_json::from_str::<PostgrestErrorResponse>(body) {
        if let Some(message) = payload.message {
            let message = match payload.details {
                Some(details) if !details.trim().is_empty() => {
                    format!("{} ({})", message.trim(), compact_text(&details))
                }
                _ => message.trim().to_string(),
            };
            return Error::Gateway(message);
        }
    }
    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        Error::Gateway(format!("HTTP {}", status.as_u16()))
    } else {
        Error::Gateway(format!("{} ({})", trimmed, status.as_u16()))
    }
}

fn retry_delay(attempt: u32) -> Duration {
    Duration::from_millis(RETRY_BASE_DELAY_MS.saturating_mul(1 << attempt.min(5)))
}
