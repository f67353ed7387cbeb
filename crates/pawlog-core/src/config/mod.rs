//! Backend connection configuration shared by every client.
//!
//! A `ClientConfig` names the Supabase project (URL + anon key) and bounds
//! every round trip with a timeout. Reads may be retried a small number of
//! times; inserts never are.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_READ_RETRIES: u32 = 2;
const MAX_READ_RETRIES: u32 = 5;

/// Resolved configuration for talking to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_read_retries() -> u32 {
    DEFAULT_READ_RETRIES
}

impl ClientConfig {
    /// Validate and normalize raw values.
    pub fn new(url: impl AsRef<str>, anon_key: impl Into<String>) -> Result<Self> {
        let supabase_url = normalize_project_url(url.as_ref())?;
        let supabase_anon_key = normalize_text_option(Some(anon_key.into()))
            .ok_or_else(|| Error::Config("Supabase anon key must not be empty".to_string()))?;
        Ok(Self {
            supabase_url,
            supabase_anon_key,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            read_retries: DEFAULT_READ_RETRIES,
        })
    }

    /// Build from `SUPABASE_URL`, `SUPABASE_ANON_KEY`, `PAWLOG_TIMEOUT_SECS`
    /// and `PAWLOG_READ_RETRIES`. Returns `Ok(None)` when neither Supabase
    /// variable is set.
    pub fn from_env() -> Result<Option<Self>> {
        let url = normalize_text_option(std::env::var("SUPABASE_URL").ok());
        let anon_key = normalize_text_option(std::env::var("SUPABASE_ANON_KEY").ok());
        let (url, anon_key) = match (url, anon_key) {
            (None, None) => return Ok(None),
            (Some(url), Some(anon_key)) => (url, anon_key),
            _ => {
                return Err(Error::Config(
                    "SUPABASE_URL and SUPABASE_ANON_KEY must be set together".to_string(),
                ))
            }
        };

        let mut config = Self::new(url, anon_key)?;
        if let Some(raw) = normalize_text_option(std::env::var("PAWLOG_TIMEOUT_SECS").ok()) {
            config = config.with_timeout_secs(parse_number(&raw, "PAWLOG_TIMEOUT_SECS")?);
        }
        if let Some(raw) = normalize_text_option(std::env::var("PAWLOG_READ_RETRIES").ok()) {
            config = config.with_read_retries(parse_number(&raw, "PAWLOG_READ_RETRIES")?);
        }
        Ok(Some(config))
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs.max(1);
        self
    }

    #[must_use]
    pub fn with_read_retries(mut self, read_retries: u32) -> Self {
        self.read_retries = read_retries.min(MAX_READ_RETRIES);
        self
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// GoTrue base, e.g. `https://project.supabase.co/auth/v1`
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.supabase_url)
    }

    /// PostgREST base, e.g. `https://project.supabase.co/rest/v1`
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.supabase_url)
    }
}

/// Strip trailing slashes and any `/auth/v1` or `/rest/v1` suffix.
pub fn normalize_project_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config("Supabase URL must not be empty".to_string()));
    }
    if !is_http_url(trimmed) {
        return Err(Error::Config(
            "Supabase URL must include http:// or https://".to_string(),
        ));
    }
    let base = trimmed
        .strip_suffix("/auth/v1")
        .or_else(|| trimmed.strip_suffix("/rest/v1"))
        .unwrap_or(trimmed);
    Ok(base.to_string())
}

fn parse_number<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::Config(format!("{name} must be a non-negative integer")))
}
