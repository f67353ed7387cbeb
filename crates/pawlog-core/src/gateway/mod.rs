//! Row-oriented access to the hosted backend.
//!
//! The record layer talks to the backend only through [`RemoteGateway`]:
//! equality-filtered, ordered selects with nested relation expansion, a
//! single-row fetch, and insert-with-return. [`PostgrestGateway`] speaks to a
//! Supabase project; [`MemoryGateway`] is an in-process stand-in with the same
//! owner-scoped visibility rules.

mod memory;
mod postgrest;

use async_trait::async_trait;
use serde_json::Value;

use crate::auth::AuthUser;
use crate::error::Result;

pub use memory::MemoryGateway;
pub use postgrest::PostgrestGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// A select against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    columns: String,
    filters: Vec<(String, String)>,
    order: Option<(String, Order)>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
        }
    }

    /// Column list in PostgREST syntax; `rel(*)` expands a child relation.
    #[must_use]
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((column.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn order(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order = Some((column.into(), order));
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &str {
        &self.columns
    }

    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    pub fn ordering(&self) -> Option<(&str, Order)> {
        self.order
            .as_ref()
            .map(|(column, order)| (column.as_str(), *order))
    }

    /// Names of expanded relations, e.g. `["weight_logs"]` for
    /// `*, weight_logs(*)`.
    pub fn relations(&self) -> Vec<&str> {
        self.columns
            .split(',')
            .filter_map(|part| {
                let (name, _) = part.split_once('(')?;
                Some(name.trim())
            })
            .filter(|name| !name.is_empty())
            .collect()
    }
}

#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// The principal the next request will run as, if any.
    async fn current_user(&self) -> Result<Option<AuthUser>>;

    /// All visible rows matching the query.
    async fn select(&self, query: &Query) -> Result<Vec<Value>>;

    /// Exactly one visible row, or `None` when nothing matches.
    async fn select_single(&self, query: &Query) -> Result<Option<Value>>;

    /// Insert one row and return it as stored.
    async fn insert(&self, table: &str, row: Value) -> Result<Value>;
}
