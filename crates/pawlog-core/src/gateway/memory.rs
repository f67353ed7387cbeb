//! In-process gateway with the backend's ownership and foreign-key rules.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{Order, Query, RemoteGateway};
use crate::auth::AuthUser;
use crate::error::{Error, Result};
use crate::models::LogKind;
use crate::util::canonical_timestamp;

const PETS_TABLE: &str = "pets";

#[derive(Default)]
struct MemoryState {
    user: Option<AuthUser>,
    tables: BTreeMap<String, Vec<Value>>,
    fail_next: Option<String>,
    last_created_at: Option<DateTime<Utc>>,
}

/// Pets are visible to their owner only; log rows are visible when their
/// parent pet is.
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
    round_trips: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run subsequent requests as `user_id`.
    pub fn sign_in_as(&self, user_id: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.user = Some(AuthUser {
                id: user_id.to_string(),
                email: None,
            });
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.user = None;
        }
    }

    /// Reject the next request with `message`.
    pub fn fail_next(&self, message: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_next = Some(message.to_string());
        }
    }

    /// Number of select/insert requests served so far.
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(AtomicOrdering::SeqCst)
    }

    /// Rows stored in `table`, regardless of visibility.
    pub fn row_count(&self, table: &str) -> usize {
        self.state
            .lock()
            .map(|state| state.tables.get(table).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn begin(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.round_trips.fetch_add(1, AtomicOrdering::SeqCst);
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::Gateway("memory gateway state poisoned".to_string()))?;
        if let Some(message) = state.fail_next.take() {
            return Err(Error::Gateway(message));
        }
        Ok(state)
    }
}

impl MemoryState {
    fn visible_pet_ids(&self) -> Vec<String> {
        let Some(user) = &self.user else {
            return Vec::new();
        };
        self.rows(PETS_TABLE)
            .iter()
            .filter(|row| text(row, "owner_id").as_deref() == Some(user.id.as_str()))
            .filter_map(|row| text(row, "id"))
            .collect()
    }

    fn rows(&self, table: &str) -> &[Value] {
        self.tables.get(table).map_or(&[][..], Vec::as_slice)
    }

    fn visible_rows(&self, table: &str) -> Result<Vec<Value>> {
        ensure_table(table)?;
        let visible = self.visible_pet_ids();
        let key = if table == PETS_TABLE { "id" } else { "pet_id" };
        Ok(self
            .rows(table)
            .iter()
            .filter(|row| text(row, key).is_some_and(|id| visible.contains(&id)))
            .cloned()
            .collect())
    }

    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_created_at {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_created_at = Some(next);
        next
    }
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        let state = self
            .state
            .lock()
            .map_err(|_| Error::Gateway("memory gateway state poisoned".to_string()))?;
        Ok(state.user.clone())
    }

    async fn select(&self, query: &Query) -> Result<Vec<Value>> {
        let state = self.begin()?;
        let mut rows: Vec<Value> = state
            .visible_rows(query.table_name())?
            .into_iter()
            .filter(|row| {
                query
                    .filters()
                    .iter()
                    .all(|(column, value)| text(row, column).as_deref() == Some(value.as_str()))
            })
            .collect();

        if let Some((column, order)) = query.ordering() {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(column), b.get(column));
                match order {
                    Order::Ascending => ordering,
                    Order::Descending => ordering.reverse(),
                }
            });
        }

        for relation in query.relations() {
            let children = state.visible_rows(relation)?;
            for row in &mut rows {
                let id = text(row, "id");
                let owned: Vec<Value> = children
                    .iter()
                    .filter(|child| id.is_some() && text(child, "pet_id") == id)
                    .cloned()
                    .collect();
                if let Value::Object(fields) = row {
                    fields.insert(relation.to_string(), Value::Array(owned));
                }
            }
        }
        Ok(rows)
    }

    async fn select_single(&self, query: &Query) -> Result<Option<Value>> {
        let mut rows = self.select(query).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            count => Err(Error::Gateway(format!(
                "JSON object requested, multiple ({count}) rows returned"
            ))),
        }
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        let mut state = self.begin()?;
        ensure_table(table)?;
        let Value::Object(mut fields) = row else {
            return Err(Error::Gateway("insert payload must be an object".to_string()));
        };
        let user = state.user.clone().ok_or_else(|| {
            Error::Gateway(format!(
                "new row violates row-level security policy for table \"{table}\""
            ))
        })?;

        if table == PETS_TABLE {
            if field_text(&fields, "owner_id").as_deref() != Some(user.id.as_str()) {
                return Err(Error::Gateway(format!(
                    "new row violates row-level security policy for table \"{table}\""
                )));
            }
            let created_at = state.next_created_at();
            fields
                .entry("created_at")
                .or_insert_with(|| Value::String(canonical_timestamp(&created_at)));
        } else {
            let pet_id = field_text(&fields, "pet_id").unwrap_or_default();
            let parent = state
                .rows(PETS_TABLE)
                .iter()
                .find(|pet| text(pet, "id").as_deref() == Some(pet_id.as_str()));
            match parent {
                None => {
                    return Err(Error::Gateway(format!(
                        "insert or update on table \"{table}\" violates foreign key constraint \"{table}_pet_id_fkey\""
                    )))
                }
                Some(pet) if text(pet, "owner_id").as_deref() != Some(user.id.as_str()) => {
                    return Err(Error::Gateway(format!(
                        "new row violates row-level security policy for table \"{table}\""
                    )))
                }
                Some(_) => {}
            }
        }

        fields
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::now_v7().to_string()));
        let stored = Value::Object(fields);
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }
}

fn ensure_table(table: &str) -> Result<()> {
    if table == PETS_TABLE || LogKind::ALL.iter().any(|kind| kind.table() == table) {
        Ok(())
    } else {
        Err(Error::Gateway(format!("relation \"{table}\" does not exist")))
    }
}

fn text(row: &Value, column: &str) -> Option<String> {
    row.as_object().and_then(|fields| field_text(fields, column))
}

fn field_text(fields: &Map<String, Value>, column: &str) -> Option<String> {
    match fields.get(column)? {
        Value::Null => None,
        Value::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}
