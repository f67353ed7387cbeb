//! Log entry models: weight, body condition, and vet visit observations.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::body_condition::{BodyCondition, RecordedCondition};
use super::pet::PetId;
use super::wire::{text_or_number, timestamp};
use crate::error::Result;
use crate::util::canonical_timestamp;

/// Backend-issued log row identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogId(Uuid);

impl LogId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for LogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightLog {
    pub id: LogId,
    pub pet_id: PetId,
    /// Raw text as entered; never parsed
    #[serde(deserialize_with = "text_or_number")]
    pub weight: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyConditionLog {
    pub id: LogId,
    pub pet_id: PetId,
    pub body_condition: RecordedCondition,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VetVisitLog {
    pub id: LogId,
    pub pet_id: PetId,
    pub notes: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
}

/// Which log collection an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Weight,
    BodyCondition,
    VetVisit,
}

impl LogKind {
    pub const ALL: [Self; 3] = [Self::Weight, Self::BodyCondition, Self::VetVisit];

    /// Backend table holding this kind of entry
    pub const fn table(self) -> &'static str {
        match self {
            Self::Weight => "weight_logs",
            Self::BodyCondition => "body_condition_logs",
            Self::VetVisit => "vet_visit_logs",
        }
    }

    /// Human label used in prompts and notices
    pub const fn label(self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::BodyCondition => "body condition",
            Self::VetVisit => "vet visit",
        }
    }
}

/// Variant-specific payload of a new log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogPayload {
    Weight(String),
    BodyCondition(BodyCondition),
    VetVisit(String),
}

impl LogPayload {
    pub const fn kind(&self) -> LogKind {
        match self {
            Self::Weight(_) => LogKind::Weight,
            Self::BodyCondition(_) => LogKind::BodyCondition,
            Self::VetVisit(_) => LogKind::VetVisit,
        }
    }

    /// Insert row for this payload against `pet_id`.
    pub fn to_row(&self, pet_id: PetId, observed_at: &DateTime<Utc>) -> Value {
        let mut row = json!({
            "pet_id": pet_id,
            "date": canonical_timestamp(observed_at),
        });
        let (field, value) = match self {
            Self::Weight(weight) => ("weight", json!(weight)),
            Self::BodyCondition(condition) => ("body_condition", json!(condition)),
            Self::VetVisit(notes) => ("notes", json!(notes)),
        };
        row[field] = value;
        row
    }
}

/// A stored entry of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Weight(WeightLog),
    BodyCondition(BodyConditionLog),
    VetVisit(VetVisitLog),
}

impl LogEntry {
    /// Decode a returned row of the given kind.
    pub fn from_row(kind: LogKind, row: Value) -> Result<Self> {
        Ok(match kind {
            LogKind::Weight => Self::Weight(serde_json::from_value(row)?),
            LogKind::BodyCondition => Self::BodyCondition(serde_json::from_value(row)?),
            LogKind::VetVisit => Self::VetVisit(serde_json::from_value(row)?),
        })
    }

    pub const fn kind(&self) -> LogKind {
        match self {
            Self::Weight(_) => LogKind::Weight,
            Self::BodyCondition(_) => LogKind::BodyCondition,
            Self::VetVisit(_) => LogKind::VetVisit,
        }
    }

    pub const fn pet_id(&self) -> PetId {
        match self {
            Self::Weight(log) => log.pet_id,
            Self::BodyCondition(log) => log.pet_id,
            Self::VetVisit(log) => log.pet_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn weight_row_keeps_raw_text_and_canonical_date() {
        let pet_id = PetId::new();
        let observed_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let row = LogPayload::Weight("4.2".to_string()).to_row(pet_id, &observed_at);
        assert_eq!(row["weight"], "4.2");
        assert_eq!(row["date"], "2024-01-01T00:00:00.000Z");
        assert_eq!(row["pet_id"], pet_id.to_string());
    }

    #[test]
    fn body_condition_row_uses_label() {
        let observed_at = Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap();
        let row = LogPayload::BodyCondition(BodyCondition::Ideal).to_row(PetId::new(), &observed_at);
        assert_eq!(row["body_condition"], "Ideal");
    }

    #[test]
    fn numeric_weight_is_read_back_as_text() {
        let row = json!({
            "id": LogId::new(),
            "pet_id": PetId::new(),
            "weight": 4.2,
            "date": "2024-01-01T00:00:00+00:00",
        });
        let LogEntry::Weight(log) = LogEntry::from_row(LogKind::Weight, row).unwrap() else {
            panic!("expected weight entry");
        };
        assert_eq!(log.weight, "4.2");
    }

    #[test]
    fn from_row_rejects_mismatched_payload() {
        let row = json!({
            "id": LogId::new(),
            "pet_id": PetId::new(),
            "notes": "checkup",
            "date": "2024-01-01",
        });
        assert!(LogEntry::from_row(LogKind::Weight, row).is_err());
    }
}
