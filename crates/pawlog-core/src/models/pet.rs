//! Pet model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::logs::{BodyConditionLog, VetVisitLog, WeightLog};
use super::wire::{null_as_empty, timestamp};
use crate::error::{Error, Result};
use crate::util::normalize_text_option;

/// Backend-issued pet identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PetId(Uuid);

impl PetId {
    /// Create a fresh identifier using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for PetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PetId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// Age as entered; numeric when it parses as one, otherwise kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PetAge {
    Number(serde_json::Number),
    Text(String),
}

impl PetAge {
    /// Interpret raw form input.
    pub fn from_input(raw: &str) -> Self {
        let trimmed = raw.trim();
        serde_json::from_str::<serde_json::Number>(trimmed)
            .map_or_else(|_| Self::Text(trimmed.to_string()), Self::Number)
    }
}

impl fmt::Display for PetAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// A pet with its log collections.
///
/// Collections are only populated when fetched through a single-pet read;
/// list reads leave them empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    pub age: PetAge,
    pub owner_id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub weight_logs: Vec<WeightLog>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body_condition_logs: Vec<BodyConditionLog>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vet_visit_logs: Vec<VetVisitLog>,
}

impl Pet {
    /// List subtitle, e.g. `Dog • Beagle`
    pub fn description(&self) -> String {
        let breed = self
            .breed
            .as_deref()
            .filter(|breed| !breed.trim().is_empty())
            .unwrap_or("Unknown breed");
        format!("{} • {}", self.species, breed)
    }
}

/// Insert payload for a pet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPet {
    pub name: String,
    pub species: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    pub age: PetAge,
    pub owner_id: String,
}

/// Raw "add pet" form fields before the owner is known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetForm {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: String,
}

impl PetForm {
    /// Presence-check the form and attach the owner.
    pub fn into_draft(self, owner_id: impl Into<String>) -> Result<NewPet> {
        let name = required(self.name, "Name is required")?;
        let species = required(self.species, "Species is required")?;
        let age = required(self.age, "Age is required")?;
        Ok(NewPet {
            name,
            species,
            breed: normalize_text_option(Some(self.breed)),
            age: PetAge::from_input(&age),
            owner_id: owner_id.into(),
        })
    }
}

fn required(value: String, message: &str) -> Result<String> {
    normalize_text_option(Some(value)).ok_or_else(|| Error::Validation(message.to_string()))
}
