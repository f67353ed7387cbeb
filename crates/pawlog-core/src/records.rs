//! Record access layer: typed pet and log operations over the gateway.
//!
//! Each operation is one logical round trip. Every failure comes back as an
//! [`Error`]; nothing here logs-and-swallows except the deliberate collapse
//! of "missing" and "not visible" into `Ok(None)` in [`PetRecords::get_pet`].

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::AuthUser;
use crate::error::{Error, Result};
use crate::gateway::{Order, Query, RemoteGateway};
use crate::models::{
    BodyCondition, LogEntry, LogKind, LogPayload, NewPet, Pet, PetForm, PetId,
};

const PETS_TABLE: &str = "pets";
const PET_WITH_LOGS: &str = "*, body_condition_logs(*), vet_visit_logs(*), weight_logs(*)";

/// Pet and log operations for the signed-in principal.
#[derive(Clone)]
pub struct PetRecords {
    gateway: Arc<dyn RemoteGateway>,
}

impl PetRecords {
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self { gateway }
    }

    /// Resolve the principal from the live session, failing fast when absent.
    pub async fn require_user(&self) -> Result<AuthUser> {
        self.gateway
            .current_user()
            .await?
            .ok_or(Error::NotAuthenticated)
    }

    /// All pets owned by the current principal, newest first.
    pub async fn list_pets(&self) -> Result<Vec<Pet>> {
        let user = self.require_user().await?;
        let query = Query::table(PETS_TABLE)
            .eq("owner_id", &user.id)
            .order("created_at", Order::Descending);
        let rows = self.gateway.select(&query).await?;
        tracing::debug!(count = rows.len(), "Loaded pets");
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Error::from))
            .collect()
    }

    /// One pet with every log collection expanded.
    ///
    /// `Ok(None)` covers both an unknown id and a pet owned by someone else;
    /// the backend does not let us tell them apart.
    pub async fn get_pet(&self, id: PetId) -> Result<Option<Pet>> {
        let query = Query::table(PETS_TABLE).select(PET_WITH_LOGS).eq("id", id);
        match self.gateway.select_single(&query).await? {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => {
                tracing::debug!(pet_id = %id, "Pet not found or not visible");
                Ok(None)
            }
        }
    }

    /// Insert a pet exactly as drafted.
    pub async fn create_pet(&self, draft: &NewPet) -> Result<Pet> {
        let row = serde_json::to_value(draft)?;
        let stored = self.gateway.insert(PETS_TABLE, row).await?;
        let pet: Pet = serde_json::from_value(stored)?;
        tracing::info!(pet_id = %pet.id, "Created pet");
        Ok(pet)
    }

    /// Insert a pet owned by whoever is signed in right now.
    pub async fn create_pet_for_current_user(&self, form: PetForm) -> Result<Pet> {
        let user = self.require_user().await?;
        let draft = form.into_draft(user.id)?;
        self.create_pet(&draft).await
    }

    pub async fn append_weight_log(
        &self,
        pet_id: PetId,
        weight: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<LogEntry> {
        self.append_log(pet_id, &LogPayload::Weight(weight.to_string()), observed_at)
            .await
    }

    pub async fn append_body_condition_log(
        &self,
        pet_id: PetId,
        condition: BodyCondition,
        observed_at: DateTime<Utc>,
    ) -> Result<LogEntry> {
        self.append_log(pet_id, &LogPayload::BodyCondition(condition), observed_at)
            .await
    }

    pub async fn append_vet_visit_log(
        &self,
        pet_id: PetId,
        notes: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<LogEntry> {
        self.append_log(pet_id, &LogPayload::VetVisit(notes.to_string()), observed_at)
            .await
    }

    /// Insert one child row for `pet_id`; rejected inserts surface as errors.
    pub async fn append_log(
        &self,
        pet_id: PetId,
        payload: &LogPayload,
        observed_at: DateTime<Utc>,
    ) -> Result<LogEntry> {
        let kind: LogKind = payload.kind();
        let row = payload.to_row(pet_id, &observed_at);
        match self.gateway.insert(kind.table(), row).await {
            Ok(stored) => {
                tracing::info!(pet_id = %pet_id, kind = kind.label(), "Appended log entry");
                LogEntry::from_row(kind, stored)
            }
            Err(error) => {
                tracing::warn!(pet_id = %pet_id, kind = kind.label(), "Log insert rejected: {}", error);
                Err(error)
            }
        }
    }
}
