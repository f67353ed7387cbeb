use std::mem;

use chrono::{DateTime, Utc};

use super::{LoadState, Notice};
use crate::models::{LogKind, Pet, PetId};
use crate::records::PetRecords;
use crate::workflows::{LogEntryForm, SubmitOutcome};

/// State behind one pet's profile with its weight/body/vet tabs.
pub struct SinglePetController {
    records: PetRecords,
    pet_id: PetId,
    state: LoadState<Pet>,
    active_tab: LogKind,
    notices: Vec<Notice>,
}

impl SinglePetController {
    pub const fn new(records: PetRecords, pet_id: PetId) -> Self {
        Self {
            records,
            pet_id,
            state: LoadState::Idle,
            active_tab: LogKind::Weight,
            notices: Vec::new(),
        }
    }

    pub const fn pet_id(&self) -> PetId {
        self.pet_id
    }

    pub const fn state(&self) -> &LoadState<Pet> {
        &self.state
    }

    pub const fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub const fn active_tab(&self) -> LogKind {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: LogKind) {
        self.active_tab = tab;
    }

    pub async fn activate(&mut self) {
        if matches!(self.state, LoadState::Idle) {
            self.refresh().await;
        }
    }

    /// Reload the pet with its logs. A missing pet settles as `Empty`.
    pub async fn refresh(&mut self) {
        self.state = LoadState::Loading;
        self.state = match self.records.get_pet(self.pet_id).await {
            Ok(Some(pet)) => LoadState::Ready(pet),
            Ok(None) => LoadState::Empty,
            Err(error) => {
                tracing::warn!(pet_id = %self.pet_id, "Failed to load pet: {}", error);
                self.notices.push(Notice::error("Failed to load pet"));
                LoadState::Failed(error.to_string())
            }
        };
    }

    /// Submit a log form for this pet; reload only after a successful append.
    ///
    /// Either way a notice is queued: "Saved <kind> log" on success, the
    /// form's failure message otherwise.
    pub async fn submit_log(
        &mut self,
        form: &mut LogEntryForm,
        observed_at: DateTime<Utc>,
    ) -> SubmitOutcome {
        let outcome = form.submit(&self.records, self.pet_id, observed_at).await;
        match &outcome {
            SubmitOutcome::Saved(entry) => {
                self.notices
                    .push(Notice::info(format!("Saved {} log", entry.kind().label())));
                self.refresh().await;
            }
            SubmitOutcome::Failed(notice) => self.notices.push(notice.clone()),
        }
        outcome
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        mem::take(&mut self.notices)
    }
}
