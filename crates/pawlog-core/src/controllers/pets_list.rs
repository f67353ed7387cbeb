use std::mem;

use super::{LoadState, Notice};
use crate::error::Result;
use crate::models::{Pet, PetForm};
use crate::records::PetRecords;

/// State behind the "My Pets" screen.
pub struct PetsListController {
    records: PetRecords,
    state: LoadState<Vec<Pet>>,
    notices: Vec<Notice>,
}

impl PetsListController {
    pub const fn new(records: PetRecords) -> Self {
        Self {
            records,
            state: LoadState::Idle,
            notices: Vec::new(),
        }
    }

    pub const fn state(&self) -> &LoadState<Vec<Pet>> {
        &self.state
    }

    pub const fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// First load when the screen appears; later calls are no-ops.
    pub async fn activate(&mut self) {
        if matches!(self.state, LoadState::Idle) {
            self.refresh().await;
        }
    }

    /// Reload unconditionally.
    pub async fn refresh(&mut self) {
        self.state = LoadState::Loading;
        self.state = match self.records.list_pets().await {
            Ok(pets) if pets.is_empty() => LoadState::Empty,
            Ok(pets) => LoadState::Ready(pets),
            Err(error) => {
                tracing::warn!("Failed to load pets: {}", error);
                self.notices.push(Notice::error("Failed to load pets"));
                LoadState::Failed(error.to_string())
            }
        };
    }

    /// Create a pet for the signed-in user, then reload the list.
    pub async fn create_pet(&mut self, form: PetForm) -> Result<Pet> {
        let pet = self.records.create_pet_for_current_user(form).await?;
        self.refresh().await;
        Ok(pet)
    }

    /// Drain pending notices for display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        mem::take(&mut self.notices)
    }
}
