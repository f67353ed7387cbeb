//! Log entry forms: collect one observation, validate presence, append it.
//!
//! The same form drives all three log kinds. Any failed submit closes the
//! form and drops the draft; the user reopens it to try again.

use chrono::{DateTime, Utc};

use crate::controllers::Notice;
use crate::error::{Error, Result};
use crate::models::{BodyCondition, LogEntry, LogKind, LogPayload, PetId};
use crate::records::PetRecords;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Closed,
    Collecting,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Stored; the owning screen should refresh.
    Saved(LogEntry),
    /// Nothing stored; show the notice.
    Failed(Notice),
}

#[derive(Debug, Clone)]
pub struct LogEntryForm {
    kind: LogKind,
    state: FormState,
    text: String,
    condition: Option<BodyCondition>,
}

impl LogEntryForm {
    pub const fn new(kind: LogKind) -> Self {
        Self {
            kind,
            state: FormState::Closed,
            text: String::new(),
            condition: None,
        }
    }

    pub const fn weight() -> Self {
        Self::new(LogKind::Weight)
    }

    pub const fn body_condition() -> Self {
        Self::new(LogKind::BodyCondition)
    }

    pub const fn vet_visit() -> Self {
        Self::new(LogKind::VetVisit)
    }

    pub const fn kind(&self) -> LogKind {
        self.kind
    }

    pub const fn state(&self) -> FormState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != FormState::Closed
    }

    pub fn open(&mut self) {
        self.state = FormState::Collecting;
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    /// Weight or notes text; ignored for body condition.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn select_condition(&mut self, condition: Option<BodyCondition>) {
        self.condition = condition;
    }

    /// Whether the save action should be enabled.
    pub fn can_submit(&self) -> bool {
        self.payload().is_ok()
    }

    /// Validated payload for the current input.
    pub fn payload(&self) -> Result<LogPayload> {
        match self.kind {
            LogKind::Weight => required_text(&self.text, "Weight is required").map(LogPayload::Weight),
            LogKind::VetVisit => required_text(&self.text, "Notes are required").map(LogPayload::VetVisit),
            LogKind::BodyCondition => self
                .condition
                .map(LogPayload::BodyCondition)
                .ok_or_else(|| Error::Validation("Body condition is required".to_string())),
        }
    }

    /// Validate, append, and close the form whatever the result.
    pub async fn submit(
        &mut self,
        records: &PetRecords,
        pet_id: PetId,
        observed_at: DateTime<Utc>,
    ) -> SubmitOutcome {
        self.state = FormState::Submitting;
        let result = match self.payload() {
            Ok(payload) => records.append_log(pet_id, &payload, observed_at).await,
            Err(error) => Err(error),
        };
        self.close();

        match result {
            Ok(entry) => SubmitOutcome::Saved(entry),
            Err(error) => {
                let message = error.to_string();
                let message = if message.trim().is_empty() {
                    fallback_message(self.kind).to_string()
                } else {
                    message
                };
                SubmitOutcome::Failed(Notice::error(message))
            }
        }
    }

    fn close(&mut self) {
        self.state = FormState::Closed;
        self.text.clear();
        self.condition = None;
    }
}

fn required_text(text: &str, message: &str) -> Result<String> {
    if text.trim().is_empty() {
        Err(Error::Validation(message.to_string()))
    } else {
        Ok(text.to_string())
    }
}

const fn fallback_message(kind: LogKind) -> &'static str {
    match kind {
        LogKind::Weight => "Failed to add weight",
        LogKind::BodyCondition => "Failed to add body condition log",
        LogKind::VetVisit => "Failed to add vet visit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_is_disabled_until_input_present() {
        let mut weight = LogEntryForm::weight();
        weight.open();
        assert!(!weight.can_submit());
        weight.set_text("4.2");
        assert!(weight.can_submit());

        let mut body = LogEntryForm::body_condition();
        body.set_text("ignored");
        assert!(!body.can_submit());
        body.select_condition(Some(BodyCondition::Ideal));
        assert_eq!(
            body.payload().unwrap(),
            LogPayload::BodyCondition(BodyCondition::Ideal)
        );
    }

    #[test]
    fn whitespace_notes_are_rejected() {
        let mut vet = LogEntryForm::vet_visit();
        vet.set_text("   ");
        let error = vet.payload().unwrap_err();
        assert_eq!(error.to_string(), "Notes are required");
    }

    #[test]
    fn weight_text_is_kept_unvalidated() {
        let mut weight = LogEntryForm::weight();
        weight.set_text("about 4 kg");
        assert_eq!(
            weight.payload().unwrap(),
            LogPayload::Weight("about 4 kg".to_string())
        );
    }

    #[test]
    fn cancel_closes_and_clears() {
        let mut vet = LogEntryForm::vet_visit();
        vet.open();
        vet.set_text("checkup");
        vet.cancel();
        assert_eq!(vet.state(), FormState::Closed);
        assert!(!vet.can_submit());
    }
}
