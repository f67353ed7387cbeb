use pawlog_core::controllers::{LoadState, SinglePetController};
use pawlog_core::models::{BodyCondition, LogKind};
use pawlog_core::workflows::{LogEntryForm, SubmitOutcome};

use crate::cli::LogCommands;
use crate::commands::common::{
    connect, format_log_lines, parse_observed_at, parse_pet_id, print_notices,
};
use crate::error::CliError;

pub async fn run_log(command: LogCommands, profile: Option<&str>) -> Result<(), CliError> {
    match command {
        LogCommands::Weight { pet, weight, date } => {
            let mut form = LogEntryForm::weight();
            form.open();
            form.set_text(weight);
            submit(&pet, form, date.as_deref(), profile).await
        }
        LogCommands::Body {
            pet,
            condition,
            date,
        } => {
            let mut form = LogEntryForm::body_condition();
            form.open();
            form.select_condition(parse_condition(condition.as_deref())?);
            submit(&pet, form, date.as_deref(), profile).await
        }
        LogCommands::Vet { pet, notes, date } => {
            let mut form = LogEntryForm::vet_visit();
            form.open();
            form.set_text(notes.join(" "));
            submit(&pet, form, date.as_deref(), profile).await
        }
    }
}

/// An omitted condition stays unselected and is rejected by the form.
pub fn parse_condition(raw: Option<&str>) -> Result<Option<BodyCondition>, CliError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<BodyCondition>().map(Some).map_err(|_| {
        let options = BodyCondition::ALL
            .iter()
            .map(|condition| condition.label())
            .collect::<Vec<_>>()
            .join(", ");
        CliError::InvalidCondition(format!(
            "Unknown body condition '{raw}'. Expected one of: {options}"
        ))
    })
}

async fn submit(
    raw_pet_id: &str,
    mut form: LogEntryForm,
    raw_date: Option<&str>,
    profile: Option<&str>,
) -> Result<(), CliError> {
    let pet_id = parse_pet_id(raw_pet_id)?;
    let observed_at = parse_observed_at(raw_date)?;
    // Incomplete input never reaches config loading or the network.
    form.payload()?;

    let records = connect(profile).await?;
    let mut screen = SinglePetController::new(records, pet_id);
    let outcome = screen.submit_log(&mut form, observed_at).await;
    print_notices(&screen.take_notices());

    match outcome {
        SubmitOutcome::Saved(entry) => {
            print_recent(&screen, entry.kind());
            Ok(())
        }
        SubmitOutcome::Failed(_) => Err(CliError::AlreadyReported),
    }
}

fn print_recent(screen: &SinglePetController, kind: LogKind) {
    if let LoadState::Ready(pet) = screen.state() {
        for line in format_log_lines(pet, kind) {
            println!("  {line}");
        }
    }
}
