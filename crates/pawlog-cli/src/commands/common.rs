use std::sync::Arc;

use chrono::{DateTime, Utc};
use pawlog_core::config::ClientConfig;
use pawlog_core::controllers::{Notice, NoticeLevel};
use pawlog_core::gateway::PostgrestGateway;
use pawlog_core::models::wire::parse_timestamp;
use pawlog_core::models::{LogKind, Pet, PetId};
use pawlog_core::PetRecords;
use serde::Serialize;

use crate::auth::session_manager;
use crate::cli::LogTab;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// Record access for a profile with a live, restored session.
pub async fn connect(profile: Option<&str>) -> Result<PetRecords, CliError> {
    let (profile_name, client_config) = resolve_client_config(profile)?;
    let client_config = client_config.ok_or_else(|| missing_config_error(&profile_name))?;

    let session = Arc::new(session_manager(&profile_name, &client_config)?);
    if session.initialize().await?.session().is_none() {
        return Err(CliError::Core(pawlog_core::Error::NotAuthenticated));
    }

    let gateway = PostgrestGateway::new(&client_config, session)?;
    tracing::debug!(profile = %profile_name, "Connected to Supabase");
    Ok(PetRecords::new(Arc::new(gateway)))
}

/// Profile name plus its backend settings, if any are configured.
pub fn resolve_client_config(
    profile: Option<&str>,
) -> Result<(String, Option<ClientConfig>), CliError> {
    let config = CliProfilesConfig::load()?;
    let profile_name = config.resolve_profile_name(profile);
    let client_config = config
        .profile(&profile_name)
        .cloned()
        .unwrap_or_default()
        .client_config()?;
    Ok((profile_name, client_config))
}

pub fn missing_config_error(profile_name: &str) -> CliError {
    CliError::Config(format!(
        "No Supabase configuration for profile '{profile_name}'. Run `pawlog config init` or set SUPABASE_URL and SUPABASE_ANON_KEY."
    ))
}

pub fn parse_pet_id(raw: &str) -> Result<PetId, CliError> {
    raw.trim()
        .parse::<PetId>()
        .map_err(|_| CliError::InvalidPetId(raw.to_string()))
}

/// `--date` value, or now when omitted.
pub fn parse_observed_at(raw: Option<&str>) -> Result<DateTime<Utc>, CliError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_timestamp(value).map_err(|_| CliError::InvalidDate(value.to_string())),
        None => Ok(Utc::now()),
    }
}

pub const fn tab_kind(tab: LogTab) -> LogKind {
    match tab {
        LogTab::Weight => LogKind::Weight,
        LogTab::Body => LogKind::BodyCondition,
        LogTab::Vet => LogKind::VetVisit,
    }
}

/// Notices go to stderr so stdout stays scriptable.
pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Info => eprintln!("{}", notice.message),
            NoticeLevel::Error => eprintln!("Error: {}", notice.message),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PetListItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub age: String,
    pub created_at: String,
}

pub fn pet_to_list_item(pet: &Pet) -> PetListItem {
    PetListItem {
        id: pet.id.to_string(),
        name: pet.name.clone(),
        description: pet.description(),
        age: pet.age.to_string(),
        created_at: pawlog_core::util::canonical_timestamp(&pet.created_at),
    }
}

pub fn format_pet_lines(pets: &[Pet]) -> Vec<String> {
    pets.iter()
        .map(|pet| {
            let id = pet.id.to_string();
            let short_id = id.get(..8).unwrap_or(&id);
            format!("{short_id}  {}  {}  age {}", pet.name, pet.description(), pet.age)
        })
        .collect()
}

pub fn format_pet_header(pet: &Pet) -> Vec<String> {
    vec![
        pet.name.clone(),
        pet.description(),
        format!("Age: {}", pet.age),
        format!("ID: {}", pet.id),
    ]
}

/// Lines for one log tab in insertion order.
pub fn format_log_lines(pet: &Pet, kind: LogKind) -> Vec<String> {
    let rows: Vec<(DateTime<Utc>, String)> = match kind {
        LogKind::Weight => pet
            .weight_logs
            .iter()
            .map(|log| (log.date, format!("{} kg", log.weight)))
            .collect(),
        LogKind::BodyCondition => pet
            .body_condition_logs
            .iter()
            .map(|log| (log.date, log.body_condition.to_string()))
            .collect(),
        LogKind::VetVisit => pet
            .vet_visit_logs
            .iter()
            .map(|log| (log.date, log.notes.clone()))
            .collect(),
    };

    if rows.is_empty() {
        return vec![format!("No {} logs yet", kind.label())];
    }

    rows.into_iter()
        .map(|(date, text)| format!("{}  {text}", date.format("%Y-%m-%d")))
        .collect()
}
