use pawlog_core::config::normalize_project_url;
use pawlog_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            supabase_url,
            supabase_anon_key,
            timeout_secs,
            read_retries,
            no_activate,
        } => {
            let mut config = CliProfilesConfig::load()?;
            let profile_name = apply_init(
                &mut config,
                profile.as_deref().or(global_profile),
                ProfileUpdate {
                    supabase_url,
                    supabase_anon_key,
                    timeout_secs,
                    read_retries,
                },
                no_activate,
            )?;
            let path = config.save()?;
            println!("Saved profile '{profile_name}' to {}", path.display());
            if config.active_profile.as_deref() == Some(profile_name.as_str()) {
                println!("Active profile: {profile_name}");
            }
            Ok(())
        }
    }
}

/// Explicit `config init` values; `None` keeps whatever the profile has.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub read_retries: Option<u32>,
}

/// Merge an update into the named profile, falling back to the environment
/// for Supabase values. Returns the resolved profile name.
pub fn apply_init(
    config: &mut CliProfilesConfig,
    profile_name: Option<&str>,
    update: ProfileUpdate,
    no_activate: bool,
) -> Result<String, CliError> {
    let profile_name = config.resolve_profile_name(profile_name);
    let profile = config.profile_mut_or_default(&profile_name);

    let supabase_url = normalize_text_option(update.supabase_url)
        .or_else(|| normalize_text_option(std::env::var("SUPABASE_URL").ok()))
        .or_else(|| profile.supabase_url());
    let supabase_anon_key = normalize_text_option(update.supabase_anon_key)
        .or_else(|| normalize_text_option(std::env::var("SUPABASE_ANON_KEY").ok()))
        .or_else(|| profile.supabase_anon_key());

    let (Some(supabase_url), Some(supabase_anon_key)) = (supabase_url, supabase_anon_key) else {
        return Err(CliError::Config(
            "Both --supabase-url and --supabase-anon-key are required (or set SUPABASE_URL and SUPABASE_ANON_KEY)".to_string(),
        ));
    };

    profile.supabase_url = Some(normalize_project_url(&supabase_url)?);
    profile.supabase_anon_key = Some(supabase_anon_key);
    if update.timeout_secs.is_some() {
        profile.timeout_secs = update.timeout_secs;
    }
    if update.read_retries.is_some() {
        profile.read_retries = update.read_retries;
    }

    if !no_activate || config.active_profile.is_none() {
        config.active_profile = Some(profile_name.clone());
    }
    Ok(profile_name)
}
