use pawlog_core::auth::{AuthSession, SessionState, SignUpOutcome};

use crate::auth::{clear_stored_session, session_manager};
use crate::cli::AuthCommands;
use crate::commands::common::{missing_config_error, resolve_client_config};
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    let (profile_name, client_config) = resolve_client_config(global_profile)?;

    match command {
        AuthCommands::Login { email, password } => {
            let client_config =
                client_config.ok_or_else(|| missing_config_error(&profile_name))?;
            let manager = session_manager(&profile_name, &client_config)?;
            let session = manager.sign_in(&email, &password).await?;
            println!("Signed in profile '{profile_name}' as {}", email_label(&session));
            Ok(())
        }
        AuthCommands::Signup { email, password } => {
            let client_config =
                client_config.ok_or_else(|| missing_config_error(&profile_name))?;
            let manager = session_manager(&profile_name, &client_config)?;
            match manager.sign_up(&email, &password).await? {
                SignUpOutcome::SignedIn(session) => {
                    println!(
                        "Created account and signed in profile '{profile_name}' as {}",
                        email_label(&session)
                    );
                }
                SignUpOutcome::ConfirmationRequired => {
                    println!("Check {email} for a confirmation link, then run `pawlog auth login`.");
                }
            }
            Ok(())
        }
        AuthCommands::Status => {
            let Some(client_config) = client_config else {
                println!("Profile '{profile_name}' is not configured.");
                return Ok(());
            };
            let manager = session_manager(&profile_name, &client_config)?;
            match manager.initialize().await? {
                SessionState::SignedIn(session) => println!(
                    "Profile '{}' is signed in as {} (expires_at={})",
                    profile_name,
                    email_label(&session),
                    session.expires_at
                ),
                SessionState::SignedOut | SessionState::Authenticating => {
                    println!("Profile '{profile_name}' is not signed in.");
                }
            }
            Ok(())
        }
        AuthCommands::Logout => {
            if let Some(client_config) = client_config {
                let manager = session_manager(&profile_name, &client_config)?;
                // A stale stored session that cannot be refreshed is cleared here.
                if let Err(error) = manager.initialize().await {
                    tracing::warn!("Failed to restore session before sign out: {}", error);
                }
                manager.sign_out().await?;
            } else {
                clear_stored_session(&profile_name)?;
            }
            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}

fn email_label(session: &AuthSession) -> &str {
    session.user.email.as_deref().unwrap_or("(no email)")
}
