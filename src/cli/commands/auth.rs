use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::service::ReportService;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the portal backend")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (falls back to ERS_PASSWORD)")]
        password: Option<String>,
        #[arg(long, help = "Backend base url for this and later sessions")]
        api_url: Option<String>,
    },

    #[command(about = "Logout and forget the saved credential")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { username, password, api_url } => {
            let password = match password.or_else(|| std::env::var("ERS_PASSWORD").ok()) {
                Some(p) => p,
                None => anyhow::bail!("Password required: pass --password or set ERS_PASSWORD"),
            };

            let previous = load_session_state()?;
            let mut state = SessionState {
                api_url: api_url.or(previous.api_url),
                ..SessionState::default()
            };

            let store = http_store(&state)?;
            let service = ReportService::login(store, &username, &password, &config().session).await?;
            let session = service.session();

            state.token = Some(session.token().to_string());
            state.username = Some(session.username().to_string());
            state.logged_in_at = Some(Utc::now());
            save_session_state(&state)?;

            let message = if session.needs_court_selection() {
                format!("Logged in as {} ({}). Select a court with 'ers court use <name>'", session.username(), session.role())
            } else {
                format!("Logged in as {} ({})", session.username(), session.role())
            };
            output_success(
                &output_format,
                &message,
                Some(json!({
                    "user": session.user(),
                    "needs_court_selection": session.needs_court_selection(),
                })),
            )
        }
        AuthCommands::Logout => {
            let state = load_session_state()?;
            save_session_state(&SessionState {
                api_url: state.api_url,
                ..SessionState::default()
            })?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let state = load_session_state()?;
            if !state.is_logged_in() {
                return output_success(&output_format, "Not logged in", Some(json!({ "logged_in": false })));
            }

            let (service, state) = connect()?;
            let session = service.session();
            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "logged_in": true,
                            "user": session.user(),
                            "court": session.selected_court(),
                            "expires_at": session.expires_at(),
                            "api_url": state.api_url(),
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("User: {} ({})", session.username(), session.role());
                    println!("Court: {}", session.selected_court().unwrap_or("(none selected)"));
                    println!("Expires: {}", session.expires_at().format("%Y-%m-%d %H:%M UTC"));
                    println!("API: {}", state.api_url());
                }
            }
            Ok(())
        }
        AuthCommands::Whoami => {
            let (service, _) = connect()?;
            let user = service.session().user();
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(user)?),
                OutputFormat::Text => {
                    println!("ID: {}", user.id);
                    println!("Username: {}", user.username);
                    println!("Role: {}", user.role);
                    if let Some(court) = &user.court {
                        println!("Assigned court: {}", court);
                    }
                }
            }
            Ok(())
        }
    }
}
