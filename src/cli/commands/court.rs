use clap::Subcommand;
use serde_json::json;

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum CourtCommands {
    #[command(about = "List all courts")]
    List,

    #[command(about = "Show the court currently worked in")]
    Current,

    #[command(about = "Select the court to review (admin and chief justice)")]
    Use {
        #[arg(help = "Court name")]
        name: String,
    },

    #[command(about = "Register a new court")]
    Add {
        #[arg(help = "Court name")]
        name: String,
    },

    #[command(about = "Delete a court")]
    Delete {
        #[arg(help = "Court name")]
        name: String,
    },
}

pub async fn handle(cmd: CourtCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        CourtCommands::List => {
            let (service, _) = connect()?;
            let courts = service.courts().await?;

            if courts.is_empty() {
                return output_empty_collection(&output_format, "courts", "No courts registered");
            }

            let current = service.session().selected_court();
            match output_format {
                OutputFormat::Json => {
                    let courts: Vec<_> = courts
                        .iter()
                        .map(|c| json!({ "id": c.id, "name": c.name, "current": current == Some(c.name.as_str()) }))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&json!({ "courts": courts }))?);
                }
                OutputFormat::Text => {
                    println!("{:<26} {}", "NAME", "ID");
                    println!("{}", "-".repeat(52));
                    for court in &courts {
                        let marker = if current == Some(court.name.as_str()) { "*" } else { " " };
                        println!("{}{:<25} {}", marker, court.name, court.id);
                    }
                }
            }
            Ok(())
        }
        CourtCommands::Current => {
            let (service, _) = connect()?;
            match service.session().selected_court() {
                Some(court) => output_success(&output_format, &format!("Current court: {}", court), Some(json!({ "current_court": court }))),
                None => output_success(&output_format, "No court selected", Some(json!({ "current_court": null }))),
            }
        }
        CourtCommands::Use { name } => {
            let (mut service, mut state) = connect()?;
            service.select_court(&name).await?;

            if service.session().role().is_reviewer() {
                state.selected_court = service.session().selected_court().map(str::to_string);
                save_session_state(&state)?;
            }
            output_success(
                &output_format,
                &format!("Switched to court '{}'", name.trim()),
                Some(json!({ "current_court": name.trim() })),
            )
        }
        CourtCommands::Add { name } => {
            let (service, _) = connect()?;
            service.add_court(&name).await?;
            output_success(&output_format, &format!("Court '{}' added", name.trim()), None)
        }
        CourtCommands::Delete { name } => {
            let (mut service, mut state) = connect()?;
            service.delete_court(&name).await?;

            if state.selected_court.as_deref() == Some(name.as_str()) {
                state.selected_court = None;
                save_session_state(&state)?;
            }
            output_success(&output_format, &format!("Court '{}' deleted", name), None)
        }
    }
}
