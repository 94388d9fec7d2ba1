use std::fs;
use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};
use serde_json::{json, Value};

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::client::HttpStore;
use crate::config::config;
use crate::export::layout::Document;
use crate::export::render;
use crate::filter::SearchQuery;
use crate::lifecycle::{self, available_actions};
use crate::service::ReportService;
use crate::submission::{
    CivilDocketBody, CourtFeeBody, CriminalDocketBody, JuryBody, MagistrateBody, ReportBody, ReturnsBody,
    Submission,
};
use crate::types::{Recipient, Term};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportKind {
    Returns,
    Jury,
    Magistrate,
    CriminalDocket,
    CivilDocket,
    CourtFee,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    #[command(about = "List reports visible to the current user")]
    List {
        #[arg(long, help = "Case-insensitive search over court, term, year and names")]
        search: Option<String>,
    },

    #[command(about = "Show one report with its status and available actions")]
    Show {
        #[arg(help = "Report ID")]
        id: String,
    },

    #[command(about = "Create a draft from a JSON body file")]
    Create {
        #[arg(long, help = "Court term (February, May, August, November)")]
        term: Term,
        #[arg(long, help = "Year")]
        year: i32,
        #[arg(long, help = "JSON file holding the report body")]
        file: PathBuf,
    },

    #[command(about = "Edit a draft or rejected report")]
    Edit {
        #[arg(help = "Report ID")]
        id: String,
        #[arg(long, help = "JSON file replacing the report body")]
        file: Option<PathBuf>,
        #[arg(long, help = "New court term")]
        term: Option<Term>,
        #[arg(long, help = "New year")]
        year: Option<i32>,
    },

    #[command(about = "Finalize a draft for submission")]
    Finalize {
        #[arg(help = "Report ID")]
        id: String,
    },

    #[command(about = "Submit a finalized report to a reviewer")]
    Submit {
        #[arg(help = "Report ID")]
        id: String,
        #[arg(long, help = "Recipient (admin or chief)")]
        to: Recipient,
    },

    #[command(about = "Approve a report routed to you")]
    Approve {
        #[arg(help = "Report ID")]
        id: String,
    },

    #[command(about = "Reject a report routed to you")]
    Reject {
        #[arg(help = "Report ID")]
        id: String,
        #[arg(long, help = "Reason shown to the clerk")]
        reason: String,
    },

    #[command(about = "Reopen a rejected report for editing")]
    Resubmit {
        #[arg(help = "Report ID")]
        id: String,
    },

    #[command(about = "Hide a report from your list")]
    Remove {
        #[arg(help = "Report ID")]
        id: String,
    },

    #[command(about = "Export one report as a paginated document")]
    Export {
        #[arg(help = "Report ID")]
        id: String,
        #[arg(long, default_value = ".", help = "Output directory")]
        out: PathBuf,
    },

    #[command(about = "Export every valid report of the selected court")]
    ExportAll {
        #[arg(long, default_value = ".", help = "Output directory")]
        out: PathBuf,
    },

    #[command(about = "Upload a file and attach it to a report")]
    Attach {
        #[arg(help = "Report ID")]
        id: String,
        #[arg(help = "File to upload")]
        path: PathBuf,
    },

    #[command(about = "Detach a file from a report")]
    Detach {
        #[arg(help = "Report ID")]
        id: String,
        #[arg(help = "Attachment url")]
        url: String,
    },
}

pub async fn handle(kind: ReportKind, cmd: ReportCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (service, _) = connect()?;

    match kind {
        ReportKind::Returns => run::<ReturnsBody>(&service, cmd, &output_format).await,
        ReportKind::Jury => run::<JuryBody>(&service, cmd, &output_format).await,
        ReportKind::Magistrate => run::<MagistrateBody>(&service, cmd, &output_format).await,
        ReportKind::CriminalDocket => run::<CriminalDocketBody>(&service, cmd, &output_format).await,
        ReportKind::CivilDocket => run::<CivilDocketBody>(&service, cmd, &output_format).await,
        ReportKind::CourtFee => run::<CourtFeeBody>(&service, cmd, &output_format).await,
    }
}

async fn run<B: ReportBody>(
    service: &ReportService<HttpStore>,
    cmd: ReportCommands,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        ReportCommands::List { search } => {
            let query = SearchQuery::new(search.as_deref().unwrap_or(""));
            let records = service.list::<B>(&query).await?;

            if records.is_empty() {
                return output_empty_collection(output_format, "reports", &format!("No {} reports found", B::KIND));
            }

            match output_format {
                OutputFormat::Json => {
                    let reports: Vec<_> = records.iter().map(summary).collect();
                    println!("{}", serde_json::to_string_pretty(&json!({ "reports": reports }))?);
                }
                OutputFormat::Text => {
                    println!("{:<26} {:<10} {:<6} {:<16} {:<6} {}", "ID", "TERM", "YEAR", "COURT", "ITEMS", "STATUS");
                    println!("{}", "-".repeat(84));
                    for record in &records {
                        println!(
                            "{:<26} {:<10} {:<6} {:<16} {:<6} {}",
                            record.id.as_deref().unwrap_or("-"),
                            record.term,
                            record.year,
                            record.court,
                            record.line_item_count(),
                            record.status()
                        );
                    }
                }
            }
            Ok(())
        }
        ReportCommands::Show { id } => {
            let record = service.get::<B>(&id).await?;
            let actions = available_actions(&record, service.session());

            match output_format {
                OutputFormat::Json => {
                    let mut detail = summary(&record);
                    detail["body"] = serde_json::to_value(&record.body)?;
                    detail["actions"] = serde_json::to_value(&actions)?;
                    println!("{}", serde_json::to_string_pretty(&detail)?);
                }
                OutputFormat::Text => {
                    println!("{} {}", B::KIND, id);
                    println!("Court: {}", record.court);
                    println!("Period: {} Term {}", record.term, record.year);
                    println!("Status: {}", record.status());
                    if record.lifecycle.rejected {
                        println!("Rejection reason: {}", record.lifecycle.rejection_reason);
                    }
                    if let Some(author) = &record.submitted_by {
                        println!("Submitted by: {}", author.display_name());
                    }
                    for attachment in &record.attachments {
                        println!("Attachment: {} ({})", attachment.name, attachment.url);
                    }
                    let actions: Vec<String> = actions.iter().map(ToString::to_string).collect();
                    println!("Actions: {}", if actions.is_empty() { "none".to_string() } else { actions.join(", ") });
                    println!("{}", serde_json::to_string_pretty(&record.body)?);
                }
            }
            Ok(())
        }
        ReportCommands::Create { term, year, file } => {
            let body: B = read_body(&file)?;
            let record = service.create(term, year, body).await?;
            done(output_format, &format!("Created {} for {} Term {}", B::KIND, term, year), &record)
        }
        ReportCommands::Edit { id, file, term, year } => {
            if file.is_none() && term.is_none() && year.is_none() {
                anyhow::bail!("Nothing to change: pass --file, --term or --year");
            }
            let body: Option<B> = file.as_deref().map(read_body::<B>).transpose()?;
            let session = service.session();

            let record = service
                .edit::<B, _>(&id, |record| {
                    if term.is_some() || year.is_some() {
                        let term = term.unwrap_or(record.term);
                        let year = year.unwrap_or(record.year);
                        lifecycle::update_period(record, session, term, year)?;
                    }
                    if let Some(body) = body {
                        record.body = body;
                    }
                    Ok(())
                })
                .await?;
            done(output_format, &format!("Saved {} {}", B::KIND, id), &record)
        }
        ReportCommands::Finalize { id } => {
            let record = service.finalize::<B>(&id).await?;
            done(output_format, &format!("Finalized {} {}", B::KIND, id), &record)
        }
        ReportCommands::Submit { id, to } => {
            let record = service.submit::<B>(&id, to).await?;
            done(output_format, &format!("Submitted {} {} to {}", B::KIND, id, to.reviewer_role()), &record)
        }
        ReportCommands::Approve { id } => {
            let record = service.approve::<B>(&id).await?;
            done(output_format, &format!("Approved {} {}", B::KIND, id), &record)
        }
        ReportCommands::Reject { id, reason } => {
            let record = service.reject::<B>(&id, &reason).await?;
            done(output_format, &format!("Rejected {} {}", B::KIND, id), &record)
        }
        ReportCommands::Resubmit { id } => {
            let record = service.resubmit::<B>(&id).await?;
            done(output_format, &format!("Reopened {} {} for editing", B::KIND, id), &record)
        }
        ReportCommands::Remove { id } => {
            let record = service.remove::<B>(&id).await?;
            done(output_format, &format!("Removed {} {} from your list", B::KIND, id), &record)
        }
        ReportCommands::Export { id, out } => {
            let document = service.export::<B>(&id, &config().export).await?;
            exported(output_format, &out, &document)
        }
        ReportCommands::ExportAll { out } => {
            let document = service.export_all::<B>(&config().export).await?;
            exported(output_format, &out, &document)
        }
        ReportCommands::Attach { id, path } => {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("Invalid file path: {}", path.display()))?
                .to_string();
            let bytes = fs::read(&path)?;

            let record = service.attach::<B>(&id, &file_name, bytes).await?;
            done(output_format, &format!("Attached '{}' to {} {}", file_name, B::KIND, id), &record)
        }
        ReportCommands::Detach { id, url } => {
            let (record, removed) = service.detach::<B>(&id, &url).await?;
            let message = if removed {
                format!("Detached '{}' from {} {}", url, B::KIND, id)
            } else {
                format!("{} {} has no attachment '{}'", B::KIND, id, url)
            };
            done(output_format, &message, &record)
        }
    }
}

fn summary<B: ReportBody>(record: &Submission<B>) -> Value {
    json!({
        "id": record.id,
        "kind": B::KIND,
        "court": record.court,
        "term": record.term,
        "year": record.year,
        "status": record.status().label(),
        "finalized": record.lifecycle.finalized,
        "rejected": record.lifecycle.rejected,
        "rejectionReason": record.lifecycle.rejection_reason,
        "submittedToAdmin": record.lifecycle.submitted_to_admin,
        "submittedToChief": record.lifecycle.submitted_to_chief,
        "submittedBy": record.submitted_by.as_ref().map(|a| a.display_name()),
        "lineItems": record.line_item_count(),
        "attachments": record.attachments,
    })
}

fn done<B: ReportBody>(output_format: &OutputFormat, message: &str, record: &Submission<B>) -> anyhow::Result<()> {
    output_success(output_format, message, Some(json!({ "report": summary(record) })))
}

fn read_body<B: ReportBody>(path: &Path) -> anyhow::Result<B> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| anyhow::anyhow!("Invalid {} body in {}: {}", B::KIND, path.display(), e))
}

/// Text and layout-JSON paths for a document; `file_name` stays the PDF
/// name an external renderer should produce.
fn document_paths(dir: &Path, document: &Document) -> (PathBuf, PathBuf) {
    let pdf = dir.join(&document.file_name);
    (pdf.with_extension("txt"), pdf.with_extension("json"))
}

fn write_document(dir: &Path, document: &Document) -> anyhow::Result<(PathBuf, PathBuf)> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let (text, layout) = document_paths(dir, document);
    fs::write(&text, render::to_text(document))?;
    fs::write(&layout, serde_json::to_string_pretty(document)?)?;
    Ok((text, layout))
}

fn exported(output_format: &OutputFormat, dir: &Path, document: &Document) -> anyhow::Result<()> {
    let (text, layout) = write_document(dir, document)?;
    output_success(
        output_format,
        &format!("Exported {} ({} pages, layout in {})", text.display(), document.page_count(), layout.display()),
        Some(json!({
            "path": text,
            "layout": layout,
            "pdf_name": document.file_name,
            "pages": document.page_count(),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::layout::Page;

    fn document(file_name: &str) -> Document {
        Document {
            file_name: file_name.to_string(),
            pages: vec![Page { number: 1, blocks: Vec::new() }],
        }
    }

    #[test]
    fn exports_are_not_written_under_a_pdf_name() {
        let (text, layout) = document_paths(Path::new("out"), &document("MagistrateReport-May Term-2025.pdf"));
        assert_eq!(text, Path::new("out").join("MagistrateReport-May Term-2025.txt"));
        assert_eq!(layout, Path::new("out").join("MagistrateReport-May Term-2025.json"));
    }

    #[test]
    fn written_text_is_the_rendering_and_layout_is_json() {
        let dir = std::env::temp_dir().join(format!("ers-export-{}", uuid::Uuid::new_v4()));
        let doc = document("CivilDocket-May-2025.pdf");

        let (text, layout) = write_document(&dir, &doc).unwrap();
        assert_eq!(fs::read_to_string(&text).unwrap(), render::to_text(&doc));
        let parsed: Value = serde_json::from_str(&fs::read_to_string(&layout).unwrap()).unwrap();
        assert_eq!(parsed["file_name"], "CivilDocket-May-2025.pdf");
        assert!(!dir.join("CivilDocket-May-2025.pdf").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
