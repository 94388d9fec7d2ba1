//! Document export: lays records out as letterhead, tables and totals, then
//! paginates them without ever splitting a table row.

pub mod date;
pub mod layout;
pub mod money;
pub mod paginate;
pub mod render;

use crate::config::ExportConfig;
use crate::error::{ReportError, ReportResult};
use crate::submission::{ReportBody, Submission};
use crate::types::{DocumentKind, Term};

use layout::{Block, Document};
use paginate::Paginator;

/// Record identity handed to a body's layout
#[derive(Debug, Clone, Copy)]
pub struct RecordContext<'a> {
    pub kind: DocumentKind,
    pub court: &'a str,
    pub term: Term,
    pub year: i32,
    pub submitted_by: Option<&'a str>,
}

impl RecordContext<'_> {
    pub fn term_label(&self) -> String {
        self.kind.term_label(self.term)
    }
}

#[cfg(test)]
impl RecordContext<'static> {
    pub(crate) fn sample(kind: DocumentKind) -> Self {
        Self {
            kind,
            court: "Sanniquellie",
            term: Term::February,
            year: 2025,
            submitted_by: Some("mdolo"),
        }
    }
}

/// `REPUBLIC OF LIBERIA / JUDICIAL BRANCH / <COURT>`
pub fn letterhead(court: &str) -> Vec<Block> {
    vec![
        Block::centered("REPUBLIC OF LIBERIA"),
        Block::centered("JUDICIAL BRANCH"),
        Block::centered(court.to_uppercase()),
    ]
}

pub fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// `{Prefix}-{term}-{year}.pdf`
pub fn export_file_name(kind: DocumentKind, term: Term, year: i32) -> String {
    format!("{}-{}-{}.pdf", kind.file_prefix(), kind.term_label(term), year)
}

/// `All_{Kind}_{court}.pdf`
pub fn combined_file_name(kind: DocumentKind, court: &str) -> String {
    format!("All_{}_{}.pdf", kind.plural_title(), court)
}

/// Single record export
pub fn document<B: ReportBody>(record: &Submission<B>, config: &ExportConfig) -> Document {
    let blocks = record.body.layout(&record.context());
    Document {
        file_name: export_file_name(B::KIND, record.term, record.year),
        pages: Paginator::new(config).paginate(blocks),
    }
}

/// Reviewer "download all" for the selected court. Rejected records are left
/// out and each record carries its provenance line.
pub fn combined_for_review<B: ReportBody>(
    records: &[Submission<B>],
    court: &str,
    config: &ExportConfig,
) -> ReportResult<Document> {
    let valid: Vec<&Submission<B>> = records.iter().filter(|r| !r.lifecycle.rejected).collect();
    if valid.is_empty() {
        return Err(ReportError::validation(format!("no valid {} to export", B::KIND.plural_title())));
    }

    let mut blocks = Vec::new();
    for record in valid {
        let ctx = record.context();
        blocks.extend(record.body.layout(&ctx));
        blocks.push(Block::left(format!(
            "Submitted by: {}",
            ctx.submitted_by.unwrap_or("-")
        )));
        blocks.push(Block::gap(config.table_gap));
    }

    tracing::debug!("Combined {} export for {} laid out", B::KIND, court);
    Ok(Document {
        file_name: combined_file_name(B::KIND, court),
        pages: Paginator::new(config).paginate(blocks),
    })
}

/// Lays out every given record in order and renders the result as bytes.
/// Identical snapshots always produce identical output.
pub fn render<B: ReportBody>(records: &[Submission<B>], config: &ExportConfig) -> Vec<u8> {
    let mut blocks = Vec::new();
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            blocks.push(Block::gap(config.table_gap));
        }
        blocks.extend(record.body.layout(&record.context()));
    }

    let file_name = match records {
        [single] => export_file_name(B::KIND, single.term, single.year),
        _ => format!("{}.pdf", B::KIND.plural_title()),
    };
    let document = Document {
        file_name,
        pages: Paginator::new(config).paginate(blocks),
    };
    render::to_text(&document).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_civil_docket, sample_court_fee};

    #[test]
    fn file_names_follow_record_identity() {
        assert_eq!(
            export_file_name(DocumentKind::Magistrate, Term::May, 2025),
            "MagistrateReport-May Term-2025.pdf"
        );
        assert_eq!(
            export_file_name(DocumentKind::CourtFee, Term::August, 2024),
            "CourtFeesReport-August-2024.pdf"
        );
        assert_eq!(
            combined_file_name(DocumentKind::CriminalDocket, "Sanniquellie"),
            "All_Criminal_Dockets_Sanniquellie.pdf"
        );
    }

    #[test]
    fn single_document_is_named_after_the_record() {
        let record = sample_civil_docket("u1", "Ganta", 2);
        let doc = document(&record, &ExportConfig::default());
        assert_eq!(doc.file_name, format!("CivilDocket-{}-{}.pdf", record.term, record.year));
        assert_eq!(doc.tables().map(|t| t.rows.len()).sum::<usize>(), 2);
    }

    #[test]
    fn combined_export_skips_rejected_and_adds_provenance() {
        let mut rejected = sample_civil_docket("u1", "Ganta", 1);
        rejected.lifecycle.finalized = true;
        rejected.lifecycle.rejected = true;
        rejected.lifecycle.rejection_reason = "missing judge name".into();
        let kept = sample_civil_docket("u2", "Ganta", 3);

        let doc = combined_for_review(&[rejected, kept], "Ganta", &ExportConfig::default()).unwrap();
        assert_eq!(doc.file_name, "All_Civil_Dockets_Ganta.pdf");
        assert_eq!(doc.tables().map(|t| t.rows.len()).sum::<usize>(), 3);
        assert_eq!(doc.lines().filter(|l| l.starts_with("Submitted by: ")).count(), 1);
    }

    #[test]
    fn combined_export_with_nothing_valid_is_refused() {
        let mut rejected = sample_court_fee("u1", "Ganta", 1);
        rejected.lifecycle.rejected = true;
        let err = combined_for_review(&[rejected], "Ganta", &ExportConfig::default()).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }

    #[test]
    fn long_docket_spans_pages_without_splitting_rows() {
        let record = sample_civil_docket("u1", "Ganta", 60);
        let config = ExportConfig::default();
        let doc = document(&record, &config);

        assert!(doc.page_count() > 1);
        assert_eq!(doc.tables().map(|t| t.rows.len()).sum::<usize>(), 60);
        assert!(doc.tables().skip(1).all(|t| t.continued && t.head[0] == "NO."));
    }

    #[test]
    fn rendering_is_deterministic() {
        let records = vec![sample_court_fee("u1", "Ganta", 4), sample_court_fee("u1", "Ganta", 2)];
        let config = ExportConfig::default();
        let first = render(&records, &config);
        assert_eq!(first, render(&records, &config));

        let text = String::from_utf8(first).unwrap();
        assert!(text.contains("REPORT ON COURT'S COSTS, FEES AND FINES"));
        assert!(text.contains("--- Page 1 of"));
    }
}
