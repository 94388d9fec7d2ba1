use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};
use crate::export::date::format_optional;
use crate::export::layout::{Block, Table};
use crate::export::money::{sum, usd};
use crate::export::{letterhead, RecordContext};
use crate::types::DocumentKind;

use super::{wire, ReportBody};

const JUROR_HEAD: [&str; 7] = [
    "NO.",
    "JURORS ID #",
    "NAMES",
    "CONTACT",
    "DAYS ATTENDED",
    "RATE PER DAY",
    "AMOUNT DUE",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JuryType {
    #[default]
    #[serde(rename = "Grand Jury")]
    Grand,
    #[serde(rename = "Petit Jury")]
    Petit,
}

impl JuryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JuryType::Grand => "Grand Jury",
            JuryType::Petit => "Petit Jury",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JurorType {
    #[default]
    Regular,
    Alternative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JurorEntry {
    #[serde(default)]
    pub juror_id: String,
    pub juror_name: String,
    #[serde(default)]
    pub contact_no: String,
    #[serde(default, deserialize_with = "wire::count")]
    pub days_attended: u32,
    #[serde(default, deserialize_with = "wire::amount")]
    pub amount_per_day: Decimal,
    #[serde(default)]
    pub juror_type: JurorType,
}

impl JurorEntry {
    pub fn amount_due(&self) -> Decimal {
        Decimal::from(self.days_attended) * self.amount_per_day
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JuryCase {
    pub case_caption: String,
    #[serde(deserialize_with = "wire::optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "wire::optional_date")]
    pub end_date: Option<NaiveDate>,
    pub jurors: Vec<JurorEntry>,
}

impl JuryCase {
    pub fn total(&self) -> Decimal {
        sum(self.jurors.iter().map(JurorEntry::amount_due))
    }
}

/// Jury attendance record and payroll
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JuryBody {
    pub judge_name: String,
    pub jury_type: JuryType,
    pub cases: Vec<JuryCase>,
}

impl JuryBody {
    pub fn total(&self) -> Decimal {
        sum(self.cases.iter().map(JuryCase::total))
    }
}

fn juror_table<'a>(jurors: impl Iterator<Item = &'a JurorEntry>) -> Table {
    let mut table = Table::new(JUROR_HEAD);
    let mut total = Decimal::ZERO;
    for (i, juror) in jurors.enumerate() {
        let due = juror.amount_due();
        total += due;
        table = table.row([
            (i + 1).to_string(),
            juror.juror_id.clone(),
            juror.juror_name.clone(),
            juror.contact_no.clone(),
            format!("{} days", juror.days_attended),
            usd(juror.amount_per_day),
            usd(due),
        ]);
    }
    let total = usd(total);
    table.with_total(["", "", "TOTAL", "", "", "", total.as_str()])
}

impl ReportBody for JuryBody {
    const KIND: DocumentKind = DocumentKind::Jury;

    fn line_item_count(&self) -> usize {
        self.cases.len()
    }

    fn validate_for_finalize(&self) -> ReportResult<()> {
        if self.cases.is_empty() {
            return Err(ReportError::validation("no line items"));
        }
        if let Some(case) = self.cases.iter().find(|c| c.jurors.is_empty()) {
            return Err(ReportError::validation(format!(
                "case '{}' has no jurors",
                case.case_caption
            )));
        }
        Ok(())
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.jury_type.as_str().to_string(), self.judge_name.clone()]
    }

    fn layout(&self, ctx: &RecordContext<'_>) -> Vec<Block> {
        let mut blocks = letterhead(ctx.court);
        let judge = self.judge_name.to_uppercase();
        let period = format!("TERM OF COURT: {} TERM, A.D.{}", ctx.term, ctx.year);

        match self.jury_type {
            JuryType::Grand => {
                blocks.push(Block::centered(format!(
                    "{} ATTENDANCE RECORD & PAYROLL",
                    self.jury_type.as_str().to_uppercase()
                )));
                blocks.push(Block::centered(period));
                blocks.push(Block::centered(format!("BEFORE HIS HONOR: {}", judge)));
                blocks.push(Block::gap(8));

                // a grand jury sits once per term, its roster is the first case
                if let Some(case) = self.cases.first() {
                    blocks.push(juror_table(case.jurors.iter()).into());
                }
            }
            JuryType::Petit => {
                blocks.push(Block::centered("PETIT JURORS' ATTENDANCE RECORD & PAYROLL"));
                blocks.push(Block::centered(period));
                blocks.push(Block::gap(8));

                for case in &self.cases {
                    blocks.push(Block::left(format!("CASE CAPTION: {}", case.case_caption)));
                    blocks.push(Block::left(format!(
                        "CASE START DATE: {}    CASE END DATE: {}",
                        format_optional(case.start_date),
                        format_optional(case.end_date)
                    )));
                    blocks.push(Block::left(format!("BEFORE HIS HONOR: {}", judge)));

                    for (juror_type, title) in [
                        (JurorType::Regular, "REGULAR JURORS"),
                        (JurorType::Alternative, "ALTERNATIVE JURORS"),
                    ] {
                        let mut section = case.jurors.iter().filter(|j| j.juror_type == juror_type).peekable();
                        if section.peek().is_some() {
                            blocks.push(juror_table(section).titled(title).into());
                        }
                    }

                    blocks.push(Block::right(format!("CASE TOTAL: {}", usd(case.total()))));
                    blocks.push(Block::gap(10));
                }
            }
        }

        blocks
    }
}
