use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::export::date::format_optional;
use crate::export::layout::{Block, Table};
use crate::export::{letterhead, RecordContext};
use crate::types::DocumentKind;

use super::{wire, ReportBody};

/// A docket line: one case filed during the term
pub trait DocketCase: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: DocumentKind;
    const TITLE: &'static str;
    const CHARGE_HEADING: &'static str;

    fn plaintiff(&self) -> &str;
    fn defendant(&self) -> &str;
    /// Crime for criminal cases, action for civil ones
    fn charge(&self) -> &str;
    fn date_filed(&self) -> Option<NaiveDate>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CriminalCase {
    pub plaintiff: String,
    pub defendant: String,
    pub crime: String,
    #[serde(deserialize_with = "wire::optional_date")]
    pub date_filed: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CivilCase {
    pub plaintiff: String,
    pub defendant: String,
    pub action: String,
    #[serde(deserialize_with = "wire::optional_date")]
    pub date_filed: Option<NaiveDate>,
    #[serde(deserialize_with = "wire::amount")]
    pub amount_deposited: Decimal,
}

impl DocketCase for CriminalCase {
    const KIND: DocumentKind = DocumentKind::CriminalDocket;
    const TITLE: &'static str = "CRIMINAL CASES DOCKET";
    const CHARGE_HEADING: &'static str = "CRIME (S)";

    fn plaintiff(&self) -> &str {
        &self.plaintiff
    }

    fn defendant(&self) -> &str {
        &self.defendant
    }

    fn charge(&self) -> &str {
        &self.crime
    }

    fn date_filed(&self) -> Option<NaiveDate> {
        self.date_filed
    }
}

impl DocketCase for CivilCase {
    const KIND: DocumentKind = DocumentKind::CivilDocket;
    const TITLE: &'static str = "CIVIL CASES DOCKET";
    const CHARGE_HEADING: &'static str = "ACTION (S)";

    fn plaintiff(&self) -> &str {
        &self.plaintiff
    }

    fn defendant(&self) -> &str {
        &self.defendant
    }

    fn charge(&self) -> &str {
        &self.action
    }

    fn date_filed(&self) -> Option<NaiveDate> {
        self.date_filed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, bound(serialize = "C: DocketCase", deserialize = "C: DocketCase"))]
pub struct DocketBody<C: DocketCase> {
    pub judge_name: String,
    pub clerk_name: String,
    pub cases: Vec<C>,
}

impl<C: DocketCase> Default for DocketBody<C> {
    fn default() -> Self {
        Self {
            judge_name: String::new(),
            clerk_name: String::new(),
            cases: Vec::new(),
        }
    }
}

pub type CriminalDocketBody = DocketBody<CriminalCase>;
pub type CivilDocketBody = DocketBody<CivilCase>;

impl<C: DocketCase> ReportBody for DocketBody<C> {
    const KIND: DocumentKind = C::KIND;

    fn line_item_count(&self) -> usize {
        self.cases.len()
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.judge_name.clone(), self.clerk_name.clone()]
    }

    fn layout(&self, ctx: &RecordContext<'_>) -> Vec<Block> {
        let mut table = Table::new(["NO.", "PLAINTIFF (S)", "", "DEFENDANT (S)", C::CHARGE_HEADING, "DATE FILED"]);
        for (i, case) in self.cases.iter().enumerate() {
            table = table.row([
                (i + 1).to_string(),
                case.plaintiff().to_string(),
                "VERSUS".to_string(),
                case.defendant().to_string(),
                case.charge().to_uppercase(),
                format_optional(case.date_filed()),
            ]);
        }

        let mut blocks = letterhead(ctx.court);
        blocks.extend([
            Block::centered(C::TITLE),
            Block::centered(format!("{} TERM, A.D.{}", ctx.term.as_str().to_uppercase(), ctx.year)),
            Block::left(format!("BEFORE: {}", self.judge_name.to_uppercase())),
            Block::left(format!("CLERK'S OFFICE: {}", self.clerk_name.to_uppercase())),
            Block::gap(8),
            table.into(),
        ]);
        blocks
    }
}
