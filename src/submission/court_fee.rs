use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::export::date::format_optional;
use crate::export::layout::{Block, Table};
use crate::export::money::{sum, usd};
use crate::export::RecordContext;
use crate::types::DocumentKind;

use super::{wire, ReportBody};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeeEntry {
    pub payee_name: String,
    /// Fine, cost or fee
    #[serde(rename = "type")]
    pub description: String,
    #[serde(deserialize_with = "wire::amount")]
    pub amount: Decimal,
    pub bank_name: String,
    pub receipt_number: String,
    #[serde(deserialize_with = "wire::optional_date")]
    pub date: Option<NaiveDate>,
}

/// Report on court's costs, fees and fines collected in a term
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourtFeeBody {
    pub judge_name: String,
    pub entries: Vec<FeeEntry>,
}

impl CourtFeeBody {
    pub fn total(&self) -> Decimal {
        sum(self.entries.iter().map(|e| e.amount))
    }
}

impl ReportBody for CourtFeeBody {
    const KIND: DocumentKind = DocumentKind::CourtFee;

    fn line_item_count(&self) -> usize {
        self.entries.len()
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.judge_name.clone()]
    }

    fn layout(&self, ctx: &RecordContext<'_>) -> Vec<Block> {
        let mut table = Table::new(["NO.", "NAME", "DESCRIPTION", "AMOUNT", "BANK", "RECEIPT #", "DATE"]);
        for (i, entry) in self.entries.iter().enumerate() {
            table = table.row([
                (i + 1).to_string(),
                entry.payee_name.clone(),
                entry.description.clone(),
                usd(entry.amount),
                entry.bank_name.clone(),
                entry.receipt_number.clone(),
                format_optional(entry.date),
            ]);
        }
        let total = usd(self.total());
        let table = table.with_total(["", "TOTAL", "", total.as_str(), "", "", ""]);

        vec![
            Block::centered("REPUBLIC OF LIBERIA"),
            Block::centered("JUDICIAL BRANCH"),
            Block::centered("REPORT ON COURT'S COSTS, FEES AND FINES"),
            Block::gap(8),
            Block::left(format!("COURT: {}", ctx.court.to_uppercase())),
            Block::left(format!("TERM: {} A.D. {}", ctx.term, ctx.year)),
            table.into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn total_row_sums_every_entry() {
        let body = CourtFeeBody {
            judge_name: String::new(),
            entries: vec![
                FeeEntry {
                    payee_name: "A. Kamara".into(),
                    description: "Fine".into(),
                    amount: Decimal::from_str("25.50").unwrap(),
                    date: NaiveDate::from_ymd_opt(2025, 1, 28),
                    ..Default::default()
                },
                FeeEntry {
                    payee_name: "B. Sirleaf".into(),
                    description: "Cost".into(),
                    amount: Decimal::from_str("10").unwrap(),
                    ..Default::default()
                },
            ],
        };

        let blocks = body.layout(&RecordContext::sample(DocumentKind::CourtFee));
        let table = blocks
            .iter()
            .find_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .unwrap();

        assert_eq!(table.rows[0][3], "US$25.50");
        assert_eq!(table.rows[0][6], "28 Jan. 2025");
        assert_eq!(table.total.as_ref().unwrap()[3], "US$35.50");
    }

    #[test]
    fn entry_type_maps_to_description() {
        let entry: FeeEntry = serde_json::from_value(serde_json::json!({
            "payeeName": "A. Kamara",
            "type": "Fine",
            "amount": "12",
            "date": "2025-03-01"
        }))
        .unwrap();
        assert_eq!(entry.description, "Fine");
        assert_eq!(entry.amount, Decimal::from(12));
    }
}
