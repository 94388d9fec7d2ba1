use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::export::layout::{Block, Table};
use crate::export::money::{format_amount, sum};
use crate::export::{letterhead, RecordContext};
use crate::types::{Currency, DocumentKind};

use super::{wire, ReportBody};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deposit {
    pub payee_name: String,
    #[serde(deserialize_with = "wire::amount")]
    pub amount_deposited: Decimal,
    pub currency: Currency,
    pub bank_name: String,
    pub bank_slip_no: String,
    pub cba_no: String,
    /// City magisterial court the deposit was collected at
    pub court: String,
}

/// Quarterly magistrate deposit report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MagistrateBody {
    pub magistrate_name: String,
    pub deposits: Vec<Deposit>,
}

/// Deposits of one sub-court split by currency, in first-appearance order
struct CourtGroup<'a> {
    name: &'a str,
    usd: Vec<&'a Deposit>,
    lrd: Vec<&'a Deposit>,
}

impl MagistrateBody {
    fn groups(&self) -> Vec<CourtGroup<'_>> {
        let mut groups: Vec<CourtGroup<'_>> = Vec::new();
        for deposit in &self.deposits {
            let index = match groups.iter().position(|g| g.name == deposit.court) {
                Some(i) => i,
                None => {
                    groups.push(CourtGroup { name: &deposit.court, usd: Vec::new(), lrd: Vec::new() });
                    groups.len() - 1
                }
            };
            match deposit.currency {
                Currency::Usd => groups[index].usd.push(deposit),
                Currency::Lrd => groups[index].lrd.push(deposit),
            }
        }
        groups
    }

    pub fn total(&self, currency: Currency) -> Decimal {
        sum(self
            .deposits
            .iter()
            .filter(|d| d.currency == currency)
            .map(|d| d.amount_deposited))
    }
}

impl CourtGroup<'_> {
    /// USD and LRD deposits share a row by position
    fn table(&self) -> Table {
        let mut table = Table::new(["NO.", "NAME OF PAYEES", "USD", "LRD", "BANK", "CBA NO.", "BANK SLIP NO."]);
        let rows = self.usd.len().max(self.lrd.len());
        for i in 0..rows {
            let usd = self.usd.get(i).copied();
            let lrd = self.lrd.get(i).copied();
            let Some(first) = usd.or(lrd) else { continue };
            table = table.row([
                (i + 1).to_string(),
                first.payee_name.clone(),
                usd.map(|d| format_amount(d.amount_deposited, Currency::Usd)).unwrap_or_default(),
                lrd.map(|d| format_amount(d.amount_deposited, Currency::Lrd)).unwrap_or_default(),
                first.bank_name.clone(),
                first.cba_no.clone(),
                first.bank_slip_no.clone(),
            ]);
        }

        let usd_total = format_amount(sum(self.usd.iter().map(|d| d.amount_deposited)), Currency::Usd);
        let lrd_total = format_amount(sum(self.lrd.iter().map(|d| d.amount_deposited)), Currency::Lrd);
        table.with_total(["", "TOTAL", usd_total.as_str(), lrd_total.as_str(), "", "", ""])
    }
}

impl ReportBody for MagistrateBody {
    const KIND: DocumentKind = DocumentKind::Magistrate;

    fn line_item_count(&self) -> usize {
        self.deposits.len()
    }

    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.magistrate_name.clone()];
        for deposit in &self.deposits {
            if !fields.contains(&deposit.court) {
                fields.push(deposit.court.clone());
            }
        }
        fields
    }

    fn layout(&self, ctx: &RecordContext<'_>) -> Vec<Block> {
        let mut blocks = letterhead(ctx.court);
        blocks.push(Block::centered(format!("QUARTERLY REPORT, {}, A.D.{}", ctx.term_label(), ctx.year)));
        blocks.push(Block::gap(8));

        for (i, group) in self.groups().iter().enumerate() {
            blocks.push(Block::left(format!(
                "{}.{} CITY MAGISTERIAL COURT:",
                i + 1,
                group.name.to_uppercase()
            )));
            blocks.push(group.table().into());
            blocks.push(Block::gap(15));
        }
        blocks
    }
}
