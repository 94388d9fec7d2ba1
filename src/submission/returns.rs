use serde::{Deserialize, Serialize};

use crate::export::layout::{Block, Table};
use crate::export::{or_dash, RecordContext};
use crate::types::DocumentKind;

use super::ReportBody;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseType {
    #[default]
    Criminal,
    Civil,
}

impl CaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::Criminal => "Criminal",
            CaseType::Civil => "Civil",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReturnsCase {
    pub case_type: CaseType,
    pub case_title: String,
    pub crime_or_action: String,
    pub disposition: String,
    /// Comma separated jury panel and reference number
    pub jury_info: String,
    /// Comma separated fee and receipt
    pub cost_fine_amount: String,
    pub remarks: String,
}

impl ReturnsCase {
    fn jury_column(&self) -> String {
        let mut parts = self.jury_info.split(',').map(str::trim);
        let first = parts.next().filter(|p| !p.is_empty()).unwrap_or("NONE");
        match self.case_type {
            CaseType::Civil => {
                let second = parts.next().filter(|p| !p.is_empty()).unwrap_or("NONE");
                format!("{} | {}", first, second)
            }
            CaseType::Criminal => first.to_string(),
        }
    }

    fn fees_column(&self) -> String {
        let joined = self
            .cost_fine_amount
            .split(',')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(" ");
        or_dash(joined.trim())
    }
}

/// Returns to assignment: the judge's summary of cases disposed during a term
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReturnsBody {
    pub judge_name: String,
    pub cases: Vec<ReturnsCase>,
}

impl ReportBody for ReturnsBody {
    const KIND: DocumentKind = DocumentKind::Returns;
    const COURT_FIELD: &'static str = "circuitCourt";

    fn line_item_count(&self) -> usize {
        self.cases.len()
    }

    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.judge_name.clone()];
        fields.extend(self.cases.iter().map(|c| c.case_title.clone()));
        fields
    }

    fn layout(&self, ctx: &RecordContext<'_>) -> Vec<Block> {
        // the first case decides the table's wording
        let case_type = self.cases.first().map(|c| c.case_type);
        let heading = case_type
            .map(|t| t.as_str().to_uppercase())
            .unwrap_or_else(|| "CASES".to_string());
        let crime_column = match case_type {
            Some(CaseType::Civil) => "Action",
            _ => "Crime",
        };

        let mut table = Table::new([
            "No.",
            "Case Title",
            crime_column,
            "Disposition",
            "Jury Panel / Ref#",
            "Fees / Receipt",
            "Remarks",
        ]);
        for (i, case) in self.cases.iter().enumerate() {
            table = table.row([
                (i + 1).to_string(),
                or_dash(&case.case_title),
                or_dash(&case.crime_or_action),
                or_dash(&case.disposition),
                case.jury_column(),
                case.fees_column(),
                or_dash(&case.remarks),
            ]);
        }

        vec![
            Block::centered("JUDICIARY BRANCH OF GOVERNMENT"),
            Block::centered("\u{201c}RETURNS TO ASSIGNMENT\u{201d}"),
            Block::left(format!("COURT: {}", or_dash(ctx.court))),
            Block::left(format!("TERM: {} {}", ctx.term_label(), ctx.year)),
            Block::left(format!("JUDGE: {}", or_dash(&self.judge_name))),
            Block::left(format!("CLERK: {}", or_dash(ctx.submitted_by.unwrap_or_default()))),
            Block::centered(format!("SUMMARY CASE REPORTING FOR {} CASES:", heading)),
            table.into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(case_type: CaseType, jury: &str, fees: &str) -> ReturnsCase {
        ReturnsCase {
            case_type,
            case_title: "Republic vs. Flomo".into(),
            crime_or_action: "Theft".into(),
            disposition: "Convicted".into(),
            jury_info: jury.into(),
            cost_fine_amount: fees.into(),
            remarks: String::new(),
        }
    }

    #[test]
    fn civil_jury_column_shows_both_parts() {
        assert_eq!(case(CaseType::Civil, "Panel 3,REF-12", "").jury_column(), "Panel 3 | REF-12");
        assert_eq!(case(CaseType::Civil, "", "").jury_column(), "NONE | NONE");
    }

    #[test]
    fn criminal_jury_column_shows_first_part_only() {
        assert_eq!(case(CaseType::Criminal, "Panel 1,REF-9", "").jury_column(), "Panel 1");
        assert_eq!(case(CaseType::Criminal, "", "").jury_column(), "NONE");
    }

    #[test]
    fn fee_parts_are_joined_with_spaces() {
        assert_eq!(case(CaseType::Criminal, "", "US$50,R-0091").fees_column(), "US$50 R-0091");
        assert_eq!(case(CaseType::Criminal, "", "").fees_column(), "-");
    }

    #[test]
    fn decodes_form_payload() {
        let body: ReturnsBody = serde_json::from_value(serde_json::json!({
            "judgeName": "Hon. Kollie",
            "cases": [{ "caseType": "Civil", "caseTitle": "Doe vs. Roe", "remarks": "settled" }]
        }))
        .unwrap();
        assert_eq!(body.cases[0].case_type, CaseType::Civil);
        assert_eq!(body.line_item_count(), 1);
    }
}
