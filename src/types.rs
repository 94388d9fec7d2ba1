/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

/// Portal roles carried in the bearer credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Court Admin")]
    CourtAdmin,
    #[serde(rename = "Circuit Clerk")]
    CircuitClerk,
    #[serde(rename = "Chief Justice")]
    ChiefJustice,
}

impl Role {
    /// Reviewer track this role acts on, if any
    pub fn reviewer_track(&self) -> Option<Recipient> {
        match self {
            Role::CourtAdmin => Some(Recipient::Admin),
            Role::ChiefJustice => Some(Recipient::Chief),
            Role::CircuitClerk => None,
        }
    }

    pub fn is_reviewer(&self) -> bool {
        self.reviewer_track().is_some()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::CourtAdmin => "Court Admin",
            Role::CircuitClerk => "Circuit Clerk",
            Role::ChiefJustice => "Chief Justice",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reviewer a submission is routed to. Each recipient is an independent track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recipient {
    Admin,
    Chief,
}

impl Recipient {
    pub const ALL: [Recipient; 2] = [Recipient::Admin, Recipient::Chief];

    /// Role that reviews this track
    pub fn reviewer_role(&self) -> Role {
        match self {
            Recipient::Admin => Role::CourtAdmin,
            Recipient::Chief => Role::ChiefJustice,
        }
    }

    /// Path segment used by the reviewer endpoints
    pub fn as_path(&self) -> &'static str {
        match self {
            Recipient::Admin => "admin",
            Recipient::Chief => "chief",
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

impl FromStr for Recipient {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "court admin" => Ok(Recipient::Admin),
            "chief" | "chief justice" => Ok(Recipient::Chief),
            other => Err(ReportError::validation(format!("unknown recipient '{}'", other))),
        }
    }
}

/// The six document types sharing the submission lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Returns,
    Jury,
    Magistrate,
    CriminalDocket,
    CivilDocket,
    CourtFee,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::Returns,
        DocumentKind::Jury,
        DocumentKind::Magistrate,
        DocumentKind::CriminalDocket,
        DocumentKind::CivilDocket,
        DocumentKind::CourtFee,
    ];

    /// REST collection name owned by the backend
    pub fn collection(&self) -> &'static str {
        match self {
            DocumentKind::Returns => "returns",
            DocumentKind::Jury => "jury-reports",
            DocumentKind::Magistrate => "magistrate-reports",
            DocumentKind::CriminalDocket => "criminal-dockets",
            DocumentKind::CivilDocket => "civil-dockets",
            DocumentKind::CourtFee => "court-fees",
        }
    }

    /// Prefix of the exported file name
    pub fn file_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Returns => "ReturnsReport",
            DocumentKind::Jury => "JuryReport",
            DocumentKind::Magistrate => "MagistrateReport",
            DocumentKind::CriminalDocket => "CriminalDocket",
            DocumentKind::CivilDocket => "CivilDocket",
            DocumentKind::CourtFee => "CourtFeesReport",
        }
    }

    /// Returns and magistrate collections store the term as `May Term`
    pub fn suffixes_term(&self) -> bool {
        matches!(self, DocumentKind::Returns | DocumentKind::Magistrate)
    }

    /// Term as this kind stores and prints it
    pub fn term_label(&self, term: Term) -> String {
        if self.suffixes_term() {
            format!("{} Term", term)
        } else {
            term.to_string()
        }
    }

    /// Plural used in combined export names, e.g. `All_Criminal_Dockets_<court>.pdf`
    pub fn plural_title(&self) -> &'static str {
        match self {
            DocumentKind::Returns => "Returns_Reports",
            DocumentKind::Jury => "Jury_Reports",
            DocumentKind::Magistrate => "Magistrate_Reports",
            DocumentKind::CriminalDocket => "Criminal_Dockets",
            DocumentKind::CivilDocket => "Civil_Dockets",
            DocumentKind::CourtFee => "Court_Fee_Reports",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Returns => "returns report",
            DocumentKind::Jury => "jury payroll",
            DocumentKind::Magistrate => "magistrate report",
            DocumentKind::CriminalDocket => "criminal docket",
            DocumentKind::CivilDocket => "civil docket",
            DocumentKind::CourtFee => "court fee report",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Court term. The wire accepts both `February` and `February Term`; see
/// `DocumentKind::term_label` for the form each collection stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    #[serde(alias = "February Term")]
    February,
    #[serde(alias = "May Term")]
    May,
    #[serde(alias = "August Term")]
    August,
    #[serde(alias = "November Term")]
    November,
}

impl Term {
    pub fn as_str(&self) -> &'static str {
        match self {
            Term::February => "February",
            Term::May => "May",
            Term::August => "August",
            Term::November => "November",
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Term {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let normalized = lowered.trim_end_matches("term").trim();
        match normalized {
            "february" => Ok(Term::February),
            "may" => Ok(Term::May),
            "august" => Ok(Term::August),
            "november" => Ok(Term::November),
            _ => Err(ReportError::validation(format!("unknown term '{}'", s))),
        }
    }
}

/// Currency tag on monetary line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "LRD", alias = "LD")]
    Lrd,
}

impl Currency {
    /// Prefix used when rendering amounts
    pub fn prefix(&self) -> &'static str {
        match self {
            Currency::Usd => "US$",
            Currency::Lrd => "LD$",
        }
    }
}
