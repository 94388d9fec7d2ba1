//! Fixtures shared by unit tests: locally minted credentials and sample
//! records of each kind.

use chrono::{NaiveDate, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal::Decimal;

use crate::config::SessionConfig;
use crate::session::{Claims, Session};
use crate::submission::{
    Author, CaseType, CivilCase, CivilDocketBody, CourtFeeBody, Deposit, FeeEntry, Lifecycle,
    MagistrateBody, ReportBody, ReturnsBody, ReturnsCase, Submission,
};
use crate::types::{Currency, Role, Term};

pub const TEST_SECRET: &str = "court-reports-test-secret";

/// HS256 credential expiring `exp_offset_secs` from now
pub fn mint_token(id: &str, username: &str, role: Role, court: Option<&str>, exp_offset_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        id: id.to_string(),
        username: username.to_string(),
        role,
        circuit_court: court.map(str::to_string),
        exp: now + exp_offset_secs,
        iat: now,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET.as_bytes()))
        .expect("test token encodes")
}

pub fn verified_config() -> SessionConfig {
    SessionConfig {
        jwt_secret: Some(TEST_SECRET.to_string()),
        expiry_leeway_secs: 0,
    }
}

pub fn clerk_session(id: &str, court: &str) -> Session {
    let token = mint_token(id, &format!("clerk-{}", id), Role::CircuitClerk, Some(court), 3600);
    Session::from_token(&token, &verified_config()).expect("clerk token decodes")
}

fn reviewer_session(id: &str, role: Role, court: &str) -> Session {
    let token = mint_token(id, id, role, None, 3600);
    let mut session = Session::from_token(&token, &verified_config()).expect("reviewer token decodes");
    session.select_court(court).expect("court selectable");
    session
}

pub fn admin_session(court: &str) -> Session {
    reviewer_session("admin", Role::CourtAdmin, court)
}

pub fn chief_session(court: &str) -> Session {
    reviewer_session("chief", Role::ChiefJustice, court)
}

fn sample<B: ReportBody>(author: &str, court: &str, body: B) -> Submission<B> {
    Submission {
        id: Some(format!("{}-{}-{}", B::KIND.collection(), author, court.to_lowercase())),
        court: court.to_string(),
        term: Term::February,
        year: 2025,
        submitted_by: Some(Author::User {
            id: author.to_string(),
            username: format!("clerk-{}", author),
        }),
        attachments: Vec::new(),
        lifecycle: Lifecycle::default(),
        body,
    }
}

fn filed(day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 2, day.clamp(1, 28))
}

pub fn sample_civil_docket(author: &str, court: &str, cases: usize) -> Submission<CivilDocketBody> {
    let cases = (1..=cases)
        .map(|n| CivilCase {
            plaintiff: format!("Plaintiff {}", n),
            defendant: format!("Defendant {}", n),
            action: "Debt".to_string(),
            date_filed: filed(n as u32),
            amount_deposited: Decimal::new(2500, 2),
        })
        .collect();

    sample(
        author,
        court,
        CivilDocketBody {
            judge_name: "Hon. J. Kollie".to_string(),
            clerk_name: "M. Dolo".to_string(),
            cases,
        },
    )
}

pub fn sample_returns(author: &str, court: &str) -> Submission<ReturnsBody> {
    sample(
        author,
        court,
        ReturnsBody {
            judge_name: "Hon. J. Kollie".to_string(),
            cases: vec![
                ReturnsCase {
                    case_type: CaseType::Criminal,
                    case_title: "RL vs. Flomo".to_string(),
                    crime_or_action: "Theft of property".to_string(),
                    disposition: "Convicted".to_string(),
                    jury_info: "Petit Jury, 12".to_string(),
                    cost_fine_amount: "US$50, R-118".to_string(),
                    remarks: String::new(),
                },
                ReturnsCase {
                    case_type: CaseType::Civil,
                    case_title: "Gono vs. Mulbah".to_string(),
                    crime_or_action: "Ejectment".to_string(),
                    disposition: "Settled".to_string(),
                    jury_info: String::new(),
                    cost_fine_amount: String::new(),
                    remarks: "Out of court".to_string(),
                },
            ],
        },
    )
}

pub fn sample_court_fee(author: &str, court: &str, entries: usize) -> Submission<CourtFeeBody> {
    let entries = (1..=entries)
        .map(|n| FeeEntry {
            payee_name: format!("Payee {}", n),
            description: "Fine".to_string(),
            amount: Decimal::from(10 * n as i64),
            bank_name: "LBDI".to_string(),
            receipt_number: format!("R-{:03}", n),
            date: filed(n as u32),
        })
        .collect();

    sample(
        author,
        court,
        CourtFeeBody {
            judge_name: "Hon. J. Kollie".to_string(),
            entries,
        },
    )
}

pub fn sample_magistrate(author: &str, court: &str) -> Submission<MagistrateBody> {
    let deposit = |payee: &str, amount: i64, currency: Currency, sub_court: &str| Deposit {
        payee_name: payee.to_string(),
        amount_deposited: Decimal::from(amount),
        currency,
        bank_name: "Ecobank".to_string(),
        bank_slip_no: format!("S-{}", amount),
        cba_no: String::new(),
        court: sub_court.to_string(),
    };

    sample(
        author,
        court,
        MagistrateBody {
            magistrate_name: "A. Zayzay".to_string(),
            deposits: vec![
                deposit("Kromah", 40, Currency::Usd, "Saclepea"),
                deposit("Kromah", 7000, Currency::Lrd, "Saclepea"),
                deposit("Wleh", 25, Currency::Usd, court),
            ],
        },
    )
}
