use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "Jan.", "Feb.", "Mar.", "Apr.", "May", "Jun.", "Jul.", "Aug.", "Sep.", "Oct.", "Nov.", "Dec.",
];

/// `D Mon. YYYY`, e.g. `5 Jan. 2025`. Fixed table, never locale dependent.
pub fn format_date(date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{} {} {}", date.day(), month, date.year())
}

/// Missing dates render as an empty cell
pub fn format_optional(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_default()
}
