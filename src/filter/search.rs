use crate::submission::{ReportBody, Submission};

/// Case-insensitive substring search over a record list. Matches court,
/// term, year and the body's own searchable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches<B: ReportBody>(&self, record: &Submission<B>) -> bool {
        if self.is_empty() {
            return true;
        }
        let hit = |value: &str| value.to_lowercase().contains(&self.needle);

        hit(record.court.as_str())
            || hit(&B::KIND.term_label(record.term))
            || record.year.to_string().contains(&self.needle)
            || record.body.search_fields().iter().any(|f| hit(f.as_str()))
    }

    pub fn apply<B: ReportBody>(&self, records: Vec<Submission<B>>) -> Vec<Submission<B>> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
