use crate::error::ReportResult;
use crate::session::Session;
use crate::submission::{ReportBody, Submission};
use crate::types::Recipient;

/// Which records an actor may act on. Pure and total: every record is
/// either admitted or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    /// Own records the clerk has not removed
    Clerk { actor_id: &'a str },
    /// Records of the selected court routed to the reviewer's track
    Reviewer { track: Recipient, court: &'a str },
}

impl<'a> View<'a> {
    pub fn for_session(actor: &'a Session) -> ReportResult<Self> {
        let court = actor.require_court()?;
        Ok(match actor.role().reviewer_track() {
            Some(track) => View::Reviewer { track, court },
            None => View::Clerk { actor_id: actor.actor_id() },
        })
    }

    pub fn admits<B: ReportBody>(&self, record: &Submission<B>) -> bool {
        match *self {
            View::Clerk { actor_id } => {
                record.author_id() == Some(actor_id) && !record.lifecycle.removed_by_clerk
            }
            View::Reviewer { track, court } => {
                record.court == court && record.lifecycle.submitted_to(track) && record.submitted_by.is_some()
            }
        }
    }
}

pub fn visible<'r, B: ReportBody>(
    actor: &Session,
    records: &'r [Submission<B>],
) -> ReportResult<Vec<&'r Submission<B>>> {
    let view = View::for_session(actor)?;
    Ok(records.iter().filter(|r| view.admits(*r)).collect())
}

/// Owned variant used on freshly fetched lists
pub fn retain_visible<B: ReportBody>(
    actor: &Session,
    mut records: Vec<Submission<B>>,
) -> ReportResult<Vec<Submission<B>>> {
    let view = View::for_session(actor)?;
    let before = records.len();
    records.retain(|r| view.admits(r));
    tracing::debug!("{} of {} records visible to {}", records.len(), before, actor.role());
    Ok(records)
}
