//! Submission lifecycle. One engine shared by every document kind; the
//! admin and chief tracks are independent automata over the same record.
//!
//! Every operation runs all of its checks before writing a single field, so
//! a refused transition leaves the record untouched.

use serde::Serialize;
use std::fmt;

use crate::error::{ReportError, ReportResult};
use crate::session::Session;
use crate::submission::{Lifecycle, ReportBody, Submission};
use crate::types::{Recipient, Role, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "action", content = "recipient", rename_all = "lowercase")]
pub enum Transition {
    Finalize,
    Submit(Recipient),
    Approve(Recipient),
    Reject(Recipient),
    Resubmit,
    Remove,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Finalize => f.write_str("finalize"),
            Transition::Submit(r) => write!(f, "submit to {}", r),
            Transition::Approve(r) => write!(f, "approve as {}", r),
            Transition::Reject(r) => write!(f, "reject as {}", r),
            Transition::Resubmit => f.write_str("resubmit"),
            Transition::Remove => f.write_str("remove"),
        }
    }
}

fn refused<B: ReportBody>(transition: Transition, record: &Submission<B>, err: ReportError) -> ReportError {
    tracing::warn!(
        "Refused {} on {} {}: {}",
        transition,
        B::KIND,
        record.id.as_deref().unwrap_or("(unsaved)"),
        err
    );
    err
}

/// Actor must be the clerk who authored the record
fn require_author<B: ReportBody>(record: &Submission<B>, actor: &Session) -> ReportResult<()> {
    if actor.role() != Role::CircuitClerk {
        return Err(ReportError::not_authorized(format!(
            "only the authoring clerk may change a {}",
            B::KIND
        )));
    }
    if !record.is_authored_by(actor) {
        return Err(ReportError::not_authorized(format!("{} was authored by another clerk", B::KIND)));
    }
    Ok(())
}

/// Actor must review `recipient`'s track in the record's court
fn require_reviewer<B: ReportBody>(record: &Submission<B>, recipient: Recipient, actor: &Session) -> ReportResult<()> {
    if actor.role().reviewer_track() != Some(recipient) {
        return Err(ReportError::not_authorized(format!(
            "{} cannot act on the {} track",
            actor.role(),
            recipient
        )));
    }
    let court = actor.require_court()?;
    if record.court != court {
        return Err(ReportError::not_authorized(format!(
            "record belongs to {}, not the selected court {}",
            record.court, court
        )));
    }
    Ok(())
}

/// Gate for replacing the detail payload or attachments
pub fn ensure_editable<B: ReportBody>(record: &Submission<B>, actor: &Session) -> ReportResult<()> {
    require_author(record, actor)?;
    if !record.is_editable() {
        return Err(ReportError::state(format!(
            "{} is finalized; it can only be edited after a rejection",
            B::KIND
        )));
    }
    Ok(())
}

/// Change the reporting period, only while the record is editable
pub fn update_period<B: ReportBody>(
    record: &mut Submission<B>,
    actor: &Session,
    term: Term,
    year: i32,
) -> ReportResult<()> {
    ensure_editable(record, actor)?;
    if !(1900..=9999).contains(&year) {
        return Err(ReportError::validation(format!("invalid year {}", year)));
    }
    record.term = term;
    record.year = year;
    Ok(())
}

pub fn finalize<B: ReportBody>(record: &mut Submission<B>, actor: &Session) -> ReportResult<()> {
    let check = || -> ReportResult<()> {
        require_author(record, actor)?;
        if actor.user().court.as_deref() != Some(record.court.as_str()) {
            return Err(ReportError::not_authorized(format!(
                "{} belongs to {}, outside the clerk's court",
                B::KIND,
                record.court
            )));
        }
        record.body.validate_for_finalize()
    };
    check().map_err(|e| refused(Transition::Finalize, record, e))?;

    let lc = &mut record.lifecycle;
    lc.finalized = true;
    lc.rejected = false;
    lc.rejection_reason.clear();
    Ok(())
}

pub fn submit<B: ReportBody>(record: &mut Submission<B>, recipient: Recipient, actor: &Session) -> ReportResult<()> {
    let check = || -> ReportResult<()> {
        require_author(record, actor)?;
        if record.lifecycle.rejected {
            return Err(ReportError::state("a rejected record must be resubmitted and finalized first"));
        }
        if !record.lifecycle.finalized {
            return Err(ReportError::state("finalize the record before submitting it"));
        }
        Ok(())
    };
    check().map_err(|e| refused(Transition::Submit(recipient), record, e))?;

    record.lifecycle.set_submitted(recipient);
    Ok(())
}

pub fn approve<B: ReportBody>(record: &mut Submission<B>, recipient: Recipient, actor: &Session) -> ReportResult<()> {
    let check = || -> ReportResult<()> {
        require_reviewer(record, recipient, actor)?;
        if record.lifecycle.rejected {
            return Err(ReportError::state("a rejected record cannot be approved"));
        }
        if !record.lifecycle.submitted_to(recipient) {
            return Err(ReportError::state(format!("record was not submitted to {}", recipient)));
        }
        Ok(())
    };
    check().map_err(|e| refused(Transition::Approve(recipient), record, e))?;

    record.lifecycle.set_viewed(recipient);
    Ok(())
}

/// Leaves routing and approval flags as they are; `rejected` overrides
/// any approval when the status is displayed.
pub fn reject<B: ReportBody>(
    record: &mut Submission<B>,
    recipient: Recipient,
    reason: &str,
    actor: &Session,
) -> ReportResult<()> {
    let reason = reason.trim();
    let check = || -> ReportResult<()> {
        require_reviewer(record, recipient, actor)?;
        if reason.is_empty() {
            return Err(ReportError::validation("a rejection reason is required"));
        }
        if !record.lifecycle.finalized && !record.lifecycle.submitted_to(recipient) {
            return Err(ReportError::state("only finalized or submitted records can be rejected"));
        }
        Ok(())
    };
    check().map_err(|e| refused(Transition::Reject(recipient), record, e))?;

    let lc = &mut record.lifecycle;
    lc.rejected = true;
    lc.rejection_reason = reason.to_string();
    Ok(())
}

/// Rejected back to draft. Routing flags stay set.
pub fn resubmit<B: ReportBody>(record: &mut Submission<B>, actor: &Session) -> ReportResult<()> {
    let check = || -> ReportResult<()> {
        require_author(record, actor)?;
        if !record.lifecycle.rejected {
            return Err(ReportError::state("only rejected records can be resubmitted"));
        }
        Ok(())
    };
    check().map_err(|e| refused(Transition::Resubmit, record, e))?;

    let lc = &mut record.lifecycle;
    lc.rejected = false;
    lc.rejection_reason.clear();
    lc.finalized = false;
    Ok(())
}

/// Hides the record from its author's list. Nothing else changes.
pub fn remove<B: ReportBody>(record: &mut Submission<B>, actor: &Session) -> ReportResult<()> {
    require_author(record, actor).map_err(|e| refused(Transition::Remove, record, e))?;
    record.lifecycle.removed_by_clerk = true;
    Ok(())
}

/// Single derived status shown wherever a record is listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DisplayStatus {
    Draft,
    Finalized,
    PendingAdmin,
    PendingChief,
    ApprovedByAdmin,
    ApprovedByChief,
    ApprovedByBoth,
    Rejected,
}

impl DisplayStatus {
    pub fn of(lc: &Lifecycle) -> Self {
        if lc.rejected {
            return DisplayStatus::Rejected;
        }
        if !lc.finalized {
            return DisplayStatus::Draft;
        }
        match (lc.admin_viewed, lc.chief_viewed) {
            (true, true) => DisplayStatus::ApprovedByBoth,
            (true, false) => DisplayStatus::ApprovedByAdmin,
            (false, true) => DisplayStatus::ApprovedByChief,
            (false, false) if lc.submitted_to_admin => DisplayStatus::PendingAdmin,
            (false, false) if lc.submitted_to_chief => DisplayStatus::PendingChief,
            (false, false) => DisplayStatus::Finalized,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DisplayStatus::Draft => "Draft",
            DisplayStatus::Finalized => "Finalized",
            DisplayStatus::PendingAdmin => "Pending (Admin)",
            DisplayStatus::PendingChief => "Pending (Chief)",
            DisplayStatus::ApprovedByAdmin => "Approved (Admin)",
            DisplayStatus::ApprovedByChief => "Approved (Chief)",
            DisplayStatus::ApprovedByBoth => "Approved",
            DisplayStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<B: ReportBody> Submission<B> {
    pub fn status(&self) -> DisplayStatus {
        DisplayStatus::of(&self.lifecycle)
    }
}

/// Transitions the actor can take on the record right now
pub fn available_actions<B: ReportBody>(record: &Submission<B>, actor: &Session) -> Vec<Transition> {
    let lc = &record.lifecycle;
    let mut actions = Vec::new();

    match actor.role().reviewer_track() {
        None => {
            if !record.is_authored_by(actor) {
                return actions;
            }
            if record.is_editable() && record.line_item_count() > 0 {
                actions.push(Transition::Finalize);
            }
            if lc.finalized && !lc.rejected {
                for recipient in Recipient::ALL {
                    if !lc.submitted_to(recipient) {
                        actions.push(Transition::Submit(recipient));
                    }
                }
            }
            if lc.rejected {
                actions.push(Transition::Resubmit);
            }
            if !lc.removed_by_clerk {
                actions.push(Transition::Remove);
            }
        }
        Some(track) => {
            let in_court = actor.selected_court() == Some(record.court.as_str());
            if in_court && lc.submitted_to(track) && !lc.rejected && !lc.viewed_by(track) {
                actions.push(Transition::Approve(track));
                actions.push(Transition::Reject(track));
            }
        }
    }
    actions
}
