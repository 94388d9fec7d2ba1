//! Back-references from a record to files held by the storage collaborator.
//! Attaching or detaching never moves the record through its lifecycle.

use crate::error::{ReportError, ReportResult};
use crate::lifecycle::ensure_editable;
use crate::session::Session;
use crate::submission::{Attachment, ReportBody, Submission};

pub fn attach<B: ReportBody>(record: &mut Submission<B>, actor: &Session, attachment: Attachment) -> ReportResult<()> {
    ensure_editable(record, actor)?;
    if attachment.url.trim().is_empty() {
        return Err(ReportError::validation("attachment url is required"));
    }
    if record.attachments.iter().any(|a| a.url == attachment.url) {
        return Ok(());
    }
    record.attachments.push(attachment);
    Ok(())
}

/// Returns whether a reference was removed. A missing reference is not an error.
pub fn detach<B: ReportBody>(record: &mut Submission<B>, actor: &Session, url: &str) -> ReportResult<bool> {
    ensure_editable(record, actor)?;
    let before = record.attachments.len();
    record.attachments.retain(|a| a.url != url);
    Ok(record.attachments.len() != before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::finalize;
    use crate::testing::{clerk_session, sample_civil_docket};

    #[test]
    fn attach_and_detach_on_a_draft() {
        let clerk = clerk_session("u1", "Ganta");
        let mut record = sample_civil_docket("u1", "Ganta", 1);

        attach(&mut record, &clerk, Attachment::new("/uploads/slip.pdf", "slip.pdf")).unwrap();
        attach(&mut record, &clerk, Attachment::new("/uploads/slip.pdf", "slip.pdf")).unwrap();
        assert_eq!(record.attachments.len(), 1);

        assert!(detach(&mut record, &clerk, "/uploads/slip.pdf").unwrap());
        assert!(!detach(&mut record, &clerk, "/uploads/slip.pdf").unwrap());
        assert!(record.attachments.is_empty());
        assert!(!record.lifecycle.finalized);
    }

    #[test]
    fn finalized_record_refuses_changes() {
        let clerk = clerk_session("u1", "Ganta");
        let mut record = sample_civil_docket("u1", "Ganta", 1);
        record.attachments.push(Attachment::new("/uploads/a.pdf", "a.pdf"));
        finalize(&mut record, &clerk).unwrap();

        let err = attach(&mut record, &clerk, Attachment::new("/uploads/b.pdf", "b.pdf")).unwrap_err();
        assert!(matches!(err, ReportError::State(_)));
        assert!(matches!(detach(&mut record, &clerk, "/uploads/a.pdf"), Err(ReportError::State(_))));
        assert_eq!(record.attachments.len(), 1);
    }

    #[test]
    fn other_clerks_cannot_attach() {
        let mut record = sample_civil_docket("u1", "Ganta", 1);
        let err = attach(&mut record, &clerk_session("u2", "Ganta"), Attachment::new("/x", "x")).unwrap_err();
        assert!(matches!(err, ReportError::NotAuthorized(_)));
    }
}
