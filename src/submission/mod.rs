pub mod court_fee;
pub mod docket;
pub mod jury;
pub mod magistrate;
pub mod returns;
pub mod wire;

pub use court_fee::{CourtFeeBody, FeeEntry};
pub use docket::{CivilCase, CivilDocketBody, CriminalCase, CriminalDocketBody};
pub use jury::{JurorEntry, JurorType, JuryBody, JuryCase, JuryType};
pub use magistrate::{Deposit, MagistrateBody};
pub use returns::{CaseType, ReturnsBody, ReturnsCase};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReportError, ReportResult};
use crate::export::layout::Block;
use crate::export::RecordContext;
use crate::session::Session;
use crate::types::{DocumentKind, Recipient, Role, Term};

/// The invariant-bearing flags shared by every document kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lifecycle {
    pub finalized: bool,
    pub rejected: bool,
    #[serde(deserialize_with = "wire::null_as_default")]
    pub rejection_reason: String,
    pub submitted_to_admin: bool,
    pub submitted_to_chief: bool,
    pub admin_viewed: bool,
    pub chief_viewed: bool,
    pub removed_by_clerk: bool,
}

impl Lifecycle {
    pub fn submitted_to(&self, recipient: Recipient) -> bool {
        match recipient {
            Recipient::Admin => self.submitted_to_admin,
            Recipient::Chief => self.submitted_to_chief,
        }
    }

    pub fn viewed_by(&self, recipient: Recipient) -> bool {
        match recipient {
            Recipient::Admin => self.admin_viewed,
            Recipient::Chief => self.chief_viewed,
        }
    }

    pub(crate) fn set_submitted(&mut self, recipient: Recipient) {
        match recipient {
            Recipient::Admin => self.submitted_to_admin = true,
            Recipient::Chief => self.submitted_to_chief = true,
        }
    }

    pub(crate) fn set_viewed(&mut self, recipient: Recipient) {
        match recipient {
            Recipient::Admin => self.admin_viewed = true,
            Recipient::Chief => self.chief_viewed = true,
        }
    }
}

/// Authoring clerk. The backend returns either a bare id or a populated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    User {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        #[serde(default)]
        username: String,
    },
    Id(String),
}

impl Author {
    pub fn id(&self) -> &str {
        match self {
            Author::User { id, .. } => id,
            Author::Id(id) => id,
        }
    }

    /// Username when populated, otherwise the id
    pub fn display_name(&self) -> &str {
        match self {
            Author::User { username, .. } if !username.is_empty() => username,
            other => other.id(),
        }
    }
}

/// Reference to an uploaded file held by the storage collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    #[serde(rename = "originalname", alias = "originalName", alias = "filename", alias = "name", default)]
    pub name: String,
}

impl Attachment {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self { url: url.into(), name: name.into() }
    }
}

/// Variant-specific payload of a submission: the line-item schema plus the
/// export grouping rule. Opaque to the state machine.
pub trait ReportBody: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: DocumentKind;

    /// Wire name of the court attribute
    const COURT_FIELD: &'static str = "court";

    fn line_item_count(&self) -> usize;

    /// Checked by finalize before any field is written
    fn validate_for_finalize(&self) -> ReportResult<()> {
        if self.line_item_count() == 0 {
            return Err(ReportError::validation("no line items"));
        }
        Ok(())
    }

    /// Free-text values matched by list search
    fn search_fields(&self) -> Vec<String>;

    /// Lays the record out as export blocks, letterhead included
    fn layout(&self, ctx: &RecordContext<'_>) -> Vec<Block>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(serialize = "B: ReportBody", deserialize = "B: ReportBody"))]
pub struct Submission<B: ReportBody> {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "circuitCourt", default)]
    pub court: String,
    pub term: Term,
    #[serde(deserialize_with = "wire::year")]
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<Author>,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub attachments: Vec<Attachment>,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
    #[serde(flatten)]
    pub body: B,
}

impl<B: ReportBody> Submission<B> {
    /// New draft authored by the session's clerk, stamped with the clerk's
    /// assigned court.
    pub fn new_draft(actor: &Session, term: Term, year: i32, body: B) -> ReportResult<Self> {
        if actor.role() != Role::CircuitClerk {
            return Err(ReportError::not_authorized(format!(
                "only circuit clerks create a {}",
                B::KIND
            )));
        }
        let court = actor
            .user()
            .court
            .clone()
            .ok_or_else(|| ReportError::precondition("clerk has no assigned court"))?;

        Ok(Self {
            id: None,
            court,
            term,
            year,
            submitted_by: Some(Author::User {
                id: actor.actor_id().to_string(),
                username: actor.username().to_string(),
            }),
            attachments: Vec::new(),
            lifecycle: Lifecycle::default(),
            body,
        })
    }

    pub fn kind(&self) -> DocumentKind {
        B::KIND
    }

    pub fn id(&self) -> ReportResult<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| ReportError::precondition(format!("{} has not been saved yet", B::KIND)))
    }

    pub fn author_id(&self) -> Option<&str> {
        self.submitted_by.as_ref().map(Author::id)
    }

    pub fn is_authored_by(&self, actor: &Session) -> bool {
        self.author_id() == Some(actor.actor_id())
    }

    /// Editable by the author while a draft, or again once rejected
    pub fn is_editable(&self) -> bool {
        !self.lifecycle.finalized || self.lifecycle.rejected
    }

    pub fn line_item_count(&self) -> usize {
        self.body.line_item_count()
    }

    pub fn context(&self) -> RecordContext<'_> {
        RecordContext {
            kind: B::KIND,
            court: &self.court,
            term: self.term,
            year: self.year,
            submitted_by: self.submitted_by.as_ref().map(Author::display_name),
        }
    }

    /// JSON body for create and replace requests, with the court attribute
    /// and the term in the form the collection expects.
    pub fn to_wire(&self) -> ReportResult<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.remove("_id");
            map.insert("term".to_string(), Value::String(B::KIND.term_label(self.term)));
            if B::COURT_FIELD != "court" {
                if let Some(court) = map.remove("court") {
                    map.insert(B::COURT_FIELD.to_string(), court);
                }
            }
            if let Some(author) = self.author_id() {
                map.insert("submittedBy".to_string(), Value::String(author.to_string()));
            }
        }
        Ok(value)
    }
}
