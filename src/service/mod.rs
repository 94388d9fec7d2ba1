//! Action boundary. Every action fetches the authoritative record, runs the
//! local lifecycle check, performs the backend call and re-fetches. Nothing
//! is mutated optimistically; after any failure the caller re-fetches.

use futures::future::try_join_all;
use serde::Serialize;

use crate::attachment;
use crate::client::{Court, ReportStore};
use crate::config::{ExportConfig, SessionConfig};
use crate::error::{ReportError, ReportResult};
use crate::export::{self, layout::Document};
use crate::filter::{retain_visible, SearchQuery};
use crate::lifecycle::{self, Transition};
use crate::session::Session;
use crate::submission::{ReportBody, Submission};
use crate::types::{Recipient, Term};

/// User-visible outcome of an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl Notice {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), error_code: None }
    }

    pub fn failed(err: &ReportError) -> Self {
        Self {
            success: false,
            message: err.message(),
            error_code: Some(err.error_code()),
        }
    }

    pub fn from_result<T>(result: &ReportResult<T>, success: impl Into<String>) -> Self {
        match result {
            Ok(_) => Self::ok(success),
            Err(err) => Self::failed(err),
        }
    }
}

pub struct ReportService<S: ReportStore> {
    store: S,
    session: Session,
}

impl<S: ReportStore> ReportService<S> {
    pub fn new(store: S, session: Session) -> Self {
        Self { store, session }
    }

    pub async fn login(store: S, username: &str, password: &str, config: &SessionConfig) -> ReportResult<Self> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ReportError::validation("username and password are required"));
        }
        let response = store.login(username.trim(), password).await?;
        let session = Session::from_token(&response.token, config)?;
        tracing::info!("Logged in as {} ({})", session.username(), session.role());
        Ok(Self::new(store, session))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    // Courts

    pub async fn courts(&self) -> ReportResult<Vec<Court>> {
        self.store.courts(&self.session).await
    }

    /// Reviewers pick one of the backend's courts
    pub async fn select_court(&mut self, name: &str) -> ReportResult<()> {
        if self.session.role().is_reviewer() {
            let courts = self.courts().await?;
            if !courts.iter().any(|c| c.name == name.trim()) {
                return Err(ReportError::not_found(format!("court '{}' does not exist", name.trim())));
            }
        }
        self.session.select_court(name)
    }

    pub async fn add_court(&self, name: &str) -> ReportResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ReportError::validation("court name is required"));
        }
        self.store.add_court(&self.session, name).await?;
        tracing::info!("Court '{}' added", name);
        Ok(())
    }

    pub async fn delete_court(&mut self, name: &str) -> ReportResult<()> {
        let courts = self.courts().await?;
        let court = courts
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ReportError::not_found(format!("court '{}' does not exist", name)))?;
        self.store.delete_court(&self.session, &court.id).await?;
        if self.session.selected_court() == Some(name) && self.session.role().is_reviewer() {
            self.session.clear_court();
        }
        tracing::info!("Court '{}' deleted", name);
        Ok(())
    }

    // Queries

    /// The actor's role-scoped list, optionally narrowed by a search
    pub async fn list<B: ReportBody>(&self, query: &SearchQuery) -> ReportResult<Vec<Submission<B>>> {
        let court = self.session.require_court()?;
        let records = match self.session.role().reviewer_track() {
            None => self.store.list_mine::<B>(&self.session).await?,
            Some(track) => self.store.list_for_reviewer::<B>(&self.session, track, court).await?,
        };
        let records = retain_visible(&self.session, records)?;
        Ok(query.apply(records))
    }

    pub async fn get<B: ReportBody>(&self, id: &str) -> ReportResult<Submission<B>> {
        self.store.get::<B>(&self.session, id).await
    }

    pub async fn fetch_many<B: ReportBody>(&self, ids: &[String]) -> ReportResult<Vec<Submission<B>>> {
        try_join_all(ids.iter().map(|id| self.store.get::<B>(&self.session, id))).await
    }

    // Clerk actions

    pub async fn create<B: ReportBody>(&self, term: Term, year: i32, body: B) -> ReportResult<Submission<B>> {
        let draft = Submission::new_draft(&self.session, term, year, body)?;
        let created = self.store.create(&self.session, &draft).await?;
        tracing::info!("Created {} {}", B::KIND, created.id.as_deref().unwrap_or("?"));
        Ok(created)
    }

    /// Applies `change` to an editable record and saves it
    pub async fn edit<B, F>(&self, id: &str, change: F) -> ReportResult<Submission<B>>
    where
        B: ReportBody,
        F: FnOnce(&mut Submission<B>) -> ReportResult<()> + Send,
    {
        let mut record = self.get::<B>(id).await?;
        lifecycle::ensure_editable(&record, &self.session)?;
        change(&mut record)?;
        lifecycle::ensure_editable(&record, &self.session)?;

        self.store.replace(&self.session, id, &record).await?;
        tracing::info!("Saved {} {}", B::KIND, id);
        self.get(id).await
    }

    pub async fn update_period<B: ReportBody>(&self, id: &str, term: Term, year: i32) -> ReportResult<Submission<B>> {
        let session = &self.session;
        self.edit::<B, _>(id, |record| lifecycle::update_period(record, session, term, year))
            .await
    }

    /// Finalizing is a full save with the finalized flag raised
    pub async fn finalize<B: ReportBody>(&self, id: &str) -> ReportResult<Submission<B>> {
        let mut record = self.get::<B>(id).await?;
        lifecycle::finalize(&mut record, &self.session)?;
        self.store.replace(&self.session, id, &record).await?;
        self.transitioned::<B>(Transition::Finalize, id).await
    }

    pub async fn submit<B: ReportBody>(&self, id: &str, recipient: Recipient) -> ReportResult<Submission<B>> {
        let mut record = self.get::<B>(id).await?;
        lifecycle::submit(&mut record, recipient, &self.session)?;
        self.store.submit(&self.session, B::KIND, id, recipient).await?;
        self.transitioned::<B>(Transition::Submit(recipient), id).await
    }

    pub async fn resubmit<B: ReportBody>(&self, id: &str) -> ReportResult<Submission<B>> {
        let mut record = self.get::<B>(id).await?;
        lifecycle::resubmit(&mut record, &self.session)?;
        self.store.resubmit(&self.session, B::KIND, id).await?;
        self.transitioned::<B>(Transition::Resubmit, id).await
    }

    pub async fn remove<B: ReportBody>(&self, id: &str) -> ReportResult<Submission<B>> {
        let mut record = self.get::<B>(id).await?;
        lifecycle::remove(&mut record, &self.session)?;
        self.store.remove(&self.session, B::KIND, id).await?;
        self.transitioned::<B>(Transition::Remove, id).await
    }

    // Reviewer actions

    fn track(&self) -> ReportResult<Recipient> {
        self.session
            .role()
            .reviewer_track()
            .ok_or_else(|| ReportError::not_authorized(format!("{} does not review submissions", self.session.role())))
    }

    pub async fn approve<B: ReportBody>(&self, id: &str) -> ReportResult<Submission<B>> {
        let recipient = self.track()?;
        let mut record = self.get::<B>(id).await?;
        lifecycle::approve(&mut record, recipient, &self.session)?;
        self.store.approve(&self.session, B::KIND, recipient, id).await?;
        self.transitioned::<B>(Transition::Approve(recipient), id).await
    }

    pub async fn reject<B: ReportBody>(&self, id: &str, reason: &str) -> ReportResult<Submission<B>> {
        let recipient = self.track()?;
        let mut record = self.get::<B>(id).await?;
        lifecycle::reject(&mut record, recipient, reason, &self.session)?;
        self.store
            .reject(&self.session, B::KIND, recipient, id, reason.trim())
            .await?;
        self.transitioned::<B>(Transition::Reject(recipient), id).await
    }

    async fn transitioned<B: ReportBody>(&self, transition: Transition, id: &str) -> ReportResult<Submission<B>> {
        tracing::info!("{} {} {}", transition, B::KIND, id);
        self.get(id).await
    }

    // Attachments

    pub async fn attach<B: ReportBody>(&self, id: &str, file_name: &str, bytes: Vec<u8>) -> ReportResult<Submission<B>> {
        let record = self.get::<B>(id).await?;
        lifecycle::ensure_editable(&record, &self.session)?;

        let uploaded = self
            .store
            .upload(&self.session, B::KIND, id, file_name, bytes)
            .await?;
        tracing::info!("Uploaded '{}' for {} {}", uploaded.name, B::KIND, id);

        // the upload endpoint may already have linked the file
        let mut record = self.get::<B>(id).await?;
        if !record.attachments.iter().any(|a| a.url == uploaded.url) {
            attachment::attach(&mut record, &self.session, uploaded)?;
            self.store.replace(&self.session, id, &record).await?;
        }
        self.get(id).await
    }

    /// Returns the re-fetched record and whether a reference was removed.
    /// The reference is dropped before the file, so a failed save never
    /// leaves the record pointing at a deleted file.
    pub async fn detach<B: ReportBody>(&self, id: &str, url: &str) -> ReportResult<(Submission<B>, bool)> {
        let mut record = self.get::<B>(id).await?;
        if !attachment::detach(&mut record, &self.session, url)? {
            return Ok((record, false));
        }

        self.store.replace(&self.session, id, &record).await?;
        if let Err(err) = self.store.delete_file(&self.session, B::KIND, id, url).await {
            tracing::warn!("Detached '{}' from {} {} but the file was kept: {}", url, B::KIND, id, err);
        }
        tracing::info!("Detached '{}' from {} {}", url, B::KIND, id);
        Ok((self.get(id).await?, true))
    }

    // Export

    pub async fn export<B: ReportBody>(&self, id: &str, config: &ExportConfig) -> ReportResult<Document> {
        let record = self.get::<B>(id).await?;
        Ok(export::document(&record, config))
    }

    /// Combined export of every non-rejected record in the reviewer's queue
    pub async fn export_all<B: ReportBody>(&self, config: &ExportConfig) -> ReportResult<Document> {
        self.track()?;
        let court = self.session.require_court()?.to_string();
        let records = self.list::<B>(&SearchQuery::default()).await?;
        export::combined_for_review(&records, &court, config)
    }
}
