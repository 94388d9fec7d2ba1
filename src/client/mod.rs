//! REST collaborator adapter. The backend owns persistence and is the
//! security boundary; this layer only shapes requests and maps failures onto
//! the crate's error taxonomy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ReportError, ReportResult};
use crate::session::Session;
use crate::submission::{Attachment, ReportBody, Submission};
use crate::types::{DocumentKind, Recipient};

/// Body of a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Court {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: Attachment,
}

/// One method per backend endpoint. Mutating calls return nothing: callers
/// re-fetch the authoritative record afterwards.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> ReportResult<LoginResponse>;

    async fn courts(&self, session: &Session) -> ReportResult<Vec<Court>>;

    async fn add_court(&self, session: &Session, name: &str) -> ReportResult<()>;

    async fn delete_court(&self, session: &Session, id: &str) -> ReportResult<()>;

    async fn create<B: ReportBody>(&self, session: &Session, record: &Submission<B>) -> ReportResult<Submission<B>>;

    async fn list_mine<B: ReportBody>(&self, session: &Session) -> ReportResult<Vec<Submission<B>>>;

    async fn list_for_reviewer<B: ReportBody>(
        &self,
        session: &Session,
        recipient: Recipient,
        court: &str,
    ) -> ReportResult<Vec<Submission<B>>>;

    async fn get<B: ReportBody>(&self, session: &Session, id: &str) -> ReportResult<Submission<B>>;

    async fn replace<B: ReportBody>(&self, session: &Session, id: &str, record: &Submission<B>) -> ReportResult<()>;

    async fn submit(&self, session: &Session, kind: DocumentKind, id: &str, recipient: Recipient) -> ReportResult<()>;

    async fn approve(&self, session: &Session, kind: DocumentKind, recipient: Recipient, id: &str) -> ReportResult<()>;

    async fn reject(
        &self,
        session: &Session,
        kind: DocumentKind,
        recipient: Recipient,
        id: &str,
        reason: &str,
    ) -> ReportResult<()>;

    async fn resubmit(&self, session: &Session, kind: DocumentKind, id: &str) -> ReportResult<()>;

    async fn remove(&self, session: &Session, kind: DocumentKind, id: &str) -> ReportResult<()>;

    async fn upload(
        &self,
        session: &Session,
        kind: DocumentKind,
        record_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ReportResult<Attachment>;

    async fn delete_file(&self, session: &Session, kind: DocumentKind, record_id: &str, url: &str) -> ReportResult<()>;
}

/// `ReportStore` over HTTP
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base: Url,
    upload_timeout: Duration,
    log_requests: bool,
}

impl HttpStore {
    pub fn new(config: &ApiConfig) -> ReportResult<Self> {
        Self::with_base_url(&config.base_url, config)
    }

    pub fn with_base_url(base_url: &str, config: &ApiConfig) -> ReportResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| ReportError::validation(format!("invalid API base url '{}': {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ReportError::validation(format!("API base url '{}' cannot hold paths", base_url)));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ReportError::network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base,
            upload_timeout: config.upload_timeout(),
            log_requests: config.enable_request_logging,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `{base}/api/{segments..}` with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> ReportResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ReportError::validation("API base url cannot hold paths"))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, session: Option<&Session>) -> RequestBuilder {
        if self.log_requests {
            tracing::debug!("{} {}", method, url);
        }
        let builder = self.client.request(method, url);
        match session {
            Some(s) => builder.header(reqwest::header::AUTHORIZATION, s.bearer()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ReportResult<Response> {
        let response = builder.send().await.map_err(|e| {
            let err = ReportError::from(e);
            tracing::warn!("Request failed: {}", err);
            err
        })?;

        let status = response.status();
        if self.log_requests {
            tracing::debug!("{} {}", status.as_u16(), response.url());
        }
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = backend_message(&text)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        Err(ReportError::from_status(status.as_u16(), message))
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ReportResult<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!("Unexpected backend payload: {}", e);
            ReportError::from(e)
        })
    }

    async fn patch(&self, session: &Session, segments: &[&str], body: Value) -> ReportResult<()> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::PATCH, url, Some(session)).json(&body))
            .await?;
        Ok(())
    }
}

/// Backends report failures under `msg`, `error` or `message`
fn backend_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["msg", "error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl ReportStore for HttpStore {
    async fn login(&self, username: &str, password: &str) -> ReportResult<LoginResponse> {
        let url = self.endpoint(&["auth", "login"])?;
        let body = json!({ "username": username, "password": password });
        self.json(self.request(Method::POST, url, None).json(&body)).await
    }

    async fn courts(&self, session: &Session) -> ReportResult<Vec<Court>> {
        let url = self.endpoint(&["courts"])?;
        self.json(self.request(Method::GET, url, Some(session))).await
    }

    async fn add_court(&self, session: &Session, name: &str) -> ReportResult<()> {
        let url = self.endpoint(&["courts"])?;
        self.send(self.request(Method::POST, url, Some(session)).json(&json!({ "name": name })))
            .await?;
        Ok(())
    }

    async fn delete_court(&self, session: &Session, id: &str) -> ReportResult<()> {
        let url = self.endpoint(&["courts", id])?;
        self.send(self.request(Method::DELETE, url, Some(session))).await?;
        Ok(())
    }

    async fn create<B: ReportBody>(&self, session: &Session, record: &Submission<B>) -> ReportResult<Submission<B>> {
        let url = self.endpoint(&[B::KIND.collection()])?;
        let body = record.to_wire()?;
        self.json(self.request(Method::POST, url, Some(session)).json(&body)).await
    }

    async fn list_mine<B: ReportBody>(&self, session: &Session) -> ReportResult<Vec<Submission<B>>> {
        let url = self.endpoint(&[B::KIND.collection(), "my"])?;
        self.json(self.request(Method::GET, url, Some(session))).await
    }

    async fn list_for_reviewer<B: ReportBody>(
        &self,
        session: &Session,
        recipient: Recipient,
        court: &str,
    ) -> ReportResult<Vec<Submission<B>>> {
        let mut url = self.endpoint(&[B::KIND.collection(), recipient.as_path(), "all"])?;
        url.query_pairs_mut().append_pair("court", court);
        self.json(self.request(Method::GET, url, Some(session))).await
    }

    async fn get<B: ReportBody>(&self, session: &Session, id: &str) -> ReportResult<Submission<B>> {
        let url = self.endpoint(&[B::KIND.collection(), id])?;
        self.json(self.request(Method::GET, url, Some(session))).await
    }

    async fn replace<B: ReportBody>(&self, session: &Session, id: &str, record: &Submission<B>) -> ReportResult<()> {
        let url = self.endpoint(&[B::KIND.collection(), id])?;
        let body = record.to_wire()?;
        self.send(self.request(Method::PUT, url, Some(session)).json(&body))
            .await?;
        Ok(())
    }

    async fn submit(&self, session: &Session, kind: DocumentKind, id: &str, recipient: Recipient) -> ReportResult<()> {
        self.patch(session, &[kind.collection(), "submit", id], json!({ "recipient": recipient }))
            .await
    }

    async fn approve(&self, session: &Session, kind: DocumentKind, recipient: Recipient, id: &str) -> ReportResult<()> {
        self.patch(session, &[kind.collection(), recipient.as_path(), "view", id], json!({}))
            .await
    }

    async fn reject(
        &self,
        session: &Session,
        kind: DocumentKind,
        recipient: Recipient,
        id: &str,
        reason: &str,
    ) -> ReportResult<()> {
        self.patch(
            session,
            &[kind.collection(), recipient.as_path(), "reject", id],
            json!({ "reason": reason }),
        )
        .await
    }

    async fn resubmit(&self, session: &Session, kind: DocumentKind, id: &str) -> ReportResult<()> {
        self.patch(session, &[kind.collection(), "resubmit", id], json!({})).await
    }

    async fn remove(&self, session: &Session, kind: DocumentKind, id: &str) -> ReportResult<()> {
        self.patch(session, &[kind.collection(), "remove", id], json!({})).await
    }

    async fn upload(
        &self,
        session: &Session,
        kind: DocumentKind,
        record_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ReportResult<Attachment> {
        let url = self.endpoint(&[kind.collection(), "upload"])?;
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("docketId", record_id.to_string());

        let builder = self
            .request(Method::POST, url, Some(session))
            .timeout(self.upload_timeout)
            .multipart(form);
        let response: UploadResponse = self.json(builder).await?;
        Ok(response.file)
    }

    async fn delete_file(&self, session: &Session, kind: DocumentKind, record_id: &str, url: &str) -> ReportResult<()> {
        let endpoint = self.endpoint(&[kind.collection(), "delete-file"])?;
        let body = json!({ "url": url, "docketId": record_id });
        self.send(self.request(Method::DELETE, endpoint, Some(session)).json(&body))
            .await?;
        Ok(())
    }
}
