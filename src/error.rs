// Report Error Types
use serde_json::{json, Value};
use thiserror::Error;

/// Failure of a single portal action. Every variant is scoped to the action
/// that produced it; none of them is fatal to the process.
#[derive(Debug, Error)]
pub enum ReportError {
    // Actor's role, court or authorship does not permit the action
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    // Transition violates the submission lifecycle
    #[error("Invalid state: {0}")]
    State(String),

    // Missing required field or line item, caught before any network call
    #[error("Validation failed: {0}")]
    Validation(String),

    // Caller must complete a prior step (e.g. pick a court) first
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // Transient transport failures, retried manually by the user
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    // Backend answered with an unexpected non-2xx status
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ReportError::NotAuthorized(msg) => msg.clone(),
            ReportError::State(msg) => msg.clone(),
            ReportError::Validation(msg) => msg.clone(),
            ReportError::Precondition(msg) => msg.clone(),
            ReportError::NotFound(msg) => msg.clone(),
            ReportError::Network(msg) => msg.clone(),
            ReportError::Timeout(msg) => msg.clone(),
            ReportError::Backend { message, .. } => message.clone(),
            ReportError::Decode(msg) => msg.clone(),
            ReportError::Io(err) => err.to_string(),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ReportError::NotAuthorized(_) => "NOT_AUTHORIZED",
            ReportError::State(_) => "STATE_ERROR",
            ReportError::Validation(_) => "VALIDATION_ERROR",
            ReportError::Precondition(_) => "PRECONDITION_ERROR",
            ReportError::NotFound(_) => "NOT_FOUND",
            ReportError::Network(_) => "NETWORK_ERROR",
            ReportError::Timeout(_) => "TIMEOUT",
            ReportError::Backend { .. } => "BACKEND_ERROR",
            ReportError::Decode(_) => "DECODE_ERROR",
            ReportError::Io(_) => "IO_ERROR",
        }
    }

    /// Only transport failures are worth a manual retry; local state is
    /// never assumed to have changed after one.
    pub fn is_transient(&self) -> bool {
        matches!(self, ReportError::Network(_) | ReportError::Timeout(_))
    }

    /// Convert to JSON body for machine-readable output
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "error_code": self.error_code(),
        });
        if let ReportError::Backend { status, .. } = self {
            body["status"] = json!(status);
        }
        body
    }

    /// Map a non-2xx backend status onto the taxonomy
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => ReportError::Validation(message),
            401 | 403 => ReportError::NotAuthorized(message),
            404 => ReportError::NotFound(message),
            408 | 504 => ReportError::Timeout(message),
            409 => ReportError::State(message),
            _ => ReportError::Backend { status, message },
        }
    }
}

// Static constructor methods
impl ReportError {
    pub fn not_authorized(message: impl Into<String>) -> Self {
        ReportError::NotAuthorized(message.into())
    }

    pub fn state(message: impl Into<String>) -> Self {
        ReportError::State(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ReportError::Validation(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        ReportError::Precondition(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ReportError::NotFound(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        ReportError::Network(message.into())
    }
}

// Convert other error types to ReportError
impl From<reqwest::Error> for ReportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ReportError::Timeout(err.to_string())
        } else if err.is_decode() {
            ReportError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ReportError::from_status(status.as_u16(), err.to_string())
        } else {
            ReportError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Decode(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ReportError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => ReportError::not_authorized("session expired"),
            _ => ReportError::not_authorized(format!("invalid credential: {}", err)),
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
