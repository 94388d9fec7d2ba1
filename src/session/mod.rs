use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::error::{ReportError, ReportResult};
use crate::types::Role;

/// Claims carried by the bearer credential issued at login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub circuit_court: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// Authenticated actor resolved from the credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub role: Role,
    /// Assigned court. Only clerks carry one.
    pub court: Option<String>,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
            role: claims.role,
            court: claims.circuit_court.filter(|c| !c.trim().is_empty()),
        }
    }
}

/// Explicit session context, built once at login and dropped at logout.
/// Passed to the query layer and the state machine instead of ambient state.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    user: SessionUser,
    selected_court: Option<String>,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Decode and validate a bearer credential
    pub fn from_token(token: &str, config: &SessionConfig) -> ReportResult<Self> {
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
        if token.is_empty() {
            return Err(ReportError::not_authorized("empty credential"));
        }

        let claims = decode_claims(token, config)?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| ReportError::not_authorized("credential expiry out of range"))?;

        let user = SessionUser::from(claims);
        tracing::debug!("Session resolved for {} ({})", user.username, user.role);

        Ok(Self {
            token: token.to_string(),
            user,
            selected_court: None,
            expires_at,
        })
    }

    /// Restore a session together with a previously selected court
    pub fn restore(token: &str, selected_court: Option<String>, config: &SessionConfig) -> ReportResult<Self> {
        let mut session = Self::from_token(token, config)?;
        if let Some(court) = selected_court {
            if session.user.role.is_reviewer() {
                session.select_court(court)?;
            }
        }
        Ok(session)
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub fn actor_id(&self) -> &str {
        &self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// `Authorization` header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Reviewers pick a court after login; clerks are bound to their own
    pub fn needs_court_selection(&self) -> bool {
        self.user.role.is_reviewer() && self.selected_court.is_none()
    }

    /// Court the actor currently works in. For clerks this is always the
    /// assigned court.
    pub fn selected_court(&self) -> Option<&str> {
        match self.user.role {
            Role::CircuitClerk => self.user.court.as_deref(),
            Role::CourtAdmin | Role::ChiefJustice => self.selected_court.as_deref(),
        }
    }

    pub fn require_court(&self) -> ReportResult<&str> {
        self.selected_court()
            .ok_or_else(|| ReportError::precondition("no court selected"))
    }

    pub fn select_court(&mut self, court: impl Into<String>) -> ReportResult<()> {
        let court = court.into();
        let court = court.trim();
        if court.is_empty() {
            return Err(ReportError::validation("court name is required"));
        }

        match self.user.role {
            Role::CircuitClerk => {
                if self.user.court.as_deref() == Some(court) {
                    Ok(())
                } else {
                    Err(ReportError::not_authorized("clerks can only work in their assigned court"))
                }
            }
            Role::CourtAdmin | Role::ChiefJustice => {
                tracing::info!("{} selected court '{}'", self.user.username, court);
                self.selected_court = Some(court.to_string());
                Ok(())
            }
        }
    }

    pub fn clear_court(&mut self) {
        self.selected_court = None;
    }
}

fn decode_claims(token: &str, config: &SessionConfig) -> ReportResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = config.expiry_leeway_secs;
    validation.validate_aud = false;

    let key = match config.jwt_secret.as_deref() {
        Some(secret) => DecodingKey::from_secret(secret.as_bytes()),
        None => {
            validation.insecure_disable_signature_validation();
            DecodingKey::from_secret(&[])
        }
    };

    let data = decode::<Claims>(token, &key, &validation)?;
    Ok(data.claims)
}
