use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::HttpStore;
use crate::config::config;
use crate::service::ReportService;
use crate::session::Session;

/// Login state kept between invocations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub token: Option<String>,
    pub username: Option<String>,
    pub selected_court: Option<String>,
    /// Overrides the configured API base url
    pub api_url: Option<String>,
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| config().api.base_url.clone())
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("ERS_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("ers").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session_state() -> anyhow::Result<SessionState> {
    let session_file = get_config_dir()?.join("session.json");

    if !session_file.exists() {
        return Ok(SessionState::default());
    }

    let content = fs::read_to_string(session_file)?;
    let state: SessionState = serde_json::from_str(&content)?;
    Ok(state)
}

pub fn save_session_state(state: &SessionState) -> anyhow::Result<()> {
    let session_file = get_config_dir()?.join("session.json");

    let content = serde_json::to_string_pretty(state)?;
    fs::write(session_file, content)?;
    Ok(())
}

pub fn http_store(state: &SessionState) -> anyhow::Result<HttpStore> {
    Ok(HttpStore::with_base_url(&state.api_url(), &config().api)?)
}

/// Rebuilds the service from the saved credential and court selection
pub fn connect() -> anyhow::Result<(ReportService<HttpStore>, SessionState)> {
    let state = load_session_state()?;
    let token = state
        .token
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run 'ers auth login <username>' first"))?;

    let session = Session::restore(token, state.selected_court.clone(), &config().session)?;
    if session.is_expired_at(Utc::now()) {
        anyhow::bail!("Session expired. Run 'ers auth login' again");
    }

    let service = ReportService::new(http_store(&state)?, session);
    Ok((service, state))
}
