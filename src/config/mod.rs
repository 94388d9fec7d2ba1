use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub user_agent: String,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// When set, credentials are signature-verified locally. The backend stays
    /// the security boundary either way.
    pub jwt_secret: Option<String>,
    pub expiry_leeway_secs: u64,
}

/// Page geometry for document export, in the renderer's vertical units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub page_top: u32,
    pub page_content_threshold: u32,
    pub line_height: u32,
    pub row_height: u32,
    pub table_gap: u32,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_top: 20,
            page_content_threshold: 280,
            line_height: 7,
            row_height: 8,
            table_gap: 15,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("API_BASE_URL") {
            self.api.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("API_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }
        if let Ok(v) = env::var("API_UPLOAD_TIMEOUT_SECS") {
            self.api.upload_timeout_secs = v.parse().unwrap_or(self.api.upload_timeout_secs);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_JWT_SECRET") {
            self.session.jwt_secret = if v.trim().is_empty() { None } else { Some(v) };
        }
        if let Ok(v) = env::var("SESSION_EXPIRY_LEEWAY_SECS") {
            self.session.expiry_leeway_secs = v.parse().unwrap_or(self.session.expiry_leeway_secs);
        }

        // Export overrides
        if let Ok(v) = env::var("EXPORT_PAGE_TOP") {
            self.export.page_top = v.parse().unwrap_or(self.export.page_top);
        }
        if let Ok(v) = env::var("EXPORT_PAGE_CONTENT_THRESHOLD") {
            self.export.page_content_threshold = v.parse().unwrap_or(self.export.page_content_threshold);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:5000".to_string(),
                request_timeout_secs: 30,
                upload_timeout_secs: 30,
                user_agent: format!("ers/{}", env!("CARGO_PKG_VERSION")),
                enable_request_logging: true,
            },
            session: SessionConfig {
                jwt_secret: None,
                expiry_leeway_secs: 60,
            },
            export: ExportConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.ers.example.com".to_string(),
                request_timeout_secs: 30,
                upload_timeout_secs: 30,
                user_agent: format!("ers/{}", env!("CARGO_PKG_VERSION")),
                enable_request_logging: true,
            },
            session: SessionConfig {
                jwt_secret: None,
                expiry_leeway_secs: 30,
            },
            export: ExportConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://ers-backend-f.onrender.com".to_string(),
                request_timeout_secs: 30,
                upload_timeout_secs: 30,
                user_agent: format!("ers/{}", env!("CARGO_PKG_VERSION")),
                enable_request_logging: false,
            },
            session: SessionConfig {
                jwt_secret: None,
                expiry_leeway_secs: 0,
            },
            export: ExportConfig::default(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
