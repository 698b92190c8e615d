//! Configuration types for examprep-client

use crate::error::{Error, Result};
use crate::types::SortKey;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding [`ApiConfig::base_url`]
pub const ENV_API_BASE_URL: &str = "EXAMPREP_API_BASE_URL";

/// Environment variable overriding [`SessionConfig::path`]
pub const ENV_SESSION_PATH: &str = "EXAMPREP_SESSION_PATH";

/// Remote service settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (None = wait indefinitely)
    #[serde(default, with = "optional_duration_serde")]
    pub request_timeout: Option<Duration>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: None,
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Parse the base URL, normalized to end with a slash so relative joins
    /// keep the path prefix (`.../api` + `articles` = `.../api/articles`)
    pub fn parsed_base_url(&self) -> Result<url::Url> {
        let trimmed = self.base_url.trim();
        if trimmed.is_empty() {
            return Err(Error::Config {
                message: "base URL must not be empty".to_string(),
                key: Some("api.base_url".to_string()),
            });
        }
        let with_slash = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        url::Url::parse(&with_slash).map_err(|e| Error::Config {
            message: format!("invalid base URL {trimmed:?}: {e}"),
            key: Some("api.base_url".to_string()),
        })
    }

    /// Check the settings without building a client
    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url().map(|_| ())
    }
}

/// Where the authenticated session is persisted
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// JSON file holding the session (default: "./.examprep/user.json")
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

/// Defaults for the article list
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Initial page size (default: 6)
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Page sizes offered to the user (default: 6, 12, 24)
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,

    /// Initial sort order (default: newest first)
    #[serde(default)]
    pub default_sort: SortKey,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            default_sort: SortKey::default(),
        }
    }
}

/// Top-level client configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote service settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Session persistence settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Article list defaults
    #[serde(default)]
    pub listing: ListingConfig,
}

impl Config {
    /// Default configuration with environment overrides applied
    ///
    /// Reads [`ENV_API_BASE_URL`] and [`ENV_SESSION_PATH`]; blank values are ignored.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.api.validate()?;
        Ok(config)
    }

    /// Overlay environment variables onto this configuration
    pub fn apply_env(&mut self) {
        if let Some(url) = non_blank_env(ENV_API_BASE_URL) {
            tracing::debug!(base_url = %url, "base URL overridden from environment");
            self.api.base_url = url;
        }
        if let Some(path) = non_blank_env(ENV_SESSION_PATH) {
            self.session.path = PathBuf::from(path);
        }
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_base_url() -> String {
    "https://exam-prep-backend-lwhw.onrender.com/api".to_string()
}

fn default_user_agent() -> String {
    concat!("examprep-client/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_session_path() -> PathBuf {
    PathBuf::from(".examprep").join("user.json")
}

fn default_page_size() -> usize {
    6
}

fn default_page_size_options() -> Vec<usize> {
    vec![6, 12, 24]
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
