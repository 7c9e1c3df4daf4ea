//! Runtime configuration for embedding applications.
//!
//! Values come from environment variables or a JSON document; anything left
//! out falls back to development defaults.

use crate::logging::{default_log_level, parse_level};
use crate::upload::PROFILE_IMAGE_DIR;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "ONGNET_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ONGNET_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ONGNET_LOG_DIR";
pub const ENV_MEDIA_BASE_URL: &str = "API_URL";

pub const DEFAULT_MEDIA_BASE_URL: &str = "http://localhost:5001";

/// Where stored media is served from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Prefix joined to relative image paths when building URLs.
    pub base_url: String,
    /// Directory prefix of generated profile image paths.
    #[serde(skip)]
    pub upload_prefix: &'static str,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MEDIA_BASE_URL.to_string(),
            upload_prefix: PROFILE_IMAGE_DIR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// `None` means an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub media: MediaConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            media: MediaConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Reads `ONGNET_DB_PATH`, `ONGNET_LOG_LEVEL`, `ONGNET_LOG_DIR` and `API_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parses a JSON document; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Json)?;
        config.validated()
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::default();
        if let Some(path) = non_blank(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(path.trim()));
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = non_blank(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(url) = lookup(ENV_MEDIA_BASE_URL) {
            config.media.base_url = url;
        }
        config.validated()
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        self.log_level = parse_level(&self.log_level)
            .map_err(ConfigError::InvalidLogLevel)?
            .to_string();

        let base_url = self.media.base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ConfigError::EmptyMediaBaseUrl);
        }
        self.media.base_url = base_url.to_string();
        self.media.upload_prefix = PROFILE_IMAGE_DIR;
        Ok(self)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    InvalidLogLevel(String),
    EmptyMediaBaseUrl,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid config json: {err}"),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::EmptyMediaBaseUrl => write!(f, "media base url cannot be empty"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidLogLevel(_) | Self::EmptyMediaBaseUrl => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DEFAULT_MEDIA_BASE_URL};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = CoreConfig::from_lookup(lookup_from(&[])).expect("defaults");
        assert_eq!(config.db_path, None);
        assert_eq!(config.media.base_url, DEFAULT_MEDIA_BASE_URL);
        assert_eq!(config.media.upload_prefix, "profiles");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            ("ONGNET_DB_PATH", "/var/lib/ongnet/app.db"),
            ("ONGNET_LOG_LEVEL", "WARNING"),
            ("API_URL", "https://api.example.org/"),
        ]))
        .expect("env config");
        assert_eq!(config.db_path, Some(PathBuf::from("/var/lib/ongnet/app.db")));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.media.base_url, "https://api.example.org");
    }

    #[test]
    fn blank_media_url_is_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[("API_URL", "  ")]))
            .expect_err("blank url must fail");
        assert!(matches!(err, ConfigError::EmptyMediaBaseUrl));
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = CoreConfig::from_json_str(r#"{"log_level":"error","media":{}}"#)
            .expect("json config");
        assert_eq!(config.log_level, "error");
        assert_eq!(config.media.base_url, DEFAULT_MEDIA_BASE_URL);

        let err = CoreConfig::from_json_str(r#"{"log_level":"loud"}"#).expect_err("bad level");
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));
        assert!(matches!(
            CoreConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }
}
