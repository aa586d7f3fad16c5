//! Client Configuration
//!
//! JSON config file with environment variable overrides.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::backend::{GraphQlAuth, GraphQlBackend};

/// Looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "amplify-notes.json";

const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("No GraphQL endpoint configured")]
    MissingEndpoint,
    #[error("Failed to set up backend: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// GraphQL endpoint URL; unset means run against the in-memory backend
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
    /// Username whose events the subscription delivers
    pub owner: Option<String>,
    /// 0 disables remote polling
    pub poll_interval_ms: u64,
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            auth_token: None,
            owner: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            log_dir: None,
            log_level: "info".to_string(),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl ClientConfig {
    /// Load from `path` (or `DEFAULT_CONFIG_FILE` if present), then apply the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.with_overrides(std::env::vars())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source: io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| write_err(io::Error::other(e)))?;
        fs::write(path, json).map_err(write_err)
    }

    /// Apply `NOTES_*` variables from `vars`
    pub fn with_overrides<I>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "NOTES_ENDPOINT" => self.endpoint = non_empty(value),
                "NOTES_API_KEY" => self.api_key = non_empty(value),
                "NOTES_AUTH_TOKEN" => self.auth_token = non_empty(value),
                "NOTES_OWNER" => self.owner = non_empty(value),
                "NOTES_LOG_DIR" => self.log_dir = non_empty(value).map(PathBuf::from),
                "NOTES_LOG_LEVEL" => self.log_level = value.trim().to_string(),
                "NOTES_POLL_INTERVAL_MS" => {
                    self.poll_interval_ms = value.trim().parse().map_err(|_| {
                        ConfigError::InvalidValue {
                            key: "NOTES_POLL_INTERVAL_MS",
                            value: value.clone(),
                        }
                    })?;
                }
                _ => {}
            }
        }
        Ok(self)
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_ms > 0).then(|| Duration::from_millis(self.poll_interval_ms))
    }

    /// API key wins when both credentials are set
    pub fn auth(&self) -> GraphQlAuth {
        match (&self.api_key, &self.auth_token) {
            (Some(key), _) => GraphQlAuth::ApiKey(key.clone()),
            (None, Some(token)) => GraphQlAuth::Token(token.clone()),
            (None, None) => GraphQlAuth::None,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("amplify-notes").join("logs"))
    }

    /// GraphQL backend for the configured endpoint
    pub fn graphql_backend(&self) -> Result<GraphQlBackend, ConfigError> {
        let endpoint = self.endpoint.as_deref().ok_or(ConfigError::MissingEndpoint)?;
        let backend = GraphQlBackend::new(endpoint, self.auth())
            .map_err(|e| ConfigError::Backend(e.to_string()))?;
        Ok(backend
            .with_owner(self.owner.clone())
            .with_poll_interval(self.poll_interval()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert!(config.endpoint.is_none());
        assert_eq!(config.poll_interval(), Some(Duration::from_millis(5000)));
        assert_eq!(config.auth(), GraphQlAuth::None);
        assert!(matches!(config.graphql_backend(), Err(ConfigError::MissingEndpoint)));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"endpoint":"https://example.com/graphql","apiKey":"da2-key"}"#).unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("https://example.com/graphql"));
        assert_eq!(config.auth(), GraphQlAuth::ApiKey("da2-key".to_string()));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.poll_interval_ms, 5000);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = ClientConfig {
            owner: Some("alice".to_string()),
            poll_interval_ms: 0,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = ClientConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.poll_interval(), None);
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::default()
            .with_overrides(vars(&[
                ("NOTES_ENDPOINT", "https://api.example.com/graphql"),
                ("NOTES_AUTH_TOKEN", "jwt"),
                ("NOTES_OWNER", "  bob "),
                ("NOTES_POLL_INTERVAL_MS", "250"),
                ("NOTES_LOG_LEVEL", "debug"),
                ("UNRELATED", "ignored"),
            ]))
            .unwrap();

        assert_eq!(config.endpoint.as_deref(), Some("https://api.example.com/graphql"));
        assert_eq!(config.auth(), GraphQlAuth::Token("jwt".to_string()));
        assert_eq!(config.owner.as_deref(), Some("bob"));
        assert_eq!(config.poll_interval(), Some(Duration::from_millis(250)));
        assert_eq!(config.log_level, "debug");
        assert!(config.graphql_backend().is_ok());
    }

    #[test]
    fn test_empty_env_value_unsets() {
        let config = ClientConfig {
            endpoint: Some("https://old".to_string()),
            ..Default::default()
        }
        .with_overrides(vars(&[("NOTES_ENDPOINT", "")]))
        .unwrap();
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_invalid_poll_interval() {
        let result = ClientConfig::default().with_overrides(vars(&[("NOTES_POLL_INTERVAL_MS", "soon")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "NOTES_POLL_INTERVAL_MS", .. })
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClientConfig::from_file(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
