//! Configuration management using the prefer crate for discovery.
//!
//! A config file (`a11y-analyzer.toml`, `.yaml` or `.json`) is optional.
//! Backend credentials normally come from the environment; see
//! `providers::ProviderSettings` for the variable names.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::providers::AiConfig;

/// Name used for config file discovery.
pub const CONFIG_NAME: &str = "a11y-analyzer";

/// Default server bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default upload limit in MiB.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 25;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum upload size in MiB.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_max_upload_mb() -> usize {
    DEFAULT_MAX_UPLOAD_MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.max(1) * 1024 * 1024
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// File this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path, or discover one with prefer.
    ///
    /// An explicit path must exist and parse. A discovered file that fails to
    /// parse is reported and ignored.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_path(path).await;
        }

        match prefer::load(CONFIG_NAME).await {
            Ok(discovered) => match discovered.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => Ok(config),
                    Err(e) => {
                        warn!("Ignoring config file: {}", e);
                        Ok(Self::default())
                    }
                },
                None => Ok(Self::default()),
            },
            Err(e) => {
                debug!("No config file found ({}), using defaults", e);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a file, choosing the format by extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(path, &contents)?;
        config.source_path = Some(path.to_path_buf());
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error("TOML", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_error("JSON", e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert_eq!(config.server.max_upload_bytes(), 25 * 1024 * 1024);
        assert_eq!(config.ai.timeout_secs, 20);
        assert_eq!(config.source_path, None);
    }

    #[tokio::test]
    async fn test_load_toml() {
        let file = write_config(
            ".toml",
            r#"
            [server]
            bind = "0.0.0.0:9000"

            [ai]
            max_concurrency = 8

            [ai.ollama]
            endpoint = "http://gpu-box:11434"
            "#,
        );

        let config = Config::load(Some(file.path())).await.unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.server.max_upload_mb, 25);
        assert_eq!(config.ai.max_concurrency, 8);
        assert_eq!(config.ai.timeout_secs, 20);
        assert_eq!(config.ai.ollama.endpoint.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(config.source_path.as_deref(), Some(file.path()));
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let yaml = write_config(".yaml", "ai:\n  timeout_secs: 7\n  order: [gemini]\n");
        let config = Config::load_from_path(yaml.path()).await.unwrap();
        assert_eq!(config.ai.timeout_secs, 7);
        assert_eq!(config.ai.order, vec!["gemini"]);

        let json = write_config(".json", r#"{"server": {"max_upload_mb": 5}}"#);
        let config = Config::load_from_path(json.path()).await.unwrap();
        assert_eq!(config.server.max_upload_bytes(), 5 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_explicit_path_errors() {
        let missing = Config::load(Some(Path::new("/nonexistent/a11y.toml"))).await;
        assert!(matches!(missing, Err(ConfigError::Read { .. })));

        let broken = write_config(".toml", "[server\nbind = ");
        let err = Config::load(Some(broken.path())).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "TOML", .. }));
    }
}
