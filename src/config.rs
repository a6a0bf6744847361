//! Configuration loading and management.
//!
//! Lookup order for the config file:
//! 1. explicit path (`--config`)
//! 2. `task-board.yaml` in the working directory
//! 3. `<user config dir>/task-board/config.yaml`
//!
//! Environment variables are applied on top of whichever file was found:
//! - `TASK_BOARD_DATABASE_URI` - store connection URI
//! - `TASK_BOARD_HOST` - address the server binds to
//! - `TASK_BOARD_PORT` - port the server binds to
//! - `TASK_BOARD_PAGE_SIZE` - rows per page in the client views

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "task-board.yaml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

/// Server-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Store connection URI (`sqlite://<path>`, `sqlite::memory:`, or a bare path).
    #[serde(default = "default_database_uri")]
    pub database_uri: String,

    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_uri: default_database_uri(),
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_database_uri() -> String {
    "sqlite://.task-board/tasks.db".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Client view configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tasks per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    5
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the configuration: file (explicit or discovered), then environment.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => Self::discover()?,
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn discover() -> Result<Self> {
        for path in Self::candidate_paths() {
            if path.is_file() {
                debug!(path = %path.display(), "Loading config file");
                return Self::load(&path);
            }
        }
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Config files looked up when no explicit path is given, highest priority first.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(PROJECT_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("task-board").join("config.yaml"));
        }
        paths
    }

    /// Apply `TASK_BOARD_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup("TASK_BOARD_DATABASE_URI") {
            self.server.database_uri = uri;
        }

        if let Some(host) = lookup("TASK_BOARD_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("TASK_BOARD_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("TASK_BOARD_PORT is not a valid port: {}", port))?;
        }

        if let Some(size) = lookup("TASK_BOARD_PAGE_SIZE") {
            self.ui.page_size = size.parse().with_context(|| {
                format!("TASK_BOARD_PAGE_SIZE is not a valid page size: {}", size)
            })?;
        }

        Ok(())
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.server.database_uri.trim().is_empty() {
            bail!("server.database_uri must not be empty");
        }
        if self.ui.page_size == 0 {
            bail!("ui.page_size must be greater than 0");
        }
        Ok(())
    }

    /// Base URL clients use to reach the configured server.
    pub fn base_url(&self) -> String {
        let host = match self.server.host.as_str() {
            "0.0.0.0" | "::" => "127.0.0.1",
            host => host,
        };
        format!("http://{}:{}", host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.database_uri, "sqlite://.task-board/tasks.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.ui.page_size, 5);
        assert_eq!(config.base_url(), "http://127.0.0.1:3000");
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("server:\n  port: 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.ui.page_size, 5);
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("TASK_BOARD_DATABASE_URI", "sqlite::memory:"),
            ("TASK_BOARD_PORT", "4000"),
            ("TASK_BOARD_PAGE_SIZE", "10"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.database_uri, "sqlite::memory:");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.ui.page_size, 10);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let mut config = Config::default();
        let result = config.apply_env(|key| {
            (key == "TASK_BOARD_PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn invalid_page_size_is_an_error() {
        let mut config = Config::default();
        let result = config.apply_env(|key| {
            (key == "TASK_BOARD_PAGE_SIZE").then(|| "ten".to_string())
        });
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("TASK_BOARD_PAGE_SIZE"));
        assert_eq!(config.ui.page_size, 5);
    }

    #[test]
    fn zero_page_size_fails_validation() {
        let mut config = Config::default();
        config.ui.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn wildcard_host_maps_to_loopback_url() {
        let mut config = Config::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 8080;
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
    }
}
