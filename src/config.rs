use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Applies both to `accept` on the listening socket and to every read on
    /// an accepted connection.
    pub idle_timeout_secs: u64,
    /// Value of the `Server` response header
    pub name: String,
}

/// Document root and the two error documents that must live inside it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
    pub bad_request_page: String,
    pub not_found_page: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            name: "ficServer/0.0.1 (Rust)".to_string(),
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("p1-files"),
            bad_request_page: "error400.html".to_string(),
            not_found_page: "error404.html".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Config {
    /// Builds the configuration from defaults, an optional YAML file and the
    /// `FICSERVER_ROOT` / `FICSERVER_IDLE_TIMEOUT` environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut cfg = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(root) = std::env::var("FICSERVER_ROOT") {
            cfg.static_files.root = PathBuf::from(root);
        }

        if let Ok(secs) = std::env::var("FICSERVER_IDLE_TIMEOUT") {
            cfg.server.idle_timeout_secs = secs
                .parse()
                .with_context(|| format!("FICSERVER_IDLE_TIMEOUT is not a number: {secs}"))?;
        }

        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }

    /// A zero idle timeout would stop the listener and fail every read at once.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.idle_timeout_secs == 0 {
            anyhow::bail!("server.idle_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn bad_request_path(&self) -> PathBuf {
        self.static_files.root.join(&self.static_files.bad_request_page)
    }

    pub fn not_found_path(&self) -> PathBuf {
        self.static_files.root.join(&self.static_files.not_found_page)
    }
}
