use crate::error::{CrmError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("crm.db") }
    }
}

/// Endpoint and per-job settings for the background jobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    pub graphql_url: String,
    pub heartbeat: JobConfig,
    pub low_stock: JobConfig,
    pub order_reminders: JobConfig,
    pub report: JobConfig,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            graphql_url: "http://localhost:8000/graphql".to_string(),
            heartbeat: JobConfig::new("/tmp/crm_heartbeat_log.txt", 5 * 60),
            low_stock: JobConfig::new("/tmp/low_stock_updates_log.txt", 12 * 60 * 60),
            order_reminders: JobConfig::new("/tmp/order_reminders_log.txt", 24 * 60 * 60),
            report: JobConfig::new("/tmp/crm_report_log.txt", 7 * 24 * 60 * 60),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub log_file: PathBuf,
    pub interval_secs: u64,
}

impl JobConfig {
    pub fn new(log_file: impl Into<PathBuf>, interval_secs: u64) -> Self {
        Self { log_file: log_file.into(), interval_secs }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Config {
    /// Loads `config.toml` (or `$CRM_CONFIG`), falling back to defaults when the
    /// file is absent, then applies environment overrides.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        let config_path = std::env::var("CRM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let path = Path::new(&config_path);

        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", config_path);
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            CrmError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("CRM_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Ok(port) = std::env::var("CRM_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| CrmError::Config(format!("CRM_PORT is not a valid port: {port}")))?;
        }
        if let Ok(url) = std::env::var("CRM_GRAPHQL_URL") {
            self.jobs.graphql_url = url;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 9100

            [jobs.heartbeat]
            log_file = "/var/log/hb.txt"
            interval_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.path, PathBuf::from("crm.db"));
        assert_eq!(config.jobs.heartbeat.log_file, PathBuf::from("/var/log/hb.txt"));
        assert_eq!(config.jobs.heartbeat.interval(), Duration::from_secs(60));
        assert_eq!(config.jobs.report.log_file, PathBuf::from("/tmp/crm_report_log.txt"));
        assert_eq!(config.jobs.graphql_url, "http://localhost:8000/graphql");
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(matches!(Config::from_toml("[server]\nport = \"x\""), Err(CrmError::Toml(_))));
    }
}
