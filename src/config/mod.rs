use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_port: default_api_port(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Habit reminder job settings.
///
/// Reminders are delivered by email; when `smtp` is absent the job still
/// runs but only logs which users would have been notified.
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_reminder_enabled")]
    pub enabled: bool,
    /// Cron expression for the reminder sweep (six fields, seconds first)
    #[serde(default = "default_reminder_schedule")]
    pub schedule: String,
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: default_reminder_enabled(),
            schedule: default_reminder_schedule(),
            smtp: None,
        }
    }
}

fn default_reminder_enabled() -> bool {
    true
}

fn default_reminder_schedule() -> String {
    // Every day at 07:00
    "0 0 7 * * *".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
}

fn default_smtp_port() -> u16 {
    587
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.api_port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(config.reminders.enabled);
        assert!(config.reminders.smtp.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [server]
            api_port = 9090

            [reminders]
            schedule = "0 30 6 * * *"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.api_port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.reminders.schedule, "0 30 6 * * *");
    }
}
