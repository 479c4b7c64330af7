//! Service configuration
//!
//! Resolution priority per setting: environment variable, then the TOML
//! config file, then the compiled default. The config file lives at
//! `$FITRADAR_CONFIG` or `<os config dir>/fitradar/config.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address the HTTP API binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the agent memory server.
    #[serde(default = "default_memory_server_url")]
    pub memory_server_url: String,

    /// Namespace user id under which product memories are stored.
    #[serde(default = "default_memory_user_id")]
    pub memory_user_id: String,

    /// Feed URLs polled for new products.
    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,

    /// Seconds between polling cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Resend API key; email sending is disabled when unset.
    #[serde(default)]
    pub resend_api_key: Option<String>,

    #[serde(default = "default_email_from")]
    pub email_from: String,

    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_memory_server_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_memory_user_id() -> String {
    "fitradar".to_string()
}

fn default_feeds() -> Vec<String> {
    vec![
        "https://www.adidas-group.com/en/rss/news/".to_string(),
        "https://hypebeast.com/feed".to_string(),
        "https://www.luxurydaily.com/rss-feeds/".to_string(),
    ]
}

fn default_poll_interval() -> u64 {
    600
}

fn default_email_from() -> String {
    "FitRadar <onboarding@resend.dev>".to_string()
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        // Empty TOML exercises every serde default
        toml::from_str("").expect("defaults are valid")
    }
}

impl Config {
    /// Load configuration: TOML file when present, then env overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            info!(path = %path.display(), "Loaded config file");
            config
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("FITRADAR_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fitradar")
            .join("config.toml")
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FITRADAR_BIND_ADDR") {
            self.bind_addr = val;
        }
        if let Ok(val) = std::env::var("FITRADAR_MEMORY_SERVER_URL") {
            self.memory_server_url = val;
        }
        if let Ok(val) = std::env::var("FITRADAR_MEMORY_USER_ID") {
            self.memory_user_id = val;
        }
        if let Ok(val) = std::env::var("FITRADAR_FEEDS") {
            self.feeds = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(val) = std::env::var("FITRADAR_POLL_INTERVAL_SECONDS") {
            if let Ok(seconds) = val.parse() {
                self.poll_interval_seconds = seconds;
            }
        }
        if let Ok(val) = std::env::var("FITRADAR_RESEND_API_KEY") {
            if !val.trim().is_empty() {
                self.resend_api_key = Some(val);
            }
        }
        if let Ok(val) = std::env::var("FITRADAR_EMAIL_FROM") {
            self.email_from = val;
        }
        if let Ok(val) = std::env::var("FITRADAR_FRONTEND_URL") {
            self.frontend_url = val;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.memory_server_url, "http://localhost:8001");
        assert_eq!(config.poll_interval_seconds, 600);
        assert_eq!(config.feeds.len(), 3);
        assert!(config.resend_api_key.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_the_rest() {
        let toml_str = r#"
memory_server_url = "http://store:9000"
poll_interval_seconds = 60
feeds = ["https://example.com/feed"]
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.memory_server_url, "http://store:9000");
        assert_eq!(config.poll_interval_seconds, 60);
        assert_eq!(config.feeds, vec!["https://example.com/feed"]);
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.frontend_url, "http://localhost:3000");
    }
}
