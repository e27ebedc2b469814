//! Configuration management with YAML support

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// Outbound webhook configuration. URLs are optional; an unset URL turns
/// the corresponding event kind into a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub context_url: Option<String>,

    #[serde(default)]
    pub chat_url: Option<String>,

    /// Request timeout for context events (the peer only acknowledges)
    #[serde(default = "default_context_timeout_secs")]
    pub context_timeout_secs: u64,

    /// Request timeout for chat events (the peer may block on a model)
    #[serde(default = "default_chat_timeout_secs")]
    pub chat_timeout_secs: u64,

    /// Total delivery attempts, first try included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before retry n is base * 2^(n-1) seconds
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,

    /// Fixed-size worker pool consuming the dispatch queues
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Per-worker queue capacity; a full queue drops, never blocks
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

// Default value functions
fn default_database_path() -> String {
    "~/.local/share/situ/situ.db".to_string()
}

fn default_context_timeout_secs() -> u64 {
    5
}

fn default_chat_timeout_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_base_secs() -> u64 {
    1
}

fn default_workers() -> usize {
    4
}

fn default_queue_depth() -> usize {
    64
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            context_url: None,
            chat_url: None,
            context_timeout_secs: default_context_timeout_secs(),
            chat_timeout_secs: default_chat_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_base_secs: default_backoff_base_secs(),
            workers: default_workers(),
            queue_depth: default_queue_depth(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./situ.yaml (current directory)
    /// 3. ~/.config/situ/situ.yaml
    pub fn load(path: &str) -> Result<Self> {
        let search_paths = vec![
            shellexpand::tilde(path).to_string(),
            "situ.yaml".to_string(),
            shellexpand::tilde("~/.config/situ/situ.yaml").to_string(),
        ];

        for search_path in &search_paths {
            if std::path::Path::new(search_path).exists() {
                let content = std::fs::read_to_string(search_path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    /// Get the database path, expanding ~ to home directory
    pub fn database_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.database.path).to_string();
        PathBuf::from(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.webhook.context_timeout_secs, 5);
        assert_eq!(config.webhook.chat_timeout_secs, 60);
        assert_eq!(config.webhook.max_attempts, 5);
        assert_eq!(config.webhook.backoff_base_secs, 1);
        assert!(config.webhook.context_url.is_none());
        assert!(config.webhook.chat_url.is_none());
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
database:
  path: ~/.local/share/situ/test.db

webhook:
  context_url: https://automation.local/webhook/context-trigger
  chat_url: https://automation.local/webhook/chat
  workers: 2
  queue_depth: 16
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.database.path, "~/.local/share/situ/test.db");
        assert_eq!(
            config.webhook.context_url.as_deref(),
            Some("https://automation.local/webhook/context-trigger")
        );
        assert_eq!(config.webhook.workers, 2);
        assert_eq!(config.webhook.queue_depth, 16);
        // unset fields keep their defaults
        assert_eq!(config.webhook.max_attempts, 5);
    }
}
