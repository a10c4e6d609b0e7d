use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Listener host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listener port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between keep-alive pings sent to each session
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,

    /// Seconds of grace after a ping before an unresponsive session is dropped
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_secs: u64,

    /// Seconds allowed for the close handshake during teardown
    #[serde(default = "default_close_timeout")]
    pub close_timeout_secs: u64,

    /// Text of the one-time welcome message sent to every new session
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        // Load from environment variables using envy
        match envy::from_env::<Config>() {
            Ok(config) => {
                info!("✅ Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                error!("❌ Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Get the full listener address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_secs(self.close_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ping_interval_secs: default_ping_interval(),
            ping_timeout_secs: default_ping_timeout(),
            close_timeout_secs: default_close_timeout(),
            welcome_message: default_welcome_message(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "Environment variable error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_ping_interval() -> u64 {
    20
}

fn default_ping_timeout() -> u64 {
    10
}

fn default_close_timeout() -> u64 {
    10
}

fn default_welcome_message() -> String {
    "Connected to command relay server".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_keepalive_settings() {
        let config = Config::default();
        assert_eq!(config.ping_interval(), Duration::from_secs(20));
        assert_eq!(config.ping_timeout(), Duration::from_secs(10));
        assert_eq!(config.close_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn server_address_joins_host_and_port() {
        let config = Config::default();
        assert_eq!(config.server_address(), "127.0.0.1:8080");
    }
}
