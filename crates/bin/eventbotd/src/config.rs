//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `eventbot.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::collections::HashSet;

use chrono::Duration;
use serde::Deserialize;

use eventbot_domain::id::UserId;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Conversation behaviour.
    pub bot: BotConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Bot behaviour.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Platform user ids granted admin rights when they finish onboarding.
    pub admins: Vec<String>,
    /// Abandon registration and event-creation flows idle for this long.
    /// Unset means flows never expire.
    pub flow_expiry_secs: Option<u64>,
}

impl Config {
    /// Load configuration from `eventbot.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("eventbot.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("EVENTBOT_HOST") {
            self.server.host = val;
        }
        if let Some(val) = var("EVENTBOT_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Some(val) = var("EVENTBOT_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("EVENTBOT_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("EVENTBOT_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("EVENTBOT_ADMINS") {
            self.bot.admins = val
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(val) = var("EVENTBOT_FLOW_EXPIRY_SECS")
            && let Ok(secs) = val.trim().parse()
        {
            self.bot.flow_expiry_secs = Some(secs);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.bot.flow_expiry_secs == Some(0) {
            return Err(ConfigError::Validation(
                "flow expiry must be non-zero when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Ids of the users bootstrapped as admins.
    #[must_use]
    pub fn admin_ids(&self) -> HashSet<UserId> {
        self.bot.admins.iter().map(UserId::new).collect()
    }

    /// Idle time after which an unfinished flow is abandoned.
    #[must_use]
    pub fn flow_expiry(&self) -> Option<Duration> {
        self.bot
            .flow_expiry_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:eventbot.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "eventbotd=info,eventbot_app=info,eventbot_adapter_http_axum=info,tower_http=debug"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
