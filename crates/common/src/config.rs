//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Token verification settings.
    pub auth: AuthConfig,
    /// Event scheduling settings.
    #[serde(default)]
    pub events: EventsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Access token verification.
///
/// Tokens are issued by the external identity provider and signed with a
/// shared HS256 secret.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared signing secret.
    pub jwt_secret: String,
    /// Expected `aud` claim.
    #[serde(default = "default_audience")]
    pub jwt_audience: String,
}

/// Event scheduling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// IANA timezone in which event dates and times are expressed.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Seconds between finalization/status sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

const fn default_sweep_interval() -> u64 {
    300
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `PLAZA_ENV`)
    /// 3. Environment variables with `PLAZA__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        // A missing .env file is fine; real deployments use the environment.
        let _ = dotenvy::dotenv();
        let env = std::env::var("PLAZA_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PLAZA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PLAZA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_events_config_default() {
        let events = EventsConfig::default();
        assert_eq!(events.timezone, "UTC");
        assert_eq!(events.sweep_interval_secs, 300);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let raw = config::Config::builder()
            .set_override("server.url", "https://plaza.example")
            .unwrap()
            .set_override("database.url", "postgres://localhost/plaza")
            .unwrap()
            .set_override("auth.jwt_secret", "secret")
            .unwrap()
            .build()
            .unwrap();

        let config: Config = raw.try_deserialize().unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 100);
        assert_eq!(config.auth.jwt_audience, "authenticated");
        assert_eq!(config.events.timezone, "UTC");
    }
}
