use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// Bearer-token verification against the external identity provider
    pub auth: AuthConfig,
    /// Request notification delivery
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Database holding org-wide data: accounts, site list, org settings.
    #[serde(default = "default_registry_db")]
    pub registry_db: String,

    /// Sites provisioned at boot when absent from the registry.
    #[serde(default)]
    pub sites: Vec<SeedSite>,
}

/// A site to provision at boot.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedSite {
    pub db: String,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// `jwt` validates RS256 tokens from the identity provider; `static`
    /// compares against a fixed development token.
    #[serde(default = "default_auth_mode")]
    pub mode: String,

    /// Fixed token accepted in `static` mode.
    #[serde(default)]
    pub static_token: String,

    /// Identity provider RSA public key in PEM format (`jwt` mode).
    #[serde(default)]
    pub jwt_public_key: String,

    /// Expected token issuer (`jwt` mode).
    #[serde(default)]
    pub issuer: String,

    /// Expected token audience (`jwt` mode).
    #[serde(default)]
    pub audience: String,
}

/// Where request notifications go. With no webhook URL configured, payloads
/// are logged instead of delivered.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub webhook_url: String,

    #[serde(default = "default_notification_timeout")]
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            timeout_secs: default_notification_timeout(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_registry_db() -> String {
    "wardops".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_auth_mode() -> String {
    "jwt".to_string()
}
fn default_notification_timeout() -> u64 {
    5
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with WO__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("WO").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds entirely from embedded defaults so tests never depend on config
    /// files being present.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            request_timeout_secs = 30

            [store]
            registry_db = "wardops-test"

            [logging]
            level = "info"
            format = "pretty"

            [security]
            cors_origins = []

            [auth]
            mode = "static"
            static_token = "test-token"

            [notifications]
            webhook_url = ""
            timeout_secs = 5
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.store.registry_db.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "store.registry_db must be set".to_string(),
            ));
        }

        match self.auth.mode.as_str() {
            "jwt" => {
                if self.auth.jwt_public_key.trim().is_empty() {
                    return Err(ConfigValidationError::MissingRequired(
                        "WO__AUTH__JWT_PUBLIC_KEY must be set in jwt mode".to_string(),
                    ));
                }
            }
            "static" => {
                if self.auth.static_token.trim().is_empty() {
                    return Err(ConfigValidationError::MissingRequired(
                        "WO__AUTH__STATIC_TOKEN must be set in static mode".to_string(),
                    ));
                }
            }
            other => {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "Unknown auth mode: {other}"
                )));
            }
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .expect("Invalid socket address")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.registry_db, "wardops-test");
        assert_eq!(config.logging.level, "info");
        assert!(config.store.sites.is_empty());
    }

    #[test]
    fn test_config_override() {
        let config = Config::load_for_test(&[
            ("server.port", "9000"),
            ("logging.level", "debug"),
            ("store.registry_db", "custom"),
        ])
        .expect("Failed to load config");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.store.registry_db, "custom");
    }

    #[test]
    fn test_validation_rejects_port_zero() {
        let config = Config::load_for_test(&[("server.port", "0")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_requires_jwt_key_in_jwt_mode() {
        let config = Config::load_for_test(&[("auth.mode", "jwt")]).unwrap();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("JWT_PUBLIC_KEY"));
    }

    #[test]
    fn test_validation_rejects_unknown_auth_mode() {
        let config = Config::load_for_test(&[("auth.mode", "none")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::load_for_test(&[("server.port", "3000")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }
}
