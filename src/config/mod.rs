//! Configuration management
//!
//! Configuration is read from a `config.yml` (or `config.toml`) file and then
//! overridden by `PRODUCTFORGE_*` environment variables. Missing values are
//! filled with defaults, so an absent file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin, `*` allows any
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/productforge.db".to_string()
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    #[default]
    Sqlite,
    Mysql,
}

/// Text-generation and search providers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// OpenRouter chat-completions provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    #[serde(default = "default_openrouter_url")]
    pub base_url: String,
    /// Substituted for `{{OPENROUTER_API_KEY}}` in outgoing requests
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_app_title")]
    pub title: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Replaces the catalog's default model (used when a request names no
    /// model or an unknown one)
    #[serde(default)]
    pub default_model: Option<String>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: default_openrouter_url(),
            api_key: None,
            referer: default_referer(),
            title: default_app_title(),
            timeout_secs: default_timeout(),
            default_model: None,
        }
    }
}

fn default_openrouter_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_referer() -> String {
    "http://localhost:8080".to_string()
}

fn default_app_title() -> String {
    "AI Digital Product Creator".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Generic `generateText` gateway used as the secondary provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_gateway_model")]
    pub model: String,
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            api_key: None,
            model: default_gateway_model(),
            timeout_secs: default_gateway_timeout(),
        }
    }
}

fn default_gateway_url() -> String {
    "http://localhost:8787/v1/generate-text".to_string()
}

fn default_gateway_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_gateway_timeout() -> u64 {
    60
}

/// Web search collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: default_search_url(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_search_url() -> String {
    "http://localhost:8787/v1/search".to_string()
}

/// Cache for search and trending lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_ttl() -> u64 {
    300
}

fn default_max_capacity() -> u64 {
    1000
}

/// Optional replacement for the embedded catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Login session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_lifetime_days")]
    pub lifetime_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_days: default_lifetime_days(),
        }
    }
}

fn default_lifetime_days() -> i64 {
    7
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file.
    ///
    /// A missing or empty file yields the default configuration. Files ending
    /// in `.toml` are parsed as TOML, everything else as YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        if is_toml {
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        } else {
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })
        }
    }

    /// Load configuration from file, then apply environment overrides and
    /// validate the result.
    ///
    /// Recognised variables:
    /// - PRODUCTFORGE_SERVER_HOST, PRODUCTFORGE_SERVER_PORT, PRODUCTFORGE_SERVER_CORS_ORIGIN
    /// - PRODUCTFORGE_DATABASE_DRIVER, PRODUCTFORGE_DATABASE_URL
    /// - PRODUCTFORGE_OPENROUTER_API_KEY, PRODUCTFORGE_OPENROUTER_BASE_URL
    /// - PRODUCTFORGE_GATEWAY_URL, PRODUCTFORGE_GATEWAY_API_KEY
    /// - PRODUCTFORGE_SEARCH_URL, PRODUCTFORGE_SEARCH_API_KEY
    /// - PRODUCTFORGE_CACHE_TTL_SECONDS
    /// - PRODUCTFORGE_CATALOG_PATH
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("PRODUCTFORGE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PRODUCTFORGE_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(origin) = std::env::var("PRODUCTFORGE_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }

        if let Ok(driver) = std::env::var("PRODUCTFORGE_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                _ => {}
            }
        }
        if let Ok(url) = std::env::var("PRODUCTFORGE_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(key) = std::env::var("PRODUCTFORGE_OPENROUTER_API_KEY") {
            self.providers.openrouter.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("PRODUCTFORGE_OPENROUTER_BASE_URL") {
            self.providers.openrouter.base_url = url;
        }
        if let Ok(url) = std::env::var("PRODUCTFORGE_GATEWAY_URL") {
            self.providers.gateway.url = url;
        }
        if let Ok(key) = std::env::var("PRODUCTFORGE_GATEWAY_API_KEY") {
            self.providers.gateway.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("PRODUCTFORGE_SEARCH_URL") {
            self.providers.search.url = url;
        }
        if let Ok(key) = std::env::var("PRODUCTFORGE_SEARCH_API_KEY") {
            self.providers.search.api_key = Some(key);
        }

        if let Ok(ttl) = std::env::var("PRODUCTFORGE_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.cache.ttl_seconds = ttl;
            }
        }
        if let Ok(path) = std::env::var("PRODUCTFORGE_CATALOG_PATH") {
            self.catalog.path = Some(PathBuf::from(path));
        }
    }

    /// Reject values that would make the server unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.host must not be empty".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be between 1 and 65535".to_string(),
            ));
        }
        let timeouts = [
            ("providers.openrouter.timeout_secs", self.providers.openrouter.timeout_secs),
            ("providers.gateway.timeout_secs", self.providers.gateway.timeout_secs),
            ("providers.search.timeout_secs", self.providers.search.timeout_secs),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        if self.session.lifetime_days <= 0 {
            return Err(ConfigError::ValidationError(
                "session.lifetime_days must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Secrets available for `{{NAME}}` substitution in proxied requests
    pub fn secrets(&self) -> HashMap<String, String> {
        let mut secrets = HashMap::new();
        if let Some(key) = &self.providers.openrouter.api_key {
            secrets.insert("OPENROUTER_API_KEY".to_string(), key.clone());
        }
        if let Some(key) = &self.providers.gateway.api_key {
            secrets.insert("GATEWAY_API_KEY".to_string(), key.clone());
        }
        if let Some(key) = &self.providers.search.api_key {
            secrets.insert("SEARCH_API_KEY".to_string(), key.clone());
        }
        secrets
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared by every test that touches PRODUCTFORGE_* variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn valid_host_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u8..=255, 0u8..=255, 0u8..=255, 0u8..=255)
                .prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d)),
            Just("localhost".to_string()),
            "[a-z][a-z0-9]{0,10}",
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Serializing a config to YAML and loading it back yields the same values
        #[test]
        fn prop_yaml_roundtrip(
            host in valid_host_strategy(),
            port in 1u16..=65535,
            ttl in 1u64..=86_400,
            lifetime in 1i64..=90,
        ) {
            let mut config = Config::default();
            config.server.host = host.clone();
            config.server.port = port;
            config.cache.ttl_seconds = ttl;
            config.session.lifetime_days = lifetime;

            let yaml = serde_yaml::to_string(&config).unwrap();
            let mut file = NamedTempFile::new().unwrap();
            write!(file, "{}", yaml).unwrap();

            let loaded = Config::load(file.path()).unwrap();
            prop_assert_eq!(loaded.server.host, host);
            prop_assert_eq!(loaded.server.port, port);
            prop_assert_eq!(loaded.cache.ttl_seconds, ttl);
            prop_assert_eq!(loaded.session.lifetime_days, lifetime);
        }

        /// A file holding only one section leaves every other section at defaults
        #[test]
        fn prop_partial_config_keeps_defaults(port in 1u16..=65535) {
            let mut file = NamedTempFile::new().unwrap();
            write!(file, "server:\n  port: {}\n", port).unwrap();

            let loaded = Config::load(file.path()).unwrap();
            prop_assert_eq!(loaded.server.port, port);
            prop_assert_eq!(loaded.database.url, "data/productforge.db");
            prop_assert_eq!(loaded.providers.gateway.model, "gpt-4o-mini");
        }
    }
}
