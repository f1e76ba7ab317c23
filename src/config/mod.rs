//! Configuration System for the offer ontology service
//!
//! Provides a layered configuration supporting:
//! - TOML configuration files
//! - Environment variable overrides
//! - Validation of values the query layer depends on
//!
//! # Configuration File Locations
//!
//! Configuration files are searched in order (first found wins):
//! 1. `./oferta.toml` - Project-local configuration
//! 2. `~/.config/oferta/config.toml` - User configuration (XDG)
//! 3. `~/.oferta/config.toml` - User configuration (legacy)
//! 4. `/etc/oferta/config.toml` - System-wide configuration
//!
//! # Environment Variables
//!
//! - `OFERTA_LOG_LEVEL` - Logging verbosity (quiet, normal, verbose, debug)
//! - `OFERTA_SPARQL_URL` - SPARQL query endpoint URL
//! - `OFERTA_NAMESPACE` - Ontology namespace IRI
//! - `OFERTA_TIMEOUT_SECS` - Store request timeout
//! - `OFERTA_SERVER_HOST` - HTTP bind host
//! - `OFERTA_SERVER_PORT` - HTTP bind port
//! - `OFERTA_CORS` - Enable permissive CORS (true/false)

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::ns;

/// Default SPARQL endpoint of the offer dataset
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3030/OntologiaOferta/sparql";

// ============================================================================
// Configuration Schema
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OntologyConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Triple store connection
    pub store: StoreConfig,
    /// Search and listing limits
    pub search: SearchConfig,
    /// HTTP server settings
    pub server: ServerConfig,
}

/// General configuration options
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Logging level
    pub log_level: LogLevel,
}

/// Triple store connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// SPARQL query endpoint URL
    pub endpoint: String,
    /// Namespace IRI of the offer ontology
    pub namespace: String,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum idle pooled connections to the endpoint
    pub pool_idle_per_host: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            namespace: ns::OFERTA.to_string(),
            connect_timeout_secs: 5,
            timeout_secs: 30,
            pool_idle_per_host: 16,
        }
    }
}

/// Search and listing settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Page size used when the caller does not give one
    pub default_limit: u32,
    /// Largest page size a caller may request
    pub max_limit: u32,
    /// Longest accepted search term, in characters
    pub max_term_length: usize,
    /// Default threshold for the rated-offers listing
    pub rating_threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            max_term_length: 200,
            rating_threshold: 4.5,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable permissive CORS
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Resolve the bind address
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                key: "server.host".to_string(),
                reason: e.to_string(),
            })
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Log level options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quiet" | "q" | "0" => Some(LogLevel::Quiet),
            "normal" | "n" | "1" => Some(LogLevel::Normal),
            "verbose" | "v" | "2" => Some(LogLevel::Verbose),
            "debug" | "d" | "3" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// Default `tracing` filter directive for this level
    pub fn filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "warn",
            LogLevel::Normal => "info",
            LogLevel::Verbose => "debug",
            LogLevel::Debug => "trace",
        }
    }
}

// ============================================================================
// Configuration Loading
// ============================================================================

impl OntologyConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from default locations, then apply environment
    /// overrides and validate
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for path in Self::config_paths() {
            if path.exists() {
                config = Self::load_from_file(&path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))
    }

    /// Load configuration from a TOML string
    pub fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<string>"), e.to_string()))
    }

    /// Get the list of config file search paths
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./oferta.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("oferta").join("config.toml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".oferta").join("config.toml"));
        }

        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/oferta/config.toml"));

        paths
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("OFERTA_LOG_LEVEL") {
            self.general.log_level = LogLevel::from_str(&val)
                .ok_or_else(|| ConfigError::invalid("OFERTA_LOG_LEVEL", format!("unknown level '{}'", val)))?;
        }

        if let Some(val) = lookup("OFERTA_SPARQL_URL") {
            self.store.endpoint = val;
        }

        if let Some(val) = lookup("OFERTA_NAMESPACE") {
            self.store.namespace = val;
        }

        if let Some(val) = lookup("OFERTA_TIMEOUT_SECS") {
            self.store.timeout_secs = val
                .parse()
                .map_err(|_| ConfigError::invalid("OFERTA_TIMEOUT_SECS", format!("not a number: '{}'", val)))?;
        }

        if let Some(val) = lookup("OFERTA_SERVER_HOST") {
            self.server.host = val;
        }

        if let Some(val) = lookup("OFERTA_SERVER_PORT") {
            self.server.port = val
                .parse()
                .map_err(|_| ConfigError::invalid("OFERTA_SERVER_PORT", format!("not a port: '{}'", val)))?;
        }

        if let Some(val) = lookup("OFERTA_CORS") {
            self.server.cors_enabled = val == "true" || val == "1" || val == "yes";
        }

        Ok(())
    }

    /// Check the values the query layer relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = &self.store.endpoint;
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::invalid("store.endpoint", "must be an http(s) URL"));
        }

        let namespace = &self.store.namespace;
        if !(namespace.ends_with('#') || namespace.ends_with('/')) {
            return Err(ConfigError::invalid("store.namespace", "must end with '#' or '/'"));
        }
        if namespace.chars().any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}')) {
            return Err(ConfigError::invalid("store.namespace", "is not a valid IRI"));
        }

        if self.store.timeout_secs == 0 {
            return Err(ConfigError::invalid("store.timeout_secs", "must be greater than zero"));
        }
        if self.store.connect_timeout_secs == 0 {
            return Err(ConfigError::invalid("store.connect_timeout_secs", "must be greater than zero"));
        }

        if self.search.max_limit == 0 {
            return Err(ConfigError::invalid("search.max_limit", "must be greater than zero"));
        }
        if self.search.default_limit == 0 || self.search.default_limit > self.search.max_limit {
            return Err(ConfigError::invalid(
                "search.default_limit",
                format!("must be between 1 and max_limit ({})", self.search.max_limit),
            ));
        }
        if self.search.max_term_length == 0 {
            return Err(ConfigError::invalid("search.max_term_length", "must be greater than zero"));
        }
        if !self.search.rating_threshold.is_finite() {
            return Err(ConfigError::invalid("search.rating_threshold", "must be a finite number"));
        }

        Ok(())
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Generate a default configuration file content
    pub fn default_config_content() -> &'static str {
        r#"# Offer ontology service configuration

[general]
# Logging level: quiet, normal, verbose, debug
log_level = "normal"

[store]
# SPARQL query endpoint of the offer dataset
endpoint = "http://localhost:3030/OntologiaOferta/sparql"
# Namespace IRI of the ontology classes and properties
namespace = "http://www.semanticweb.org/germanlozano/oferta#"
# Connection timeout (seconds)
connect_timeout_secs = 5
# Request timeout (seconds, must be > 0)
timeout_secs = 30
# Idle pooled connections kept per host
pool_idle_per_host = 16

[search]
# Page size for free-text search
default_limit = 20
# Largest page size a caller may ask for
max_limit = 100
# Longest accepted search term (characters)
max_term_length = 200
# Threshold for the rated-offers listing
rating_threshold = 4.5

[server]
host = "0.0.0.0"
port = 3001
# Allow requests from any origin
cors_enabled = true
"#
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error reading {}: {1}", .0.display())]
    Io(PathBuf, String),
    /// Parse error in config file
    #[error("Parse error in {}: {1}", .0.display())]
    Parse(PathBuf, String),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
    /// A value failed validation
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = OntologyConfig::new();
        assert_eq!(config.store.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.store.namespace, "http://www.semanticweb.org/germanlozano/oferta#");
        assert_eq!(config.search.default_limit, 20);
        assert_eq!(config.search.rating_threshold, 4.5);
        assert_eq!(config.server.port, 3001);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [general]
            log_level = "verbose"

            [store]
            endpoint = "http://fuseki:3030/offers/query"
            timeout_secs = 10

            [search]
            max_limit = 50
        "#;

        let config = OntologyConfig::load_from_str(toml).unwrap();
        assert_eq!(config.general.log_level, LogLevel::Verbose);
        assert_eq!(config.store.endpoint, "http://fuseki:3030/offers/query");
        assert_eq!(config.store.timeout_secs, 10);
        assert_eq!(config.store.connect_timeout_secs, 5);
        assert_eq!(config.search.max_limit, 50);
        assert_eq!(config.search.default_limit, 20);
    }

    #[test]
    fn test_default_content_round_trips() {
        let config = OntologyConfig::load_from_str(OntologyConfig::default_config_content()).unwrap();
        assert_eq!(config, OntologyConfig::default());
    }

    #[test]
    fn test_overrides() {
        let mut config = OntologyConfig::new();
        config
            .apply_overrides(lookup(&[
                ("OFERTA_SPARQL_URL", "https://store.example.org/sparql"),
                ("OFERTA_TIMEOUT_SECS", "3"),
                ("OFERTA_SERVER_PORT", "8080"),
                ("OFERTA_LOG_LEVEL", "debug"),
                ("OFERTA_CORS", "no"),
            ]))
            .unwrap();

        assert_eq!(config.store.endpoint, "https://store.example.org/sparql");
        assert_eq!(config.store.timeout_secs, 3);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.general.log_level, LogLevel::Debug);
        assert!(!config.server.cors_enabled);
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let mut config = OntologyConfig::new();
        let err = config
            .apply_overrides(lookup(&[("OFERTA_SERVER_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let mut config = OntologyConfig::new();
        config.store.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("store.timeout_secs"));
    }

    #[test]
    fn test_validate_endpoint_and_namespace() {
        let mut config = OntologyConfig::new();
        config.store.endpoint = "localhost:3030/sparql".to_string();
        assert!(config.validate().is_err());

        let mut config = OntologyConfig::new();
        config.store.namespace = "http://example.org/onto".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_limits() {
        let mut config = OntologyConfig::new();
        config.search.default_limit = 200;
        assert!(config.validate().is_err());

        let mut config = OntologyConfig::new();
        config.search.rating_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::from_str("quiet"), Some(LogLevel::Quiet));
        assert_eq!(LogLevel::Quiet.filter_directive(), "warn");
        assert_eq!(LogLevel::Normal.filter_directive(), "info");
        assert_eq!(LogLevel::from_str("loud"), None);
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig::default();
        assert_eq!(server.socket_addr().unwrap().port(), 3001);

        let server = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(server.socket_addr().is_err());
    }

    #[test]
    fn test_serialize_config() {
        let toml = OntologyConfig::new().to_toml().unwrap();
        assert!(toml.contains("[store]"));
        assert!(toml.contains("[search]"));
        assert!(toml.contains("[server]"));
    }

    #[test]
    fn test_config_paths() {
        let paths = OntologyConfig::config_paths();
        assert!(paths[0].ends_with("oferta.toml"));
    }
}
