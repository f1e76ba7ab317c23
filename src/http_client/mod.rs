//! HTTP Client Construction
//!
//! Builds the pooled `reqwest` client the store client uses. Every client
//! built here has a finite connect timeout and a finite whole-request
//! timeout, so a stalled store surfaces as an error instead of a hung
//! request.
//!
//! # Example
//!
//! ```rust,ignore
//! use oferta_ontology::http_client::{create_async_client, HttpClientConfig};
//!
//! let client = create_async_client(&HttpClientConfig::default())?;
//! ```

use std::time::Duration;

use crate::config::StoreConfig;

// ============================================================================
// Configuration
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Maximum idle connections per host
    pub pool_idle_per_host: usize,
    /// Idle connection timeout in seconds
    pub pool_idle_timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            pool_idle_per_host: 16,
            pool_idle_timeout_secs: 90,
            user_agent: format!("oferta-ontology/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&StoreConfig> for HttpClientConfig {
    fn from(store: &StoreConfig) -> Self {
        Self {
            connect_timeout_secs: store.connect_timeout_secs,
            request_timeout_secs: store.timeout_secs,
            pool_idle_per_host: store.pool_idle_per_host,
            ..Default::default()
        }
    }
}

impl HttpClientConfig {
    /// Set the whole-request timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Timeouts actually applied; zero is raised to one second
    pub fn timeouts(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.connect_timeout_secs.max(1)),
            Duration::from_secs(self.request_timeout_secs.max(1)),
        )
    }
}

// ============================================================================
// Asynchronous Client (reqwest)
// ============================================================================

/// Create an asynchronous HTTP client with custom configuration
pub fn create_async_client(config: &HttpClientConfig) -> Result<reqwest::Client, reqwest::Error> {
    let (connect_timeout, request_timeout) = config.timeouts();
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
        .pool_max_idle_per_host(config.pool_idle_per_host)
        .user_agent(&config.user_agent)
        .build()
}

/// Create an asynchronous HTTP client from store settings
pub fn create_async_client_from_config(store: &StoreConfig) -> Result<reqwest::Client, reqwest::Error> {
    create_async_client(&HttpClientConfig::from(store))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.user_agent.starts_with("oferta-ontology/"));
    }

    #[test]
    fn test_from_store_config() {
        let store = StoreConfig {
            timeout_secs: 7,
            connect_timeout_secs: 2,
            pool_idle_per_host: 4,
            ..Default::default()
        };
        let config = HttpClientConfig::from(&store);
        assert_eq!(config.request_timeout_secs, 7);
        assert_eq!(config.connect_timeout_secs, 2);
        assert_eq!(config.pool_idle_per_host, 4);
    }

    #[test]
    fn test_timeouts_are_never_zero() {
        let config = HttpClientConfig::default().with_timeout(0);
        let (connect, request) = config.timeouts();
        assert_eq!(connect, Duration::from_secs(5));
        assert_eq!(request, Duration::from_secs(1));
    }

    #[test]
    fn test_async_client_creation() {
        let client = create_async_client(&HttpClientConfig::default());
        assert!(client.is_ok());
    }
}
