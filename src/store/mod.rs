//! SPARQL Protocol store client
//!
//! Executes rendered query text against a SPARQL 1.1 query endpoint
//! (Apache Jena Fuseki in production) and decodes the JSON results.
//!
//! # Protocol
//!
//! - `GET <endpoint>?query=<url-encoded query>`
//! - `Accept: application/sparql-results+json`
//! - one attempt per call, bounded by the client's timeouts
//!
//! # Failure classification
//!
//! | Condition | Code | Kind |
//! |---|---|---|
//! | connection refused/reset | `ConnectionFailed` | `StoreUnavailable` |
//! | timeout, HTTP 408 | `StoreTimeout` | `StoreUnavailable` |
//! | HTTP 404/502/503/504 | `EndpointUnavailable` | `StoreUnavailable` |
//! | HTTP 400 | `QueryRejected` | `StoreQueryError` |
//! | other non-2xx | `StoreQueryError` | `StoreQueryError` |
//! | body is not SPARQL JSON | `MalformedResults` | `StoreQueryError` |
//!
//! Error bodies returned by the store are attached as the error payload.

mod fixed;

pub use fixed::StaticEndpoint;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::core::SparqlEndpoint;
use crate::error::{ErrorCode, OntologyError, OntologyResult};
use crate::http_client::create_async_client_from_config;
use crate::results::{Binding, SparqlResults, SPARQL_RESULTS_JSON};

/// Longest store error body kept on an error, in characters
const MAX_PAYLOAD_CHARS: usize = 2048;

/// A SPARQL endpoint reached over HTTP
#[derive(Debug, Clone)]
pub struct SparqlClient {
    endpoint: String,
    http: reqwest::Client,
}

impl SparqlClient {
    /// Client for `endpoint` with default timeouts
    pub fn new(endpoint: impl Into<String>) -> OntologyResult<Self> {
        Self::from_config(&StoreConfig {
            endpoint: endpoint.into(),
            ..Default::default()
        })
    }

    /// Client built from store settings
    pub fn from_config(config: &StoreConfig) -> OntologyResult<Self> {
        let http = create_async_client_from_config(config)
            .map_err(|e| OntologyError::config(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self::with_client(config.endpoint.clone(), http))
    }

    /// Client reusing an existing connection pool
    pub fn with_client(endpoint: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> OntologyError {
        let base = if err.is_timeout() {
            OntologyError::store_timeout(format!("request to {} timed out", self.endpoint))
        } else if err.is_connect() {
            OntologyError::store_unavailable(format!("cannot connect to {}", self.endpoint))
                .with_code(ErrorCode::ConnectionFailed)
                .with_hint("Check that the SPARQL server is running and store.endpoint points at it")
        } else {
            OntologyError::store_unavailable(format!("request to {} failed", self.endpoint))
        };
        base.with_context("endpoint", self.endpoint.as_str())
            .with_cause(err.to_string())
    }
}

#[async_trait]
impl SparqlEndpoint for SparqlClient {
    async fn select(&self, query: &str) -> OntologyResult<Vec<Binding>> {
        debug!(endpoint = %self.endpoint, %query, "executing SPARQL query");

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("query", query)])
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let payload = response.text().await.unwrap_or_default();
            let err = status_error(&self.endpoint, status, &payload);
            warn!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                code = ?err.code,
                "SPARQL endpoint returned an error status"
            );
            return Err(err);
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let results = SparqlResults::from_slice(&body).map_err(|e| {
            warn!(endpoint = %self.endpoint, "SPARQL endpoint returned an unreadable body");
            e.with_context("endpoint", self.endpoint.as_str())
        })?;

        let rows = results.into_bindings();
        debug!(endpoint = %self.endpoint, rows = rows.len(), "SPARQL query finished");
        Ok(rows)
    }

    fn location(&self) -> &str {
        &self.endpoint
    }
}

/// Classify a non-2xx answer
fn status_error(endpoint: &str, status: StatusCode, payload: &str) -> OntologyError {
    let code = match status.as_u16() {
        400 => ErrorCode::QueryRejected,
        408 => ErrorCode::StoreTimeout,
        404 | 502 | 503 | 504 => ErrorCode::EndpointUnavailable,
        _ => ErrorCode::StoreQueryError,
    };

    OntologyError::new(code, format!("SPARQL endpoint answered HTTP {}", status))
        .with_context("endpoint", endpoint)
        .with_context("status", status.as_u16().to_string())
        .with_payload(truncate(payload, MAX_PAYLOAD_CHARS))
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
