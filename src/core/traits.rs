//! Core trait abstractions
//!
//! The query facade talks to the triple store only through
//! [`SparqlEndpoint`], so the HTTP client can be swapped for an
//! in-process fake in tests or for another transport.

use async_trait::async_trait;

use crate::error::OntologyResult;
use crate::results::Binding;

/// A read-only SPARQL 1.1 query endpoint
///
/// # Contract
///
/// - `select` performs at most one round-trip and never retries.
/// - A successful call with no matching rows returns `Ok(vec![])`.
/// - Transport failures surface as `ErrorKind::StoreUnavailable`, and
///   rejected or unreadable responses as `ErrorKind::StoreQueryError`;
///   a failure is never reported as an empty result.
///
/// Implementations hold no per-call mutable state and may be shared
/// across tasks.
#[async_trait]
pub trait SparqlEndpoint: Send + Sync {
    /// Execute a SELECT query and return its result rows
    async fn select(&self, query: &str) -> OntologyResult<Vec<Binding>>;

    /// Human-readable location of the endpoint, for logs and errors
    fn location(&self) -> &str;
}
