//! Fixed-answer endpoint
//!
//! A [`SparqlEndpoint`] that answers every query with the same rows (or
//! the same error) and remembers the query text it received. Used to
//! exercise the facade and HTTP layer without a store.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::SparqlEndpoint;
use crate::error::{OntologyError, OntologyResult};
use crate::results::Binding;

#[derive(Debug)]
pub struct StaticEndpoint {
    outcome: Result<Vec<Binding>, OntologyError>,
    queries: Mutex<Vec<String>>,
}

impl StaticEndpoint {
    /// Answer every query with `rows`
    pub fn returning(rows: Vec<Binding>) -> Self {
        Self {
            outcome: Ok(rows),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Fail every query with `err`
    pub fn failing(err: OntologyError) -> Self {
        Self {
            outcome: Err(err),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Query texts received so far, oldest first
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last_query(&self) -> Option<String> {
        self.queries().pop()
    }
}

#[async_trait]
impl SparqlEndpoint for StaticEndpoint {
    async fn select(&self, query: &str) -> OntologyResult<Vec<Binding>> {
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(query.to_string());
        self.outcome.clone()
    }

    fn location(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::TypedValue;

    #[tokio::test]
    async fn test_records_queries() {
        let endpoint = StaticEndpoint::returning(vec![
            Binding::new().with("nombre", TypedValue::literal("A")),
        ]);

        let rows = endpoint.select("SELECT 1").await.unwrap();
        assert_eq!(rows.len(), 1);
        endpoint.select("SELECT 2").await.unwrap();

        assert_eq!(endpoint.queries(), vec!["SELECT 1", "SELECT 2"]);
        assert_eq!(endpoint.last_query().as_deref(), Some("SELECT 2"));
    }

    #[tokio::test]
    async fn test_failing() {
        let endpoint = StaticEndpoint::failing(OntologyError::store_unavailable("down"));
        assert!(endpoint.select("SELECT 1").await.is_err());
        assert_eq!(endpoint.queries().len(), 1);
    }
}
