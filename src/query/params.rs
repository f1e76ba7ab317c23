//! Validated query parameters
//!
//! Every externally supplied fragment of query text goes through one of
//! these types. Construction is the only place `InvalidParameter` errors
//! are raised, so nothing invalid ever reaches the store.

use std::fmt;

use crate::error::{OntologyError, OntologyResult};
use crate::query::escape;

/// Default page size for free-text search
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Default rating threshold for the rated-offers listing
pub const DEFAULT_RATING_THRESHOLD: f64 = 4.5;

/// Local name of an ontology class, spaces already turned into underscores
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Normalize and validate user input such as `"Casa Rural"`
    ///
    /// Accepts Unicode letters and digits plus `_`, `-` and `.`. Anything
    /// else cannot be part of a class local name and is rejected.
    pub fn parse(raw: &str) -> OntologyResult<Self> {
        let normalized = raw.trim().replace(' ', "_");
        if normalized.is_empty() {
            return Err(OntologyError::empty_parameter("categoria"));
        }

        if let Some(bad) = normalized
            .chars()
            .find(|c| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(OntologyError::invalid_category(
                raw,
                format!("category names cannot contain {:?}", bad),
            ));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full IRI reference in the given namespace, e.g. `<...#Casa_Rural>`
    pub fn to_iri(&self, namespace: &str) -> String {
        format!("<{}{}>", namespace, self.0)
    }
}

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Untrusted free-text search input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn parse(raw: &str, max_len: usize) -> OntologyResult<Self> {
        let term = raw.trim();
        if term.is_empty() {
            return Err(OntologyError::empty_parameter("q"));
        }

        let len = term.chars().count();
        if len > max_len {
            return Err(OntologyError::invalid_search_term(format!(
                "search term is {} characters long, the limit is {}",
                len, max_len
            )));
        }

        if term.chars().any(char::is_control) {
            return Err(OntologyError::invalid_search_term(
                "search term cannot contain control characters",
            ));
        }

        Ok(Self(term.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Quoted SPARQL literal matching this term literally inside `REGEX`
    pub fn to_regex_literal(&self) -> String {
        escape::regex_literal(&self.0)
    }
}

/// A `LIMIT`/`OFFSET` window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: u32,
    offset: u64,
}

impl Page {
    /// Validate caller-supplied values; `limit` must be in `1..=max_limit`
    pub fn new(limit: i64, offset: i64, max_limit: u32) -> OntologyResult<Self> {
        if offset < 0 {
            return Err(OntologyError::invalid_pagination(format!(
                "offset cannot be negative, got {}",
                offset
            ))
            .with_context("offset", offset.to_string()));
        }

        if limit < 1 || limit > i64::from(max_limit) {
            return Err(OntologyError::invalid_pagination(format!(
                "limit must be between 1 and {}, got {}",
                max_limit, limit
            ))
            .with_context("limit", limit.to_string()));
        }

        Ok(Self {
            limit: limit as u32,
            offset: offset as u64,
        })
    }

    /// First page of the given size
    pub fn first(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            offset: 0,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The page immediately following this one
    pub fn next(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset + u64::from(self.limit),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_LIMIT)
    }
}

/// Lower bound (exclusive) on `valoracion`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> OntologyResult<Self> {
        if !value.is_finite() {
            return Err(OntologyError::invalid_threshold(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Plain decimal numeral, never exponent notation
    pub fn to_sparql(&self) -> String {
        format!("{}", self.0)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_RATING_THRESHOLD)
    }
}
