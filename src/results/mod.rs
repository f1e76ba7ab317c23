//! SPARQL 1.1 Query Results JSON format
//!
//! Explicit serde types for the `application/sparql-results+json` body
//! returned by the store. Decoding is strict: a body without
//! `results.bindings`, a term without `type`/`value`, or an unknown term
//! type is an error rather than a silently empty row.
//!
//! ```json
//! {
//!   "head": { "vars": ["nombre", "type"] },
//!   "results": { "bindings": [
//!     { "nombre": { "type": "literal", "value": "Hotel Sol" },
//!       "type":   { "type": "uri", "value": "http://example.org/onto#Hotel" } }
//!   ] }
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::ns;
use crate::error::{OntologyError, OntologyResult};

/// Media type requested from the store
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Kind of RDF term in a result row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermKind {
    #[serde(rename = "uri")]
    Uri,
    #[serde(rename = "literal")]
    Literal,
    /// Legacy form emitted by older stores for datatyped literals
    #[serde(rename = "typed-literal")]
    TypedLiteral,
    #[serde(rename = "bnode")]
    BlankNode,
}

/// One bound value: the term's lexical text plus its kind and datatype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    #[serde(rename = "type")]
    pub kind: TermKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl TypedValue {
    /// An IRI
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Uri,
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    /// A plain literal
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    /// A datatyped literal
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            datatype: Some(datatype.into()),
            lang: None,
        }
    }

    /// A language-tagged literal
    pub fn lang_literal(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            datatype: None,
            lang: Some(lang.into()),
        }
    }

    pub fn is_uri(&self) -> bool {
        self.kind == TermKind::Uri
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, TermKind::Literal | TermKind::TypedLiteral)
    }

    /// Whether this literal is an `xsd:double` or `xsd:float`
    pub fn is_floating_point(&self) -> bool {
        self.is_literal()
            && matches!(self.datatype.as_deref(), Some(ns::XSD_DOUBLE) | Some(ns::XSD_FLOAT))
    }
}

/// One result row: variable name to bound value
///
/// Variables left unbound by the query (e.g. under `OPTIONAL`) are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Binding(HashMap<String, TypedValue>);

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and fakes
    pub fn with(mut self, var: impl Into<String>, value: TypedValue) -> Self {
        self.0.insert(var.into(), value);
        self
    }

    pub fn insert(&mut self, var: impl Into<String>, value: TypedValue) {
        self.0.insert(var.into(), value);
    }

    pub fn get(&self, var: &str) -> Option<&TypedValue> {
        self.0.get(var)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn vars(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, TypedValue)> for Binding {
    fn from_iter<I: IntoIterator<Item = (String, TypedValue)>>(iter: I) -> Self {
        Binding(iter.into_iter().collect())
    }
}

/// `head` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsHead {
    #[serde(default)]
    pub vars: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<String>,
}

/// `results` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub bindings: Vec<Binding>,
}

/// A whole SELECT response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: ResultsHead,
    pub results: ResultSet,
}

impl SparqlResults {
    /// Build a response from rows, as a store would
    pub fn from_bindings(vars: &[&str], bindings: Vec<Binding>) -> Self {
        Self {
            head: ResultsHead {
                vars: vars.iter().map(|v| v.to_string()).collect(),
                link: Vec::new(),
            },
            results: ResultSet { bindings },
        }
    }

    /// Decode a response body
    pub fn from_slice(body: &[u8]) -> OntologyResult<Self> {
        serde_json::from_slice(body).map_err(|e| {
            OntologyError::malformed_results(format!("response is not SPARQL JSON results: {}", e))
                .with_context("format", SPARQL_RESULTS_JSON)
        })
    }

    pub fn into_bindings(self) -> Vec<Binding> {
        self.results.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const FUSEKI_BODY: &str = r#"{
        "head": { "vars": ["x", "nombre", "valoracion", "type"] },
        "results": { "bindings": [
            {
                "x": { "type": "uri", "value": "http://www.semanticweb.org/germanlozano/oferta#HotelSol" },
                "nombre": { "type": "literal", "value": "Hotel Sol", "xml:lang": "es" },
                "valoracion": { "type": "literal", "datatype": "http://www.w3.org/2001/XMLSchema#double", "value": "4.8" },
                "type": { "type": "uri", "value": "http://www.semanticweb.org/germanlozano/oferta#Hotel" }
            },
            {
                "x": { "type": "bnode", "value": "b0" }
            }
        ] }
    }"#;

    #[test]
    fn test_decode_fuseki_body() {
        let results = SparqlResults::from_slice(FUSEKI_BODY.as_bytes()).unwrap();
        assert_eq!(results.head.vars, vec!["x", "nombre", "valoracion", "type"]);

        let rows = results.into_bindings();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert!(first.get("x").unwrap().is_uri());
        assert_eq!(first.get("nombre").unwrap().lang.as_deref(), Some("es"));
        assert!(first.get("valoracion").unwrap().is_floating_point());
        assert_eq!(rows[1].get("x").unwrap().kind, TermKind::BlankNode);
        assert!(rows[1].get("nombre").is_none());
    }

    #[test]
    fn test_decode_empty_result_set() {
        let body = r#"{ "head": { "vars": ["nombre"] }, "results": { "bindings": [] } }"#;
        let rows = SparqlResults::from_slice(body.as_bytes()).unwrap().into_bindings();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_legacy_typed_literal() {
        let body = r#"{ "head": { "vars": ["v"] }, "results": { "bindings": [
            { "v": { "type": "typed-literal", "datatype": "http://www.w3.org/2001/XMLSchema#double", "value": "4.0" } }
        ] } }"#;
        let rows = SparqlResults::from_slice(body.as_bytes()).unwrap().into_bindings();
        let v = rows[0].get("v").unwrap();
        assert_eq!(v.kind, TermKind::TypedLiteral);
        assert!(v.is_floating_point());
    }

    #[test]
    fn test_missing_bindings_is_malformed() {
        let ask = r#"{ "head": {}, "boolean": true }"#;
        let err = SparqlResults::from_slice(ask.as_bytes()).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedResults);
    }

    #[test]
    fn test_unknown_term_type_is_malformed() {
        let body = r#"{ "head": { "vars": ["v"] }, "results": { "bindings": [
            { "v": { "type": "mystery", "value": "?" } }
        ] } }"#;
        assert!(SparqlResults::from_slice(body.as_bytes()).is_err());
    }

    #[test]
    fn test_html_error_page_is_malformed() {
        let err = SparqlResults::from_slice(b"<html>Service Unavailable</html>").unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedResults);
    }

    #[test]
    fn test_integer_literal_is_not_floating_point() {
        let v = TypedValue::typed_literal("4", format!("{}integer", ns::XSD));
        assert!(!v.is_floating_point());
        assert!(!TypedValue::uri(ns::XSD_DOUBLE).is_floating_point());
    }
}
