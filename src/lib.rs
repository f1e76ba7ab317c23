//! Offer ontology query layer
//!
//! Read-only access to a tourism-offer OWL ontology (accommodation,
//! restaurants, activities and the like) held in a SPARQL 1.1 store such as
//! Apache Jena Fuseki.
//!
//! # Architecture
//!
//! - [`query`] renders each request into SPARQL text from validated parameters
//! - [`store`] sends the text to the endpoint and decodes the JSON results
//! - [`normalize`] turns result rows into flat string records
//! - [`service`] composes the three into the five public operations
//! - [`server`] exposes the operations over HTTP
//!
//! The store is reached through the [`core::SparqlEndpoint`] trait, so the
//! query layer can run against any endpoint implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use oferta_ontology::{OntologyService, Page, SparqlClient};
//!
//! let client = SparqlClient::new("http://localhost:3030/OntologiaOferta/sparql")?;
//! let service = OntologyService::new(Arc::new(client), oferta_ontology::ns::OFERTA);
//!
//! for record in service.free_text_search("playa", Page::default()).await? {
//!     println!("{} ({})", record.get("nombre").unwrap_or(""), record.get("type").unwrap_or(""));
//! }
//! ```

pub mod core;
pub mod config;
pub mod error;
pub mod results;
pub mod query;
pub mod normalize;
pub mod http_client;
pub mod store;
pub mod service;
pub mod server;

// Re-export core traits and types
pub use crate::core::{ns, SparqlEndpoint};

// Re-export configuration
pub use config::{ConfigError, LogLevel, OntologyConfig};

// Re-export error types
pub use error::{ErrorCode, ErrorKind, ErrorResponse, OntologyError, OntologyResult};

// Re-export query types
pub use query::{CategoryName, Operation, Page, QueryTemplates, SearchTerm, Threshold};

// Re-export result and record types
pub use results::{Binding, SparqlResults, TypedValue};
pub use normalize::{normalize, NormalizedRecord};

// Re-export store and facade
pub use store::{SparqlClient, StaticEndpoint};
pub use service::OntologyService;
