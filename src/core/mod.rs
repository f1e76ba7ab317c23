//! Core abstractions and common definitions
//!
//! This module provides:
//! - `traits`: The `SparqlEndpoint` seam between the query facade and the transport
//! - `namespaces`: RDF/OWL namespace IRI constants and local-name helpers

pub mod traits;
pub mod namespaces;

pub use traits::*;
pub use namespaces::ns;
