//! Standard RDF and ontology namespace IRI constants
//!
//! These constants keep namespace IRIs in one place so query templates
//! and the result normalizer agree on them.

/// Standard namespace IRI constants
pub mod ns {
    // W3C Core Vocabularies
    /// RDF namespace
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// RDF Schema namespace
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    /// XML Schema Datatypes namespace
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    /// OWL Web Ontology Language namespace
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";

    /// Default namespace of the tourism offer ontology
    pub const OFERTA: &str = "http://www.semanticweb.org/germanlozano/oferta#";

    // Frequently used terms
    /// `owl:NamedIndividual`, the bookkeeping type every individual carries
    pub const OWL_NAMED_INDIVIDUAL: &str = "http://www.w3.org/2002/07/owl#NamedIndividual";
    /// `xsd:double`
    pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    /// `xsd:float`
    pub const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";

    /// Helper to construct a full IRI from namespace and local name
    #[inline]
    pub fn uri(namespace: &str, local: &str) -> String {
        format!("{}{}", namespace, local)
    }

    /// Fragment of an IRI: everything after the last `#`
    ///
    /// IRIs without a `#` are returned whole.
    #[inline]
    pub fn fragment(uri: &str) -> &str {
        match uri.rfind('#') {
            Some(pos) => &uri[pos + 1..],
            None => uri,
        }
    }
}
