//! Query Templates
//!
//! Pure functions that render each semantic request into SPARQL 1.1 text.
//! No I/O happens here; the rendered text can be inspected in tests
//! without a live store.
//!
//! Templates project raw terms (IRIs and typed literals). Local-name
//! extraction and numeric rendering are done by the
//! [`normalize`](crate::normalize) module from the term kind and datatype
//! the store reports, so both stay in one place.
//!
//! Every parameter arrives already validated ([`CategoryName`],
//! [`SearchTerm`], [`Page`], [`Threshold`]):
//!
//! - Categories are rendered as full IRIs `<namespace + name>`.
//! - Search terms are regex-escaped and literal-escaped.
//! - Numbers are rendered from typed values, never from caller text.

pub mod escape;
pub mod params;

pub use params::{CategoryName, Page, SearchTerm, Threshold, DEFAULT_PAGE_LIMIT, DEFAULT_RATING_THRESHOLD};

use std::fmt;

use crate::core::ns;

// ============================================================================
// Operations
// ============================================================================

/// The five read operations of the query layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RootCategories,
    Subcategories,
    RatedOffers,
    CategoryInstances,
    FreeTextSearch,
}

/// Fields of a class listing
pub const CATEGORY_FIELDS: &[&str] = &["nombre"];

/// Fields of an offer listing
pub const OFFER_FIELDS: &[&str] = &["nombre", "direccion", "valoracion", "type"];

/// Fields of an instance/property listing
pub const INSTANCE_FIELDS: &[&str] = &["Instancia", "Propiedad", "Detalles"];

impl Operation {
    /// Record fields this operation produces, in output order
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Operation::RootCategories | Operation::Subcategories => CATEGORY_FIELDS,
            Operation::RatedOffers | Operation::FreeTextSearch => OFFER_FIELDS,
            Operation::CategoryInstances => INSTANCE_FIELDS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::RootCategories => "root_categories",
            Operation::Subcategories => "subcategories",
            Operation::RatedOffers => "rated_offers",
            Operation::CategoryInstances => "category_instances",
            Operation::FreeTextSearch => "free_text_search",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Templates
// ============================================================================

/// Renders queries against one ontology namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplates {
    namespace: String,
}

impl Default for QueryTemplates {
    fn default() -> Self {
        Self::new(ns::OFERTA)
    }
}

impl QueryTemplates {
    /// `namespace` is the ontology IRI prefix, ending in `#` or `/`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn prologue(&self) -> String {
        format!(
            "PREFIX rdf: <{}>\nPREFIX rdfs: <{}>\nPREFIX owl: <{}>\nPREFIX xsd: <{}>\nPREFIX : <{}>\n",
            ns::RDF,
            ns::RDFS,
            ns::OWL,
            ns::XSD,
            self.namespace
        )
    }

    /// Classes of the ontology namespace with no declared superclass
    pub fn root_categories(&self) -> String {
        format!(
            "{}\
SELECT DISTINCT ?nombre
WHERE {{
  ?nombre rdf:type owl:Class .
  FILTER NOT EXISTS {{ ?nombre rdfs:subClassOf ?superclass }}
  FILTER(isIRI(?nombre) && STRSTARTS(STR(?nombre), STR(:)))
}}
ORDER BY ?nombre
",
            self.prologue()
        )
    }

    /// Classes whose direct superclass is `category`
    pub fn subcategories_of(&self, category: &CategoryName) -> String {
        let parent = category.to_iri(&self.namespace);
        format!(
            "{}\
SELECT DISTINCT ?nombre
WHERE {{
  ?nombre rdfs:subClassOf {parent} .
  FILTER(isIRI(?nombre) && ?nombre != {parent})
}}
ORDER BY ?nombre
",
            self.prologue(),
            parent = parent
        )
    }

    /// Offers with `valoracion` strictly above `threshold`, with their asserted type
    pub fn rated_offers(&self, threshold: Threshold) -> String {
        format!(
            "{}\
SELECT ?nombre ?direccion ?valoracion ?type
WHERE {{
{}
  FILTER(?type != owl:NamedIndividual && ?valoracion > {})
}}
ORDER BY DESC(?valoracion) ?x ?type ?nombre ?direccion
",
            self.prologue(),
            OFFER_PATTERN,
            threshold.to_sparql()
        )
    }

    /// Literal-valued properties of every individual typed with `category`
    /// or any class below it (`rdfs:subClassOf*`, zero or more steps)
    pub fn instances_of_category(&self, category: &CategoryName) -> String {
        format!(
            "{}\
SELECT DISTINCT ?Instancia ?Propiedad ?Detalles
WHERE {{
  ?Instancia rdf:type ?clase .
  ?clase rdfs:subClassOf* {} .
  ?Instancia ?Propiedad ?Detalles .
  FILTER(isLiteral(?Detalles))
}}
ORDER BY ?Instancia ?Propiedad ?Detalles
",
            self.prologue(),
            category.to_iri(&self.namespace)
        )
    }

    /// Offers whose name, address, rating or type local name matches `term`,
    /// case-insensitively, one page at a time
    ///
    /// The `ORDER BY` covers every pattern variable so consecutive pages are
    /// disjoint and contiguous over an unchanged store.
    pub fn free_text_search(&self, term: &SearchTerm, page: Page) -> String {
        let pattern = term.to_regex_literal();
        format!(
            "{}\
SELECT ?nombre ?direccion ?valoracion ?type
WHERE {{
{}
  FILTER(
    ?type != owl:NamedIndividual &&
    (
      REGEX(STR(?nombre), {p}, \"i\") ||
      REGEX(STR(?direccion), {p}, \"i\") ||
      REGEX(STR(?valoracion), {p}, \"i\") ||
      REGEX(REPLACE(STR(?type), \"^.*#\", \"\"), {p}, \"i\")
    )
  )
}}
ORDER BY ?x ?type ?nombre ?direccion ?valoracion
LIMIT {}
OFFSET {}
",
            self.prologue(),
            OFFER_PATTERN,
            page.limit(),
            page.offset(),
            p = pattern
        )
    }
}

/// Triple patterns shared by the offer listings
const OFFER_PATTERN: &str = "  ?x :direccion ?direccion .
  ?x :nombre ?nombre .
  ?x :valoracion ?valoracion .
  ?x rdf:type ?type .";

// ============================================================================
// Tests
// ============================================================================
