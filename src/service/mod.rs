//! Ontology Query Layer
//!
//! [`OntologyService`] is the whole surface callers use. Each operation
//! validates its parameters, renders a template, runs it once against the
//! configured [`SparqlEndpoint`] and normalizes the rows.
//!
//! | Operation | Fields |
//! |---|---|
//! | `root_categories` | nombre |
//! | `subcategories_of` | nombre |
//! | `rated_offers` | nombre, direccion, valoracion, type |
//! | `instances_of_category` | Instancia, Propiedad, Detalles |
//! | `free_text_search` | nombre, direccion, valoracion, type |
//!
//! The service holds no mutable state; clones share the endpoint and are
//! safe to use from many tasks at once. Store errors are returned as-is.
//!
//! # Example
//!
//! ```rust,ignore
//! use oferta_ontology::{OntologyConfig, OntologyService, Page};
//!
//! let service = OntologyService::from_config(&OntologyConfig::load()?)?;
//! let hotels = service.free_text_search("hotel", Page::default()).await?;
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::config::{OntologyConfig, SearchConfig};
use crate::core::{ns, SparqlEndpoint};
use crate::error::OntologyResult;
use crate::normalize::{normalize, NormalizedRecord};
use crate::query::{CategoryName, Operation, Page, QueryTemplates, SearchTerm, Threshold};
use crate::results::Binding;
use crate::store::SparqlClient;

/// Read-only query facade over the offer ontology
#[derive(Clone)]
pub struct OntologyService {
    templates: QueryTemplates,
    endpoint: Arc<dyn SparqlEndpoint>,
    search: SearchConfig,
}

impl OntologyService {
    /// Service over `endpoint` for the given ontology namespace
    pub fn new(endpoint: Arc<dyn SparqlEndpoint>, namespace: impl Into<String>) -> Self {
        Self {
            templates: QueryTemplates::new(namespace),
            endpoint,
            search: SearchConfig::default(),
        }
    }

    /// Service talking HTTP to the configured store
    pub fn from_config(config: &OntologyConfig) -> OntologyResult<Self> {
        let client = SparqlClient::from_config(&config.store)?;
        Ok(Self::new(Arc::new(client), config.store.namespace.clone())
            .with_search_config(config.search.clone()))
    }

    pub fn with_search_config(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn templates(&self) -> &QueryTemplates {
        &self.templates
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search
    }

    pub fn endpoint_location(&self) -> &str {
        self.endpoint.location()
    }

    /// Build a page from optional caller values, applying configured defaults
    pub fn page(&self, limit: Option<i64>, offset: Option<i64>) -> OntologyResult<Page> {
        Page::new(
            limit.unwrap_or_else(|| i64::from(self.search.default_limit)),
            offset.unwrap_or(0),
            self.search.max_limit,
        )
    }

    /// Classes with no superclass
    pub async fn root_categories(&self) -> OntologyResult<Vec<NormalizedRecord>> {
        let query = self.templates.root_categories();
        self.run(Operation::RootCategories, &query).await
    }

    /// Direct subclasses of `category` (spaces allowed, e.g. `"Casa Rural"`)
    pub async fn subcategories_of(&self, category: &str) -> OntologyResult<Vec<NormalizedRecord>> {
        let category = CategoryName::parse(category)?;
        let query = self.templates.subcategories_of(&category);
        self.run(Operation::Subcategories, &query).await
    }

    /// Offers rated above the configured threshold
    pub async fn rated_offers(&self) -> OntologyResult<Vec<NormalizedRecord>> {
        self.rated_offers_above(self.search.rating_threshold).await
    }

    /// Offers rated strictly above `threshold`
    pub async fn rated_offers_above(&self, threshold: f64) -> OntologyResult<Vec<NormalizedRecord>> {
        let threshold = Threshold::new(threshold)?;
        let query = self.templates.rated_offers(threshold);
        self.run(Operation::RatedOffers, &query).await
    }

    /// Literal properties of every individual of `category` or any of its
    /// direct or indirect subclasses
    pub async fn instances_of_category(&self, category: &str) -> OntologyResult<Vec<NormalizedRecord>> {
        let category = CategoryName::parse(category)?;
        let query = self.templates.instances_of_category(&category);
        self.run(Operation::CategoryInstances, &query).await
    }

    /// Offers matching `term` in name, address, rating or type
    pub async fn free_text_search(&self, term: &str, page: Page) -> OntologyResult<Vec<NormalizedRecord>> {
        let term = SearchTerm::parse(term, self.search.max_term_length)?;
        let query = self.templates.free_text_search(&term, page);
        self.run(Operation::FreeTextSearch, &query).await
    }

    async fn run(&self, operation: Operation, query: &str) -> OntologyResult<Vec<NormalizedRecord>> {
        let mut rows = self.endpoint.select(query).await?;

        if operation.fields().contains(&"type") {
            drop_bookkeeping_types(&mut rows);
        }

        let records = normalize(&rows, operation.fields());
        debug!(%operation, records = records.len(), "operation finished");
        Ok(records)
    }
}

/// Remove rows whose `type` is `owl:NamedIndividual`
///
/// The templates already filter these out; this keeps the guarantee
/// independent of the store.
fn drop_bookkeeping_types(rows: &mut Vec<Binding>) {
    rows.retain(|row| {
        row.get("type")
            .map(|t| !(t.is_uri() && t.value == ns::OWL_NAMED_INDIVIDUAL))
            .unwrap_or(true)
    });
}
