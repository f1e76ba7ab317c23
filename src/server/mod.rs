//! Async HTTP Server Module
//!
//! Exposes the query layer over HTTP with axum, using the route names and
//! JSON keys of the public tourism-offer API.
//!
//! # Routes
//!
//! | Route | Operation | Record keys |
//! |---|---|---|
//! | `GET /categorias` | root categories | nombre |
//! | `GET /subcategorias/:categoria` | subcategories | nombre |
//! | `GET /ofertas-destacadas[?umbral=]` | rated offers | nombre, direccion, valoracion, tipo |
//! | `GET /instancias/:categoria` | category instances | instancia, propiedad, detalle |
//! | `GET /buscar?q=[&offset=][&limit=]` | free-text search | nombre, direccion, valoracion, tipo |
//! | `GET /health` | liveness | |
//!
//! Errors are answered with an [`ErrorResponse`] body and the status of
//! their [`ErrorCode`](crate::error::ErrorCode).
//!
//! # Example
//!
//! ```rust,ignore
//! use oferta_ontology::{server::run_server, OntologyConfig, OntologyService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = OntologyConfig::load()?;
//!     let service = OntologyService::from_config(&config)?;
//!     run_server(service, config.server).await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{ErrorResponse, OntologyError, OntologyResult};
use crate::normalize::NormalizedRecord;
use crate::service::OntologyService;

/// Offer field names as the API publishes them
const OFFER_KEYS: &[(&str, &str)] = &[("type", "tipo")];

/// Instance field names as the API publishes them
const INSTANCE_KEYS: &[(&str, &str)] = &[
    ("Instancia", "instancia"),
    ("Propiedad", "propiedad"),
    ("Detalles", "detalle"),
];

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the server
pub struct AppState {
    pub service: OntologyService,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(service: OntologyService, config: ServerConfig) -> Self {
        Self { service, config }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for GET /ofertas-destacadas
#[derive(Debug, Deserialize)]
pub struct RatedParams {
    umbral: Option<String>,
}

/// Query parameters for GET /buscar
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    offset: Option<String>,
    limit: Option<String>,
}

/// An [`OntologyError`] answered as JSON
pub struct ApiError(OntologyError);

impl From<OntologyError> for ApiError {
    fn from(err: OntologyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(code = ?self.0.code, status = status.as_u16(), "{}", self.0.message);
        }
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

type ApiResult = Result<Json<Vec<NormalizedRecord>>, ApiError>;

fn publish(records: Vec<NormalizedRecord>, keys: &[(&str, &str)]) -> Json<Vec<NormalizedRecord>> {
    Json(records.into_iter().map(|r| r.renamed(keys)).collect())
}

/// `offset` values that do not parse are read as 0
fn lenient_offset(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

fn parse_limit(raw: Option<&str>) -> OntologyResult<Option<i64>> {
    match raw {
        None => Ok(None),
        Some(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| OntologyError::invalid_pagination(format!("limit is not an integer: {}", s))),
    }
}

fn parse_threshold(raw: &str) -> OntologyResult<f64> {
    raw.trim().parse().map_err(|_| {
        OntologyError::invalid_parameter(format!("umbral is not a number: {}", raw))
            .with_code(crate::error::ErrorCode::InvalidThreshold)
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Handle GET /categorias
async fn categorias(State(state): State<SharedState>) -> ApiResult {
    let records = state.service.root_categories().await?;
    Ok(Json(records))
}

/// Handle GET /subcategorias/:categoria
async fn subcategorias(State(state): State<SharedState>, Path(categoria): Path<String>) -> ApiResult {
    let records = state.service.subcategories_of(&categoria).await?;
    Ok(Json(records))
}

/// Handle GET /ofertas-destacadas?umbral=...
async fn ofertas_destacadas(State(state): State<SharedState>, Query(params): Query<RatedParams>) -> ApiResult {
    let records = match params.umbral.as_deref() {
        Some(raw) => state.service.rated_offers_above(parse_threshold(raw)?).await?,
        None => state.service.rated_offers().await?,
    };
    Ok(publish(records, OFFER_KEYS))
}

/// Handle GET /instancias/:categoria
async fn instancias(State(state): State<SharedState>, Path(categoria): Path<String>) -> ApiResult {
    let records = state.service.instances_of_category(&categoria).await?;
    Ok(publish(records, INSTANCE_KEYS))
}

/// Handle GET /buscar?q=...&offset=...&limit=...
async fn buscar(State(state): State<SharedState>, Query(params): Query<SearchParams>) -> ApiResult {
    let term = params
        .q
        .as_deref()
        .ok_or_else(|| OntologyError::empty_parameter("q"))?;
    let page = state.service.page(
        parse_limit(params.limit.as_deref())?,
        Some(lenient_offset(params.offset.as_deref())),
    )?;
    let records = state.service.free_text_search(term, page).await?;
    Ok(publish(records, OFFER_KEYS))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

// ============================================================================
// Server Setup
// ============================================================================

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let cors_enabled = state.config.cors_enabled;

    let router = Router::new()
        .route("/categorias", get(categorias))
        .route("/subcategorias/:categoria", get(subcategorias))
        .route("/ofertas-destacadas", get(ofertas_destacadas))
        .route("/instancias/:categoria", get(instancias))
        .route("/buscar", get(buscar))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_enabled {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_origin(Any)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);
        router.layer(cors)
    } else {
        router
    }
}

/// Run the HTTP server until Ctrl+C
pub async fn run_server(service: OntologyService, config: ServerConfig) -> OntologyResult<()> {
    let addr = config.socket_addr()?;
    let endpoint = service.endpoint_location().to_string();
    let app = create_router(Arc::new(AppState::new(service, config)));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| OntologyError::config(format!("cannot bind {}", addr)).with_cause(e.to_string()))?;

    info!(%addr, store = %endpoint, "ontology API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| OntologyError::internal("HTTP server failed").with_cause(e.to_string()))?;

    info!("server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C)
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; stop the process to shut down");
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ns;
    use crate::error::ErrorCode;
    use crate::results::{Binding, TypedValue};
    use crate::store::{SparqlClient, StaticEndpoint};
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    fn offers() -> Vec<Binding> {
        vec![Binding::new()
            .with("nombre", TypedValue::literal("Hotel Sol"))
            .with("direccion", TypedValue::literal("Calle Mayor 1"))
            .with("valoracion", TypedValue::typed_literal("4.8", ns::XSD_DOUBLE))
            .with("type", TypedValue::uri(ns::uri(ns::OFERTA, "Hotel")))]
    }

    fn app_with(endpoint: Arc<StaticEndpoint>, config: ServerConfig) -> Router {
        let service = OntologyService::new(endpoint, ns::OFERTA);
        create_router(Arc::new(AppState::new(service, config)))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = app_with(Arc::new(StaticEndpoint::returning(vec![])), ServerConfig::default());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_categorias() {
        let endpoint = Arc::new(StaticEndpoint::returning(vec![
            Binding::new().with("nombre", TypedValue::uri(ns::uri(ns::OFERTA, "Alojamiento"))),
        ]));
        let app = app_with(endpoint, ServerConfig::default());

        let (status, json) = get_json(app, "/categorias").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([{ "nombre": "Alojamiento" }]));
    }

    #[tokio::test]
    async fn test_subcategorias_accepts_spaces() {
        let endpoint = Arc::new(StaticEndpoint::returning(vec![]));
        let app = app_with(endpoint.clone(), ServerConfig::default());

        let (status, json) = get_json(app, "/subcategorias/Casa%20Rural").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
        assert!(endpoint.last_query().unwrap().contains("Casa_Rural>"));
    }

    #[tokio::test]
    async fn test_ofertas_destacadas_uses_wire_keys() {
        let endpoint = Arc::new(StaticEndpoint::returning(offers()));
        let app = app_with(endpoint.clone(), ServerConfig::default());

        let (status, json) = get_json(app, "/ofertas-destacadas?umbral=4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!([{
                "nombre": "Hotel Sol",
                "direccion": "Calle Mayor 1",
                "valoracion": "4.8",
                "tipo": "Hotel"
            }])
        );
        assert!(endpoint.last_query().unwrap().contains("?valoracion > 4"));
    }

    #[tokio::test]
    async fn test_ofertas_destacadas_bad_threshold() {
        let endpoint = Arc::new(StaticEndpoint::returning(offers()));
        let app = app_with(endpoint.clone(), ServerConfig::default());

        let (status, json) = get_json(app, "/ofertas-destacadas?umbral=alto").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "InvalidThreshold");
        assert!(endpoint.queries().is_empty());
    }

    #[tokio::test]
    async fn test_instancias_uses_wire_keys() {
        let endpoint = Arc::new(StaticEndpoint::returning(vec![Binding::new()
            .with("Instancia", TypedValue::uri(ns::uri(ns::OFERTA, "HotelSol")))
            .with("Propiedad", TypedValue::uri(ns::uri(ns::OFERTA, "nombre")))
            .with("Detalles", TypedValue::literal("Hotel Sol"))]));
        let app = app_with(endpoint, ServerConfig::default());

        let (status, json) = get_json(app, "/instancias/Alojamiento").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!([{ "instancia": "HotelSol", "propiedad": "nombre", "detalle": "Hotel Sol" }])
        );
    }

    #[tokio::test]
    async fn test_buscar_requires_q() {
        let endpoint = Arc::new(StaticEndpoint::returning(offers()));
        let app = app_with(endpoint.clone(), ServerConfig::default());

        let (status, json) = get_json(app, "/buscar").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "INVALID_PARAMETER");
        assert!(endpoint.queries().is_empty());
    }

    #[tokio::test]
    async fn test_buscar_pagination() {
        let endpoint = Arc::new(StaticEndpoint::returning(offers()));
        let app = app_with(endpoint.clone(), ServerConfig::default());

        let uri = format!("/buscar?q={}&offset=20", urlencoding::encode("hotel sol"));
        let (status, json) = get_json(app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["tipo"], "Hotel");

        let query = endpoint.last_query().unwrap();
        assert!(query.contains("LIMIT 20"));
        assert!(query.contains("OFFSET 20"));
    }

    #[tokio::test]
    async fn test_buscar_unparsable_offset_is_zero() {
        let endpoint = Arc::new(StaticEndpoint::returning(vec![]));
        let app = app_with(endpoint.clone(), ServerConfig::default());

        let (status, _) = get_json(app, "/buscar?q=hotel&offset=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert!(endpoint.last_query().unwrap().contains("OFFSET 0"));
    }

    #[tokio::test]
    async fn test_buscar_negative_offset() {
        let endpoint = Arc::new(StaticEndpoint::returning(vec![]));
        let app = app_with(endpoint.clone(), ServerConfig::default());

        let (status, json) = get_json(app, "/buscar?q=hotel&offset=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "InvalidPagination");
        assert!(endpoint.queries().is_empty());
    }

    #[tokio::test]
    async fn test_store_unavailable_is_503() {
        let endpoint = Arc::new(StaticEndpoint::failing(
            OntologyError::store_unavailable("cannot connect to http://localhost:3030").with_code(ErrorCode::ConnectionFailed),
        ));
        let app = app_with(endpoint, ServerConfig::default());

        let (status, json) = get_json(app, "/categorias").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["kind"], "STORE_UNAVAILABLE");
        assert_eq!(json["code"], "ConnectionFailed");
    }

    #[tokio::test]
    async fn test_unreachable_store_over_http() {
        let server = wiremock::MockServer::start().await;
        let endpoint = format!("{}/sparql", server.uri());
        drop(server);

        let service = OntologyService::new(Arc::new(SparqlClient::new(endpoint).unwrap()), ns::OFERTA);
        let app = create_router(Arc::new(AppState::new(service, ServerConfig::default())));

        let (status, json) = get_json(app, "/buscar?q=hotel").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["kind"], "STORE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_cors_header() {
        let endpoint = Arc::new(StaticEndpoint::returning(vec![]));
        let request = || {
            Request::builder()
                .uri("/categorias")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap()
        };

        let app = app_with(endpoint.clone(), ServerConfig::default());
        let response = app.oneshot(request()).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );

        let config = ServerConfig {
            cors_enabled: false,
            ..Default::default()
        };
        let response = app_with(endpoint, config).oneshot(request()).await.unwrap();
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn test_lenient_offset() {
        assert_eq!(lenient_offset(None), 0);
        assert_eq!(lenient_offset(Some("15")), 15);
        assert_eq!(lenient_offset(Some("quince")), 0);
        assert_eq!(lenient_offset(Some("-3")), -3);
    }
}
