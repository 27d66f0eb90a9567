//! Generic API structures and handlers
//!
//! This module contains shared response structures, the rejection handler,
//! the CORS policy, and the `ApiServer` that assembles all routes.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::http::header::{HeaderValue, WWW_AUTHENTICATE};
use warp::http::{Method, StatusCode};
use warp::{Filter, Rejection, Reply};

use super::auth::{login_handler, with_auth, with_tokens};
use super::facilities::{
    create_facility_handler, get_facility_handler, list_facilities_handler,
    risk_assessment_handler, with_scorer, with_store,
};
use crate::auth::TokenService;
use crate::config::Config;
use crate::error::ServiceError;
use crate::risk::{RiskScorer, UniformRandomScorer};
use crate::storage::FacilityStore;

/// Target used for the per-request access log.
const HTTP_LOG_TARGET: &str = "tailings_api::http";

// ============================================================================
// SHARED RESPONSE STRUCTURES
// ============================================================================

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable failure description
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process is serving
    pub status: String,
    /// Server time (UTC)
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// CUSTOM REJECTION TYPES
// ============================================================================

impl warp::reject::Reject for ServiceError {}

/// Custom rejection for request bodies that do not decode into the expected shape
#[derive(Debug)]
pub struct JsonDeserializeError(pub String);

impl warp::reject::Reject for JsonDeserializeError {}

// ============================================================================
// CORS CONFIGURATION
// ============================================================================

/// Creates a CORS filter based on the configured allowed origins.
fn create_cors_filter(allowed_origins: &[String]) -> warp::cors::Builder {
    let methods = vec![Method::GET, Method::POST, Method::OPTIONS];
    // warp has no allow-any-header option; this covers what the API reads
    // plus the usual browser headers. Preflights asking for others get 403.
    let headers = vec![
        "accept",
        "authorization",
        "content-type",
        "origin",
        "x-requested-with",
    ];

    if allowed_origins.iter().any(|origin| origin == "*") {
        warp::cors()
            .allow_any_origin()
            .allow_methods(methods)
            .allow_headers(headers)
    } else {
        let origins: Vec<&str> = allowed_origins.iter().map(|s| s.as_str()).collect();
        warp::cors()
            .allow_origins(origins)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true)
    }
}

// ============================================================================
// REJECTION HANDLER
// ============================================================================

/// Global rejection handler for all API routes.
///
/// Converts rejections into `{"detail": ...}` bodies. Domain errors are checked
/// first so that an authorization failure on one route wins over a method or
/// path mismatch on another. 401 replies carry `WWW-Authenticate: Bearer`.
pub async fn handle_rejection(rej: Rejection) -> Result<warp::reply::Response, std::convert::Infallible> {
    let (status, message) = if let Some(err) = rej.find::<ServiceError>() {
        match err {
            ServiceError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ServiceError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        }
    } else if let Some(err) = rej.find::<JsonDeserializeError>() {
        (StatusCode::UNPROCESSABLE_ENTITY, err.0.clone())
    } else if let Some(err) = rej.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::UNPROCESSABLE_ENTITY, format!("Invalid request body: {}", err))
    } else if rej.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported media type".to_string())
    } else if rej.find::<warp::cors::CorsForbidden>().is_some() {
        (StatusCode::FORBIDDEN, "CORS request forbidden".to_string())
    } else if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if rej.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", rej);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    let mut response =
        warp::reply::with_status(warp::reply::json(&ErrorResponse::new(message)), status)
            .into_response();
    if status == StatusCode::UNAUTHORIZED {
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    Ok(response)
}

// ============================================================================
// API SERVER IMPLEMENTATION
// ============================================================================

/// REST API server for the tailings service.
///
/// Owns the shared state handed to every route: configuration, the token
/// service, the facility store and the risk scorer.
pub struct ApiServer {
    /// Service configuration
    config: Arc<Config>,
    /// Issues and verifies bearer tokens
    tokens: Arc<TokenService>,
    /// Facilities and the assessment log
    store: Arc<FacilityStore>,
    /// Source of risk scores
    scorer: Arc<dyn RiskScorer>,
}

impl ApiServer {
    /// Creates a new API server with an empty store and the uniform random scorer.
    ///
    /// # Arguments
    ///
    /// * `config` - Service configuration
    /// * `tokens` - Token service used by `/token` and the bearer filter
    pub fn new(config: Config, tokens: TokenService) -> Self {
        Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            store: Arc::new(FacilityStore::new()),
            scorer: Arc::new(UniformRandomScorer),
        }
    }

    /// Replaces the risk scorer.
    pub fn with_scorer(mut self, scorer: Arc<dyn RiskScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Starts the API server and serves requests until Ctrl-C.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Server shut down cleanly
    /// * `Err(anyhow::Error)` - Address could not be parsed or bound
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting API server on {}:{}",
            self.config.api.host, self.config.api.port
        );
        if self.config.allows_any_origin() {
            warn!("CORS allows any origin; restrict api.cors_origins for non-demo deployments");
        }

        let routes = self.create_routes();

        let addr: std::net::SocketAddr = format!("{}:{}", self.config.api.host, self.config.api.port)
            .parse()
            .context("Failed to parse API server address")?;

        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Shutdown signal received");
                }
            })
            .context("Failed to bind API server address")?;

        info!("API server listening on http://{}", bound);
        server.await;
        info!("API server stopped");

        Ok(())
    }

    /// Creates all API routes for the server.
    ///
    /// # Returns
    ///
    /// A warp filter containing all API routes
    pub(crate) fn create_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        let tokens = self.tokens.clone();
        let store = self.store.clone();
        let scorer = self.scorer.clone();

        // Health check endpoint - open
        let health = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .map(|| {
                warp::reply::json(&HealthResponse {
                    status: "healthy".to_string(),
                    timestamp: Utc::now(),
                })
            });

        // POST /token - exchange the demo credential for a bearer token
        let login = warp::path("token")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::form())
            .and(with_tokens(tokens.clone()))
            .and_then(login_handler);

        // GET /facilities - all facilities in creation order
        let list_facilities = warp::path("facilities")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_auth(tokens.clone()))
            .and(with_store(store.clone()))
            .and_then(list_facilities_handler);

        // POST /facilities - create a facility
        let create_facility = warp::path("facilities")
            .and(warp::path::end())
            .and(warp::post())
            .and(with_auth(tokens.clone()))
            .and(warp::body::bytes())
            .and(with_store(store.clone()))
            .and_then(create_facility_handler);

        // GET /facilities/:id - a single facility
        let get_facility = warp::path!("facilities" / u64)
            .and(warp::get())
            .and(with_auth(tokens.clone()))
            .and(with_store(store.clone()))
            .and_then(get_facility_handler);

        // /facilities/:id/risk-assessment - POST creates an assessment
        let risk_assessment = warp::path!("facilities" / u64 / "risk-assessment")
            .and(warp::method())
            .and(with_auth(tokens))
            .and(with_store(store))
            .and(with_scorer(scorer))
            .and_then(risk_assessment_handler);

        health
            .or(login)
            .or(list_facilities)
            .or(create_facility)
            .or(get_facility)
            .or(risk_assessment)
            .with(create_cors_filter(&self.config.api.cors_origins))
            .recover(handle_rejection)
            .with(warp::log(HTTP_LOG_TARGET))
    }

    /// Public method for testing - exposes routes for integration tests
    pub fn test_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        self.create_routes()
    }
}
