//! Shared test helpers for integration tests
//!
//! The module is organized into several categories:
//! - **Constants**: Credentials, secrets and placeholder records
//! - **Builders**: Configurations, token services and API servers
//! - **Request helpers**: Logging in and building bearer headers

#![allow(dead_code)]

use chrono::Duration;
use serde_json::json;
use std::sync::Arc;
use tailings_api::api::ApiServer;
use tailings_api::auth::{Token, TokenService};
use tailings_api::config::Config;
use tailings_api::risk::RiskScorer;
use tailings_api::storage::{Facility, NewFacility};
use warp::test::request;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Signing key used by every test token service
pub const TEST_SECRET: &[u8] = b"integration-test-signing-key";

/// Accepted login name
pub const TEST_USERNAME: &str = "demo";

/// Accepted login password
pub const TEST_PASSWORD: &str = "demo";

/// Name of the sample facility
pub const DUMMY_FACILITY_NAME: &str = "Cadia North Tailings Dam";

/// Identifier that is never assigned in tests
pub const DUMMY_UNKNOWN_FACILITY_ID: u64 = 999;

// ============================================================================
// SCORERS
// ============================================================================

/// Scorer that returns the same score for every facility.
#[derive(Debug, Clone, Copy)]
pub struct FixedScorer(pub f64);

impl RiskScorer for FixedScorer {
    fn score(&self, _facility: &Facility) -> f64 {
        self.0
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Default configuration bound to loopback
pub fn build_test_config() -> Config {
    let mut config = Config::default();
    config.api.host = "127.0.0.1".to_string();
    config
}

/// Token service with the test secret and a 30 minute lifetime
pub fn build_test_token_service() -> TokenService {
    TokenService::new(TEST_SECRET, TEST_USERNAME, TEST_PASSWORD, Duration::minutes(30))
}

/// API server with an empty store and the uniform random scorer
pub fn build_test_api_server() -> ApiServer {
    ApiServer::new(build_test_config(), build_test_token_service())
}

/// API server with an empty store and the given scorer
pub fn build_test_api_server_with_scorer(scorer: impl RiskScorer + 'static) -> ApiServer {
    build_test_api_server().with_scorer(Arc::new(scorer))
}

/// Sample creation payload
pub fn sample_facility() -> NewFacility {
    NewFacility {
        name: DUMMY_FACILITY_NAME.to_string(),
        location: "Orange, NSW".to_string(),
        facility_type: "Tailings Storage Facility".to_string(),
        owner: "Example Mining Ltd".to_string(),
        status: "Active".to_string(),
    }
}

/// Sample creation payload as raw JSON
pub fn sample_facility_json() -> serde_json::Value {
    json!({
        "name": DUMMY_FACILITY_NAME,
        "location": "Orange, NSW",
        "type": "Tailings Storage Facility",
        "owner": "Example Mining Ltd",
        "status": "Active"
    })
}

// ============================================================================
// REQUEST HELPERS
// ============================================================================

/// Logs in with the demo credential and returns the access token
pub async fn login<F>(routes: &F) -> String
where
    F: warp::Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    let response = request()
        .method("POST")
        .path("/token")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(format!("username={}&password={}", TEST_USERNAME, TEST_PASSWORD))
        .reply(routes)
        .await;
    assert_eq!(response.status(), 200, "login should succeed");

    let token: Token = serde_json::from_slice(response.body()).unwrap();
    token.access_token
}

/// `Authorization` header value for a token
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
