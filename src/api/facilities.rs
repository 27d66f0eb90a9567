//! Facility and risk assessment handlers.
//!
//! Every handler receives the authenticated subject extracted by
//! `with_auth`; it is only used for logging.

use std::sync::Arc;
use tracing::{debug, error};
use warp::http::{Method, StatusCode};
use warp::hyper::body::Bytes;
use warp::{Filter, Reply};

use super::generic::{ErrorResponse, JsonDeserializeError};
use crate::risk::RiskScorer;
use crate::storage::{FacilityStore, NewFacility};

/// Handler for `GET /facilities`.
pub async fn list_facilities_handler(
    user: String,
    store: Arc<FacilityStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let facilities = store.list().await;
    debug!("{} listed {} facilities", user, facilities.len());
    Ok(warp::reply::json(&facilities))
}

/// Handler for `POST /facilities`.
///
/// The body is decoded here rather than with `warp::body::json` so that the
/// raw payload can be logged when it does not fit the facility shape.
pub async fn create_facility_handler(
    user: String,
    body: Bytes,
    store: Arc<FacilityStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let body_str = String::from_utf8_lossy(&body);
    debug!("POST /facilities by {} - Received body: {}", user, body_str);

    let new_facility = serde_json::from_slice::<NewFacility>(&body).map_err(|e| {
        error!("Facility deserialization failed: {}. Body: {}", e, body_str);
        warp::reject::custom(JsonDeserializeError(format!("Invalid facility: {}", e)))
    })?;

    let facility = store.create(new_facility).await;
    Ok(warp::reply::json(&facility))
}

/// Handler for `GET /facilities/{id}`.
pub async fn get_facility_handler(
    facility_id: u64,
    _user: String,
    store: Arc<FacilityStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let facility = store
        .get(facility_id)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&facility))
}

/// Handler for `/facilities/{id}/risk-assessment`.
///
/// The route accepts every method so that an unknown facility is reported as
/// 404 regardless of method. Only `POST` creates an assessment; other methods
/// on an existing facility get 405.
pub async fn risk_assessment_handler(
    facility_id: u64,
    method: Method,
    user: String,
    store: Arc<FacilityStore>,
    scorer: Arc<dyn RiskScorer>,
) -> Result<warp::reply::Response, warp::Rejection> {
    if method != Method::POST {
        store
            .get(facility_id)
            .await
            .map_err(warp::reject::custom)?;
        return Ok(warp::reply::with_status(
            warp::reply::json(&ErrorResponse::new("Method Not Allowed")),
            StatusCode::METHOD_NOT_ALLOWED,
        )
        .into_response());
    }

    let assessment = store
        .assess(facility_id, scorer.as_ref())
        .await
        .map_err(warp::reject::custom)?;
    debug!("{} assessed facility {}", user, facility_id);
    Ok(warp::reply::json(&assessment).into_response())
}

/// Creates a warp filter that provides access to the facility store.
pub fn with_store(
    store: Arc<FacilityStore>,
) -> impl Filter<Extract = (Arc<FacilityStore>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || store.clone())
}

/// Creates a warp filter that provides access to the risk scorer.
pub fn with_scorer(
    scorer: Arc<dyn RiskScorer>,
) -> impl Filter<Extract = (Arc<dyn RiskScorer>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || scorer.clone())
}
