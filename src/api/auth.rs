//! Login endpoint and bearer token filter.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::header::{HeaderMap, AUTHORIZATION};
use warp::{Filter, Rejection};

use crate::auth::TokenService;
use crate::error::ServiceError;

/// Form body of `POST /token`.
///
/// Other OAuth2 password-grant fields (`grant_type`, `scope`, `client_id`, ...)
/// are accepted and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Extracts the credential from an `Authorization` header value.
///
/// The scheme must be `Bearer` (case-insensitive) followed by a non-empty token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Handler for `POST /token`.
pub async fn login_handler(
    form: LoginForm,
    tokens: Arc<TokenService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let token = tokens
        .issue(&form.username, &form.password)
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&token))
}

/// Creates a warp filter that provides access to the token service.
pub fn with_tokens(
    tokens: Arc<TokenService>,
) -> impl Filter<Extract = (Arc<TokenService>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || tokens.clone())
}

/// Requires a valid bearer token and extracts its subject.
///
/// Rejects with `ServiceError::Unauthorized` when the header is missing, does
/// not use the bearer scheme, is not readable text, or carries a token that
/// fails verification.
pub fn with_auth(
    tokens: Arc<TokenService>,
) -> impl Filter<Extract = (String,), Error = Rejection> + Clone {
    warp::header::headers_cloned()
        .and(with_tokens(tokens))
        .and_then(|headers: HeaderMap, tokens: Arc<TokenService>| async move {
            // Values that are not visible ASCII are treated as absent
            let token = headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(bearer_token)
                .ok_or_else(|| warp::reject::custom(ServiceError::not_authenticated()))?;
            tokens.verify(token).map_err(warp::reject::custom)
        })
}
