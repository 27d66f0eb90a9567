//! Token Service Module
//!
//! Issues and verifies HS256-signed bearer tokens for the single configured
//! demo identity. Tokens carry only a subject (`sub`) and an expiry (`exp`);
//! nothing is persisted, validity is recomputed from the signature and the
//! expiry on every request.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::error::ServiceError;

/// Lifetime applied by [`TokenService::create_access_token`] when none is given.
pub const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 15;

/// Value of `token_type` in login responses.
pub const TOKEN_TYPE: &str = "bearer";

/// Length in bytes of the key generated when running in demo mode without `SECRET_KEY`.
const EPHEMERAL_KEY_LEN: usize = 32;

// ============================================================================
// TOKEN DATA STRUCTURES
// ============================================================================

/// Claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated subject. Optional on decode so a token without it is
    /// rejected as unauthorized rather than as malformed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiry as seconds since the Unix epoch
    pub exp: i64,
}

/// Response body of the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Signed JWT
    pub access_token: String,
    /// Always `"bearer"`
    pub token_type: String,
}

// ============================================================================
// TOKEN SERVICE IMPLEMENTATION
// ============================================================================

/// Issues and verifies bearer tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    username: String,
    password: String,
    access_token_lifetime: Duration,
}

impl TokenService {
    /// Creates a token service from a raw HMAC secret.
    ///
    /// # Arguments
    ///
    /// * `secret` - HS256 signing key
    /// * `username` - Accepted login name
    /// * `password` - Accepted login password
    /// * `access_token_lifetime` - Lifetime of tokens issued by [`TokenService::issue`]
    pub fn new(
        secret: &[u8],
        username: impl Into<String>,
        password: impl Into<String>,
        access_token_lifetime: Duration,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            username: username.into(),
            password: password.into(),
            access_token_lifetime,
        }
    }

    /// Creates a token service from configuration.
    ///
    /// The signing key is read from the environment variable named by
    /// `secret_key_env`. If it is unset the service refuses to start, unless
    /// `demo_mode` is enabled, in which case a random key is generated for
    /// the lifetime of the process.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenService)` - Service ready to issue tokens
    /// * `Err(anyhow::Error)` - Signing key missing outside demo mode
    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        let lifetime = i64::try_from(config.access_token_expire_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .ok_or_else(|| anyhow::anyhow!("auth.access_token_expire_minutes is too large"))?;

        let secret = match config.get_secret_key() {
            Some(key) => {
                info!("Token signing key loaded from ${}", config.secret_key_env);
                key.into_bytes()
            }
            None if config.demo_mode => {
                warn!(
                    "${} is not set; demo mode generated an ephemeral signing key. \
                     Tokens will not survive a restart. Do not run this way in production.",
                    config.secret_key_env
                );
                let mut key = vec![0u8; EPHEMERAL_KEY_LEN];
                rand::thread_rng().fill_bytes(&mut key);
                key
            }
            None => {
                return Err(anyhow::anyhow!(
                    "Environment variable '{}' not set. Please set it to the token signing key, \
                     or enable auth.demo_mode for local demos.",
                    config.secret_key_env
                ));
            }
        };

        Ok(Self::new(&secret, &config.username, &config.password, lifetime))
    }

    /// Exchanges the demo credential for an access token.
    ///
    /// # Returns
    ///
    /// * `Ok(Token)` - Token for `username`, expiring after the configured lifetime
    /// * `Err(ServiceError::Unauthorized)` - Credentials do not match
    pub fn issue(&self, username: &str, password: &str) -> Result<Token, ServiceError> {
        if username != self.username || password != self.password {
            warn!("Rejected login attempt for user '{}'", username);
            return Err(ServiceError::bad_credentials());
        }
        let token = self.create_access_token(username, Some(self.access_token_lifetime))?;
        info!("Issued access token for user '{}'", username);
        Ok(token)
    }

    /// Signs a token for `subject`.
    ///
    /// When `lifetime` is `None` the token expires
    /// [`DEFAULT_TOKEN_LIFETIME_MINUTES`] after issuance.
    pub fn create_access_token(
        &self,
        subject: &str,
        lifetime: Option<Duration>,
    ) -> Result<Token, ServiceError> {
        let lifetime = lifetime.unwrap_or_else(|| Duration::minutes(DEFAULT_TOKEN_LIFETIME_MINUTES));
        let expires_at = Utc::now().checked_add_signed(lifetime).ok_or_else(|| {
            ServiceError::Internal(format!("token lifetime {} is out of range", lifetime))
        })?;
        let claims = Claims {
            sub: Some(subject.to_string()),
            exp: expires_at.timestamp(),
        };
        Ok(Token {
            access_token: self.sign(&claims)?,
            token_type: TOKEN_TYPE.to_string(),
        })
    }

    /// Signs arbitrary claims with the service key.
    pub fn sign(&self, claims: &Claims) -> Result<String, ServiceError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(format!("token signing failed: {}", e)))
    }

    /// Verifies a token against the current time and returns its subject.
    pub fn verify(&self, token: &str) -> Result<String, ServiceError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies a token against `now` and returns its subject.
    ///
    /// A token is accepted while `now` is at or before its expiry second and
    /// rejected strictly after it. There is no clock-skew leeway.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The `sub` claim
    /// * `Err(ServiceError::Unauthorized)` - Bad signature, expired, malformed, or no subject
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is checked below against `now`
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            ServiceError::invalid_token()
        })?;

        if now.timestamp() > data.claims.exp {
            debug!("Token rejected: expired at {}", data.claims.exp);
            return Err(ServiceError::invalid_token());
        }

        data.claims.sub.ok_or_else(|| {
            debug!("Token rejected: missing sub claim");
            ServiceError::invalid_token()
        })
    }
}
