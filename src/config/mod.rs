//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the tailings API service.
//! Configuration covers the HTTP listener, CORS policy, and the token signing settings.

use serde::{Deserialize, Serialize};

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/tailings-api.toml";

/// Environment variable that overrides the configuration file location.
pub const CONFIG_PATH_ENV: &str = "TAILINGS_API_CONFIG_PATH";

/// Longest accepted token lifetime (one year), in minutes.
pub const MAX_TOKEN_EXPIRE_MINUTES: u64 = 365 * 24 * 60;

/// Environment variable that overrides the listen port.
pub const PORT_ENV: &str = "PORT";

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration (host, port, CORS settings)
    pub api: ApiConfig,
    /// Token signing and demo credential configuration
    pub auth: AuthConfig,
}

/// API server configuration for external communication.
///
/// Controls how the service exposes its REST API endpoints
/// and handles cross-origin requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host address to bind the API server to
    pub host: String,
    /// Port number to bind the API server to
    pub port: u16,
    /// Allowed CORS origins for cross-origin requests ("*" allows any origin)
    pub cors_origins: Vec<String>,
}

/// Bearer token configuration.
///
/// The signing key itself is never stored in the file; only the name of the
/// environment variable that holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Name of the environment variable containing the HS256 signing key
    pub secret_key_env: String,
    /// Lifetime of tokens issued by the login endpoint, in minutes
    pub access_token_expire_minutes: u64,
    /// Username accepted by the login endpoint
    pub username: String,
    /// Password accepted by the login endpoint
    pub password: String,
    /// Allows startup without a signing key (an ephemeral key is generated)
    #[serde(default)]
    pub demo_mode: bool,
}

impl AuthConfig {
    /// Loads the signing key from the configured environment variable.
    ///
    /// # Returns
    ///
    /// * `Some(String)` - The key, if the variable is set and non-empty
    /// * `None` - The variable is unset or empty
    pub fn get_secret_key(&self) -> Option<String> {
        std::env::var(&self.secret_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Validates the configuration values.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Configuration is valid
    /// - `Err(anyhow::Error)` - A value is out of range or missing
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth.access_token_expire_minutes == 0 {
            anyhow::bail!("Configuration error: auth.access_token_expire_minutes must be greater than zero");
        }
        if self.auth.access_token_expire_minutes > MAX_TOKEN_EXPIRE_MINUTES {
            anyhow::bail!(
                "Configuration error: auth.access_token_expire_minutes must not exceed {} (one year)",
                MAX_TOKEN_EXPIRE_MINUTES
            );
        }
        if self.auth.username.is_empty() || self.auth.password.is_empty() {
            anyhow::bail!("Configuration error: auth.username and auth.password must not be empty");
        }
        if self.auth.secret_key_env.is_empty() {
            anyhow::bail!("Configuration error: auth.secret_key_env must name an environment variable");
        }
        if self.api.cors_origins.is_empty() {
            anyhow::bail!("Configuration error: api.cors_origins must list at least one origin (use \"*\" for any)");
        }
        Ok(())
    }

    /// Returns true when CORS is open to every origin.
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }

    /// Loads configuration from the TOML file and the environment.
    ///
    /// This function:
    /// 1. Resolves the file path from `TAILINGS_API_CONFIG_PATH` or the default path
    /// 2. Parses the file if it exists (an explicitly named file must exist)
    /// 3. Falls back to `Config::default()` when the default file is absent
    /// 4. Applies the `PORT` override
    /// 5. Validates the result
    ///
    /// # Returns
    ///
    /// - `Ok(Config)` - Successfully loaded and validated configuration
    /// - `Err(anyhow::Error)` - File missing, unparsable, or invalid
    pub fn load() -> anyhow::Result<Self> {
        let explicit_path = std::env::var(CONFIG_PATH_ENV).ok();
        let config_path = explicit_path
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Config>(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse '{}': {}", config_path, e))?
        } else if explicit_path.is_some() {
            return Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/tailings-api.template.toml {}\n\
                Then edit it with your actual values.",
                config_path,
                config_path
            ));
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides taken from process environment variables.
    ///
    /// Currently only `PORT`, which replaces `api.port`.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(port) = std::env::var(PORT_ENV) {
            self.api.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid {} value '{}': {}", PORT_ENV, port, e))?;
        }
        Ok(())
    }
}

impl Default for Config {
    /// Configuration suitable for local demos: listens on 0.0.0.0:8000,
    /// wildcard CORS, `demo`/`demo` credentials and demo mode enabled.
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                cors_origins: vec!["*".to_string()],
            },
            auth: AuthConfig {
                secret_key_env: "SECRET_KEY".to_string(),
                access_token_expire_minutes: 30,
                username: "demo".to_string(),
                password: "demo".to_string(),
                demo_mode: true,
            },
        }
    }
}
