//! Tailings API Service
//!
//! Demonstration HTTP API for tailings facility tracking.
//!
//! ## Overview
//!
//! The service:
//! 1. Issues bearer tokens for the configured demo identity (`POST /token`)
//! 2. Stores facility records in memory (`/facilities`)
//! 3. Produces synthetic risk assessments (`POST /facilities/{id}/risk-assessment`)
//! 4. Reports liveness (`GET /health`)
//!
//! ## Security Model
//!
//! Tokens are signed with the key in `$SECRET_KEY`. Without it the service only
//! starts in demo mode, using a throwaway key. All state is lost on restart.

use anyhow::Result;
use tracing::info;

use tailings_api::api::ApiServer;
use tailings_api::auth::TokenService;
use tailings_api::config::{Config, CONFIG_PATH_ENV};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

/// Main application entry point that initializes and runs the API service.
///
/// This function:
/// 1. Initializes logging and tracing
/// 2. Loads configuration from the TOML file and environment
/// 3. Initializes the token service
/// 4. Starts the API server and runs until shutdown
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging for debugging and monitoring
    tracing_subscriber::fmt::init();

    info!("Starting Tailings API Service");

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Check for help flag
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("Tailings API Service");
        println!();
        println!("Usage: tailings-api [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --config <path>   Use custom config file path");
        println!("  --help, -h        Show this help message");
        println!();
        println!("Environment variables:");
        println!("  TAILINGS_API_CONFIG_PATH   Path to config file (overrides --config)");
        println!("  SECRET_KEY                 Token signing key (required unless auth.demo_mode)");
        println!("  PORT                       Listen port (overrides api.port, default 8000)");
        return Ok(());
    }

    // Check for custom config path
    let mut config_path = None;
    for (i, arg) in args.iter().enumerate() {
        if arg == "--config" && i + 1 < args.len() {
            config_path = Some(args[i + 1].clone());
            break;
        }
    }

    // The environment variable wins over the flag
    if let Some(path) = config_path {
        if std::env::var(CONFIG_PATH_ENV).is_err() {
            std::env::set_var(CONFIG_PATH_ENV, &path);
            info!("Using custom config: {}", path);
        }
    }

    let config = Config::load()?;
    info!("Configuration loaded successfully");

    let tokens = TokenService::from_config(&config.auth)?;
    info!("Token service initialized successfully");

    let api_server = ApiServer::new(config, tokens);

    // Run the service (this blocks until shutdown)
    api_server.run().await?;

    Ok(())
}
