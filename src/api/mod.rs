//! REST API Server Module
//!
//! This module provides the HTTP surface of the tailings API service:
//! login, facility management, risk assessment, and health checks.
//!
//! ## Authorization
//!
//! `/token` and `/health` are open. Every `/facilities` route requires an
//! `Authorization: Bearer <token>` header carrying a token issued by `/token`.

// Shared structures, filters, rejection handling and the server itself
mod generic;

// Login and bearer token extraction
mod auth;

// Facility and risk assessment handlers
mod facilities;

pub use auth::{bearer_token, LoginForm};
pub use generic::{ApiServer, ErrorResponse, HealthResponse};
