//! Tailings API Service Library
//!
//! This crate provides a small demonstration API for tracking dam/tailings
//! facilities and producing ad-hoc risk assessments. Facilities and assessments
//! live in memory for the lifetime of the process; access is guarded by
//! short-lived HS256 bearer tokens issued to a single configured identity.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod risk;
pub mod storage;

// Re-export commonly used types
pub use api::ApiServer;
pub use auth::{Claims, Token, TokenService};
pub use config::{ApiConfig, AuthConfig, Config};
pub use error::ServiceError;
pub use risk::{RiskAssessment, RiskLevel, RiskScorer, UniformRandomScorer};
pub use storage::{Facility, FacilityStore, NewFacility};
