//! Risk Assessment Module
//!
//! Risk scores come from a pluggable [`RiskScorer`]. The shipped scorer draws a
//! uniform random value; a real model only needs to implement the trait. Tier
//! and recommendations are always derived from the score here, so every scorer
//! produces records with the same shape and the same thresholds.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::storage::Facility;

/// Lowest score a record can carry.
pub const MIN_RISK_SCORE: f64 = 0.1;
/// Highest score a record can carry.
pub const MAX_RISK_SCORE: f64 = 0.9;
/// Scores below this are `Low`.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.3;
/// Scores at or above this are `High`.
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

// ============================================================================
// RISK DATA STRUCTURES
// ============================================================================

/// Risk tier derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Maps a score to its tier.
    ///
    /// score < 0.3 is `Low`, 0.3 <= score < 0.7 is `Medium`, score >= 0.7 is `High`.
    pub fn from_score(score: f64) -> Self {
        if score < MEDIUM_RISK_THRESHOLD {
            RiskLevel::Low
        } else if score < HIGH_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    /// Fixed recommendation list for the tier, in presentation order.
    pub fn recommendations(self) -> &'static [&'static str] {
        match self {
            RiskLevel::Low => &[
                "Continue regular monitoring",
                "Maintain current safety protocols",
            ],
            RiskLevel::Medium => &[
                "Increase monitoring frequency",
                "Review safety procedures",
                "Consider additional safety measures",
            ],
            RiskLevel::High => &[
                "Immediate safety review required",
                "Increase monitoring to daily",
                "Consider emergency response planning",
                "Consult with safety experts",
            ],
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// A timestamped score/tier/recommendation record for one facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Facility the assessment belongs to
    pub facility_id: u64,
    /// Score in [0.1, 0.9], two decimal places
    pub risk_score: f64,
    /// Tier derived from `risk_score`
    pub risk_level: RiskLevel,
    /// Recommendations for `risk_level`
    pub recommendations: Vec<String>,
    /// When the assessment was produced (UTC)
    pub timestamp: DateTime<Utc>,
}

impl RiskAssessment {
    /// Builds a record from a raw score.
    ///
    /// The score is clamped to [0.1, 0.9] and rounded to two decimals before
    /// the tier is derived, so the record always satisfies the tier mapping.
    pub fn from_score(facility_id: u64, raw_score: f64, timestamp: DateTime<Utc>) -> Self {
        let risk_score = normalize_score(raw_score);
        let risk_level = RiskLevel::from_score(risk_score);
        Self {
            facility_id,
            risk_score,
            risk_level,
            recommendations: risk_level
                .recommendations()
                .iter()
                .map(|r| r.to_string())
                .collect(),
            timestamp,
        }
    }
}

/// Clamps a score to [0.1, 0.9] and rounds it to two decimal places.
///
/// NaN is treated as the minimum score.
pub fn normalize_score(score: f64) -> f64 {
    let clamped = if score.is_nan() {
        MIN_RISK_SCORE
    } else {
        score.clamp(MIN_RISK_SCORE, MAX_RISK_SCORE)
    };
    (clamped * 100.0).round() / 100.0
}

// ============================================================================
// SCORERS
// ============================================================================

/// Produces a raw risk score for a facility.
pub trait RiskScorer: Send + Sync {
    /// Returns a score; values outside [0.1, 0.9] are clamped by the caller.
    fn score(&self, facility: &Facility) -> f64;
}

/// Scores every facility with a uniform random draw from [0.1, 0.9].
///
/// There is no model behind it; the facility is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRandomScorer;

impl RiskScorer for UniformRandomScorer {
    fn score(&self, _facility: &Facility) -> f64 {
        rand::thread_rng().gen_range(MIN_RISK_SCORE..=MAX_RISK_SCORE)
    }
}
