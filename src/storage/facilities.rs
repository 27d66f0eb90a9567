//! Facility store
//!
//! Ordered, append-only storage of facility records plus the append-only risk
//! assessment log. Identifier assignment, record insertion and log appends all
//! happen under one write lock, so identifiers are assigned linearly even when
//! requests arrive concurrently. Nothing is persisted.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::ServiceError;
use crate::risk::{RiskAssessment, RiskScorer};

/// Identifier given to the first facility created in a process.
const FIRST_FACILITY_ID: u64 = 1;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// A tracked tailings/dam site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    /// Store-assigned identifier
    pub id: u64,
    pub name: String,
    pub location: String,
    /// Facility kind, e.g. "Tailings Dam"
    #[serde(rename = "type")]
    pub facility_type: String,
    pub owner: String,
    pub status: String,
}

/// Creation payload: a facility without its identifier.
///
/// Unknown fields, including a client-supplied `id`, are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFacility {
    pub name: String,
    pub location: String,
    #[serde(rename = "type")]
    pub facility_type: String,
    pub owner: String,
    pub status: String,
}

impl NewFacility {
    fn into_facility(self, id: u64) -> Facility {
        Facility {
            id,
            name: self.name,
            location: self.location,
            facility_type: self.facility_type,
            owner: self.owner,
            status: self.status,
        }
    }
}

/// State guarded by the store lock.
#[derive(Debug)]
struct Registry {
    facilities: Vec<Facility>,
    assessments: Vec<RiskAssessment>,
    next_id: u64,
}

// ============================================================================
// STORE
// ============================================================================

/// In-memory facility store.
///
/// Only four operations are exposed: [`list`](Self::list),
/// [`create`](Self::create), [`get`](Self::get) and [`assess`](Self::assess).
#[derive(Debug)]
pub struct FacilityStore {
    inner: RwLock<Registry>,
}

impl FacilityStore {
    /// Creates an empty store whose first facility will receive id 1.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Registry {
                facilities: Vec::new(),
                assessments: Vec::new(),
                next_id: FIRST_FACILITY_ID,
            }),
        }
    }

    /// Returns every facility in creation order.
    pub async fn list(&self) -> Vec<Facility> {
        self.inner.read().await.facilities.clone()
    }

    /// Stores a new facility under the next sequential identifier.
    ///
    /// # Returns
    ///
    /// The stored record, including its assigned id
    pub async fn create(&self, new_facility: NewFacility) -> Facility {
        let mut registry = self.inner.write().await;
        let id = registry.next_id;
        registry.next_id += 1;

        let facility = new_facility.into_facility(id);
        registry.facilities.push(facility.clone());
        info!("Created facility {} ({})", facility.id, facility.name);
        facility
    }

    /// Looks up a facility by identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(Facility)` - The stored record
    /// * `Err(ServiceError::NotFound)` - No facility has this id
    pub async fn get(&self, id: u64) -> Result<Facility, ServiceError> {
        let registry = self.inner.read().await;
        find(&registry.facilities, id)
            .cloned()
            .ok_or_else(ServiceError::facility_not_found)
    }

    /// Produces a risk assessment for a facility and appends it to the log.
    ///
    /// The lookup and the log append happen under the same write lock.
    ///
    /// # Arguments
    ///
    /// * `facility_id` - Facility to assess
    /// * `scorer` - Source of the raw score
    ///
    /// # Returns
    ///
    /// * `Ok(RiskAssessment)` - The recorded assessment
    /// * `Err(ServiceError::NotFound)` - No facility has this id
    pub async fn assess(
        &self,
        facility_id: u64,
        scorer: &dyn RiskScorer,
    ) -> Result<RiskAssessment, ServiceError> {
        let mut registry = self.inner.write().await;
        let facility = find(&registry.facilities, facility_id)
            .ok_or_else(ServiceError::facility_not_found)?;

        let assessment =
            RiskAssessment::from_score(facility.id, scorer.score(facility), Utc::now());
        registry.assessments.push(assessment.clone());
        info!(
            "Risk assessment for facility {}: {} ({})",
            facility_id, assessment.risk_score, assessment.risk_level
        );
        Ok(assessment)
    }
}

impl Default for FacilityStore {
    fn default() -> Self {
        Self::new()
    }
}

fn find(facilities: &[Facility], id: u64) -> Option<&Facility> {
    facilities.iter().find(|f| f.id == id)
}
