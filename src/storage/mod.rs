//! In-memory storage module
//!
//! Holds facility records and the risk assessment log for the process lifetime.

pub mod facilities;

pub use facilities::{Facility, FacilityStore, NewFacility};
