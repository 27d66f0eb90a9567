//! Test module organization
//!
//! This module re-exports test helpers for use in test files.

mod helpers;

#[allow(unused_imports)]
pub use helpers::{
    bearer, build_test_api_server, build_test_api_server_with_scorer, build_test_config,
    build_test_token_service, login, sample_facility, sample_facility_json, FixedScorer,
    DUMMY_FACILITY_NAME, DUMMY_UNKNOWN_FACILITY_ID, TEST_PASSWORD, TEST_SECRET, TEST_USERNAME,
};
