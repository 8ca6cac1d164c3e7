//! CLI integration tests for helmrun.

mod common;
mod plan_tests;
