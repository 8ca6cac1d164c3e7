//! Shared utilities.
//!
//! Duration rendering for `helm` flags and test helpers.

pub mod duration;
