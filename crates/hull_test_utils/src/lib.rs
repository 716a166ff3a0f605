//! # Hull Test Utilities
//!
//! Shared testing utilities for the hull crates:
//! - Layout fixtures
//! - Brute-force reference oracles
//! - Determinism test harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod reference;

/// Re-export proptest for convenience.
pub use proptest;
