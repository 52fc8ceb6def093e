//! # Arena Test Utilities
//!
//! Shared testing utilities for the arena crates:
//! - Determinism test harness
//! - Fixture battles and placement helpers
//! - Log capture
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod logging;

/// Re-export proptest for convenience.
pub use proptest;
