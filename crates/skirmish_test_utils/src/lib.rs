//! # Skirmish Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Match and unit fixtures with a manual frame clock
//! - Determinism harness for scripted matches
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
