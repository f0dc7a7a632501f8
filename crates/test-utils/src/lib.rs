//! Shared test utilities for the marine suitability workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic grid and region generators
//! - An on-disk fixture set for end-to-end runs
//! - Temporary directory helpers
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{geographic_spec, write_fixture_set};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;
