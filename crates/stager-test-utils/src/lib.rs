//! Shared test utilities for the Stager workspace.
//!
//! This crate provides standardised fixtures so crate test suites don't each
//! build their own directory trees. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`] builder for active/staging directory layouts
//! - [`snapshot`]: content snapshots for comparing whole trees

pub mod snapshot;
pub mod tree;

pub use snapshot::{Entry, Snapshot};
pub use tree::TestTree;
