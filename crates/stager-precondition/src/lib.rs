//! Precondition trees for the Stager lifecycle
//!
//! Every lifecycle stage is guarded by a tree of checks. Leaves are
//! individual [`Check`]s; composites group children and are fulfilled only
//! when all of them are. Asserting a tree walks it depth-first and stops at
//! the first unfulfilled leaf.
//!
//! # Modules
//!
//! - [`check`]: the [`Check`] trait and the [`CheckContext`] it inspects
//! - [`precondition`]: the [`Precondition`] tree
//! - [`directories`]: checks on the active and staging directories
//! - [`host`]: checks on the host environment
//! - [`links`]: checks for links the sync cannot carry safely
//! - [`trees`]: the tree guarding each lifecycle stage

pub mod check;
pub mod directories;
pub mod host;
pub mod links;
pub mod precondition;
pub mod trees;

pub use check::{Check, CheckContext, Outcome};
pub use precondition::{Composite, Precondition};
pub use trees::Environment;
pub use stager_translation::{Error, Result};
