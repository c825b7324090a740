//! Staging lifecycle orchestration for Stager
//!
//! Applies risky changes to a codebase through an isolated copy:
//!
//! - **Begin** copies the active directory into a new staging directory
//! - **Stage** runs the configured executable inside the staging directory
//! - **Commit** copies the staging directory back over the active one
//! - **Clean** removes the staging directory
//!
//! Each operation first asserts its precondition tree and does nothing if
//! any check fails.
//!
//! # Architecture
//!
//! ```text
//!                     host application
//!                           |
//!                      stager-core
//!                           |
//!     +-----------+---------+----------+----------------+
//!     |           |                    |                |
//! stager-fs  stager-process      stager-sync   stager-precondition
//!     |           |                    |                |
//!     +-----------+------ stager-translation -----------+
//! ```
//!
//! # Example
//!
//! ```no_run
//! use stager_core::{Lifecycle, StagerConfig};
//!
//! fn example() -> stager_core::Result<()> {
//!     let lifecycle = Lifecycle::from_config(StagerConfig::default())?;
//!     let active = lifecycle.path("/var/www/site");
//!     let staging = lifecycle.path("/var/www/.staging");
//!     let timeout = lifecycle.config().timeout();
//!
//!     lifecycle.beginner().begin(&active, &staging, None, None, timeout)?;
//!     let command = vec!["require".to_string(), "acme/widgets".to_string()];
//!     lifecycle.stager().stage(&command, &active, &staging, None, timeout)?;
//!     lifecycle.committer().commit(&staging, &active, None, None, timeout)?;
//!     lifecycle.cleaner().clean(&active, &staging, None, timeout)?;
//!     Ok(())
//! }
//! ```

pub mod beginner;
pub mod cleaner;
pub mod committer;
pub mod config;
pub mod lifecycle;
pub mod logging;
pub mod stager;

pub use beginner::Beginner;
pub use cleaner::Cleaner;
pub use committer::Committer;
pub use config::StagerConfig;
pub use lifecycle::Lifecycle;
pub use stager::Stager;
pub use stager_translation::{Error, ErrorKind, Result};
