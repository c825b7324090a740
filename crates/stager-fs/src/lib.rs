//! Filesystem abstraction for Stager
//!
//! Provides host-aware path resolution, exclusion lists, and the filesystem
//! primitives the synchronizer and preconditions are built on.

pub mod config;
pub mod filesystem;
pub mod host;
pub mod io;
pub mod path;
pub mod path_list;

pub use config::ConfigStore;
pub use host::HostOs;
pub use io::RobustnessConfig;
pub use path::{NormalizedPath, PathFactory};
pub use path_list::PathList;
pub use stager_translation::{Error, Result};
