//! Directory synchronization for Stager
//!
//! A [`FileSyncer`] makes a destination directory mirror a source directory.
//! Two strategies share the contract:
//!
//! - [`RsyncFileSyncer`] delegates to `rsync` when it is installed
//! - [`SoftwareFileSyncer`] walks both trees itself and needs nothing but
//!   the filesystem
//!
//! [`FileSyncerFactory`] picks one, probing for `rsync` at most once.

pub mod factory;
pub mod rsync;
pub mod software;
pub mod syncer;

pub use factory::{FileSyncerFactory, FileSyncerStrategy};
pub use rsync::RsyncFileSyncer;
pub use software::SoftwareFileSyncer;
pub use syncer::{FileSyncer, SyncPlan};
pub use stager_translation::{Error, Result};
