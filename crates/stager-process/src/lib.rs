//! External process execution for Stager
//!
//! This crate runs the executables the staging lifecycle depends on:
//!
//! - [`ExecutableFinder`] resolves an executable name on `PATH`
//! - [`ProcessFactory`] and [`Process`] spawn a command, stream each output
//!   line to an [`OutputCallback`] and enforce a timeout
//! - [`ProcessRunner`] binds a [`Process`] to one named executable, e.g.
//!   `rsync` or the package manager run during staging
//!
//! Every failure is reported as a translatable [`Error`]: a missing
//! executable is a logic error, a failed or timed-out process a runtime error.

pub mod finder;
pub mod output;
pub mod process;
pub mod runner;

pub use finder::{ExecutableFinder, PathExecutableFinder};
pub use output::{BufferedOutputCallback, OutputCallback, OutputType};
pub use process::{Process, ProcessFactory, ProcessOutput};
pub use runner::ProcessRunner;
pub use stager_translation::{Error, Result};
