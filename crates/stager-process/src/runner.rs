//! Running a single named executable

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use stager_translation::Result;

use crate::finder::ExecutableFinder;
use crate::output::OutputCallback;
use crate::process::{ProcessFactory, ProcessOutput};

/// Runs one executable, resolved through an [`ExecutableFinder`] on every
/// call.
#[derive(Clone)]
pub struct ProcessRunner {
    executable: String,
    finder: Arc<dyn ExecutableFinder>,
    factory: ProcessFactory,
}

impl ProcessRunner {
    pub fn new(executable: impl Into<String>, finder: Arc<dyn ExecutableFinder>) -> Self {
        Self {
            executable: executable.into(),
            finder,
            factory: ProcessFactory::new(),
        }
    }

    /// The executable name as configured, before resolution.
    pub fn executable_name(&self) -> &str {
        &self.executable
    }

    /// Whether the executable can currently be found.
    pub fn is_available(&self) -> bool {
        self.finder.find(&self.executable).is_ok()
    }

    /// Run the executable with `args` in `cwd`.
    ///
    /// # Errors
    ///
    /// - [`stager_translation::Error::Logic`] if the executable cannot be found
    /// - [`stager_translation::Error::Runtime`] if it fails to start, exits
    ///   non-zero or exceeds `timeout`
    pub fn run(
        &self,
        args: &[String],
        cwd: Option<&Path>,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput> {
        let path = self.finder.find(&self.executable)?;

        let mut command = Vec::with_capacity(args.len() + 1);
        command.push(path.to_string_lossy().into_owned());
        command.extend(args.iter().cloned());

        let mut process = self.factory.create(command)?;
        if let Some(cwd) = cwd {
            process = process.with_working_dir(cwd);
        }

        tracing::info!(executable = %self.executable, ?args, "Running executable");
        process.must_run(callback, timeout)
    }
}

impl std::fmt::Debug for ProcessRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRunner")
            .field("executable", &self.executable)
            .finish_non_exhaustive()
    }
}
