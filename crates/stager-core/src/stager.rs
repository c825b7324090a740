//! Stage: run the configured executable inside the staging directory

use std::sync::Arc;
use std::time::Duration;

use stager_fs::NormalizedPath;
use stager_precondition::{CheckContext, Precondition};
use stager_process::{ExecutableFinder, OutputCallback, ProcessRunner};
use stager_translation::{Error, Result, TranslatableMessage};

use crate::lifecycle::wrap_failure;

/// Options that would move the executable out of the staging directory.
const WORKING_DIR_OPTIONS: [&str; 2] = ["--working-dir", "-d"];

#[derive(Debug)]
pub struct Stager {
    preconditions: Precondition,
    runner: ProcessRunner,
}

impl Stager {
    pub fn new(
        preconditions: Precondition,
        executable: impl Into<String>,
        finder: Arc<dyn ExecutableFinder>,
    ) -> Self {
        Self {
            preconditions,
            runner: ProcessRunner::new(executable, finder),
        }
    }

    pub fn preconditions(&self) -> &Precondition {
        &self.preconditions
    }

    /// Run the executable with `command` as its arguments, in `staging`.
    ///
    /// `command` holds arguments only, e.g. `["require", "acme/widgets"]`;
    /// the working directory is always `staging`. `active` is only used to
    /// assert the preconditions.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `command` is empty, starts with the
    ///   executable's name, or sets its own working directory
    /// - [`Error::Precondition`] if either directory is unusable
    /// - [`Error::Runtime`] if the executable fails or exceeds `timeout`
    pub fn stage(
        &self,
        command: &[String],
        active: &NormalizedPath,
        staging: &NormalizedPath,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.validate_command(command)?;
        let ctx = CheckContext::new(active, staging).with_timeout(timeout);
        self.preconditions.assert_is_fulfilled(&ctx)?;

        tracing::info!(
            executable = self.runner.executable_name(),
            command = %command.join(" "),
            staging = %staging,
            "Staging changes"
        );
        self.runner
            .run(command, Some(staging.to_native().as_path()), callback, timeout)
            .map_err(wrap_failure("Failed to stage changes: %details%"))?;
        tracing::info!(staging = %staging, "Changes staged");
        Ok(())
    }

    fn validate_command(&self, command: &[String]) -> Result<()> {
        let Some(first) = command.first() else {
            return Err(Error::invalid_argument(TranslatableMessage::exception(
                "The command cannot be empty.",
            )));
        };

        let executable = self.runner.executable_name();
        if first == executable {
            return Err(Error::invalid_argument(
                TranslatableMessage::exception(
                    "The command cannot begin with \"%name%\"; it is implied.",
                )
                .with_parameter("%name%", executable),
            ));
        }

        let sets_working_dir = command.iter().any(|arg| {
            WORKING_DIR_OPTIONS
                .iter()
                .any(|option| arg == option || arg.starts_with(&format!("{option}=")))
        });
        if sets_working_dir {
            return Err(Error::invalid_argument(TranslatableMessage::exception(
                "The command cannot contain the \"--working-dir\" (or \"-d\") option; it is set automatically.",
            )));
        }
        Ok(())
    }
}
