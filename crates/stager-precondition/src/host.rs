//! Checks on the host environment

use std::fmt;
use std::sync::Arc;

use stager_fs::HostOs;
use stager_process::ExecutableFinder;
use stager_translation::TranslatableMessage;

use crate::check::{Check, CheckContext, Outcome};

/// The executable run during staging can be found.
#[derive(Clone)]
pub struct ExecutableIsAvailable {
    executable: String,
    finder: Arc<dyn ExecutableFinder>,
}

impl ExecutableIsAvailable {
    pub fn new(executable: impl Into<String>, finder: Arc<dyn ExecutableFinder>) -> Self {
        Self {
            executable: executable.into(),
            finder,
        }
    }
}

impl fmt::Debug for ExecutableIsAvailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutableIsAvailable")
            .field("executable", &self.executable)
            .finish_non_exhaustive()
    }
}

impl Check for ExecutableIsAvailable {
    fn name(&self) -> &'static str {
        "ExecutableIsAvailable"
    }

    fn description(&self) -> TranslatableMessage {
        TranslatableMessage::new("The \"%name%\" executable must be available.")
            .with_parameter("%name%", &self.executable)
    }

    fn fulfilled_message(&self) -> TranslatableMessage {
        TranslatableMessage::new("The \"%name%\" executable is available.")
            .with_parameter("%name%", &self.executable)
    }

    fn evaluate(&self, _ctx: &CheckContext<'_>) -> Outcome {
        self.finder
            .find(&self.executable)
            .map(|_| ())
            .map_err(|e| e.translatable_message().clone())
    }
}

/// On Windows, neither lifecycle directory lies inside the other.
#[derive(Debug, Clone, Copy)]
pub struct NoNestingOnWindows {
    host: HostOs,
}

impl NoNestingOnWindows {
    pub fn new(host: HostOs) -> Self {
        Self { host }
    }
}

impl Check for NoNestingOnWindows {
    fn name(&self) -> &'static str {
        "NoNestingOnWindows"
    }

    fn description(&self) -> TranslatableMessage {
        TranslatableMessage::new(
            "The active and staging directories cannot be nested inside each other on Windows.",
        )
    }

    fn fulfilled_message(&self) -> TranslatableMessage {
        TranslatableMessage::new("The active and staging directories are not nested.")
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Outcome {
        if !self.host.is_windows() {
            return Ok(());
        }
        let (active, staging) = (ctx.active_dir, ctx.staging_dir);
        if staging.is_descendant_of(active) || active.is_descendant_of(staging) {
            return Err(TranslatableMessage::new(
                "The active directory at %active% and the staging directory at %staging% \
                 cannot be nested inside each other on Windows.",
            )
            .with_parameter("%active%", active)
            .with_parameter("%staging%", staging));
        }
        Ok(())
    }
}
