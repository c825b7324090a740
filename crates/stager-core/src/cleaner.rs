//! Clean: remove the staging directory

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use stager_fs::{NormalizedPath, RobustnessConfig, filesystem};
use stager_precondition::{CheckContext, Precondition};
use stager_process::{OutputCallback, OutputType};
use stager_translation::{Error, Result, TranslatableMessage};
use walkdir::WalkDir;

use crate::lifecycle::wrap_failure;

pub struct Cleaner {
    preconditions: Precondition,
    robustness: RobustnessConfig,
}

impl Cleaner {
    pub fn new(preconditions: Precondition) -> Self {
        Self {
            preconditions,
            robustness: RobustnessConfig::default(),
        }
    }

    pub fn preconditions(&self) -> &Precondition {
        &self.preconditions
    }

    /// Remove `staging` and everything in it.
    ///
    /// Entries are removed deepest first, each reported to `callback` as a
    /// `deleting <path>` line. The timeout is checked between entries.
    pub fn clean(
        &self,
        active: &NormalizedPath,
        staging: &NormalizedPath,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let ctx = CheckContext::new(active, staging).with_timeout(timeout);
        self.preconditions.assert_is_fulfilled(&ctx)?;

        tracing::info!(staging = %staging, "Removing staging directory");
        self.remove_tree(&staging.to_native(), callback, timeout)
            .map_err(wrap_failure("Failed to remove the staging directory: %details%"))?;
        tracing::info!(staging = %staging, "Staging directory removed");
        Ok(())
    }

    fn remove_tree(
        &self,
        root: &Path,
        mut callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let started = Instant::now();

        if filesystem::is_symlink(root) {
            return filesystem::remove(root, self.robustness);
        }

        for entry in WalkDir::new(root).contents_first(true).follow_links(false) {
            if let Some(timeout) = timeout
                && started.elapsed() > timeout
            {
                return Err(Error::runtime(
                    TranslatableMessage::exception(
                        "Removing the staging directory exceeded the timeout of %timeout% seconds.",
                    )
                    .with_parameter("%timeout%", timeout.as_secs_f64()),
                ));
            }

            let entry = entry.map_err(|e| {
                Error::io(
                    TranslatableMessage::exception("Failed to read the directory tree at %path%.")
                        .with_parameter("%path%", root.display()),
                    e.into(),
                )
            })?;
            filesystem::remove(entry.path(), self.robustness)?;

            if let Some(cb) = callback.as_mut()
                && let Ok(rel) = entry.path().strip_prefix(root)
                && !rel.as_os_str().is_empty()
            {
                cb.on_output(OutputType::Out, &format!("deleting {}", rel.display()));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Cleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cleaner")
            .field("preconditions", &self.preconditions.name())
            .finish_non_exhaustive()
    }
}
