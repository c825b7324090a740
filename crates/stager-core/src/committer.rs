//! Commit: copy the staging directory back over the active directory

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use stager_fs::{NormalizedPath, PathList};
use stager_precondition::{CheckContext, Precondition};
use stager_process::OutputCallback;
use stager_sync::FileSyncer;
use stager_translation::Result;

use crate::lifecycle::wrap_failure;

pub struct Committer {
    preconditions: Precondition,
    syncer: Arc<dyn FileSyncer>,
}

impl Committer {
    pub fn new(preconditions: Precondition, syncer: Arc<dyn FileSyncer>) -> Self {
        Self {
            preconditions,
            syncer,
        }
    }

    pub fn preconditions(&self) -> &Precondition {
        &self.preconditions
    }

    /// Make `active` mirror `staging`, leaving `exclusions` in `active`
    /// untouched.
    ///
    /// Note the argument order: the staging directory is the source here.
    pub fn commit(
        &self,
        staging: &NormalizedPath,
        active: &NormalizedPath,
        exclusions: Option<&PathList>,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let ctx = CheckContext::new(active, staging)
            .with_exclusions(exclusions)
            .with_timeout(timeout);
        self.preconditions.assert_is_fulfilled(&ctx)?;

        tracing::info!(staging = %staging, active = %active, "Committing staged changes");
        self.syncer
            .sync(staging, active, exclusions, callback, timeout)
            .map_err(wrap_failure("Failed to commit the staged changes: %details%"))?;
        tracing::info!(active = %active, "Staged changes are live");
        Ok(())
    }
}

impl fmt::Debug for Committer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Committer")
            .field("preconditions", &self.preconditions.name())
            .field("syncer", &self.syncer.name())
            .finish()
    }
}
