//! Begin: copy the active directory into a new staging directory

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use stager_fs::{NormalizedPath, PathList};
use stager_precondition::{CheckContext, Precondition};
use stager_process::OutputCallback;
use stager_sync::FileSyncer;
use stager_translation::Result;

use crate::lifecycle::wrap_failure;

pub struct Beginner {
    preconditions: Precondition,
    syncer: Arc<dyn FileSyncer>,
}

impl Beginner {
    pub fn new(preconditions: Precondition, syncer: Arc<dyn FileSyncer>) -> Self {
        Self {
            preconditions,
            syncer,
        }
    }

    pub fn preconditions(&self) -> &Precondition {
        &self.preconditions
    }

    /// Create `staging` as a copy of `active`, leaving out `exclusions`.
    ///
    /// # Errors
    ///
    /// - [`stager_translation::Error::Precondition`] if the active directory
    ///   is unusable or `staging` already exists; nothing is written
    /// - any error from the sync, wrapped with this operation's context
    pub fn begin(
        &self,
        active: &NormalizedPath,
        staging: &NormalizedPath,
        exclusions: Option<&PathList>,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let ctx = CheckContext::new(active, staging)
            .with_exclusions(exclusions)
            .with_timeout(timeout);
        self.preconditions.assert_is_fulfilled(&ctx)?;

        tracing::info!(active = %active, staging = %staging, "Beginning staging process");
        self.syncer
            .sync(active, staging, exclusions, callback, timeout)
            .map_err(wrap_failure("Failed to begin the staging process: %details%"))?;
        tracing::info!(staging = %staging, "Staging directory created");
        Ok(())
    }
}

impl fmt::Debug for Beginner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Beginner")
            .field("preconditions", &self.preconditions.name())
            .field("syncer", &self.syncer.name())
            .finish()
    }
}
