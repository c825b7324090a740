//! Individual checks

use std::time::{Duration, Instant};

use stager_fs::{NormalizedPath, PathList};
use stager_translation::TranslatableMessage;

/// Result of evaluating a [`Check`]: `Err` carries the unfulfilled message.
pub type Outcome = std::result::Result<(), TranslatableMessage>;

/// What a check inspects.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub active_dir: &'a NormalizedPath,
    pub staging_dir: &'a NormalizedPath,
    /// Paths, relative to each codebase, that link scans skip
    pub exclusions: Option<&'a PathList>,
    /// Instant after which long-running checks give up
    pub deadline: Option<Instant>,
}

impl<'a> CheckContext<'a> {
    pub fn new(active_dir: &'a NormalizedPath, staging_dir: &'a NormalizedPath) -> Self {
        Self {
            active_dir,
            staging_dir,
            exclusions: None,
            deadline: None,
        }
    }

    pub fn with_exclusions(mut self, exclusions: Option<&'a PathList>) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Bound evaluation to `timeout` from now. `None` means unbounded.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        self
    }

    pub fn is_past_deadline(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// A single named safety check.
///
/// Checks are evaluated afresh on every call; nothing is cached between
/// evaluations.
pub trait Check: Send + Sync {
    /// Stable identifier, e.g. `ActiveDirExists`.
    fn name(&self) -> &'static str;

    /// What the check requires.
    fn description(&self) -> TranslatableMessage;

    /// Status reported when the check passes.
    fn fulfilled_message(&self) -> TranslatableMessage;

    /// Evaluate the check against `ctx`.
    fn evaluate(&self, ctx: &CheckContext<'_>) -> Outcome;
}
