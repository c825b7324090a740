//! Sync through the `rsync` executable

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use stager_fs::{NormalizedPath, PathList, filesystem};
use stager_process::{ExecutableFinder, OutputCallback, ProcessRunner};
use stager_translation::Result;

use crate::syncer::{FileSyncer, SyncPlan};

/// Mirrors trees with `rsync --archive --delete-after --checksum`.
///
/// `--checksum` makes rsync compare contents rather than size and mtime, so
/// every changed file is transferred. Each excluded path becomes an anchored
/// `--exclude=/<path>` rule, which also keeps rsync from deleting it on the
/// receiving side.
#[derive(Debug, Clone)]
pub struct RsyncFileSyncer {
    runner: ProcessRunner,
}

impl RsyncFileSyncer {
    pub fn new(executable: impl Into<String>, finder: Arc<dyn ExecutableFinder>) -> Self {
        Self {
            runner: ProcessRunner::new(executable, finder),
        }
    }

    /// Whether the rsync executable can be found.
    pub fn is_available(&self) -> bool {
        self.runner.is_available()
    }

    /// The arguments rsync is invoked with for `plan`.
    pub fn arguments(plan: &SyncPlan) -> Vec<String> {
        let mut args = vec![
            "--archive".to_string(),
            "--delete-after".to_string(),
            "--checksum".to_string(),
            "--verbose".to_string(),
        ];
        args.extend(
            plan.excluded()
                .iter()
                .map(|rel| format!("--exclude=/{}", to_rsync_pattern(rel))),
        );

        let separator = plan.source().host().separator();
        let mut source = plan.source().absolute().to_string();
        if !source.ends_with(separator) {
            source.push(separator);
        }
        args.push(source);
        args.push(plan.destination().absolute().to_string());
        args
    }
}

/// Characters rsync treats as wildcards in filter patterns.
const WILDCARDS: [char; 3] = ['*', '?', '['];

/// Turn a relative path into a literal rsync filter pattern.
///
/// rsync only honours backslash escapes in patterns that contain a wildcard,
/// so components without one are passed through untouched.
fn to_rsync_pattern(rel: &Path) -> String {
    rel.components()
        .map(|c| escape_component(&c.as_os_str().to_string_lossy()))
        .collect::<Vec<_>>()
        .join("/")
}

fn escape_component(component: &str) -> String {
    if !component.contains(WILDCARDS) {
        return component.to_string();
    }
    let mut escaped = String::with_capacity(component.len() + 4);
    for c in component.chars() {
        if c == '\\' || WILDCARDS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl FileSyncer for RsyncFileSyncer {
    fn name(&self) -> &'static str {
        "rsync"
    }

    fn sync(
        &self,
        source: &NormalizedPath,
        destination: &NormalizedPath,
        exclusions: Option<&PathList>,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let plan = SyncPlan::new(source, destination, exclusions)?;

        tracing::debug!(
            source = %source,
            destination = %destination,
            excluded = plan.excluded().len(),
            "Syncing with rsync"
        );

        // rsync creates the final directory but not its parents
        filesystem::mkdir(destination)?;

        self.runner
            .run(&Self::arguments(&plan), None, callback, timeout)
            .map(|_| ())
    }
}
