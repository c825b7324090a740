//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;
use stager_translation::{Error, Result, TranslatableMessage};

/// Retry policy for filesystem operations that can fail transiently.
///
/// Windows in particular reports sharing violations as permission errors
/// while a scanner or indexer briefly holds a handle.
#[derive(Debug, Clone, Copy)]
pub struct RobustnessConfig {
    /// Delay before the first retry
    pub initial_interval: Duration,
    /// Give up once this much time has passed since the first attempt
    pub retry_window: Duration,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(50),
            retry_window: Duration::from_secs(2),
        }
    }
}

impl RobustnessConfig {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            initial_interval: Duration::ZERO,
            retry_window: Duration::ZERO,
        }
    }
}

/// Run `op`, retrying transient I/O failures within the configured window.
pub fn retry_transient<T>(
    robustness: RobustnessConfig,
    mut op: impl FnMut() -> std::io::Result<T>,
) -> std::io::Result<T> {
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(robustness.initial_interval)
        .with_max_elapsed_time(Some(robustness.retry_window))
        .build();

    backoff::retry(policy, || {
        op().map_err(|e| {
            if is_transient(&e) {
                tracing::debug!(error = %e, "Retrying transient filesystem error");
                backoff::Error::transient(e)
            } else {
                backoff::Error::permanent(e)
            }
        })
    })
    .map_err(|e| match e {
        backoff::Error::Permanent(err) => err,
        backoff::Error::Transient { err, .. } => err,
    })
}

fn is_transient(error: &std::io::Error) -> bool {
    match error.kind() {
        std::io::ErrorKind::Interrupted => true,
        std::io::ErrorKind::PermissionDenied => cfg!(windows),
        _ => false,
    }
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &Path, content: &[u8], robustness: RobustnessConfig) -> Result<()> {
    let write_failed = |p: &Path, e| {
        Error::io(
            TranslatableMessage::exception("Failed to write %path%.")
                .with_parameter("%path%", p.display()),
            e,
        )
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| write_failed(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| write_failed(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|e| write_failed(path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| write_failed(&temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| write_failed(&temp_path, e))?;

    // Released on drop as well; unlocking first keeps Windows from refusing the rename
    FileExt::unlock(&temp_file).map_err(|e| write_failed(path, e))?;
    drop(temp_file);

    retry_transient(robustness, || fs::rename(&temp_path, path)).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        write_failed(path, e)
    })
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::io(
            TranslatableMessage::exception("Failed to read %path%.")
                .with_parameter("%path%", path.display()),
            e,
        )
    })
}
