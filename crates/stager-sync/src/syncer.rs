//! The [`FileSyncer`] contract and the plan both strategies execute

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use stager_fs::{NormalizedPath, PathFactory, PathList};
use stager_process::OutputCallback;
use stager_translation::{Error, Result, TranslatableMessage};

/// Makes a destination directory mirror a source directory.
pub trait FileSyncer: Send + Sync {
    /// Short strategy name, for logs.
    fn name(&self) -> &'static str;

    /// Mirror `source` onto `destination`.
    ///
    /// Afterwards `destination` holds exactly the entries of `source`, minus
    /// `exclusions` (relative to `source`), which are neither copied nor
    /// deleted. Files are copied whatever their timestamps. Symlinks are
    /// copied as symlinks. `destination` is created if missing.
    ///
    /// When one directory is nested inside the other, the nested one is
    /// excluded implicitly so a sync never copies or deletes itself.
    ///
    /// # Errors
    ///
    /// - [`Error::Logic`] if `source` is not a directory or equals `destination`
    /// - [`Error::Runtime`] if the sync fails or exceeds `timeout`; the
    ///   destination may then be partially synced
    /// - [`Error::Io`] if the filesystem refuses an operation
    fn sync(
        &self,
        source: &NormalizedPath,
        destination: &NormalizedPath,
        exclusions: Option<&PathList>,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<()>;
}

/// A validated sync request.
///
/// Exclusions are held as paths relative to the sync root and apply to both
/// sides: an excluded source entry is not copied and an excluded destination
/// entry is not deleted.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    source: NormalizedPath,
    destination: NormalizedPath,
    excluded: Vec<PathBuf>,
}

impl SyncPlan {
    /// Validate a request and resolve its exclusions.
    pub fn new(
        source: &NormalizedPath,
        destination: &NormalizedPath,
        exclusions: Option<&PathList>,
    ) -> Result<Self> {
        if !source.is_dir() {
            return Err(Error::logic(
                TranslatableMessage::exception("The source directory does not exist at %path%.")
                    .with_parameter("%path%", source),
            ));
        }
        if source == destination {
            return Err(Error::logic(
                TranslatableMessage::exception(
                    "The source and destination directories cannot be the same at %path%.",
                )
                .with_parameter("%path%", source),
            ));
        }

        let mut excluded = Vec::new();
        if let Some(exclusions) = exclusions {
            let factory = PathFactory::with_working_dir(source.host(), source.absolute());
            for (entry, resolved) in exclusions.iter().zip(exclusions.resolve(&factory, source)) {
                if resolved.is_descendant_of(source) {
                    excluded.push(PathBuf::from(resolved.relative(source)));
                } else {
                    tracing::debug!(exclusion = entry, "Ignoring exclusion outside the source");
                }
            }
        }
        if destination.is_descendant_of(source) {
            excluded.push(PathBuf::from(destination.relative(source)));
        }
        if source.is_descendant_of(destination) {
            excluded.push(PathBuf::from(source.relative(destination)));
        }
        excluded.dedup();

        Ok(Self {
            source: source.clone(),
            destination: destination.clone(),
            excluded,
        })
    }

    pub fn source(&self) -> &NormalizedPath {
        &self.source
    }

    pub fn destination(&self) -> &NormalizedPath {
        &self.destination
    }

    /// Excluded paths relative to the sync root.
    pub fn excluded(&self) -> &[PathBuf] {
        &self.excluded
    }

    /// Whether `rel` is an excluded path or lies below one.
    pub fn is_excluded(&self, rel: &Path) -> bool {
        self.excluded.iter().any(|ex| rel.starts_with(ex))
    }
}

/// Wall-clock budget for one sync.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    started: Instant,
    timeout: Option<Duration>,
}

impl Deadline {
    pub(crate) fn start(timeout: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            timeout,
        }
    }

    pub(crate) fn check(&self) -> Result<()> {
        match self.timeout {
            Some(timeout) if self.started.elapsed() > timeout => Err(Error::runtime(
                TranslatableMessage::exception(
                    "The file sync exceeded the timeout of %timeout% seconds.",
                )
                .with_parameter("%timeout%", timeout.as_secs_f64()),
            )),
            _ => Ok(()),
        }
    }
}
