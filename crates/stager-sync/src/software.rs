//! Pure filesystem sync, used when `rsync` is not available

use std::fs;
use std::path::Path;
use std::time::Duration;

use stager_fs::{NormalizedPath, PathList, RobustnessConfig, filesystem};
use stager_process::{OutputCallback, OutputType};
use stager_translation::{Error, Result, TranslatableMessage};
use walkdir::WalkDir;

use crate::syncer::{Deadline, FileSyncer, SyncPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Dir,
    File,
    Symlink,
    /// FIFOs, sockets and device nodes
    Special,
}

fn kind_of(path: &Path) -> Option<Kind> {
    let file_type = fs::symlink_metadata(path).ok()?.file_type();
    Some(if file_type.is_symlink() {
        Kind::Symlink
    } else if file_type.is_dir() {
        Kind::Dir
    } else if file_type.is_file() {
        Kind::File
    } else {
        Kind::Special
    })
}

fn walk_error(root: &Path, e: walkdir::Error) -> Error {
    Error::io(
        TranslatableMessage::exception("Failed to read the directory tree at %path%.")
            .with_parameter("%path%", root.display()),
        e.into(),
    )
}

/// Mirrors trees by walking them, in two passes.
///
/// The deletion pass removes destination entries that are missing from the
/// source or whose type differs. The copy pass then creates directories and
/// copies every file and symlink. Each transferred entry is reported as one
/// output line, deletions prefixed with `deleting `.
///
/// Special files (FIFOs, sockets, devices) in the source are skipped rather
/// than recreated, unlike `rsync --archive`. A destination entry at the same
/// path is still deleted when its type differs.
#[derive(Debug, Clone)]
pub struct SoftwareFileSyncer {
    robustness: RobustnessConfig,
}

impl Default for SoftwareFileSyncer {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareFileSyncer {
    pub fn new() -> Self {
        Self {
            robustness: RobustnessConfig::default(),
        }
    }

    pub fn with_robustness(robustness: RobustnessConfig) -> Self {
        Self { robustness }
    }

    fn delete_extraneous(
        &self,
        plan: &SyncPlan,
        callback: &mut Option<&mut dyn OutputCallback>,
        deadline: &Deadline,
    ) -> Result<()> {
        let source = plan.source().to_native();
        let destination = plan.destination().to_native();

        let mut it = WalkDir::new(&destination)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = it.next() {
            deadline.check()?;
            let entry = entry.map_err(|e| walk_error(&destination, e))?;
            let Ok(rel) = entry.path().strip_prefix(&destination) else {
                continue;
            };
            let is_dir = entry.file_type().is_dir();

            if plan.is_excluded(rel) {
                if is_dir {
                    it.skip_current_dir();
                }
                continue;
            }

            let target_kind = kind_of(entry.path());
            if target_kind == kind_of(&source.join(rel)) {
                continue;
            }

            if is_dir {
                it.skip_current_dir();
            }
            tracing::debug!(path = %rel.display(), "Deleting");
            filesystem::remove(entry.path(), self.robustness)?;
            emit(callback, format!("deleting {}", display_rel(rel, target_kind)));
        }
        Ok(())
    }

    fn copy_all(
        &self,
        plan: &SyncPlan,
        callback: &mut Option<&mut dyn OutputCallback>,
        deadline: &Deadline,
    ) -> Result<()> {
        let source = plan.source().to_native();
        let destination = plan.destination().to_native();

        let mut it = WalkDir::new(&source)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = it.next() {
            deadline.check()?;
            let entry = entry.map_err(|e| walk_error(&source, e))?;
            let Ok(rel) = entry.path().strip_prefix(&source) else {
                continue;
            };

            if plan.is_excluded(rel) {
                if entry.file_type().is_dir() {
                    it.skip_current_dir();
                }
                continue;
            }

            let target = destination.join(rel);
            let kind = kind_of(entry.path());
            match kind {
                Some(Kind::Dir) => {
                    if target.is_dir() {
                        continue;
                    }
                    filesystem::mkdir(&target)?;
                }
                Some(Kind::Symlink) => {
                    let link_target = filesystem::read_link(entry.path())?;
                    if filesystem::is_symlink(&target)
                        && filesystem::read_link(&target)? == link_target
                    {
                        continue;
                    }
                    filesystem::symlink(&link_target, &target)?;
                }
                Some(Kind::File) => filesystem::copy(entry.path(), &target)?,
                Some(Kind::Special) => {
                    tracing::debug!(path = %rel.display(), "Skipping special file");
                    continue;
                }
                None => continue,
            }
            tracing::debug!(path = %rel.display(), "Copied");
            emit(callback, display_rel(rel, kind));
        }
        Ok(())
    }
}

fn display_rel(rel: &Path, kind: Option<Kind>) -> String {
    let rel = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if kind == Some(Kind::Dir) {
        format!("{rel}/")
    } else {
        rel
    }
}

fn emit(callback: &mut Option<&mut dyn OutputCallback>, line: String) {
    if let Some(cb) = callback.as_mut() {
        cb.on_output(OutputType::Out, &line);
    }
}

impl FileSyncer for SoftwareFileSyncer {
    fn name(&self) -> &'static str {
        "software"
    }

    fn sync(
        &self,
        source: &NormalizedPath,
        destination: &NormalizedPath,
        exclusions: Option<&PathList>,
        mut callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let plan = SyncPlan::new(source, destination, exclusions)?;
        let deadline = Deadline::start(timeout);

        tracing::debug!(
            source = %source,
            destination = %destination,
            excluded = plan.excluded().len(),
            "Syncing with the software syncer"
        );

        if destination.exists() && !destination.is_dir() {
            filesystem::remove(destination, self.robustness)?;
        }
        filesystem::mkdir(destination)?;

        self.delete_extraneous(&plan, &mut callback, &deadline)?;
        self.copy_all(&plan, &mut callback, &deadline)?;
        deadline.check()
    }
}
