//! Checks for links the sync cannot carry safely
//!
//! Each check scans one or both codebases for the first offending entry.
//! Scans skip excluded paths and, when the lifecycle directories are nested,
//! the other directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use stager_fs::{HostOs, NormalizedPath, PathFactory, filesystem};
use stager_translation::TranslatableMessage;
use walkdir::WalkDir;

use crate::check::{Check, CheckContext, Outcome};

/// Which codebases a link check scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codebases {
    Active,
    ActiveAndStaging,
}

struct Scan<'a> {
    label: &'static str,
    root: &'a NormalizedPath,
    excluded: Vec<PathBuf>,
    deadline: Option<Instant>,
}

impl<'a> Scan<'a> {
    fn new(label: &'static str, root: &'a NormalizedPath, other: &NormalizedPath, ctx: &CheckContext<'_>) -> Self {
        let mut excluded = Vec::new();
        if let Some(exclusions) = ctx.exclusions {
            let factory = PathFactory::with_working_dir(root.host(), root.absolute());
            excluded.extend(
                exclusions
                    .resolve(&factory, root)
                    .iter()
                    .filter(|p| p.is_descendant_of(root))
                    .map(|p| PathBuf::from(p.relative(root))),
            );
        }
        if other.is_descendant_of(root) {
            excluded.push(PathBuf::from(other.relative(root)));
        }
        Self {
            label,
            root,
            excluded,
            deadline: ctx.deadline,
        }
    }

    /// The first entry for which `offends` holds, as a message built from
    /// `template`.
    fn first<F>(&self, template: &str, mut offends: F) -> Outcome
    where
        F: FnMut(&Path, &NormalizedPath) -> bool,
    {
        if !self.root.is_dir() {
            return Ok(());
        }
        let root = self.root.to_native();

        let mut it = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = it.next() {
            if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                tracing::warn!(root = %self.root, "Link scan timed out");
                return Err(TranslatableMessage::new(
                    "The %codebase_name% directory at %codebase_root% could not be scanned for links in time.",
                )
                .with_parameter("%codebase_name%", self.label)
                .with_parameter("%codebase_root%", self.root));
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(root = %self.root, error = %e, "Link scan failed");
                    return Err(TranslatableMessage::new(
                        "The %codebase_name% directory at %codebase_root% could not be scanned for links.",
                    )
                    .with_parameter("%codebase_name%", self.label)
                    .with_parameter("%codebase_root%", self.root));
                }
            };
            let Ok(rel) = entry.path().strip_prefix(&root) else {
                continue;
            };
            if self.excluded.iter().any(|ex| rel.starts_with(ex)) {
                if entry.file_type().is_dir() {
                    it.skip_current_dir();
                }
                continue;
            }

            if offends(entry.path(), self.root) {
                return Err(TranslatableMessage::new(template)
                    .with_parameter("%codebase_name%", self.label)
                    .with_parameter("%codebase_root%", self.root)
                    .with_parameter("%file%", entry.path().display()));
            }
        }
        Ok(())
    }
}

fn scans<'a>(codebases: Codebases, ctx: &CheckContext<'a>) -> Vec<Scan<'a>> {
    let mut scans = vec![Scan::new("active", ctx.active_dir, ctx.staging_dir, ctx)];
    if codebases == Codebases::ActiveAndStaging {
        scans.push(Scan::new("staging", ctx.staging_dir, ctx.active_dir, ctx));
    }
    scans
}

fn scan_all<F>(codebases: Codebases, ctx: &CheckContext<'_>, template: &str, mut offends: F) -> Outcome
where
    F: FnMut(&Path, &NormalizedPath) -> bool,
{
    for scan in scans(codebases, ctx) {
        scan.first(template, &mut offends)?;
    }
    Ok(())
}

fn symlink_target(path: &Path) -> Option<PathBuf> {
    if !filesystem::is_symlink(path) {
        return None;
    }
    fs::read_link(path).ok()
}

/// Every symlink stores a relative target.
#[derive(Debug, Clone, Copy)]
pub struct NoAbsoluteSymlinksExist {
    codebases: Codebases,
}

impl NoAbsoluteSymlinksExist {
    pub fn new(codebases: Codebases) -> Self {
        Self { codebases }
    }
}

impl Check for NoAbsoluteSymlinksExist {
    fn name(&self) -> &'static str {
        "NoAbsoluteSymlinksExist"
    }

    fn description(&self) -> TranslatableMessage {
        TranslatableMessage::new("The codebase cannot contain absolute symlinks.")
    }

    fn fulfilled_message(&self) -> TranslatableMessage {
        TranslatableMessage::new("There are no absolute symlinks in the codebase.")
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Outcome {
        scan_all(
            self.codebases,
            ctx,
            "The %codebase_name% directory at %codebase_root% contains absolute links, \
             which is not supported. The first one is %file%.",
            |path, _| symlink_target(path).is_some_and(|target| target.is_absolute()),
        )
    }
}

/// No regular file has more than one hard link.
#[derive(Debug, Clone, Copy)]
pub struct NoHardLinksExist {
    codebases: Codebases,
}

impl NoHardLinksExist {
    pub fn new(codebases: Codebases) -> Self {
        Self { codebases }
    }
}

impl Check for NoHardLinksExist {
    fn name(&self) -> &'static str {
        "NoHardLinksExist"
    }

    fn description(&self) -> TranslatableMessage {
        TranslatableMessage::new("The codebase cannot contain hard links.")
    }

    fn fulfilled_message(&self) -> TranslatableMessage {
        TranslatableMessage::new("There are no hard links in the codebase.")
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Outcome {
        scan_all(
            self.codebases,
            ctx,
            "The %codebase_name% directory at %codebase_root% contains hard links, \
             which is not supported. The first one is %file%.",
            |path, _| filesystem::is_hard_link(path),
        )
    }
}

/// On Windows, the codebase contains no links of any kind.
#[derive(Debug, Clone, Copy)]
pub struct NoLinksExistOnWindows {
    host: HostOs,
    codebases: Codebases,
}

impl NoLinksExistOnWindows {
    pub fn new(host: HostOs, codebases: Codebases) -> Self {
        Self { host, codebases }
    }
}

impl Check for NoLinksExistOnWindows {
    fn name(&self) -> &'static str {
        "NoLinksExistOnWindows"
    }

    fn description(&self) -> TranslatableMessage {
        TranslatableMessage::new("The codebase cannot contain links on Windows.")
    }

    fn fulfilled_message(&self) -> TranslatableMessage {
        TranslatableMessage::new("There are no links in the codebase on Windows.")
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Outcome {
        if !self.host.is_windows() {
            return Ok(());
        }
        scan_all(
            self.codebases,
            ctx,
            "The %codebase_name% directory at %codebase_root% contains links, \
             which is not supported on Windows. The first one is %file%.",
            |path, _| filesystem::is_symlink(path) || filesystem::is_hard_link(path),
        )
    }
}

/// Every relative symlink resolves to a path inside its own codebase.
///
/// Resolution is lexical: the target need not exist.
#[derive(Debug, Clone, Copy)]
pub struct NoSymlinksPointOutsideTheCodebase {
    codebases: Codebases,
}

impl NoSymlinksPointOutsideTheCodebase {
    pub fn new(codebases: Codebases) -> Self {
        Self { codebases }
    }
}

fn points_outside(path: &Path, root: &NormalizedPath) -> bool {
    let Some(target) = symlink_target(path) else {
        return false;
    };
    if target.is_absolute() {
        return false;
    }
    let factory = PathFactory::with_working_dir(root.host(), root.absolute());
    let link = factory.create(path.to_string_lossy());
    let resolved = link.join("..").join(&target.to_string_lossy());
    resolved != *root && !resolved.is_descendant_of(root)
}

impl Check for NoSymlinksPointOutsideTheCodebase {
    fn name(&self) -> &'static str {
        "NoSymlinksPointOutsideTheCodebase"
    }

    fn description(&self) -> TranslatableMessage {
        TranslatableMessage::new("The codebase cannot contain symlinks that point outside the codebase.")
    }

    fn fulfilled_message(&self) -> TranslatableMessage {
        TranslatableMessage::new("There are no symlinks that point outside the codebase.")
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Outcome {
        scan_all(
            self.codebases,
            ctx,
            "The %codebase_name% directory at %codebase_root% contains links that point outside \
             the codebase, which is not supported. The first one is %file%.",
            points_outside,
        )
    }
}
