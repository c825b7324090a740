//! Filesystem primitives
//!
//! Thin wrappers over `std::fs` that report failures as translatable
//! [`Error`]s. Predicates never fail; they answer `false` when the answer
//! cannot be determined.

use std::fs;
use std::path::{Path, PathBuf};

use stager_translation::{Error, Result, TranslatableMessage};

use crate::io::{RobustnessConfig, retry_transient};

fn io_error(template: &str, path: &Path, source: std::io::Error) -> Error {
    Error::io(
        TranslatableMessage::exception(template).with_parameter("%path%", path.display()),
        source,
    )
}

/// Whether anything exists at `path`, including a dangling symlink.
pub fn exists(path: impl AsRef<Path>) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Whether `path` is a directory, following symlinks.
pub fn is_dir(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_dir()
}

/// Whether `path` is a regular file, following symlinks.
pub fn is_file(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}

/// Whether `path` itself is a symlink.
pub fn is_symlink(path: impl AsRef<Path>) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Whether `path` is a regular file with more than one hard link.
///
/// Always `false` on hosts where the link count is not exposed.
pub fn is_hard_link(path: impl AsRef<Path>) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_file() && m.nlink() > 1)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        false
    }
}

/// Whether the current user can write to `path`.
///
/// Directories are probed by creating an anonymous temporary file inside
/// them and files by opening them for writing, so ownership counts and not
/// just the permission bits.
pub fn is_writable(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(m) if m.is_dir() => tempfile::tempfile_in(path).is_ok(),
        Ok(_) => fs::OpenOptions::new().write(true).open(path).is_ok(),
        Err(_) => false,
    }
}

/// Create a directory and any missing parents.
pub fn mkdir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| io_error("Failed to create directory at %path%.", path, e))
}

/// Copy a single file, overwriting whatever is at `destination`.
///
/// A symlink at `destination` is replaced rather than written through.
pub fn copy(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
    let (source, destination) = (source.as_ref(), destination.as_ref());

    if !source.is_file() {
        return Err(Error::logic(
            TranslatableMessage::exception("The source file does not exist or is not a file at %path%.")
                .with_parameter("%path%", source.display()),
        ));
    }
    if source == destination {
        return Err(Error::logic(
            TranslatableMessage::exception("The source and destination files cannot be the same at %path%.")
                .with_parameter("%path%", source.display()),
        ));
    }

    if let Some(parent) = destination.parent() {
        mkdir(parent)?;
    }
    if is_symlink(destination) {
        fs::remove_file(destination)
            .map_err(|e| io_error("Failed to remove the file at %path%.", destination, e))?;
    }

    fs::copy(source, destination).map_err(|e| {
        Error::io(
            TranslatableMessage::exception("Failed to copy %source% to %destination%.")
                .with_parameter("%source%", source.display())
                .with_parameter("%destination%", destination.display()),
            e,
        )
    })?;
    Ok(())
}

/// Remove a file, symlink, or directory tree. Missing paths are not an error.
///
/// Symlinks are removed themselves; their targets are never touched.
pub fn remove(path: impl AsRef<Path>, robustness: RobustnessConfig) -> Result<()> {
    let path = path.as_ref();

    let result = retry_transient(robustness, || {
        let metadata = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        let removed = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            remove_link_or_file(path)
        };
        match removed {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    });

    result.map_err(|e| io_error("Failed to remove %path%.", path, e))
}

#[cfg(windows)]
fn remove_link_or_file(path: &Path) -> std::io::Result<()> {
    // Directory symlinks on Windows are directories as far as deletion goes
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
}

#[cfg(not(windows))]
fn remove_link_or_file(path: &Path) -> std::io::Result<()> {
    fs::remove_file(path)
}

/// Read the target of a symlink without resolving it.
pub fn read_link(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if !is_symlink(path) {
        return Err(Error::logic(
            TranslatableMessage::exception("The path does not exist or is not a symlink at %path%.")
                .with_parameter("%path%", path.display()),
        ));
    }
    fs::read_link(path).map_err(|e| io_error("Failed to read the symlink at %path%.", path, e))
}

/// Create a symlink at `link` pointing to `target`, replacing anything at `link`.
///
/// `target` is stored verbatim, so relative targets stay relative.
pub fn symlink(target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()> {
    let (target, link) = (target.as_ref(), link.as_ref());

    if let Some(parent) = link.parent() {
        mkdir(parent)?;
    }
    if exists(link) {
        remove(link, RobustnessConfig::default())?;
    }

    create_symlink(target, link).map_err(|e| {
        Error::io(
            TranslatableMessage::exception("Failed to create symlink %link% to %target%.")
                .with_parameter("%link%", link.display())
                .with_parameter("%target%", target.display()),
            e,
        )
    })
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    let resolved = match link.parent() {
        Some(parent) if target.is_relative() => parent.join(target),
        _ => target.to_path_buf(),
    };
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

/// Canonicalize a path that exists, without UNC prefixes on Windows.
pub fn canonicalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    dunce::canonicalize(path).map_err(|e| io_error("Failed to resolve %path%.", path, e))
}
