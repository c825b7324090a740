//! Tree snapshots.
//!
//! A [`Snapshot`] records every entry below a root by relative path: file
//! contents as a SHA-256 digest, symlinks by their stored target, and
//! directories by presence. Two trees mirror each other when their snapshots
//! are equal.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// One entry in a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Dir,
    /// Hex SHA-256 of the file contents
    File(String),
    /// Target exactly as stored in the link
    Symlink(String),
    /// FIFO, socket or device node; contents are not read
    Special,
}

/// Every entry below a root, keyed by `/`-separated relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<String, Entry>,
}

impl Snapshot {
    /// Snapshot the tree at `root`. Symlinks are recorded, not followed.
    ///
    /// # Panics
    /// Panics if the tree cannot be read.
    pub fn of(root: impl AsRef<Path>) -> Self {
        Self::of_excluding(root, &[])
    }

    /// Snapshot the tree at `root`, leaving out `excluded` relative paths and
    /// everything below them.
    pub fn of_excluding(root: impl AsRef<Path>, excluded: &[&str]) -> Self {
        let root = root.as_ref();
        let mut entries = BTreeMap::new();

        let mut it = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = it.next() {
            let entry = entry.unwrap_or_else(|e| panic!("Could not walk {}: {e}", root.display()));
            let rel = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");

            if excluded
                .iter()
                .any(|ex| rel == *ex || rel.starts_with(&format!("{ex}/")))
            {
                if entry.file_type().is_dir() {
                    it.skip_current_dir();
                }
                continue;
            }

            let file_type = entry.file_type();
            let recorded = if file_type.is_symlink() {
                let target = fs::read_link(entry.path()).unwrap();
                Entry::Symlink(target.to_string_lossy().into_owned())
            } else if file_type.is_dir() {
                Entry::Dir
            } else if !file_type.is_file() {
                Entry::Special
            } else {
                let content = fs::read(entry.path()).unwrap();
                Entry::File(format!("{:x}", Sha256::digest(&content)))
            };
            entries.insert(rel, recorded);
        }

        Self { entries }
    }

    pub fn entries(&self) -> &BTreeMap<String, Entry> {
        &self.entries
    }

    pub fn get(&self, rel: &str) -> Option<&Entry> {
        self.entries.get(rel)
    }

    pub fn contains(&self, rel: &str) -> bool {
        self.entries.contains_key(rel)
    }

    /// Relative paths in sorted order.
    pub fn paths(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
