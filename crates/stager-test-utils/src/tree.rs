//! [`TestTree`] builder for lifecycle test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::snapshot::Snapshot;

/// A temporary directory with helpers for laying out codebases and asserting
/// on them.
///
/// Paths passed to the helpers are relative to the tree root.
///
/// # Example
///
/// ```rust,no_run
/// use stager_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.write("active/composer.json", "{}");
/// tree.mkdir("active/vendor");
/// tree.assert_file_contains("active/composer.json", "{}");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `rel`.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Absolute path of `rel` as a string, for path factories.
    pub fn path_str(&self, rel: &str) -> String {
        self.path(rel).to_string_lossy().into_owned()
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        self
    }

    /// Create the directory `rel` and its parents.
    pub fn mkdir(&self, rel: &str) -> &Self {
        fs::create_dir_all(self.path(rel)).unwrap();
        self
    }

    /// Create a symlink at `rel` storing `target` verbatim.
    #[cfg(unix)]
    pub fn symlink(&self, target: &str, rel: &str) -> &Self {
        let link = self.path(rel);
        if let Some(parent) = link.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        std::os::unix::fs::symlink(target, link).unwrap();
        self
    }

    /// Create a hard link at `rel` to the existing file `original`.
    pub fn hard_link(&self, original: &str, rel: &str) -> &Self {
        fs::hard_link(self.path(original), self.path(rel)).unwrap();
        self
    }

    /// Mark `rel` read-only.
    pub fn make_read_only(&self, rel: &str) -> &Self {
        let path = self.path(rel);
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(path, permissions).unwrap();
        self
    }

    /// Read `rel` as a string.
    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel))
            .unwrap_or_else(|_| panic!("Could not read file: {}", self.path(rel).display()))
    }

    /// Snapshot the subtree at `rel`.
    pub fn snapshot(&self, rel: &str) -> Snapshot {
        Snapshot::of(self.path(rel))
    }

    /// Snapshot the subtree at `rel`, leaving out `excluded` paths relative to it.
    pub fn snapshot_excluding(&self, rel: &str, excluded: &[&str]) -> Snapshot {
        Snapshot::of_excluding(self.path(rel), excluded)
    }

    /// Assert that something (including a dangling symlink) exists at `rel`.
    ///
    /// # Panics
    /// Panics with a descriptive message if nothing exists there.
    pub fn assert_exists(&self, rel: &str) {
        let path = self.path(rel);
        assert!(
            fs::symlink_metadata(&path).is_ok(),
            "Expected path to exist: {}",
            path.display()
        );
    }

    /// Assert that nothing exists at `rel`.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, rel: &str) {
        let path = self.path(rel);
        assert!(
            fs::symlink_metadata(&path).is_err(),
            "Expected path NOT to exist: {}",
            path.display()
        );
    }

    /// Assert that the file at `rel` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, rel: &str, content: &str) {
        let file_content = self.read(rel);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            self.path(rel).display(),
            content,
            file_content
        );
    }

    /// Assert that `rel` is a symlink storing `target`.
    ///
    /// # Panics
    /// Panics if `rel` is not a symlink or points elsewhere.
    pub fn assert_symlink(&self, rel: &str, target: &str) {
        let path = self.path(rel);
        let actual = fs::read_link(&path)
            .unwrap_or_else(|_| panic!("Expected a symlink: {}", path.display()));
        assert_eq!(
            actual,
            Path::new(target),
            "Symlink {} points to the wrong target",
            path.display()
        );
    }
}
