//! Executable discovery on `PATH`

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use stager_translation::{Error, Result, TranslatableMessage};

/// Resolves executable names to paths.
pub trait ExecutableFinder: Send + Sync {
    /// Find `name` on the host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Logic`] if the executable cannot be found.
    fn find(&self, name: &str) -> Result<PathBuf>;
}

/// Looks executables up on `PATH`, remembering what it found.
///
/// Only successful lookups are cached, so installing a missing tool is
/// picked up by the next call.
#[derive(Debug, Default)]
pub struct PathExecutableFinder {
    cache: Mutex<HashMap<String, PathBuf>>,
}

impl PathExecutableFinder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExecutableFinder for PathExecutableFinder {
    fn find(&self, name: &str) -> Result<PathBuf> {
        if let Ok(cache) = self.cache.lock()
            && let Some(path) = cache.get(name)
        {
            return Ok(path.clone());
        }

        let path = which::which(name).map_err(|e| {
            Error::logic(
                TranslatableMessage::exception(
                    "The \"%name%\" executable cannot be found. Make sure it's installed and in the $PATH.",
                )
                .with_parameter("%name%", name),
            )
            .with_source(e)
        })?;

        tracing::debug!(executable = name, path = %path.display(), "Resolved executable");

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(name.to_string(), path.clone());
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stager_translation::ErrorKind;

    #[test]
    fn missing_executable_is_logic_error() {
        let finder = PathExecutableFinder::new();
        let err = finder
            .find("stager-definitely-not-an-executable")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Logic);
        assert!(err.to_string().contains("stager-definitely-not-an-executable"));
    }

    #[cfg(unix)]
    #[test]
    fn finds_sh_and_caches_it() {
        let finder = PathExecutableFinder::new();
        let first = finder.find("sh").unwrap();
        let second = finder.find("sh").unwrap();
        assert_eq!(first, second);
        assert!(finder.cache.lock().unwrap().contains_key("sh"));
    }
}
