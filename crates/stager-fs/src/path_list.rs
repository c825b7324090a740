//! Exclusion lists

use stager_translation::{Error, Result, TranslatableMessage};

use crate::{NormalizedPath, PathFactory};

/// An ordered, de-duplicated, append-only list of raw path strings.
///
/// Entries are normalized to forward slashes with redundant separators and
/// leading `./` removed, so `vendor/`, `./vendor` and `vendor` collapse into
/// one entry. Entries stay unresolved until [`PathList::resolve`] anchors them
/// to a base directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathList {
    paths: Vec<String>,
}

impl PathList {
    /// Create a list from the given entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if an entry is empty or contains a
    /// NUL byte.
    pub fn new<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        list.add(paths)?;
        Ok(list)
    }

    /// Append entries, skipping ones already present.
    ///
    /// Validation happens before anything is appended, so a rejected batch
    /// leaves the list unchanged.
    pub fn add<I, S>(&mut self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized = paths
            .into_iter()
            .map(|p| normalize_entry(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        for entry in normalized {
            if !self.paths.contains(&entry) {
                self.paths.push(entry);
            }
        }
        Ok(())
    }

    pub fn get_all(&self) -> &[String] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Resolve every entry against `base`.
    pub fn resolve(&self, factory: &PathFactory, base: &NormalizedPath) -> Vec<NormalizedPath> {
        self.paths
            .iter()
            .map(|p| factory.create_relative_to(p, base))
            .collect()
    }
}

fn normalize_entry(raw: &str) -> Result<String> {
    if raw.contains('\0') {
        return Err(Error::invalid_argument(
            TranslatableMessage::exception("Paths must not contain NUL bytes: %path%")
                .with_parameter("%path%", raw.escape_default()),
        ));
    }

    let unified = raw.replace('\\', "/");
    let absolute = unified.starts_with('/');
    let segments: Vec<&str> = unified
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    if segments.is_empty() {
        return Err(Error::invalid_argument(
            TranslatableMessage::exception("Paths must not be empty: \"%path%\"")
                .with_parameter("%path%", raw),
        ));
    }

    let joined = segments.join("/");
    Ok(if absolute { format!("/{}", joined) } else { joined })
}
