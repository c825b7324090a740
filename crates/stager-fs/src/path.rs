//! Host-aware path resolution
//!
//! Resolution is purely lexical: nothing is read from disk and a path need
//! not exist. `.` segments are dropped, `..` pops the previous segment (and is
//! dropped at the root), separators are normalized to the host's canonical
//! one, and no trailing separator is kept except on a root.

use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use stager_translation::{Error, Result, TranslatableMessage};

use crate::HostOs;

/// An immutable path, resolved to canonical absolute form at creation.
///
/// Create instances with a [`PathFactory`]. Two paths are equal when their
/// absolute forms are equal, whatever raw strings they were built from.
#[derive(Debug, Clone)]
pub struct NormalizedPath {
    raw: String,
    absolute: String,
    host: HostOs,
}

impl NormalizedPath {
    /// The string the path was created from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the raw string is absolute. Purely syntactic.
    pub fn is_absolute(&self) -> bool {
        match self.host {
            HostOs::Unix => self.raw.starts_with('/') || self.raw.starts_with('\\'),
            HostOs::Windows => {
                let parsed = parse_windows(&self.raw);
                parsed.root.is_some() && parsed.rooted
            }
        }
    }

    /// The canonical absolute form.
    pub fn absolute(&self) -> &str {
        &self.absolute
    }

    /// This path relative to `base`.
    ///
    /// Returns the part after `base` when this path lies strictly inside it.
    /// Otherwise returns the absolute form unchanged; callers that need to
    /// know the difference should use [`NormalizedPath::is_descendant_of`].
    pub fn relative(&self, base: &NormalizedPath) -> String {
        match self.strip_base(base) {
            Some(suffix) => suffix.to_string(),
            None => self.absolute.clone(),
        }
    }

    /// Whether this path lies strictly inside `base`.
    pub fn is_descendant_of(&self, base: &NormalizedPath) -> bool {
        self.strip_base(base).is_some()
    }

    /// Resolve `segment` against this path.
    pub fn join(&self, segment: &str) -> Self {
        let absolute = resolve(self.host, segment, &self.absolute);
        Self {
            raw: absolute.clone(),
            absolute,
            host: self.host,
        }
    }

    /// The final component, or `None` for a root.
    pub fn file_name(&self) -> Option<&str> {
        let sep = self.host.separator();
        match self.absolute.rsplit_once(sep) {
            Some((_, name)) if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    pub fn host(&self) -> HostOs {
        self.host
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.absolute)
    }

    /// Check if anything (including a dangling symlink) exists at this path.
    pub fn exists(&self) -> bool {
        std::fs::symlink_metadata(&self.absolute).is_ok()
    }

    /// Check if this is a directory, following symlinks.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    fn strip_base(&self, base: &NormalizedPath) -> Option<&str> {
        let sep = self.host.separator();
        let rest = self.absolute.strip_prefix(base.absolute.as_str())?;
        let rest = if base.absolute.ends_with(sep) {
            rest
        } else {
            rest.strip_prefix(sep)?
        };
        if rest.is_empty() { None } else { Some(rest) }
    }
}

impl PartialEq for NormalizedPath {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host && self.absolute == other.absolute
    }
}

impl Eq for NormalizedPath {}

impl Hash for NormalizedPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.host.hash(state);
        self.absolute.hash(state);
    }
}

impl AsRef<std::path::Path> for NormalizedPath {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.absolute)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.absolute)
    }
}

/// Creates [`NormalizedPath`]s for one host.
///
/// Relative inputs without an explicit base are resolved against the working
/// directory captured when the factory was built.
#[derive(Debug, Clone)]
pub struct PathFactory {
    host: HostOs,
    working_dir: String,
}

impl PathFactory {
    /// Create a factory resolving against the process working directory.
    pub fn new(host: HostOs) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| {
            Error::io(
                TranslatableMessage::exception("Unable to determine the current working directory."),
                e,
            )
        })?;
        Ok(Self::with_working_dir(host, cwd.to_string_lossy()))
    }

    /// Create a factory resolving against an explicit working directory.
    ///
    /// A relative `working_dir` is itself anchored at the filesystem root.
    pub fn with_working_dir(host: HostOs, working_dir: impl AsRef<str>) -> Self {
        let root = match host {
            HostOs::Unix => "/",
            HostOs::Windows => "C:\\",
        };
        Self {
            host,
            working_dir: resolve(host, working_dir.as_ref(), root),
        }
    }

    pub fn host(&self) -> HostOs {
        self.host
    }

    /// Create a path, resolving relative input against the working directory.
    pub fn create(&self, raw: impl AsRef<str>) -> NormalizedPath {
        self.build(raw.as_ref(), &self.working_dir)
    }

    /// Create a path, resolving relative input against `base`.
    pub fn create_relative_to(&self, raw: impl AsRef<str>, base: &NormalizedPath) -> NormalizedPath {
        self.build(raw.as_ref(), &base.absolute)
    }

    fn build(&self, raw: &str, base: &str) -> NormalizedPath {
        NormalizedPath {
            raw: raw.to_string(),
            absolute: resolve(self.host, raw, base),
            host: self.host,
        }
    }
}

/// Resolve `raw` against the already-absolute `base`.
fn resolve(host: HostOs, raw: &str, base: &str) -> String {
    match host {
        HostOs::Unix => resolve_unix(raw, base),
        HostOs::Windows => resolve_windows(raw, base),
    }
}

fn resolve_unix(raw: &str, base: &str) -> String {
    let raw = raw.replace('\\', "/");
    let combined = if raw.starts_with('/') {
        raw
    } else {
        format!("{}/{}", base.replace('\\', "/"), raw)
    };

    let segments = collapse(combined.split('/'));
    format!("/{}", segments.join("/"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum WindowsRoot {
    /// Upper-cased drive, e.g. `C:`
    Drive(String),
    /// `\\server\share`
    Unc(String),
}

struct ParsedWindows<'a> {
    root: Option<WindowsRoot>,
    rooted: bool,
    segments: Vec<&'a str>,
}

fn parse_windows<'a>(raw: &'a str) -> ParsedWindows<'a> {
    let bytes = raw.as_bytes();
    let is_sep = |b: u8| b == b'\\' || b == b'/';
    let split = |s: &'a str| -> Vec<&'a str> { s.split(['\\', '/']).collect() };

    if bytes.len() >= 2 && is_sep(bytes[0]) && is_sep(bytes[1]) {
        let mut parts = split(&raw[2..]).into_iter().filter(|p| !p.is_empty());
        let server = parts.next().unwrap_or_default();
        let share = parts.next();
        let root = match share {
            Some(share) => format!("\\\\{}\\{}", server, share),
            None => format!("\\\\{}", server),
        };
        return ParsedWindows {
            root: Some(WindowsRoot::Unc(root)),
            rooted: true,
            segments: parts.collect(),
        };
    }

    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let drive = format!("{}:", (bytes[0] as char).to_ascii_uppercase());
        let rest = &raw[2..];
        return ParsedWindows {
            root: Some(WindowsRoot::Drive(drive)),
            rooted: rest.bytes().next().is_some_and(is_sep),
            segments: split(rest),
        };
    }

    ParsedWindows {
        root: None,
        rooted: bytes.first().copied().is_some_and(is_sep),
        segments: split(raw),
    }
}

fn resolve_windows(raw: &str, base: &str) -> String {
    let parsed = parse_windows(raw);
    let base = parse_windows(base);
    let base_root = base
        .root
        .clone()
        .unwrap_or_else(|| WindowsRoot::Drive("C:".to_string()));

    let (root, segments): (WindowsRoot, Vec<&str>) = match (parsed.root, parsed.rooted) {
        (Some(root), true) => (root, parsed.segments),
        // Drive-relative input such as `C:foo` continues from the base only
        // when the base is on the same drive.
        (Some(root), false) if root == base_root => {
            (root, base.segments.into_iter().chain(parsed.segments).collect())
        }
        (Some(root), false) => (root, parsed.segments),
        (None, true) => (base_root, parsed.segments),
        (None, false) => (
            base_root,
            base.segments.into_iter().chain(parsed.segments).collect(),
        ),
    };

    let segments = collapse(segments.into_iter());
    match root {
        WindowsRoot::Drive(drive) => format!("{}\\{}", drive, segments.join("\\")),
        WindowsRoot::Unc(share) if segments.is_empty() => share,
        WindowsRoot::Unc(share) => format!("{}\\{}", share, segments.join("\\")),
    }
}

/// Drop empty and `.` segments and apply `..`.
fn collapse<'a>(segments: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut stack: Vec<&str> = Vec::new();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    stack
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_applies_parent_segments() {
        let segments = collapse("a/./b/../c".split('/'));
        assert_eq!(segments, vec!["a", "c"]);
    }

    #[test]
    fn collapse_drops_parent_above_root() {
        let segments = collapse("../../a".split('/'));
        assert_eq!(segments, vec!["a"]);
    }

    #[test]
    fn parse_windows_recognizes_unc_share() {
        let parsed = parse_windows(r"\\server\share\dir");
        assert_eq!(
            parsed.root,
            Some(WindowsRoot::Unc(r"\\server\share".to_string()))
        );
        assert_eq!(parsed.segments, vec!["dir"]);
    }

    #[test]
    fn parse_windows_drive_relative_is_not_rooted() {
        let parsed = parse_windows("d:foo");
        assert_eq!(parsed.root, Some(WindowsRoot::Drive("D:".to_string())));
        assert!(!parsed.rooted);
    }
}
