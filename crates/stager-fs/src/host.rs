//! Host operating system detection

/// Path and link rules of the host operating system.
///
/// Detected once with [`HostOs::current`] and passed explicitly to whatever
/// needs it, so path logic can be exercised for either platform from any host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOs {
    /// POSIX-like hosts (Linux, macOS, BSD)
    Unix,
    /// Windows, with drive letters and UNC shares
    Windows,
}

impl HostOs {
    /// The operating system this process is running on.
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Self::Windows)
    }

    /// The canonical directory separator.
    pub fn separator(&self) -> char {
        match self {
            Self::Unix => '/',
            Self::Windows => '\\',
        }
    }
}
