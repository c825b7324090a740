//! Strategy selection

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use stager_process::ExecutableFinder;
use stager_translation::{Error, Result, TranslatableMessage};

use crate::rsync::RsyncFileSyncer;
use crate::software::SoftwareFileSyncer;
use crate::syncer::FileSyncer;

/// Which [`FileSyncer`] to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileSyncerStrategy {
    /// rsync when installed, the software syncer otherwise
    #[default]
    Auto,
    Rsync,
    Software,
}

impl fmt::Display for FileSyncerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Rsync => write!(f, "rsync"),
            Self::Software => write!(f, "software"),
        }
    }
}

/// Creates the [`FileSyncer`] for a [`FileSyncerStrategy`].
///
/// In [`FileSyncerStrategy::Auto`] mode the rsync lookup happens on the first
/// call to [`FileSyncerFactory::create`] and its answer is kept for the life
/// of the factory.
pub struct FileSyncerFactory {
    finder: Arc<dyn ExecutableFinder>,
    strategy: FileSyncerStrategy,
    rsync_executable: String,
    rsync_available: OnceLock<bool>,
}

impl FileSyncerFactory {
    pub fn new(finder: Arc<dyn ExecutableFinder>) -> Self {
        Self {
            finder,
            strategy: FileSyncerStrategy::Auto,
            rsync_executable: "rsync".to_string(),
            rsync_available: OnceLock::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: FileSyncerStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_rsync_executable(mut self, executable: impl Into<String>) -> Self {
        self.rsync_executable = executable.into();
        self.rsync_available = OnceLock::new();
        self
    }

    pub fn strategy(&self) -> FileSyncerStrategy {
        self.strategy
    }

    /// Whether rsync resolves, probing at most once.
    pub fn rsync_available(&self) -> bool {
        *self.rsync_available.get_or_init(|| {
            let available = self.finder.find(&self.rsync_executable).is_ok();
            tracing::debug!(executable = %self.rsync_executable, available, "Probed for rsync");
            available
        })
    }

    /// Create the syncer for the configured strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Logic`] if rsync is forced but cannot be found.
    pub fn create(&self) -> Result<Arc<dyn FileSyncer>> {
        let use_rsync = match self.strategy {
            FileSyncerStrategy::Software => false,
            FileSyncerStrategy::Auto => self.rsync_available(),
            FileSyncerStrategy::Rsync => {
                if !self.rsync_available() {
                    return Err(Error::logic(
                        TranslatableMessage::exception(
                            "The file syncer is set to rsync but the \"%name%\" executable cannot be found.",
                        )
                        .with_parameter("%name%", &self.rsync_executable),
                    ));
                }
                true
            }
        };

        let syncer: Arc<dyn FileSyncer> = if use_rsync {
            Arc::new(RsyncFileSyncer::new(
                self.rsync_executable.clone(),
                Arc::clone(&self.finder),
            ))
        } else {
            Arc::new(SoftwareFileSyncer::new())
        };
        tracing::info!(strategy = syncer.name(), "Selected file syncer");
        Ok(syncer)
    }
}

impl fmt::Debug for FileSyncerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSyncerFactory")
            .field("strategy", &self.strategy)
            .field("rsync_executable", &self.rsync_executable)
            .field("rsync_available", &self.rsync_available.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFinder {
        found: bool,
        calls: AtomicUsize,
    }

    impl ExecutableFinder for CountingFinder {
        fn find(&self, name: &str) -> Result<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.found {
                Ok(PathBuf::from("/usr/bin").join(name))
            } else {
                Err(Error::logic(TranslatableMessage::exception("missing")))
            }
        }
    }

    fn finder(found: bool) -> Arc<CountingFinder> {
        Arc::new(CountingFinder {
            found,
            calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn auto_probes_once() {
        let counting = finder(true);
        let factory = FileSyncerFactory::new(counting.clone());

        assert_eq!(factory.create().unwrap().name(), "rsync");
        assert_eq!(factory.create().unwrap().name(), "rsync");
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn auto_falls_back_to_software() {
        let factory = FileSyncerFactory::new(finder(false));
        assert_eq!(factory.create().unwrap().name(), "software");
    }

    #[test]
    fn software_never_probes() {
        let counting = finder(true);
        let factory =
            FileSyncerFactory::new(counting.clone()).with_strategy(FileSyncerStrategy::Software);

        assert_eq!(factory.create().unwrap().name(), "software");
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn forced_rsync_without_rsync_is_logic_error() {
        let factory =
            FileSyncerFactory::new(finder(false)).with_strategy(FileSyncerStrategy::Rsync);
        let err = factory.create().err().unwrap();
        assert_eq!(err.kind(), stager_translation::ErrorKind::Logic);
    }

    #[test]
    fn strategy_displays_as_configured() {
        assert_eq!(FileSyncerStrategy::default(), FileSyncerStrategy::Auto);
        assert_eq!(FileSyncerStrategy::Rsync.to_string(), "rsync");
        assert_eq!(FileSyncerStrategy::Software.to_string(), "software");
    }
}
