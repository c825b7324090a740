//! Wiring the four lifecycle operations together

use std::sync::Arc;

use stager_fs::{HostOs, NormalizedPath, PathFactory};
use stager_precondition::Environment;
use stager_precondition::trees::{
    beginner_preconditions, cleaner_preconditions, committer_preconditions, stager_preconditions,
};
use stager_process::{ExecutableFinder, PathExecutableFinder};
use stager_sync::{FileSyncer, FileSyncerFactory};
use stager_translation::translator::DEFAULT_LOCALE;
use stager_translation::{DefaultTranslator, Error, Result, TranslatableMessage, Translator};

use crate::beginner::Beginner;
use crate::cleaner::Cleaner;
use crate::committer::Committer;
use crate::config::StagerConfig;
use crate::stager::Stager;

/// Wrap a lower-level failure with the operation it interrupted.
///
/// The inner message is kept structured as `%details%`, so it renders in
/// whatever locale the outer one is rendered in.
pub(crate) fn wrap_failure(template: &'static str) -> impl FnOnce(Error) -> Error {
    move |e| {
        let details = e.translatable_message().clone();
        e.wrap(TranslatableMessage::exception(template).with_message_parameter("%details%", details))
    }
}

/// The four lifecycle operations, built from one [`StagerConfig`].
pub struct Lifecycle {
    config: StagerConfig,
    paths: PathFactory,
    translator: Arc<dyn Translator>,
    beginner: Beginner,
    stager: Stager,
    committer: Committer,
    cleaner: Cleaner,
}

impl Lifecycle {
    /// Build for the current host, resolving executables on `PATH`.
    pub fn from_config(config: StagerConfig) -> Result<Self> {
        let paths = PathFactory::new(HostOs::current())?;
        Self::with_finder(config, paths, Arc::new(PathExecutableFinder::new()))
    }

    /// Build with an explicit path factory and executable finder.
    pub fn with_finder(
        config: StagerConfig,
        paths: PathFactory,
        finder: Arc<dyn ExecutableFinder>,
    ) -> Result<Self> {
        let syncer = FileSyncerFactory::new(Arc::clone(&finder))
            .with_strategy(config.file_syncer)
            .with_rsync_executable(config.rsync_executable.clone())
            .create()?;
        Ok(Self::with_syncer(config, paths, finder, syncer))
    }

    /// Build around an already chosen [`FileSyncer`].
    pub fn with_syncer(
        config: StagerConfig,
        paths: PathFactory,
        finder: Arc<dyn ExecutableFinder>,
        syncer: Arc<dyn FileSyncer>,
    ) -> Self {
        let env = Environment::new(paths.host(), Arc::clone(&finder), config.stage_executable.clone());

        tracing::info!(
            host = ?paths.host(),
            syncer = syncer.name(),
            stage_executable = %config.stage_executable,
            "Lifecycle ready"
        );

        let locale = config.locale.as_deref().unwrap_or(DEFAULT_LOCALE);
        let translator: Arc<dyn Translator> = Arc::new(DefaultTranslator::new(locale));

        Self {
            translator,
            beginner: Beginner::new(beginner_preconditions(&env), Arc::clone(&syncer)),
            stager: Stager::new(
                stager_preconditions(&env),
                config.stage_executable.clone(),
                finder,
            ),
            committer: Committer::new(committer_preconditions(&env), syncer),
            cleaner: Cleaner::new(cleaner_preconditions(&env)),
            config,
            paths,
        }
    }

    /// Render messages through `translator` instead of the default one.
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Render `message` in the configured locale.
    pub fn render(&self, message: &TranslatableMessage) -> String {
        message.trans(self.translator.as_ref(), self.config.locale.as_deref())
    }

    pub fn config(&self) -> &StagerConfig {
        &self.config
    }

    /// Resolve `raw` against the working directory.
    pub fn path(&self, raw: impl AsRef<str>) -> NormalizedPath {
        self.paths.create(raw)
    }

    pub fn path_factory(&self) -> &PathFactory {
        &self.paths
    }

    pub fn beginner(&self) -> &Beginner {
        &self.beginner
    }

    pub fn stager(&self) -> &Stager {
        &self.stager
    }

    pub fn committer(&self) -> &Committer {
        &self.committer
    }

    pub fn cleaner(&self) -> &Cleaner {
        &self.cleaner
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("config", &self.config)
            .field("paths", &self.paths)
            .field("locale", &self.translator.locale())
            .field("beginner", &self.beginner)
            .field("stager", &self.stager)
            .field("committer", &self.committer)
            .field("cleaner", &self.cleaner)
            .finish()
    }
}
