//! Stager configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stager_fs::ConfigStore;
use stager_sync::FileSyncerStrategy;
use stager_translation::Result;

fn default_timeout_secs() -> u64 {
    120
}

fn default_stage_executable() -> String {
    "composer".to_string()
}

fn default_rsync_executable() -> String {
    "rsync".to_string()
}

/// Settings for a [`crate::Lifecycle`].
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```
/// use stager_core::StagerConfig;
///
/// let config: StagerConfig = toml::from_str("timeout_secs = 300").unwrap();
/// assert_eq!(config.timeout_secs, 300);
/// assert_eq!(config.stage_executable, "composer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagerConfig {
    /// Limit for each lifecycle operation; 0 means no limit
    pub timeout_secs: u64,

    /// How directories are synced
    pub file_syncer: FileSyncerStrategy,

    /// Executable run by [`crate::Stager::stage`]
    pub stage_executable: String,

    /// Executable used by the rsync syncer
    pub rsync_executable: String,

    /// Locale for rendering messages; the host's default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl Default for StagerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            file_syncer: FileSyncerStrategy::default(),
            stage_executable: default_stage_executable(),
            rsync_executable: default_rsync_executable(),
            locale: None,
        }
    }
}

impl StagerConfig {
    /// Load from a TOML, JSON, or YAML file, chosen by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = ConfigStore::new().load(path)?;
        tracing::debug!(path = %path.display(), "Loaded stager config");
        Ok(config)
    }

    /// Save atomically to a TOML, JSON, or YAML file, chosen by extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        ConfigStore::new().save(path, self)
    }

    /// The operation timeout, `None` when unlimited.
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
