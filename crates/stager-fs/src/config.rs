//! Format-agnostic configuration loading and saving

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};
use stager_translation::{Error, Result, TranslatableMessage};

use crate::io;

/// Format-agnostic configuration store.
///
/// Automatically detects format from file extension and handles
/// serialization/deserialization transparently.
#[derive(Debug, Default)]
pub struct ConfigStore {
    robustness: io::RobustnessConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
    Yaml,
}

impl Format {
    fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::invalid_argument(
                TranslatableMessage::exception("Unsupported config format: \"%extension%\"")
                    .with_parameter("%extension%", extension),
            )),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

fn format_error(template: &str, path: &Path, format: Format, cause: String) -> Error {
    Error::logic(
        TranslatableMessage::exception(template)
            .with_parameter("%path%", path.display())
            .with_parameter("%format%", format.name()),
    )
    .with_source(cause)
}

impl ConfigStore {
    /// Create a new ConfigStore with default robustness settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new ConfigStore with custom robustness settings.
    pub fn with_robustness(robustness: io::RobustnessConfig) -> Self {
        Self { robustness }
    }

    /// Load configuration from a file.
    ///
    /// Format is detected from file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let format = Format::detect(path)?;
        let content = io::read_text(path)?;
        let parse_failed = |cause: String| {
            format_error("Failed to parse %format% config at %path%.", path, format, cause)
        };

        match format {
            Format::Toml => toml::from_str(&content).map_err(|e| parse_failed(e.to_string())),
            Format::Json => serde_json::from_str(&content).map_err(|e| parse_failed(e.to_string())),
            Format::Yaml => serde_yaml::from_str(&content).map_err(|e| parse_failed(e.to_string())),
        }
    }

    /// Save configuration to a file.
    ///
    /// Format is determined from file extension.
    /// Uses atomic write to prevent corruption.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let format = Format::detect(path)?;
        let serialize_failed = |cause: String| {
            format_error("Failed to serialize %format% config for %path%.", path, format, cause)
        };

        let content = match format {
            Format::Toml => toml::to_string_pretty(value).map_err(|e| serialize_failed(e.to_string()))?,
            Format::Json => {
                serde_json::to_string_pretty(value).map_err(|e| serialize_failed(e.to_string()))?
            }
            Format::Yaml => serde_yaml::to_string(value).map_err(|e| serialize_failed(e.to_string()))?,
        };

        io::write_atomic(path, content.as_bytes(), self.robustness)
    }
}
