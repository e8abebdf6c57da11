use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use crate::libraries::{default_library_minimums, LibraryRequirement};
use crate::platform::Platform;
use crate::version::Version;

/// Oldest engine release the host supports.
///
/// When changing this, also change [`crate::libraries::MINIMUM_LIBRARY_VERSIONS`].
pub const DEFAULT_MINIMUM_VERSION: Version = Version::new(4, 0);

/// Configuration for the encoder validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Path to the engine executable
    pub encoder_path: PathBuf,
    /// Lowest accepted engine version
    pub minimum_version: Version,
    /// Highest accepted engine version, if any
    pub maximum_version: Option<Version>,
    /// Library versions that ship with `minimum_version`
    pub library_minimums: Vec<LibraryRequirement>,
    /// Platform family, detected at startup unless overridden
    pub platform: Platform,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl ValidatorConfig {
    /// Create a default configuration with the built-in version requirements
    pub fn default_config() -> Self {
        Self {
            encoder_path: PathBuf::from("ffmpeg"),
            minimum_version: DEFAULT_MINIMUM_VERSION,
            maximum_version: None,
            library_minimums: default_library_minimums(),
            platform: Platform::current(),
        }
    }

    /// Default configuration pointing at a specific engine binary
    pub fn with_encoder_path(path: impl Into<PathBuf>) -> Self {
        Self {
            encoder_path: path.into(),
            ..Self::default_config()
        }
    }

    /// Load configuration from a file, or return defaults if path is None or file doesn't exist
    pub fn load_config(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default_config();

        if let Some(config_path) = path {
            if config_path.exists() {
                let content = std::fs::read_to_string(config_path)
                    .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

                if config_path.extension().and_then(|s| s.to_str()) == Some("toml") {
                    config = toml::from_str(&content)
                        .with_context(|| format!("Failed to parse TOML config: {}", config_path.display()))?;
                } else {
                    config = serde_json::from_str(&content)
                        .with_context(|| format!("Failed to parse JSON config: {}", config_path.display()))?;
                }
            }
        }

        anyhow::ensure!(
            !config.library_minimums.is_empty(),
            "library_minimums must list at least one library"
        );
        anyhow::ensure!(
            config.minimum_version == DEFAULT_MINIMUM_VERSION
                || config.library_minimums != default_library_minimums(),
            "minimum_version {} needs library_minimums matching that release; the built-in table is for {}",
            config.minimum_version,
            DEFAULT_MINIMUM_VERSION
        );

        if let Some(max) = config.maximum_version {
            anyhow::ensure!(
                max >= config.minimum_version,
                "maximum_version {} is below minimum_version {}",
                max,
                config.minimum_version
            );
        }

        Ok(config)
    }
}
