use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use common::serde::{read_file, write_file};
use imaginarium::{ColorMirage, GrayMirage, Mirage, MirageMode};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_IMG_SIZE_MIB: u64 = 10;
const MAX_TIMEOUT_SECS: u64 = 3600;
const MAX_IMG_SIZE_MIB: u64 = 1024;
const TEMP_DIR_NAME: &str = "mirage_tank_cache";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds to wait for each image.
    #[serde(deserialize_with = "lenient_count")]
    pub timeout: u64,
    /// Largest accepted attachment, in MiB.
    #[serde(deserialize_with = "lenient_count")]
    pub max_img_size: u64,
    pub temp_dir: PathBuf,
    pub log_level: String,
    pub gray: GrayMirage,
    pub color: ColorMirage,
}

/// Reads a whole non-negative number. Anything else (negative, fractional, text)
/// becomes 0 so that [`Config::validate`] replaces it with the default.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Count(u64),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Count(value) => value,
        Raw::Other(_) => 0,
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
            max_img_size: DEFAULT_MAX_IMG_SIZE_MIB,
            temp_dir: std::env::temp_dir().join(TEMP_DIR_NAME),
            log_level: "info".to_string(),
            gray: GrayMirage::default(),
            color: ColorMirage::default(),
        }
    }
}

impl Config {
    /// Reads the config at `path`, or returns defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        read_file(path).with_context(|| format!("Failed to read config {}", path.display()))
    }

    /// Loads and validates the config, writing it back when a value had to be replaced.
    pub fn load_validated(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load_or_default(path)?;
        config.validate_and_save(path)?;
        Ok(config)
    }

    /// Validates in place and writes the config to `path` when anything was corrected.
    pub fn validate_and_save(&mut self, path: &Path) -> anyhow::Result<bool> {
        if !self.validate() {
            return Ok(false);
        }

        write_file(self, path)
            .with_context(|| format!("Failed to save corrected config {}", path.display()))?;
        info!(path = %path.display(), "saved corrected config");
        Ok(true)
    }

    /// Replaces out-of-range values with defaults. Returns true when anything changed.
    pub fn validate(&mut self) -> bool {
        let mut changed = false;

        if self.timeout == 0 || self.timeout >= MAX_TIMEOUT_SECS {
            warn!(
                timeout = self.timeout,
                "timeout out of range, falling back to {DEFAULT_TIMEOUT_SECS}s"
            );
            self.timeout = DEFAULT_TIMEOUT_SECS;
            changed = true;
        }

        if self.max_img_size == 0 || self.max_img_size >= MAX_IMG_SIZE_MIB {
            warn!(
                max_img_size = self.max_img_size,
                "max_img_size out of range, falling back to {DEFAULT_MAX_IMG_SIZE_MIB}MiB"
            );
            self.max_img_size = DEFAULT_MAX_IMG_SIZE_MIB;
            changed = true;
        }

        if self.temp_dir.as_os_str().is_empty() {
            warn!("temp_dir is empty, falling back to the system temp directory");
            self.temp_dir = Self::default().temp_dir;
            changed = true;
        }

        if let Err(err) = self.gray.validate() {
            warn!(error = %err, "invalid gray parameters, falling back to defaults");
            self.gray = GrayMirage::default();
            changed = true;
        }

        if let Err(err) = self.color.validate() {
            warn!(error = %err, "invalid color parameters, falling back to defaults");
            self.color = ColorMirage::default();
            changed = true;
        }

        changed
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn max_image_bytes(&self) -> u64 {
        self.max_img_size * 1024 * 1024
    }

    /// Compositor for `mode` with the configured parameters.
    pub fn mirage(&self, mode: MirageMode) -> Mirage {
        match mode {
            MirageMode::Gray => self.gray.into(),
            MirageMode::Color => self.color.into(),
        }
    }
}
