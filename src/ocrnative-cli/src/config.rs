//! Configuration management
//!
//! Settings come from an optional TOML file; command-line flags override them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Recognition settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrConfig {
    /// OCR language tag (e.g., "en-US"); unset uses the user profile languages
    pub language: Option<String>,
}

/// Batch extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Number of files recognized at once
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Print results as JSON
    #[serde(default)]
    pub json: bool,
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(4)
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML {:?}", path))
    }

    /// Load an explicit config file, else the default one if present, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_path() {
            Some(path) if path.is_file() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }
}

/// %APPDATA%\OcrNative\config.toml on Windows
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("OcrNative").join("config.toml"))
}
