//! Application configuration
//!
//! TOML settings covering the canvas geometry, preprocessing margins,
//! trigger timing, and the classifier engine. Every field has a default,
//! so a missing or partial file still yields a working pad. Stroke width
//! and color are fixed constants of the renderer, so there is no brush
//! section.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classify::ClassifierConfig;
use crate::preprocess::PreprocessConfig;

/// Top-level settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub canvas: CanvasConfig,
    pub preprocess: PreprocessConfig,
    pub trigger: TriggerConfig,
    pub classifier: ClassifierConfig,
}

/// Drawing surface size, px
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 240,
        }
    }
}

/// Debounce timing for the prediction trigger
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Quiescence delay before the trailing prediction fires, ms
    pub quiescence_ms: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self { quiescence_ms: 200 }
    }
}

/// Loads configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {path:?}"))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config file {path:?}"))
}

/// Saves configuration as TOML, creating parent directories as needed.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {parent:?}"))?;
    }
    let content = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, content).with_context(|| format!("failed to write config file {path:?}"))
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "digitpad", "DigitPad")
        .context("could not determine platform directories")
}

/// Default config file location
pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Platform data directory (model cache lives here)
pub fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}
