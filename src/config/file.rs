//! Configuration file management for sonoscope.
//!
//! This module handles loading the application configuration from a TOML file
//! in the user's config directory. The file is created with defaults on first
//! run and is never written by the visualizer afterwards.

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Embedded default configuration template.
pub const DEFAULT_CONFIG: &str = include_str!("../../environments/sonoscope.toml");

/// Audio source selection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AudioConfig {
    /// Microphone device. Options:
    /// - "default" for system default input device
    /// - numeric index (0, 1, 2, etc.) from `sonoscope list-devices`
    /// - device name from `sonoscope list-devices`
    #[serde(default = "default_device")]
    pub microphone: String,
    /// System audio device; "default" searches for a monitor/loopback source
    #[serde(default = "default_device")]
    pub system: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            microphone: default_device(),
            system: default_device(),
        }
    }
}

/// Render loop pacing and input steps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderConfig {
    /// Target frames per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Sensitivity change per key press
    #[serde(default = "default_sensitivity_step")]
    pub sensitivity_step: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            sensitivity_step: default_sensitivity_step(),
        }
    }
}

fn default_device() -> String {
    "default".to_string()
}

fn default_frame_rate() -> u32 {
    60
}

fn default_sensitivity_step() -> f64 {
    0.1
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SonoscopeConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

impl SonoscopeConfig {
    /// Loads configuration from the user's config directory, creating the
    /// default file first if it does not exist.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the config file cannot be read
    /// - If the TOML is malformed or holds out-of-range values
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        ensure_config_file(&config_path)?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parses and validates configuration text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: SonoscopeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(1..=240).contains(&self.render.frame_rate) {
            bail!(
                "render.frame_rate must be between 1 and 240, got {}",
                self.render.frame_rate
            );
        }
        let step = self.render.sensitivity_step;
        if !step.is_finite() || step <= 0.0 {
            bail!("render.sensitivity_step must be a positive number, got {step}");
        }
        Ok(())
    }
}

/// Retrieves the path to the config file, creating its directory.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("sonoscope");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("sonoscope.toml"))
}

/// Writes the default config template if no file exists at `path`.
///
/// Returns true if a new file was written.
pub fn ensure_config_file(path: &Path) -> anyhow::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;
    tracing::info!("Default configuration written to {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_matches_defaults() {
        let parsed = SonoscopeConfig::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, SonoscopeConfig::default());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let parsed = SonoscopeConfig::from_toml_str("[audio]\nmicrophone = \"2\"\n").unwrap();
        assert_eq!(parsed.audio.microphone, "2");
        assert_eq!(parsed.audio.system, "default");
        assert_eq!(parsed.render.frame_rate, 60);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        assert!(SonoscopeConfig::from_toml_str("[render]\nframe_rate = 0\n").is_err());
        assert!(SonoscopeConfig::from_toml_str("[render]\nframe_rate = 1000\n").is_err());
        assert!(SonoscopeConfig::from_toml_str("[render]\nsensitivity_step = -0.5\n").is_err());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(SonoscopeConfig::from_toml_str("[audio\nmicrophone = ").is_err());
    }

    #[test]
    fn test_ensure_config_file_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sonoscope.toml");

        assert!(ensure_config_file(&path).unwrap());
        assert!(!ensure_config_file(&path).unwrap());

        let loaded = SonoscopeConfig::load_from(&path).unwrap();
        assert_eq!(loaded, SonoscopeConfig::default());
    }

    #[test]
    fn test_existing_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sonoscope.toml");
        fs::write(&path, "[render]\nframe_rate = 30\n").unwrap();

        ensure_config_file(&path).unwrap();
        let loaded = SonoscopeConfig::load_from(&path).unwrap();
        assert_eq!(loaded.render.frame_rate, 30);
    }
}
