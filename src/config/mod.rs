//! Configuration management for sonoscope.
//!
//! Audio source selection and render pacing live in a TOML file in the user's
//! config directory. Visualization settings are session-only.

pub mod file;

pub use file::{ensure_config_file, get_config_path, AudioConfig, SonoscopeConfig};
