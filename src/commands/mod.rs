//! Application command handlers for sonoscope.
//!
//! # Commands
//! - `visualize`: Live audio visualization (default)
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List audio devices and likely system-audio sources
//! - `logs`: Display recent log entries

pub mod config;
pub mod list_devices;
pub mod logs;
pub mod visualize;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use visualize::handle_visualize;
