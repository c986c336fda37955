//! `sonoscope config`: edit the configuration file.

use crate::config::{ensure_config_file, get_config_path};
use anyhow::Context;
use std::process::Command;

const FALLBACK_EDITORS: [&str; 2] = ["nano", "vi"];

/// Opens the configuration file in `$EDITOR` (or nano, then vi), writing the
/// default template first if the file is missing.
///
/// # Errors
/// - If the config file cannot be created
/// - If no editor is found, or the editor fails
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    if ensure_config_file(&config_path)? {
        println!("Created default configuration at {}", config_path.display());
    }

    let editor = pick_editor(std::env::var("EDITOR").ok(), on_path)
        .context("No editor found. Please set the $EDITOR environment variable.")?;
    tracing::info!("Editing {} with {editor}", config_path.display());

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .with_context(|| format!("Failed to launch editor '{editor}'"))?;
    anyhow::ensure!(
        status.success(),
        "Editor exited with error code: {}",
        status.code().unwrap_or(-1)
    );
    Ok(())
}

/// A non-empty `$EDITOR` wins; otherwise the first fallback that is installed.
fn pick_editor(env_editor: Option<String>, installed: impl Fn(&str) -> bool) -> Option<String> {
    env_editor.filter(|e| !e.trim().is_empty()).or_else(|| {
        FALLBACK_EDITORS
            .into_iter()
            .find(|e| installed(e))
            .map(str::to_string)
    })
}

fn on_path(program: &str) -> bool {
    Command::new("which")
        .arg(program)
        .output()
        .is_ok_and(|output| output.status.success())
}
