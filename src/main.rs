//! sonoscope: a terminal audio visualizer.

mod app;
mod capture;
mod commands;
mod config;
mod error;
mod logging;
mod ui;
mod visualizer;

use std::process::ExitCode;

fn main() -> ExitCode {
    match app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal error: {e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
