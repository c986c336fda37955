//! Live audio visualization session.
//!
//! Runs the start overlay and the render loop in the terminal. Supports an
//! external mode toggle via SIGUSR1 and clean shutdown on SIGTERM/SIGINT.

use crate::capture::{devices, CpalStream, SourceKind};
use crate::config::SonoscopeConfig;
use crate::error::VizError;
use crate::ui::ErrorScreen;
use crate::visualizer::ui::canvas_size_for;
use crate::visualizer::{
    FrameClock, FrameOutcome, Mode, PixelCanvas, RenderController, StatusLine, UiCommand,
    VisualizerTui,
};
use signal_hook::consts::{SIGINT, SIGTERM, SIGUSR1};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Opens the visualizer, optionally starting capture from `source` right away.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If `sensitivity` is not a positive number
/// - If the requested startup source cannot be captured
/// - If the terminal cannot be driven
pub fn handle_visualize(
    source: Option<SourceKind>,
    mode: Mode,
    sensitivity: f64,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== sonoscope started ===");

    let config = match SonoscopeConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err:#}");
            show_error(&format!(
                "Configuration Error:\n\n{err:#}\n\nPlease check your ~/.config/sonoscope/sonoscope.toml file and try again."
            ))?;
            return Err(anyhow::anyhow!("Configuration error: {err:#}"));
        }
    };

    tracing::info!(
        "Configuration loaded: microphone={}, system={}, frame_rate={}fps, sensitivity_step={}",
        config.audio.microphone,
        config.audio.system,
        config.render.frame_rate,
        config.render.sensitivity_step
    );

    let mut controller = RenderController::new(0, 0);
    controller.set_mode(mode);
    controller.set_sensitivity(sensitivity)?;

    if let Some(source) = source {
        if let Err(e) = start_source(&mut controller, source, &config) {
            tracing::error!("Failed to start {source} capture: {e}");
            show_error(&format!(
                "Capture Error:\n\n{e}\n\n{}.",
                capitalize(acquisition_hint(source))
            ))?;
            return Err(e.into());
        }
    }

    let mut tui = VisualizerTui::new()
        .map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    let result = run_session(&mut tui, &mut controller, &config);

    controller.detach();
    tui.cleanup()
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;

    result?;
    tracing::info!("=== sonoscope exited successfully ===");
    Ok(())
}

fn run_session(
    tui: &mut VisualizerTui,
    controller: &mut RenderController,
    config: &SonoscopeConfig,
) -> Result<(), anyhow::Error> {
    let quit = Arc::new(AtomicBool::new(false));
    let toggle = Arc::new(AtomicBool::new(false));
    for signal in [SIGTERM, SIGINT] {
        signal_hook::flag::register(signal, quit.clone())
            .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;
    }
    signal_hook::flag::register(SIGUSR1, toggle.clone())
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    let (width, height) = tui
        .canvas_size()
        .map_err(|e| anyhow::anyhow!("Failed to query terminal size: {e}"))?;
    let mut canvas = PixelCanvas::new(width, height);
    controller.resize(width, height);

    let step = config.render.sensitivity_step;
    let mut clock = FrameClock::new(config.render.frame_rate);
    let mut notice: Option<String> = None;

    tracing::debug!(
        "Entering render loop at {}x{} px, one frame every {:?}",
        canvas.width(),
        canvas.height(),
        clock.interval()
    );

    loop {
        if quit.load(Ordering::Relaxed) {
            tracing::info!("Received termination signal, shutting down");
            break;
        }
        if toggle.swap(false, Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: toggling mode");
            controller.set_mode(controller.mode().toggled());
        }

        let command = tui
            .handle_input(clock.until_next_frame())
            .map_err(|e| anyhow::anyhow!("Input handling error: {e}"))?;

        match command {
            UiCommand::Continue => {}
            UiCommand::Quit => break,
            UiCommand::StartSystem | UiCommand::StartMicrophone if !controller.has_stream() => {
                let source = if command == UiCommand::StartSystem {
                    SourceKind::System
                } else {
                    SourceKind::Microphone
                };
                notice = match start_source(controller, source, config) {
                    Ok(()) => {
                        canvas.clear();
                        None
                    }
                    Err(e) if e.is_acquisition_failure() => {
                        tracing::error!("Failed to start {source} capture: {e}");
                        Some(format!("{e} ({})", acquisition_hint(source)))
                    }
                    Err(e) => {
                        tracing::error!("Failed to start {source} capture: {e}");
                        Some(e.to_string())
                    }
                };
            }
            UiCommand::StartSystem | UiCommand::StartMicrophone => {}
            UiCommand::SetMode(mode) => controller.set_mode(mode),
            UiCommand::ToggleMode => controller.set_mode(controller.mode().toggled()),
            UiCommand::SensitivityUp => {
                let value = controller.sensitivity() + step;
                adjust_sensitivity(controller, value);
            }
            UiCommand::SensitivityDown => {
                let value = (controller.sensitivity() - step).max(step);
                adjust_sensitivity(controller, value);
            }
            UiCommand::TogglePause => {
                if controller.is_running() {
                    controller.stop();
                } else if controller.has_stream() {
                    controller.start();
                }
            }
            UiCommand::StopCapture => {
                if controller.has_stream() {
                    tracing::info!("Capture stopped by user");
                    controller.detach();
                    canvas.clear();
                    notice = None;
                }
            }
            UiCommand::Resize(columns, rows) => {
                let (width, height) = canvas_size_for(columns, rows);
                canvas.resize(width, height);
                controller.resize(width, height);
                let geometry = controller.geometry();
                tracing::debug!(
                    "Terminal resized to {}x{} px, center ({}, {})",
                    width,
                    height,
                    geometry.center_x,
                    geometry.center_y
                );
            }
        }

        if !clock.poll() {
            continue;
        }

        if controller.tick(&mut canvas, now_millis()) == FrameOutcome::StreamEnded {
            notice = Some(VizError::StreamEnded.to_string());
        }

        let status = StatusLine {
            lifecycle: controller.lifecycle(),
            source: controller.stream_label(),
            mode: controller.mode(),
            sensitivity: controller.sensitivity(),
            notice: notice.as_deref(),
        };
        tui.render(&canvas, &status, !controller.has_stream())
            .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
    }

    tracing::debug!("Render loop exited after {} frames", controller.frames());
    Ok(())
}

/// Opens a capture stream, binds it, and starts the loop.
fn start_source(
    controller: &mut RenderController,
    source: SourceKind,
    config: &SonoscopeConfig,
) -> Result<(), VizError> {
    tracing::info!("Starting {source} capture");
    let stream = devices::suppress_alsa_warnings(|| Ok(CpalStream::open(source, &config.audio)))
        .map_err(|e| VizError::Acquisition(e.to_string()))??;
    controller.attach(Box::new(stream))?;
    controller.start();
    Ok(())
}

/// What to try when `source` cannot be captured.
fn acquisition_hint(source: SourceKind) -> &'static str {
    match source {
        SourceKind::System => {
            "try the microphone instead, or set audio.system to a monitor device from 'sonoscope list-devices'"
        }
        SourceKind::Microphone => {
            "check microphone permissions and that audio.microphone names a connected device"
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn adjust_sensitivity(controller: &mut RenderController, value: f64) {
    match controller.set_sensitivity(value) {
        Ok(()) => tracing::debug!("Sensitivity set to {:.2}", value),
        Err(e) => tracing::warn!("{e}"),
    }
}

fn show_error(message: &str) -> Result<(), anyhow::Error> {
    let mut error_screen = ErrorScreen::new()?;
    error_screen.show_error(message)?;
    error_screen.cleanup()?;
    Ok(())
}

fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_failure_suggests_microphone() {
        let hint = acquisition_hint(SourceKind::System);
        assert!(hint.contains("microphone"));
        assert!(hint.contains("list-devices"));
    }

    #[test]
    fn test_microphone_failure_mentions_permissions() {
        let hint = acquisition_hint(SourceKind::Microphone);
        assert!(hint.contains("permissions"));
        assert!(!hint.contains("list-devices"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("check it"), "Check it");
        assert_eq!(capitalize(""), "");
    }
}
