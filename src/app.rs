//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::capture::SourceKind;
use crate::commands;
use crate::logging;
use crate::visualizer::controller::DEFAULT_SENSITIVITY;
use crate::visualizer::Mode;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

/// A terminal audio visualizer with live frequency bars and an oscilloscope wave
#[derive(Parser)]
#[command(name = "sonoscope")]
#[command(version)]
#[command(long_about = "A terminal audio visualizer with live frequency bars and an oscilloscope wave.\n\nDEFAULT COMMAND:\n    If no command is specified, 'visualize' is used by default.\n    Visualize options (--source, --mode, --sensitivity) can be used without\n    explicitly saying 'visualize'.\n\nEXAMPLES:\n    # Open the start screen and pick a source\n    $ sonoscope\n\n    # Visualize system audio right away\n    $ sonoscope --source system\n\n    # Microphone as an oscilloscope, twice as sensitive\n    $ sonoscope -s mic -m wave --sensitivity 3\n\n    # Toggle the mode from a window-manager binding\n    $ pkill -USR1 sonoscope")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/sonoscope/sonoscope.toml\n    Logs:               ~/.local/state/sonoscope/sonoscope.log.*"
)]
struct Cli {
    #[command(flatten)]
    visualize: VisualizeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct VisualizeArgs {
    /// Start capturing this source immediately instead of showing the start screen
    #[arg(short, long, value_enum)]
    source: Option<SourceKind>,

    /// Initial visualization
    #[arg(short, long, value_enum, default_value_t = Mode::Bars)]
    mode: Mode,

    /// Initial sensitivity multiplier (must be positive)
    #[arg(long, default_value_t = DEFAULT_SENSITIVITY, value_parser = parse_sensitivity)]
    sensitivity: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Visualize live audio (default)
    ///
    /// Press s for system audio or m for the microphone. While visualizing:
    /// b/w switch mode, +/- change sensitivity, Space pauses, x stops capture,
    /// q or Escape quits.
    #[command(visible_alias = "v")]
    Visualize(VisualizeArgs),

    /// Open configuration file in your preferred editor
    ///
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio devices
    ///
    /// Shows device IDs, names, and configurations to help pick the
    /// microphone and system-audio devices in sonoscope.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   sonoscope completions bash > sonoscope.bash
    ///   sonoscope completions zsh > _sonoscope
    ///   sonoscope completions fish > sonoscope.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_sensitivity(value: &str) -> Result<f64, String> {
    let parsed: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(format!("{value} must be a positive number"));
    }
    Ok(parsed)
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that print to the terminal run without logging
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "sonoscope", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => return commands::handle_list_devices(),
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    logging::init_logging()?;

    match cli.command {
        None => {
            let args = cli.visualize;
            commands::handle_visualize(args.source, args.mode, args.sensitivity)?;
        }
        Some(Commands::Visualize(args)) => {
            commands::handle_visualize(args.source, args.mode, args.sensitivity)?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
