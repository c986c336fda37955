//! Live audio acquisition.
//!
//! Opens system-audio (monitor/loopback) or microphone streams through cpal and
//! feeds their downmixed samples into a shared ring that the analyser reads.

pub mod devices;
pub mod stream;
pub mod tap;

pub use stream::{CpalStream, LiveStream};
pub use tap::SampleTap;

use clap::ValueEnum;

/// Which kind of source a capture command opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Everything the machine is playing, via a monitor or loopback source
    System,
    /// A microphone or other input device
    #[value(name = "mic", alias = "microphone")]
    Microphone,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system audio"),
            Self::Microphone => write!(f, "microphone"),
        }
    }
}
