//! Error taxonomy for capture and visualization.
//!
//! Only acquisition and configuration paths return these errors. The render
//! path never fails: missing data is drawn as nothing.

use thiserror::Error;

/// Errors raised while acquiring or binding a live audio stream.
#[derive(Debug, Error)]
pub enum VizError {
    /// The environment denied or could not supply an audio stream.
    #[error("Audio acquisition failed: {0}")]
    Acquisition(String),

    /// A stream was supplied but carries no audio track.
    #[error("No audio track in the selected source. Did you pick a source that carries audio?")]
    NoAudioTrack,

    /// No analysis stage could be built for the stream.
    #[error("Audio analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    /// The live stream terminated externally.
    #[error("Audio stream ended")]
    StreamEnded,

    /// Sensitivity must be a finite, positive number.
    #[error("Invalid sensitivity {0}: must be a positive number")]
    InvalidSensitivity(f64),
}

impl VizError {
    /// Returns true for failures the user can fix by choosing another source.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(self, Self::Acquisition(_) | Self::NoAudioTrack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_failures_are_classified() {
        assert!(VizError::NoAudioTrack.is_acquisition_failure());
        assert!(VizError::Acquisition("denied".into()).is_acquisition_failure());
        assert!(!VizError::StreamEnded.is_acquisition_failure());
        assert!(!VizError::InvalidSensitivity(0.0).is_acquisition_failure());
    }

    #[test]
    fn test_messages_name_the_problem() {
        let msg = VizError::InvalidSensitivity(-1.0).to_string();
        assert!(msg.contains("-1"));
        assert!(VizError::Acquisition("no device".into())
            .to_string()
            .contains("no device"));
    }
}
