//! Pull-based access to a live stream's analysis buffers.

use super::analyser::{Analyser, FFT_SIZE, SMOOTHING_TIME_CONSTANT};
use crate::capture::{LiveStream, SampleTap};
use crate::error::VizError;

/// Everything owned while a stream is bound.
struct Session {
    stream: Box<dyn LiveStream>,
    tap: SampleTap,
    analyser: Analyser,
    frequency: Vec<u8>,
    waveform: Vec<u8>,
}

/// Wraps a live stream and its analysis stage.
///
/// Accessors pull a fresh snapshot on every call into a buffer that is reused
/// for the lifetime of the stream. Before `initialize` (and after `release`)
/// they return an empty slice.
#[derive(Default)]
pub struct StreamAdapter {
    session: Option<Session>,
}

impl StreamAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds to a live stream and builds its analysis stage.
    ///
    /// A rejected stream is stopped and any previously bound stream is kept.
    ///
    /// # Errors
    /// - `VizError::NoAudioTrack` if the stream carries no audio
    /// - `VizError::AnalysisUnavailable` if no analysis stage can be built for it
    pub fn initialize(&mut self, mut stream: Box<dyn LiveStream>) -> Result<(), VizError> {
        if stream.audio_tracks() == 0 {
            stream.stop();
            return Err(VizError::NoAudioTrack);
        }
        if stream.sample_rate() == 0 {
            stream.stop();
            return Err(VizError::AnalysisUnavailable(
                "stream reports a sample rate of 0 Hz".to_string(),
            ));
        }

        let analyser = match Analyser::new(FFT_SIZE, SMOOTHING_TIME_CONSTANT) {
            Ok(analyser) => analyser,
            Err(e) => {
                stream.stop();
                return Err(e);
            }
        };

        self.release();

        let bins = analyser.bin_count();
        tracing::info!(
            "Stream bound: {} ({}Hz, window {}, {} bins)",
            stream.label(),
            stream.sample_rate(),
            analyser.fft_size(),
            bins
        );

        self.session = Some(Session {
            tap: stream.tap(),
            stream,
            analyser,
            frequency: vec![0; bins],
            waveform: vec![128; bins],
        });
        Ok(())
    }

    /// Latest frequency snapshot, low bins first.
    pub fn frequency_data(&mut self) -> &[u8] {
        match self.session.as_mut() {
            Some(s) => {
                s.analyser.frequency_bytes(&s.tap, &mut s.frequency);
                &s.frequency
            }
            None => &[],
        }
    }

    /// Latest time-domain snapshot, 128 at the zero crossing.
    pub fn waveform_data(&mut self) -> &[u8] {
        match self.session.as_mut() {
            Some(s) => {
                s.analyser.time_domain_bytes(&s.tap, &mut s.waveform);
                &s.waveform
            }
            None => &[],
        }
    }

    /// Stops the stream and drops the analysis stage. Idempotent.
    pub fn release(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stream.stop();
            tracing::info!("Stream released: {}", session.stream.label());
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// True if the bound stream terminated on its own.
    pub fn has_stream_ended(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.stream.has_ended())
    }

    /// Label of the bound stream, if any.
    pub fn label(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.stream.label())
    }
}

impl Drop for StreamAdapter {
    fn drop(&mut self) {
        self.release();
    }
}
