//! Live stream handles consumed by the stream adapter.

use super::devices;
use super::tap::SampleTap;
use super::SourceKind;
use crate::config::AudioConfig;
use crate::error::VizError;
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A live audio stream that writes mono samples into a [`SampleTap`].
///
/// The stream adapter owns exactly one of these at a time and is the only
/// caller of [`LiveStream::stop`].
pub trait LiveStream {
    /// Human-readable source description for the status line.
    fn label(&self) -> &str;

    /// Sample rate of the captured signal in Hz.
    fn sample_rate(&self) -> u32;

    /// Number of audio tracks carried by the stream.
    fn audio_tracks(&self) -> usize;

    /// Ring the stream writes into.
    fn tap(&self) -> SampleTap;

    /// True once the source went away on its own (device unplugged, sharing revoked).
    fn has_ended(&self) -> bool;

    /// Stops all tracks. Must be safe to call more than once.
    fn stop(&mut self);
}

/// Live stream backed by a cpal input stream.
pub struct CpalStream {
    label: String,
    sample_rate: u32,
    channels: usize,
    tap: SampleTap,
    ended: Arc<AtomicBool>,
    stream: Option<cpal::Stream>,
}

impl CpalStream {
    /// Opens and starts a capture stream for the given source.
    ///
    /// # Errors
    /// - `VizError::Acquisition` if the device is missing or the stream cannot start
    /// - `VizError::NoAudioTrack` if the device reports no channels
    pub fn open(source: SourceKind, audio: &AudioConfig) -> Result<Self, VizError> {
        let spec = match source {
            SourceKind::System => audio.system.as_str(),
            SourceKind::Microphone => audio.microphone.as_str(),
        };

        let resolved = devices::resolve(source, spec)?;
        tracing::info!(
            "Capture device for {}: {}{}",
            source,
            resolved.name,
            if resolved.loopback { " (loopback)" } else { "" }
        );

        // For loopback the device is an output, so ask for its output format
        let supported = if resolved.loopback {
            resolved.device.default_output_config()
        } else {
            resolved.device.default_input_config()
        }
        .map_err(|e| VizError::Acquisition(format!("Failed to get device config: {e}")))?;

        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        if channels == 0 {
            return Err(VizError::NoAudioTrack);
        }

        tracing::debug!(
            "Device configuration: {}Hz, {} channels, {:?}",
            sample_rate,
            channels,
            supported.sample_format()
        );

        let tap = SampleTap::default();
        let ended = Arc::new(AtomicBool::new(false));
        let format = supported.sample_format();
        let config: StreamConfig = supported.into();

        let stream = match format {
            SampleFormat::F32 => build_stream::<f32>(&resolved.device, &config, &tap, &ended),
            SampleFormat::I16 => build_stream::<i16>(&resolved.device, &config, &tap, &ended),
            SampleFormat::U16 => build_stream::<u16>(&resolved.device, &config, &tap, &ended),
            other => {
                return Err(VizError::Acquisition(format!(
                    "Unsupported sample format: {other:?}"
                )))
            }
        }
        .map_err(|e| VizError::Acquisition(format!("Failed to build audio stream: {e}")))?;

        stream
            .play()
            .map_err(|e| VizError::Acquisition(format!("Failed to start stream: {e}")))?;

        tracing::info!("Capture started: {}Hz, {} channels", sample_rate, channels);

        Ok(Self {
            label: format!("{source}: {}", resolved.name),
            sample_rate,
            channels,
            tap,
            ended,
            stream: Some(stream),
        })
    }
}

impl LiveStream for CpalStream {
    fn label(&self) -> &str {
        &self.label
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn audio_tracks(&self) -> usize {
        usize::from(self.channels > 0)
    }

    fn tap(&self) -> SampleTap {
        self.tap.clone()
    }

    fn has_ended(&self) -> bool {
        self.ended.load(Ordering::Relaxed)
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                tracing::debug!("Failed to pause stream before drop: {}", e);
            }
            tracing::info!("Capture stopped: {}", self.label);
        }
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Builds an input stream that downmixes into the tap.
fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    tap: &SampleTap,
    ended: &Arc<AtomicBool>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let tap = tap.clone();
    let ended = Arc::clone(ended);
    let channels = config.channels as usize;

    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            tap.push_interleaved(data, channels);
        },
        move |err| match err {
            cpal::StreamError::DeviceNotAvailable => {
                tracing::warn!("Audio device went away, ending stream");
                ended.store(true, Ordering::Relaxed);
            }
            other => {
                tracing::error!("Audio stream error: {}", other);
            }
        },
        None,
    )
}
