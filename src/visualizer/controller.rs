//! Render loop state machine.
//!
//! The host drives the loop by calling [`RenderController::tick`] once per
//! frame from its frame clock. `running` is checked at tick entry, so every
//! state change made between ticks is seen whole by the next frame.

use super::adapter::StreamAdapter;
use super::surface::{Geometry, Paint, Surface};
use super::visualizations::{bars, wave, Mode};
use crate::capture::LiveStream;
use crate::error::VizError;

/// Overlay drawn over the previous frame to leave fading trails.
pub const TRAIL_PAINT: Paint = Paint::rgba(10, 10, 10, 0.2);
/// Sensitivity a new controller starts with.
pub const DEFAULT_SENSITIVITY: f64 = 1.5;

/// Loop lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed, never started
    Idle,
    Running,
    /// Halted; the stream and geometry are retained
    Stopped,
}

/// What a call to `tick` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Loop not running; nothing was drawn
    Skipped,
    /// One frame was drawn with this strategy
    Drawn(Mode),
    /// The stream ended externally; it was released and the loop stopped
    StreamEnded,
}

/// Mutable render settings, read once at the start of each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub mode: Mode,
    pub sensitivity: f64,
    pub running: bool,
    pub geometry: Geometry,
}

/// Owns the stream adapter and the render state.
pub struct RenderController {
    adapter: StreamAdapter,
    state: RenderState,
    lifecycle: LoopState,
    frames: u64,
}

impl RenderController {
    /// Creates an idle controller for a surface of `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            adapter: StreamAdapter::new(),
            state: RenderState {
                mode: Mode::default(),
                sensitivity: DEFAULT_SENSITIVITY,
                running: false,
                geometry: Geometry::new(width as f64, height as f64),
            },
            lifecycle: LoopState::Idle,
            frames: 0,
        }
    }

    /// Binds a new live stream, replacing any current one.
    ///
    /// On failure the current stream and loop state are left untouched.
    pub fn attach(&mut self, stream: Box<dyn LiveStream>) -> Result<(), VizError> {
        self.adapter.initialize(stream)
    }

    /// Stops the loop and releases the stream.
    pub fn detach(&mut self) {
        self.stop();
        self.adapter.release();
    }

    /// Starts or resumes the loop. No-op while running.
    pub fn start(&mut self) {
        if self.state.running {
            return;
        }
        self.state.running = true;
        self.lifecycle = LoopState::Running;
        tracing::debug!("Render loop started");
    }

    /// Halts the loop before its next frame.
    pub fn stop(&mut self) {
        if !self.state.running {
            return;
        }
        self.state.running = false;
        self.lifecycle = LoopState::Stopped;
        tracing::debug!("Render loop stopped after {} frames", self.frames);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.state.mode != mode {
            tracing::debug!("Mode changed to {}", mode);
        }
        self.state.mode = mode;
    }

    /// Sets the sensitivity multiplier.
    ///
    /// # Errors
    /// - `VizError::InvalidSensitivity` for zero, negative, or non-finite values
    pub fn set_sensitivity(&mut self, value: f64) -> Result<(), VizError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(VizError::InvalidSensitivity(value));
        }
        self.state.sensitivity = value;
        Ok(())
    }

    /// Recomputes geometry for a surface of `width` x `height` pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.state.geometry = Geometry::new(width as f64, height as f64);
    }

    /// Runs one frame if the loop is running.
    ///
    /// An ended stream is released on any tick, paused or not.
    /// `now_millis` is wall-clock time in milliseconds, used for color cycling.
    pub fn tick(&mut self, surface: &mut dyn Surface, now_millis: f64) -> FrameOutcome {
        if self.adapter.has_stream_ended() {
            tracing::info!("Stream ended, stopping render loop");
            self.detach();
            return FrameOutcome::StreamEnded;
        }

        if !self.state.running {
            return FrameOutcome::Skipped;
        }

        // Snapshot so nothing can change mid-frame
        let RenderState {
            mode,
            sensitivity,
            geometry,
            ..
        } = self.state;

        surface.fill_rect(0.0, 0.0, geometry.width, geometry.height, TRAIL_PAINT);

        match mode {
            Mode::Bars => {
                let data = self.adapter.frequency_data();
                bars::draw(data, sensitivity, &geometry, surface);
            }
            Mode::Wave => {
                let data = self.adapter.waveform_data();
                wave::draw(data, sensitivity, &geometry, now_millis, surface);
            }
        }

        self.frames += 1;
        FrameOutcome::Drawn(mode)
    }

    pub fn lifecycle(&self) -> LoopState {
        self.lifecycle
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn sensitivity(&self) -> f64 {
        self.state.sensitivity
    }

    pub fn geometry(&self) -> Geometry {
        self.state.geometry
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Frames drawn since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn has_stream(&self) -> bool {
        self.adapter.is_initialized()
    }

    pub fn stream_label(&self) -> Option<&str> {
        self.adapter.label()
    }
}
