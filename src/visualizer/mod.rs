//! Live audio visualization.
//!
//! A [`StreamAdapter`](adapter::StreamAdapter) turns a live stream into
//! frequency and waveform snapshots. The [`RenderController`] pulls one
//! snapshot per frame and hands it to the active strategy, which draws onto a
//! [`Surface`](surface::Surface). The terminal host renders through a
//! [`PixelCanvas`].

pub mod adapter;
pub mod analyser;
pub mod canvas;
pub mod clock;
pub mod controller;
pub mod surface;
pub mod ui;
pub mod visualizations;

#[cfg(test)]
mod testing;

pub use canvas::PixelCanvas;
pub use clock::FrameClock;
pub use controller::{FrameOutcome, RenderController};
pub use ui::{StatusLine, UiCommand, VisualizerTui};
pub use visualizations::Mode;
