//! Test doubles for live streams and drawing surfaces.

use crate::capture::{LiveStream, SampleTap};
use crate::visualizer::surface::{Paint, Surface};
use std::cell::Cell;
use std::rc::Rc;

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        paint: Paint,
    },
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Stroke { paint: Paint, line_width: f64 },
}

/// Surface that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn fill_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { .. }))
            .count()
    }

    pub fn stroke_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Stroke { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: Paint) {
        self.ops.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            paint,
        });
    }

    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::LineTo(x, y));
    }

    fn stroke(&mut self, paint: Paint, line_width: f64) {
        self.ops.push(DrawOp::Stroke { paint, line_width });
    }
}

/// Live stream fed by hand. Counts every `stop()` call it receives.
pub struct ScriptedStream {
    tap: SampleTap,
    tracks: usize,
    sample_rate: u32,
    pub stops: Rc<Cell<usize>>,
    pub ended: Rc<Cell<bool>>,
}

impl ScriptedStream {
    pub fn new() -> Self {
        Self {
            tap: SampleTap::default(),
            tracks: 1,
            sample_rate: 48_000,
            stops: Rc::new(Cell::new(0)),
            ended: Rc::new(Cell::new(false)),
        }
    }

    pub fn with_tracks(mut self, tracks: usize) -> Self {
        self.tracks = tracks;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}

impl LiveStream for ScriptedStream {
    fn label(&self) -> &str {
        "scripted"
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn audio_tracks(&self) -> usize {
        self.tracks
    }

    fn tap(&self) -> SampleTap {
        self.tap.clone()
    }

    fn has_ended(&self) -> bool {
        self.ended.get()
    }

    fn stop(&mut self) {
        self.stops.set(self.stops.get() + 1);
    }
}
