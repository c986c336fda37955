//! Mirrored bar spectrum.
//!
//! Bars grow vertically around the horizontal midline and spread outward from
//! the center in both directions, low frequencies innermost.

use crate::visualizer::surface::{Geometry, Paint, Surface};

/// Share of the lowest frequency bins that are drawn. High bins are sparse and noisy.
pub const RENDERED_BIN_FRACTION: f64 = 0.7;
/// Bar width multiplier over an even split of the surface, so bars overlap.
pub const BAR_WIDTH_MULTIPLIER: f64 = 2.5;
/// Horizontal advance between bars beyond the bar width.
pub const BAR_GAP: f64 = 1.0;

/// One bar, drawn twice (right of center and mirrored left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub bin: usize,
    /// Distance of the bar's inner edge from the center
    pub offset: f64,
    pub width: f64,
    pub height: f64,
    pub paint: Paint,
}

/// Number of bins that are rendered for a buffer of `len` bins.
pub fn rendered_bin_count(len: usize) -> usize {
    (len as f64 * RENDERED_BIN_FRACTION).floor() as usize
}

/// Bar height for a byte magnitude.
pub fn bar_height(value: u8, surface_height: f64, sensitivity: f64) -> f64 {
    let percent = value as f64 / 255.0;
    percent * surface_height * 0.5 * sensitivity
}

/// Color for bin `bin` of `rendered` with byte magnitude `value`.
pub fn bar_paint(bin: usize, rendered: usize, value: u8) -> Paint {
    let percent = value as f64 / 255.0;
    let hue = (bin as f64 / rendered as f64) * 360.0 + percent * 50.0;
    let lightness = 50.0 + percent * 30.0;
    Paint::hsl(hue, 100.0, lightness)
}

/// Lazily lays out bars from the center outward.
///
/// Stops after the bar whose advance carries the cursor past the center, so
/// mirrored copies never wrap across the surface.
pub struct BarLayout<'a> {
    data: &'a [u8],
    rendered: usize,
    width: f64,
    surface_height: f64,
    center_x: f64,
    sensitivity: f64,
    next_bin: usize,
    cursor: f64,
    done: bool,
}

impl Iterator for BarLayout<'_> {
    type Item = Bar;

    fn next(&mut self) -> Option<Bar> {
        if self.done || self.next_bin >= self.rendered {
            return None;
        }

        let bin = self.next_bin;
        let value = self.data[bin];
        let bar = Bar {
            bin,
            offset: self.cursor,
            width: self.width,
            height: bar_height(value, self.surface_height, self.sensitivity),
            paint: bar_paint(bin, self.rendered, value),
        };

        self.next_bin += 1;
        self.cursor += self.width + BAR_GAP;
        if self.cursor > self.center_x {
            self.done = true;
        }

        Some(bar)
    }
}

/// Lays out bars for a frequency buffer.
pub fn layout<'a>(data: &'a [u8], sensitivity: f64, geometry: &Geometry) -> BarLayout<'a> {
    let rendered = rendered_bin_count(data.len());
    let width = if rendered == 0 {
        0.0
    } else {
        (geometry.width / rendered as f64) * BAR_WIDTH_MULTIPLIER
    };

    BarLayout {
        data,
        rendered,
        width,
        surface_height: geometry.height,
        center_x: geometry.center_x,
        sensitivity,
        next_bin: 0,
        cursor: 0.0,
        done: false,
    }
}

/// Draws the mirrored spectrum. An empty buffer draws nothing.
pub fn draw(data: &[u8], sensitivity: f64, geometry: &Geometry, surface: &mut dyn Surface) {
    for bar in layout(data, sensitivity, geometry) {
        let top = geometry.center_y - bar.height / 2.0;
        surface.fill_rect(geometry.center_x + bar.offset, top, bar.width, bar.height, bar.paint);
        surface.fill_rect(
            geometry.center_x - bar.offset - bar.width,
            top,
            bar.width,
            bar.height,
            bar.paint,
        );
    }
}
