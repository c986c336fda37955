//! Oscilloscope-style waveform.
//!
//! Draws the time-domain buffer as one polyline across the full width, scaled
//! around the vertical midline. The stroke hue drifts with wall-clock time.

use crate::visualizer::surface::{Geometry, Paint, Surface};

/// Byte value of the zero crossing.
pub const ZERO_CROSSING: f64 = 128.0;
/// Stroke width in surface pixels.
pub const LINE_WIDTH: f64 = 3.0;
/// Milliseconds per degree of hue rotation.
const HUE_PERIOD_MS: f64 = 50.0;

/// Signed deviation from the zero crossing, roughly -1..+1.
pub fn deviation(value: u8) -> f64 {
    value as f64 / ZERO_CROSSING - 1.0
}

/// Vertical position of a sample.
pub fn sample_y(value: u8, sensitivity: f64, geometry: &Geometry) -> f64 {
    geometry.center_y + deviation(value) * (geometry.height / 2.0) * sensitivity
}

/// Stroke hue for a wall-clock time in milliseconds.
pub fn stroke_hue(now_millis: f64) -> f64 {
    (now_millis / HUE_PERIOD_MS).rem_euclid(360.0)
}

/// Polyline vertices for the buffer, one per sample.
pub fn points<'a>(
    data: &'a [u8],
    sensitivity: f64,
    geometry: &'a Geometry,
) -> impl Iterator<Item = (f64, f64)> + 'a {
    let step = if data.is_empty() {
        0.0
    } else {
        geometry.width / data.len() as f64
    };

    data.iter()
        .enumerate()
        .map(move |(i, &value)| (i as f64 * step, sample_y(value, sensitivity, geometry)))
}

/// Strokes the waveform and closes it at the right edge on the midline.
/// An empty buffer draws nothing.
pub fn draw(
    data: &[u8],
    sensitivity: f64,
    geometry: &Geometry,
    now_millis: f64,
    surface: &mut dyn Surface,
) {
    if data.is_empty() {
        return;
    }

    surface.begin_path();
    for (i, (x, y)) in points(data, sensitivity, geometry).enumerate() {
        if i == 0 {
            surface.move_to(x, y);
        } else {
            surface.line_to(x, y);
        }
    }
    surface.line_to(geometry.width, geometry.center_y);
    surface.stroke(Paint::hsl(stroke_hue(now_millis), 100.0, 50.0), LINE_WIDTH);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::testing::{DrawOp, RecordingSurface};

    #[test]
    fn test_silence_sits_exactly_on_center() {
        let data = [128u8; 512];
        let geometry = Geometry::new(640.0, 337.0);

        for &s in &[0.1, 1.0, 1.5, 40.0] {
            assert!(points(&data, s, &geometry).all(|(_, y)| y == geometry.center_y));
        }
    }

    #[test]
    fn test_deviation_range() {
        assert_eq!(deviation(128), 0.0);
        assert_eq!(deviation(0), -1.0);
        assert_eq!(deviation(255), 127.0 / 128.0);
        assert_eq!(deviation(192), 0.5);
    }

    #[test]
    fn test_deviation_scales_linearly_with_sensitivity() {
        let data: Vec<u8> = (0..=255).collect();
        let geometry = Geometry::new(256.0, 200.0);

        for &s in &[0.25, 1.0, 1.5] {
            for &k in &[2.0, 0.5, 3.0] {
                let base = points(&data, s, &geometry).map(|(_, y)| y - geometry.center_y);
                let scaled = points(&data, s * k, &geometry).map(|(_, y)| y - geometry.center_y);
                for (a, b) in base.zip(scaled) {
                    assert!((a * k - b).abs() <= 1e-9 * b.abs().max(1.0));
                }
            }
        }
    }

    #[test]
    fn test_samples_span_full_width() {
        let data = [128u8; 4];
        let geometry = Geometry::new(400.0, 100.0);
        let xs: Vec<f64> = points(&data, 1.0, &geometry).map(|(x, _)| x).collect();
        assert_eq!(xs, vec![0.0, 100.0, 200.0, 300.0]);
    }

    #[test]
    fn test_path_closes_on_midline_at_right_edge() {
        let data = [255u8, 0, 128];
        let geometry = Geometry::new(300.0, 200.0);
        let mut surface = RecordingSurface::default();
        draw(&data, 1.0, &geometry, 0.0, &mut surface);

        assert_eq!(surface.ops[0], DrawOp::BeginPath);
        assert_eq!(surface.ops[1], DrawOp::MoveTo(0.0, 100.0 + (127.0 / 128.0) * 100.0));
        assert_eq!(surface.ops[2], DrawOp::LineTo(100.0, 0.0));
        assert_eq!(surface.ops[3], DrawOp::LineTo(200.0, 100.0));
        assert_eq!(surface.ops[4], DrawOp::LineTo(300.0, 100.0));
        assert!(matches!(
            surface.ops[5],
            DrawOp::Stroke { line_width, .. } if line_width == LINE_WIDTH
        ));
        assert_eq!(surface.ops.len(), 6);
    }

    #[test]
    fn test_hue_cycles_with_time() {
        assert_eq!(stroke_hue(0.0), 0.0);
        assert_eq!(stroke_hue(500.0), 10.0);
        assert_eq!(stroke_hue(18_000.0), 0.0);
        assert_eq!(stroke_hue(18_050.0), 1.0);
    }

    #[test]
    fn test_empty_buffer_draws_nothing() {
        let geometry = Geometry::new(300.0, 200.0);
        let mut surface = RecordingSurface::default();
        draw(&[], 2.0, &geometry, 1234.0, &mut surface);
        assert!(surface.ops.is_empty());
    }
}
