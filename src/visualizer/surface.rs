//! Immediate-mode 2D drawing interface and shared geometry.

use palette::{FromColor, Hsl, Srgb};

/// Fill or stroke color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    /// Straight RGB with alpha in 0..=1
    Rgba { r: u8, g: u8, b: u8, a: f32 },
    /// Hue in degrees (wraps), saturation and lightness in percent (clamped)
    Hsl {
        hue: f64,
        saturation: f64,
        lightness: f64,
    },
}

impl Paint {
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::Rgba { r, g, b, a }
    }

    pub const fn hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        Self::Hsl {
            hue,
            saturation,
            lightness,
        }
    }

    /// Resolves to straight RGB plus alpha.
    pub fn to_rgba(self) -> ([u8; 3], f32) {
        match self {
            Self::Rgba { r, g, b, a } => ([r, g, b], a.clamp(0.0, 1.0)),
            Self::Hsl {
                hue,
                saturation,
                lightness,
            } => (hsl_to_rgb(hue, saturation, lightness), 1.0),
        }
    }
}

/// Converts HSL (degrees, percent, percent) to RGB.
///
/// Hue wraps modulo 360. Saturation and lightness clamp to 0..=100.
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let hue = if hue.is_finite() { hue.rem_euclid(360.0) } else { 0.0 };
    let hsl: Hsl = Hsl::new(
        hue as f32,
        (saturation / 100.0).clamp(0.0, 1.0) as f32,
        (lightness / 100.0).clamp(0.0, 1.0) as f32,
    );
    let rgb: Srgb = Srgb::from_color(hsl);
    let to_byte = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(rgb.red), to_byte(rgb.green), to_byte(rgb.blue)]
}

/// Pixel dimensions of the drawing surface and its center point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl Geometry {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            center_x: width / 2.0,
            center_y: height / 2.0,
        }
    }
}

/// 2D immediate-mode drawing target.
///
/// Coordinates are in surface pixels with the origin at the top left.
pub trait Surface {
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: Paint);

    /// Discards any pending path.
    fn begin_path(&mut self);

    fn move_to(&mut self, x: f64, y: f64);

    fn line_to(&mut self, x: f64, y: f64);

    /// Strokes the pending path.
    fn stroke(&mut self, paint: Paint, line_width: f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_hues() {
        assert_eq!(hsl_to_rgb(0.0, 100.0, 50.0), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(120.0, 100.0, 50.0), [0, 255, 0]);
        assert_eq!(hsl_to_rgb(240.0, 100.0, 50.0), [0, 0, 255]);
    }

    #[test]
    fn test_hue_wraps_modulo_360() {
        assert_eq!(hsl_to_rgb(360.0, 100.0, 50.0), hsl_to_rgb(0.0, 100.0, 50.0));
        assert_eq!(hsl_to_rgb(410.0, 100.0, 50.0), hsl_to_rgb(50.0, 100.0, 50.0));
        assert_eq!(hsl_to_rgb(-60.0, 100.0, 50.0), hsl_to_rgb(300.0, 100.0, 50.0));
    }

    #[test]
    fn test_lightness_is_clamped() {
        assert_eq!(hsl_to_rgb(200.0, 100.0, 140.0), [255, 255, 255]);
        assert_eq!(hsl_to_rgb(200.0, 100.0, -5.0), [0, 0, 0]);
        assert_eq!(hsl_to_rgb(0.0, 250.0, 50.0), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(0.0, -10.0, 50.0), [128, 128, 128]);
    }

    #[test]
    fn test_non_finite_hue_falls_back_to_red() {
        assert_eq!(hsl_to_rgb(f64::NAN, 100.0, 50.0), [255, 0, 0]);
    }

    #[test]
    fn test_hsl_paint_is_opaque() {
        let (_, alpha) = Paint::hsl(30.0, 100.0, 50.0).to_rgba();
        assert_eq!(alpha, 1.0);
        let (rgb, alpha) = Paint::rgba(10, 10, 10, 0.2).to_rgba();
        assert_eq!(rgb, [10, 10, 10]);
        assert_eq!(alpha, 0.2);
    }

    #[test]
    fn test_geometry_centers() {
        let g = Geometry::new(801.0, 300.0);
        assert_eq!(g.center_x, 400.5);
        assert_eq!(g.center_y, 150.0);
    }
}
