//! Raster canvas implementing [`Surface`] on a `tiny_skia::Pixmap`.
//!
//! Terminal pixels are coarse, so anti-aliasing is off and edges stay hard.

use tiny_skia::{Color, PathBuilder, Pixmap, PremultipliedColorU8, Rect, Stroke, Transform};

use super::surface::{Paint, Surface};

/// Fixed-size opaque pixel buffer. Starts black.
pub struct PixelCanvas {
    width: u32,
    height: u32,
    // None while either dimension is zero
    pixmap: Option<Pixmap>,
    path: PathBuilder,
    has_point: bool,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixmap: black_pixmap(width, height),
            path: PathBuilder::new(),
            has_point: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Changes the pixel dimensions. Contents are cleared.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixmap = black_pixmap(width, height);
        self.begin_path();
    }

    /// Resets every pixel to black.
    pub fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(Color::BLACK);
        }
    }

    /// Row-major pixels, `width * height` of them.
    pub fn pixels(&self) -> &[PremultipliedColorU8] {
        match &self.pixmap {
            Some(pixmap) => pixmap.pixels(),
            None => &[],
        }
    }

    /// Pixel color at (x, y), or black outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixmap
            .as_ref()
            .and_then(|pixmap| pixmap.pixel(x, y))
            .map_or([0, 0, 0], rgb)
    }
}

impl Surface for PixelCanvas {
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: Paint) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let (left, right) = if width < 0.0 { (x + width, x) } else { (x, x + width) };
        let (top, bottom) = if height < 0.0 { (y + height, y) } else { (y, y + height) };
        let Some(rect) = Rect::from_ltrb(left as f32, top as f32, right as f32, bottom as f32)
        else {
            return;
        };
        pixmap.fill_rect(rect, &skia_paint(paint), Transform::identity(), None);
    }

    fn begin_path(&mut self) {
        self.path = PathBuilder::new();
        self.has_point = false;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.path.move_to(x as f32, y as f32);
            self.has_point = true;
        }
    }

    fn line_to(&mut self, x: f64, y: f64) {
        // A line with no current point starts the subpath
        if !self.has_point {
            self.move_to(x, y);
        } else if x.is_finite() && y.is_finite() {
            self.path.line_to(x as f32, y as f32);
        }
    }

    fn stroke(&mut self, paint: Paint, line_width: f64) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let Some(path) = self.path.clone().finish() else {
            return;
        };
        let stroke = Stroke {
            width: line_width.max(0.0) as f32,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &skia_paint(paint), &stroke, Transform::identity(), None);
    }
}

fn black_pixmap(width: u32, height: u32) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)?;
    pixmap.fill(Color::BLACK);
    Some(pixmap)
}

fn skia_paint(paint: Paint) -> tiny_skia::Paint<'static> {
    let ([r, g, b], alpha) = paint.to_rgba();
    let mut skia = tiny_skia::Paint::default();
    skia.set_color_rgba8(r, g, b, (alpha * 255.0).round() as u8);
    skia.anti_alias = false;
    skia
}

fn rgb(color: PremultipliedColorU8) -> [u8; 3] {
    let color = color.demultiply();
    [color.red(), color.green(), color.blue()]
}
