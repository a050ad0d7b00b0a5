//! CPU pixel surfaces backed by tiny-skia.
//!
//! A [`Canvas`] is used for everything that holds pixels: the output surface
//! the manager presents, the two frame buffers captured when a transition
//! starts, and the scratch copies transitions composite with.

use glam::Vec2;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Transform};

use crate::error::SceneError;

/// An 8-bit straight-alpha RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub(crate) fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

/// How a source canvas is combined with the destination in
/// [`Canvas::draw_canvas`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Regular source-over alpha blending.
    #[default]
    Normal,
    /// Replace destination pixels with source pixels.
    Source,
    /// Multiply source and destination colors.
    Multiply,
    /// Multiply the destination by the source alpha. Used with alpha masks.
    MultiplyAlpha,
}

impl BlendMode {
    fn to_skia(self) -> tiny_skia::BlendMode {
        match self {
            BlendMode::Normal => tiny_skia::BlendMode::SourceOver,
            BlendMode::Source => tiny_skia::BlendMode::Source,
            BlendMode::Multiply => tiny_skia::BlendMode::Multiply,
            BlendMode::MultiplyAlpha => tiny_skia::BlendMode::DestinationIn,
        }
    }
}

/// A fixed-size RGBA pixel surface.
#[derive(Clone, Debug)]
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Allocate a transparent canvas.
    pub fn new(width: u32, height: u32) -> Result<Self, SceneError> {
        let pixmap = Pixmap::new(width, height).ok_or(SceneError::Surface { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// `(width, height)` in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Canvas center in pixel coordinates.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32) / 2.0
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    /// Replace every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        self.pixmap.fill(color.to_skia());
    }

    /// Blend a rectangle of `color` over the canvas.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let Some(rect) = tiny_skia::Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.anti_alias = false;
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Blend a filled circle of `color` over the canvas.
    ///
    /// A radius of zero or less draws nothing.
    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.circle(center, radius, color, tiny_skia::BlendMode::SourceOver);
    }

    /// Make every pixel inside the circle fully transparent.
    pub fn erase_circle(&mut self, center: Vec2, radius: f32) {
        self.circle(center, radius, Color::TRANSPARENT, tiny_skia::BlendMode::Source);
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color, mode: tiny_skia::BlendMode) {
        if radius <= 0.0 || !radius.is_finite() {
            return;
        }
        let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.blend_mode = mode;
        paint.anti_alias = true;
        self.pixmap.fill_path(
            &path,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    /// Draw `src` onto this canvas with its top-left corner at `offset`.
    ///
    /// Offsets are rounded to whole pixels. Parts of `src` falling outside the
    /// canvas are clipped.
    pub fn draw_canvas(&mut self, src: &Canvas, offset: Vec2, opacity: f32, mode: BlendMode) {
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            blend_mode: mode.to_skia(),
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            offset.x.round() as i32,
            offset.y.round() as i32,
            src.pixmap.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
    }

    /// Copy `src` over this canvas pixel for pixel.
    pub fn copy_from(&mut self, src: &Canvas) {
        self.draw_canvas(src, Vec2::ZERO, 1.0, BlendMode::Source);
    }

    /// Multiply this canvas by the alpha channel of `mask`.
    pub fn apply_mask(&mut self, mask: &Canvas) {
        self.draw_canvas(mask, Vec2::ZERO, 1.0, BlendMode::MultiplyAlpha);
    }

    /// Blend `color` into one pixel with the given coverage (0-255).
    ///
    /// Out-of-bounds coordinates are ignored.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: u8) {
        let (w, h) = (self.width() as i32, self.height() as i32);
        if coverage == 0 || x < 0 || y < 0 || x >= w || y >= h {
            return;
        }
        let alpha = (coverage as f32 / 255.0) * (color.a as f32 / 255.0);
        let inv = 1.0 - alpha;
        let idx = (y as usize * w as usize + x as usize) * 4;
        let data = self.pixmap.data_mut();
        // Pixmap data is premultiplied.
        data[idx] = (color.r as f32 * alpha + data[idx] as f32 * inv) as u8;
        data[idx + 1] = (color.g as f32 * alpha + data[idx + 1] as f32 * inv) as u8;
        data[idx + 2] = (color.b as f32 * alpha + data[idx + 2] as f32 * inv) as u8;
        data[idx + 3] = (255.0 * alpha + data[idx + 3] as f32 * inv) as u8;
    }

    /// Read one pixel as straight-alpha color. `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let p = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(p.red(), p.green(), p.blue(), p.alpha()))
    }

    /// Raw premultiplied RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }
}
