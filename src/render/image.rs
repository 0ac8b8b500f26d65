//! Raster surface for annotations using tiny-skia
//!
//! Annotations are recorded in display coordinates; the surface carries a
//! display→natural transform so everything lands at full resolution.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage};
use tiny_skia::{
    ColorU8, FillRule, LineCap, LineJoin, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash,
    Transform,
};

use super::geometry::{self, BEZIER_K};
use super::surface::{Paint, RenderSurface, StrokeStyle};
use crate::domain::{GLYPH_CELL, Point, Rect, Viewport};

/// A tiny-skia pixmap addressed in display coordinates
pub struct PixmapSurface {
    pixmap: Pixmap,
    transform: Transform,
}

impl PixmapSurface {
    /// Transparent surface at the viewport's natural size
    pub fn overlay(viewport: &Viewport) -> Option<Self> {
        let pixmap = Pixmap::new(
            viewport.natural.width.round() as u32,
            viewport.natural.height.round() as u32,
        )?;
        Some(Self::with_viewport(pixmap, viewport))
    }

    /// Surface initialized with `img`, which must be at the viewport's natural size
    pub fn from_image(img: &RgbaImage, viewport: &Viewport) -> Option<Self> {
        Some(Self::with_viewport(pixmap_from_rgba(img)?, viewport))
    }

    fn with_viewport(pixmap: Pixmap, viewport: &Viewport) -> Self {
        let (sx, sy) = viewport.scale();
        Self {
            pixmap,
            transform: Transform::from_scale(sx, sy),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Composite another surface on top of this one, pixel for pixel
    pub fn draw_surface(&mut self, other: &PixmapSurface) {
        self.pixmap.draw_pixmap(
            0,
            0,
            other.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn fill_path(&mut self, path: &tiny_skia::Path, paint: Paint, anti_alias: bool) {
        let mut sk_paint = to_sk_paint(paint);
        sk_paint.anti_alias = anti_alias;
        self.pixmap
            .fill_path(path, &sk_paint, FillRule::Winding, self.transform, None);
    }

    fn stroke_path(&mut self, path: &tiny_skia::Path, style: &StrokeStyle) {
        let paint = to_sk_paint(style.paint);
        let stroke = Stroke {
            width: style.width.max(0.5),
            line_cap: if style.dash.is_some() {
                LineCap::Butt
            } else {
                LineCap::Round
            },
            line_join: LineJoin::Round,
            dash: style
                .dash
                .as_ref()
                .and_then(|d| StrokeDash::new(d.clone(), 0.0)),
            ..Default::default()
        };
        self.pixmap
            .stroke_path(path, &paint, &stroke, self.transform, None);
    }
}

impl RenderSurface for PixmapSurface {
    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
        if let Some(path) = pb.finish() {
            self.stroke_path(&path, style);
        }
    }

    fn stroke_polyline(&mut self, points: &[Point], style: &StrokeStyle) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first.x, first.y);
        for p in rest {
            pb.line_to(p.x, p.y);
        }
        if let Some(path) = pb.finish() {
            self.stroke_path(&path, style);
        }
    }

    fn fill_polygon(&mut self, points: &[Point], paint: Paint) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first.x, first.y);
        for p in rest {
            pb.line_to(p.x, p.y);
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.fill_path(&path, paint, true);
        }
    }

    fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle) {
        let mut pb = PathBuilder::new();
        pb.move_to(rect.x, rect.y);
        pb.line_to(rect.right(), rect.y);
        pb.line_to(rect.right(), rect.bottom());
        pb.line_to(rect.x, rect.bottom());
        pb.close();
        if let Some(path) = pb.finish() {
            self.stroke_path(&path, style);
        }
    }

    fn fill_rect(&mut self, rect: Rect, paint: Paint) {
        let Some(r) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) else {
            return;
        };
        // Non-AA so adjacent redaction blocks tile without seams.
        let path = PathBuilder::from_rect(r);
        self.fill_path(&path, paint, false);
    }

    fn stroke_ellipse(&mut self, bounds: Rect, style: &StrokeStyle) {
        let (cx, cy, rx, ry) =
            geometry::ellipse_from_bounds(bounds.x, bounds.y, bounds.right(), bounds.bottom());
        if let Some(path) = build_ellipse_path(cx, cy, rx, ry) {
            self.stroke_path(&path, style);
        }
    }

    fn draw_text(&mut self, origin: Point, text: &str, font_size: f32, paint: Paint) {
        let cell = font_size / GLYPH_CELL;
        let mut pb = PathBuilder::new();
        for (row, line) in text.split('\n').enumerate() {
            let top = origin.y + row as f32 * font_size;
            for (col, ch) in line.chars().enumerate() {
                let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
                    continue;
                };
                let left = origin.x + col as f32 * font_size;
                for (gy, bits) in glyph.iter().enumerate() {
                    for gx in 0..8 {
                        if (bits >> gx) & 1 == 0 {
                            continue;
                        }
                        if let Some(r) = tiny_skia::Rect::from_xywh(
                            left + gx as f32 * cell,
                            top + gy as f32 * cell,
                            cell,
                            cell,
                        ) {
                            pb.push_rect(r);
                        }
                    }
                }
            }
        }
        if let Some(path) = pb.finish() {
            self.fill_path(&path, paint, true);
        }
    }

    fn rasterize_to_buffer(&self) -> RgbaImage {
        rgba_from_pixmap(&self.pixmap)
    }
}

fn to_sk_paint(paint: Paint) -> tiny_skia::Paint<'static> {
    let [r, g, b, a] = paint.rgba;
    let mut sk = tiny_skia::Paint::default();
    sk.set_color_rgba8(r, g, b, a);
    sk.anti_alias = true;
    sk
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<tiny_skia::Path> {
    let kx = rx * BEZIER_K;
    let ky = ry * BEZIER_K;

    let mut pb = PathBuilder::new();

    pb.move_to(cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);

    pb.close();
    pb.finish()
}

/// Copy straight-alpha RGBA into a premultiplied pixmap
fn pixmap_from_rgba(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Copy a premultiplied pixmap back to straight-alpha RGBA
fn rgba_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}
