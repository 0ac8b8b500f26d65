//! Toolkit-agnostic drawing surface
//!
//! The compositor and host previews draw through [`RenderSurface`], so the
//! editor core never depends on a particular canvas. Coordinates passed to a
//! surface are display coordinates; the surface owns the mapping to its own
//! pixels.

use image::RgbaImage;

use super::geometry::{marquee, pending};
use crate::config::ShapeColor;
use crate::domain::{AnnotationKind, Point, Rect, arrow_head};
use crate::session::state::Preview;

/// RGBA paint with straight (non-premultiplied) alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paint {
    pub rgba: [u8; 4],
}

impl Paint {
    pub fn opaque(color: ShapeColor) -> Self {
        Self {
            rgba: color.to_rgba_u8(),
        }
    }

    pub fn rgb(rgb: [u8; 3]) -> Self {
        Self {
            rgba: [rgb[0], rgb[1], rgb[2], 255],
        }
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.rgba[3] = alpha;
        self
    }
}

/// Line styling
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub paint: Paint,
    pub width: f32,
    /// Alternating dash/gap lengths; `None` draws a solid line
    pub dash: Option<Vec<f32>>,
}

impl StrokeStyle {
    pub fn solid(paint: Paint, width: f32) -> Self {
        Self {
            paint,
            width,
            dash: None,
        }
    }

    pub fn dashed(paint: Paint, width: f32, dash: &[f32]) -> Self {
        Self {
            paint,
            width,
            dash: Some(dash.to_vec()),
        }
    }
}

/// Drawing primitives the editor needs from a canvas
pub trait RenderSurface {
    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle);
    fn stroke_polyline(&mut self, points: &[Point], style: &StrokeStyle);
    fn fill_polygon(&mut self, points: &[Point], paint: Paint);
    fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle);
    fn fill_rect(&mut self, rect: Rect, paint: Paint);
    fn stroke_ellipse(&mut self, bounds: Rect, style: &StrokeStyle);
    fn draw_text(&mut self, origin: Point, text: &str, font_size: f32, paint: Paint);
    /// Read back everything drawn so far as straight-alpha RGBA
    fn rasterize_to_buffer(&self) -> RgbaImage;
}

/// Draw one annotation
pub fn draw_annotation(surface: &mut impl RenderSurface, kind: &AnnotationKind) {
    match kind {
        AnnotationKind::Arrow {
            start,
            end,
            color,
            stroke_width,
        } => {
            let head = arrow_head(*start, *end, *stroke_width);
            // Stop the shaft at the head's base so a wide stroke cannot poke through the tip.
            let base = Point::new((head[1].x + head[2].x) * 0.5, (head[1].y + head[2].y) * 0.5);
            let shaft_end = if start.distance(*end) > start.distance(base) {
                base
            } else {
                *end
            };
            let paint = Paint::opaque(*color);
            surface.stroke_line(*start, shaft_end, &StrokeStyle::solid(paint, *stroke_width));
            surface.fill_polygon(&head, paint);
        }
        AnnotationKind::Rect {
            bounds,
            color,
            stroke_width,
        } => surface.stroke_rect(
            *bounds,
            &StrokeStyle::solid(Paint::opaque(*color), *stroke_width),
        ),
        AnnotationKind::Ellipse {
            bounds,
            color,
            stroke_width,
        } => surface.stroke_ellipse(
            *bounds,
            &StrokeStyle::solid(Paint::opaque(*color), *stroke_width),
        ),
        AnnotationKind::Freehand {
            points,
            color,
            stroke_width,
        } => surface.stroke_polyline(
            points,
            &StrokeStyle::solid(Paint::opaque(*color), *stroke_width),
        ),
        AnnotationKind::Text {
            position,
            content,
            font_size,
            color,
        } => surface.draw_text(*position, content, *font_size, Paint::opaque(*color)),
        AnnotationKind::Redaction { bounds, blocks, .. } => {
            let origin = Point::new(bounds.x, bounds.y);
            for block in blocks {
                surface.fill_rect(block.rect_at(origin), Paint::rgb(block.color));
            }
        }
    }
}

/// Draw annotations in layer order (later ones on top)
pub fn draw_annotations_in_order<'a>(
    surface: &mut impl RenderSurface,
    annotations: impl IntoIterator<Item = &'a AnnotationKind>,
) {
    for kind in annotations {
        draw_annotation(surface, kind);
    }
}

/// Draw a gesture preview. Pending redactions are dashed and translucent so
/// they cannot be mistaken for a finished shape.
pub fn draw_preview(surface: &mut impl RenderSurface, preview: &Preview) {
    match preview {
        Preview::Shape(kind) | Preview::Stroke(kind) => draw_annotation(surface, kind),
        Preview::PendingRedaction(bounds) => {
            let gray = Paint::rgb([128, 128, 128]);
            surface.fill_rect(*bounds, gray.with_alpha(pending::FILL_ALPHA));
            surface.stroke_rect(
                *bounds,
                &StrokeStyle::dashed(
                    gray.with_alpha(pending::STROKE_ALPHA),
                    pending::STROKE,
                    &pending::DASH,
                ),
            );
        }
        Preview::Marquee(bounds) => surface.stroke_rect(
            *bounds,
            &StrokeStyle::dashed(
                Paint::rgb([30, 120, 255]),
                marquee::STROKE,
                &marquee::DASH,
            ),
        ),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::RedactionBlock;

    /// Records draw calls instead of painting
    #[derive(Default)]
    pub(crate) struct RecordingSurface {
        pub calls: Vec<String>,
    }

    impl RenderSurface for RecordingSurface {
        fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) {
            self.calls.push(format!(
                "line {},{} -> {},{} w{}",
                from.x, from.y, to.x, to.y, style.width
            ));
        }
        fn stroke_polyline(&mut self, points: &[Point], _style: &StrokeStyle) {
            self.calls.push(format!("polyline {}", points.len()));
        }
        fn fill_polygon(&mut self, points: &[Point], _paint: Paint) {
            self.calls.push(format!("polygon {}", points.len()));
        }
        fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle) {
            let kind = if style.dash.is_some() { "dashed" } else { "solid" };
            self.calls
                .push(format!("rect {} {},{} {}x{}", kind, rect.x, rect.y, rect.width, rect.height));
        }
        fn fill_rect(&mut self, rect: Rect, paint: Paint) {
            self.calls.push(format!(
                "fill {},{} {}x{} a{}",
                rect.x, rect.y, rect.width, rect.height, paint.rgba[3]
            ));
        }
        fn stroke_ellipse(&mut self, _bounds: Rect, _style: &StrokeStyle) {
            self.calls.push("ellipse".into());
        }
        fn draw_text(&mut self, _origin: Point, text: &str, _font_size: f32, _paint: Paint) {
            self.calls.push(format!("text {text}"));
        }
        fn rasterize_to_buffer(&self) -> RgbaImage {
            RgbaImage::new(0, 0)
        }
    }

    #[test]
    fn test_arrow_draws_shaft_and_head() {
        let mut surface = RecordingSurface::default();
        draw_annotation(
            &mut surface,
            &AnnotationKind::Arrow {
                start: Point::new(10.0, 10.0),
                end: Point::new(110.0, 10.0),
                color: ShapeColor::default(),
                stroke_width: 3.0,
            },
        );
        assert_eq!(surface.calls.len(), 2);
        assert!(surface.calls[0].starts_with("line 10,10 -> "));
        assert_eq!(surface.calls[1], "polygon 3");
    }

    #[test]
    fn test_redaction_draws_blocks_at_offsets() {
        let mut surface = RecordingSurface::default();
        let block = |x, y| RedactionBlock {
            x,
            y,
            width: 8.0,
            height: 8.0,
            color: [1, 2, 3],
        };
        draw_annotation(
            &mut surface,
            &AnnotationKind::Redaction {
                bounds: Rect::new(100.0, 50.0, 16.0, 8.0),
                block_size: 8.0,
                blocks: vec![block(0.0, 0.0), block(8.0, 0.0)],
            },
        );
        assert_eq!(
            surface.calls,
            vec!["fill 100,50 8x8 a255", "fill 108,50 8x8 a255"]
        );
    }

    #[test]
    fn test_pending_redaction_preview_is_dashed_and_translucent() {
        let mut surface = RecordingSurface::default();
        draw_preview(
            &mut surface,
            &Preview::PendingRedaction(Rect::new(0.0, 0.0, 20.0, 20.0)),
        );
        assert_eq!(
            surface.calls,
            vec![
                format!("fill 0,0 20x20 a{}", pending::FILL_ALPHA),
                "rect dashed 0,0 20x20".to_string()
            ]
        );
    }
}
