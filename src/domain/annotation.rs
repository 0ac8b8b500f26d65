//! Annotation types for drawing on screenshots
//!
//! All annotation types store coordinates in display coordinates of the
//! working image.

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect, arrow_head};
use crate::config::ShapeColor;

/// Glyph cell size of the bitmap font used for text labels
pub const GLYPH_CELL: f32 = 8.0;

/// Stable identity of an annotation inside its layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// One solid-color cell of a redaction, offset from the redaction's top-left
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RedactionBlock {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: [u8; 3],
}

impl RedactionBlock {
    /// Block rectangle in the redaction's coordinate space
    pub fn rect_at(&self, origin: Point) -> Rect {
        Rect::new(origin.x + self.x, origin.y + self.y, self.width, self.height)
    }
}

/// Vector annotation catalogue
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AnnotationKind {
    Arrow {
        start: Point,
        end: Point,
        color: ShapeColor,
        stroke_width: f32,
    },
    Rect {
        bounds: Rect,
        color: ShapeColor,
        stroke_width: f32,
    },
    Ellipse {
        bounds: Rect,
        color: ShapeColor,
        stroke_width: f32,
    },
    Freehand {
        points: Vec<Point>,
        color: ShapeColor,
        stroke_width: f32,
    },
    Text {
        position: Point,
        content: String,
        font_size: f32,
        color: ShapeColor,
    },
    /// Pixelated snapshot of the pixels under `bounds` at creation time
    Redaction {
        bounds: Rect,
        block_size: f32,
        blocks: Vec<RedactionBlock>,
    },
}

/// An annotation with its layer identity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationObject {
    pub id: ObjectId,
    pub kind: AnnotationKind,
}

impl AnnotationKind {
    /// Check if this is a redaction (style-immutable)
    pub fn is_redaction(&self) -> bool {
        matches!(self, AnnotationKind::Redaction { .. })
    }

    /// Axis-aligned bounds covering everything this annotation paints
    pub fn bounds(&self) -> Rect {
        match self {
            AnnotationKind::Arrow {
                start,
                end,
                stroke_width,
                ..
            } => {
                let head = arrow_head(*start, *end, *stroke_width);
                let pts = [*start, head[0], head[1], head[2]];
                Rect::bounding(&pts)
                    .unwrap_or_default()
                    .inflate(stroke_width * 0.5)
            }
            AnnotationKind::Rect {
                bounds,
                stroke_width,
                ..
            }
            | AnnotationKind::Ellipse {
                bounds,
                stroke_width,
                ..
            } => bounds.inflate(stroke_width * 0.5),
            AnnotationKind::Freehand {
                points,
                stroke_width,
                ..
            } => Rect::bounding(points)
                .unwrap_or_default()
                .inflate(stroke_width * 0.5),
            AnnotationKind::Text {
                position,
                content,
                font_size,
                ..
            } => {
                let (cols, rows) = text_grid(content);
                Rect::new(
                    position.x,
                    position.y,
                    cols as f32 * font_size,
                    rows as f32 * font_size,
                )
            }
            AnnotationKind::Redaction { bounds, .. } => *bounds,
        }
    }

    /// Check if a point lands on this annotation, with `tolerance` slack
    pub fn hit_test(&self, p: Point, tolerance: f32) -> bool {
        self.bounds().inflate(tolerance).contains_point(p)
    }

    /// Move every coordinate by the given offset
    pub fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            AnnotationKind::Arrow { start, end, .. } => {
                *start = start.offset(dx, dy);
                *end = end.offset(dx, dy);
            }
            AnnotationKind::Rect { bounds, .. }
            | AnnotationKind::Ellipse { bounds, .. }
            | AnnotationKind::Redaction { bounds, .. } => *bounds = bounds.translate(dx, dy),
            AnnotationKind::Freehand { points, .. } => {
                for p in points.iter_mut() {
                    *p = p.offset(dx, dy);
                }
            }
            AnnotationKind::Text { position, .. } => *position = position.offset(dx, dy),
        }
    }

    /// Scale positions about the origin, used when the display size changes.
    /// Stroke widths and font sizes are kept.
    pub fn scale(&mut self, sx: f32, sy: f32) {
        let scale_point = |p: &mut Point| *p = Point::new(p.x * sx, p.y * sy);
        let scale_rect = |r: &Rect| Rect::new(r.x * sx, r.y * sy, r.width * sx, r.height * sy);
        match self {
            AnnotationKind::Arrow { start, end, .. } => {
                scale_point(start);
                scale_point(end);
            }
            AnnotationKind::Rect { bounds, .. } | AnnotationKind::Ellipse { bounds, .. } => {
                *bounds = scale_rect(bounds);
            }
            AnnotationKind::Redaction {
                bounds,
                block_size,
                blocks,
            } => {
                *bounds = scale_rect(bounds);
                *block_size *= sx.min(sy);
                for block in blocks.iter_mut() {
                    block.x *= sx;
                    block.y *= sy;
                    block.width *= sx;
                    block.height *= sy;
                }
            }
            AnnotationKind::Freehand { points, .. } => points.iter_mut().for_each(scale_point),
            AnnotationKind::Text { position, .. } => scale_point(position),
        }
    }

    /// Overwrite color, leaving redactions untouched. Returns whether anything changed.
    pub fn set_color(&mut self, new_color: ShapeColor) -> bool {
        match self {
            AnnotationKind::Arrow { color, .. }
            | AnnotationKind::Rect { color, .. }
            | AnnotationKind::Ellipse { color, .. }
            | AnnotationKind::Freehand { color, .. }
            | AnnotationKind::Text { color, .. } => {
                *color = new_color;
                true
            }
            AnnotationKind::Redaction { .. } => false,
        }
    }

    /// Overwrite stroke width on stroked shapes only. Returns whether anything changed.
    pub fn set_stroke_width(&mut self, width: f32) -> bool {
        match self {
            AnnotationKind::Arrow { stroke_width, .. }
            | AnnotationKind::Rect { stroke_width, .. }
            | AnnotationKind::Ellipse { stroke_width, .. }
            | AnnotationKind::Freehand { stroke_width, .. } => {
                *stroke_width = width;
                true
            }
            AnnotationKind::Text { .. } | AnnotationKind::Redaction { .. } => false,
        }
    }
}

/// Columns and rows occupied by `text` in glyph cells
pub fn text_grid(text: &str) -> (usize, usize) {
    let cols = text.split('\n').map(|l| l.chars().count()).max().unwrap_or(0);
    let rows = text.split('\n').count().max(1);
    (cols, rows)
}
