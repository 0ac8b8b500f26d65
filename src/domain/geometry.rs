//! Geometric types for editor regions and coordinates
//!
//! Two coordinate spaces exist: display space (what the user points at) and
//! natural space (the raster's real pixels). Everything the user draws is
//! stored in display space and converted with [`display_to_natural`] before
//! touching pixels.

use std::f32::consts::FRAC_PI_6;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::RegionError;

/// Fraction of the shorter dimension covered by the default crop
pub const CROP_COVERAGE: f32 = 0.9;

/// Base arrowhead length before stroke scaling
pub const ARROW_HEAD_BASE: f32 = 15.0;

/// A point in display or natural space
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn offset(self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Width and height of a surface
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle with origin at its top-left corner
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from two arbitrary corners (normalizes min/max)
    pub fn from_corners(a: Point, b: Point) -> Self {
        let (min_x, max_x) = if a.x < b.x { (a.x, b.x) } else { (b.x, a.x) };
        let (min_y, max_y) = if a.y < b.y { (a.y, b.y) } else { (b.y, a.y) };
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Smallest rectangle containing every point, or `None` for an empty slice
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::from_corners(min, max))
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if this rectangle contains a point (edges inclusive)
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Check if `other` lies entirely within this rectangle
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if left < right && top < bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Translate the rectangle by the given offset
    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grow the rectangle by `amount` on every side
    pub fn inflate(&self, amount: f32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Clamp into `[0, width] x [0, height]`
    pub fn clamp_to(&self, bounds: Size) -> Result<Rect, RegionError> {
        self.intersect(&Rect::new(0.0, 0.0, bounds.width, bounds.height))
            .ok_or(RegionError::InvalidRegion)
    }

    /// Keep the size but shift the rectangle so it lies inside `bounds`.
    ///
    /// A rectangle larger than `bounds` is shrunk to fit.
    pub fn shift_into(&self, bounds: Size) -> Rect {
        let width = self.width.min(bounds.width);
        let height = self.height.min(bounds.height);
        let x = self.x.min(bounds.width - width).max(0.0);
        let y = self.y.min(bounds.height - height).max(0.0);
        Rect::new(x, y, width, height)
    }

    /// Snap to whole pixels inside a raster of `width x height`
    pub fn to_pixel_rect(&self, width: u32, height: u32) -> Option<PixelRect> {
        let left = self.x.round().max(0.0) as u32;
        let top = self.y.round().max(0.0) as u32;
        let right = (self.right().round().max(0.0) as u32).min(width);
        let bottom = (self.bottom().round().max(0.0) as u32).min(height);
        Some(PixelRect {
            x: left,
            y: top,
            width: NonZeroU32::new(right.checked_sub(left)?)?,
            height: NonZeroU32::new(bottom.checked_sub(top)?)?,
        })
    }
}

/// Whole-pixel rectangle with non-zero dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }
}

/// Display and natural sizes of the working raster
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub display: Size,
    pub natural: Size,
}

impl Viewport {
    /// A viewport shown at 1:1 scale
    pub fn identity(width: u32, height: u32) -> Self {
        let size = Size::from_pixels(width, height);
        Self {
            display: size,
            natural: size,
        }
    }

    /// Horizontal and vertical natural-per-display factors
    pub fn scale(&self) -> (f32, f32) {
        if self.display.is_empty() {
            return (1.0, 1.0);
        }
        (
            self.natural.width / self.display.width,
            self.natural.height / self.display.height,
        )
    }

    pub fn to_natural(&self, rect: Rect) -> Rect {
        display_to_natural(
            rect,
            self.display.width,
            self.display.height,
            self.natural.width,
            self.natural.height,
        )
    }

    pub fn to_natural_point(&self, p: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(p.x * sx, p.y * sy)
    }

    /// Same display scale applied to a raster of a different natural size
    pub fn rescaled(&self, natural_width: u32, natural_height: u32) -> Viewport {
        let (sx, sy) = self.scale();
        let natural = Size::from_pixels(natural_width, natural_height);
        Viewport {
            display: Size::new(natural.width / sx, natural.height / sy),
            natural,
        }
    }
}

/// Default crop selection: 90% of the shorter dimension, image aspect ratio, centered
pub fn centered_crop(width: f32, height: f32) -> Rect {
    if width <= 0.0 || height <= 0.0 {
        return Rect::default();
    }
    let aspect = width / height;
    let short = width.min(height) * CROP_COVERAGE;
    let (crop_w, crop_h) = if width >= height {
        (short * aspect, short)
    } else {
        (short, short / aspect)
    };
    Rect::new(
        (width - crop_w) * 0.5,
        (height - crop_h) * 0.5,
        crop_w,
        crop_h,
    )
}

/// Scale a display-space rectangle into natural pixel space
pub fn display_to_natural(
    rect: Rect,
    display_width: f32,
    display_height: f32,
    natural_width: f32,
    natural_height: f32,
) -> Rect {
    let sx = natural_width / display_width;
    let sy = natural_height / display_height;
    Rect::new(rect.x * sx, rect.y * sy, rect.width * sx, rect.height * sy)
}

/// Inverse of [`display_to_natural`]
pub fn natural_to_display(
    rect: Rect,
    display_width: f32,
    display_height: f32,
    natural_width: f32,
    natural_height: f32,
) -> Rect {
    display_to_natural(
        rect,
        natural_width,
        natural_height,
        display_width,
        display_height,
    )
}

/// Arrowhead length for a given stroke width
pub fn arrow_head_length(stroke_width: f32) -> f32 {
    ARROW_HEAD_BASE + 2.0 * stroke_width
}

/// Arrowhead triangle for a directed segment: `[tip, back_left, back_right]`
pub fn arrow_head(start: Point, end: Point, stroke_width: f32) -> [Point; 3] {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let head_len = arrow_head_length(stroke_width);
    let back = |a: f32| Point::new(end.x - head_len * a.cos(), end.y - head_len * a.sin());
    [end, back(angle - FRAC_PI_6), back(angle + FRAC_PI_6)]
}
