//! Crop selection handles

use super::geometry::{Point, Rect, Size};

/// Distance in display pixels within which a handle grabs the pointer
pub const HANDLE_GRAB: f32 = 8.0;

/// Smallest crop edge a resize can produce
pub const MIN_CROP_EDGE: f32 = 1.0;

/// Drag state for crop selection handles
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    #[default]
    None,
    /// North-West corner
    NW,
    /// North edge
    N,
    /// North-East corner
    NE,
    /// East edge
    E,
    /// South-East corner
    SE,
    /// South edge
    S,
    /// South-West corner
    SW,
    /// West edge
    W,
    /// Whole-rectangle move
    Move,
}

impl DragState {
    /// Which handle of `rect` (if any) is under `p`
    pub fn pick(rect: &Rect, p: Point) -> DragState {
        let near = |a: f32, b: f32| (a - b).abs() <= HANDLE_GRAB;
        let in_x = p.x >= rect.x - HANDLE_GRAB && p.x <= rect.right() + HANDLE_GRAB;
        let in_y = p.y >= rect.y - HANDLE_GRAB && p.y <= rect.bottom() + HANDLE_GRAB;
        if !(in_x && in_y) {
            return DragState::None;
        }
        let left = near(p.x, rect.x);
        let right = near(p.x, rect.right());
        let top = near(p.y, rect.y);
        let bottom = near(p.y, rect.bottom());
        match (left, right, top, bottom) {
            (true, _, true, _) => DragState::NW,
            (_, true, true, _) => DragState::NE,
            (true, _, _, true) => DragState::SW,
            (_, true, _, true) => DragState::SE,
            (_, _, true, _) => DragState::N,
            (_, _, _, true) => DragState::S,
            (true, _, _, _) => DragState::W,
            (_, true, _, _) => DragState::E,
            _ if rect.contains_point(p) => DragState::Move,
            _ => DragState::None,
        }
    }

    /// Apply a pointer delta to `origin`, keeping the result inside `bounds`
    pub fn apply(self, origin: Rect, dx: f32, dy: f32, bounds: Size) -> Rect {
        if self == DragState::Move {
            return origin.translate(dx, dy).shift_into(bounds);
        }

        let mut left = origin.x;
        let mut top = origin.y;
        let mut right = origin.right();
        let mut bottom = origin.bottom();

        // min/max rather than clamp: a selection thinner than MIN_CROP_EDGE
        // near an edge would make the clamp range empty.
        if matches!(self, DragState::NW | DragState::W | DragState::SW) {
            left = (left + dx).min(right - MIN_CROP_EDGE).max(0.0);
        }
        if matches!(self, DragState::NE | DragState::E | DragState::SE) {
            right = (right + dx).max(left + MIN_CROP_EDGE).min(bounds.width);
        }
        if matches!(self, DragState::NW | DragState::N | DragState::NE) {
            top = (top + dy).min(bottom - MIN_CROP_EDGE).max(0.0);
        }
        if matches!(self, DragState::SW | DragState::S | DragState::SE) {
            bottom = (bottom + dy).max(top + MIN_CROP_EDGE).min(bounds.height);
        }

        Rect::new(left, top, right - left, bottom - top)
    }
}
