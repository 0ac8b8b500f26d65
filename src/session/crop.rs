//! Crop-mode pointer handling
//!
//! Dragging inside the selection moves it, dragging a handle resizes it, and
//! dragging outside draws a new one. The selection never leaves the displayed
//! image.

use super::Canvas;
use super::messages::{PointerEvent, PointerKind};
use super::state::{EditorState, Interaction};
use crate::domain::{DragState, Point, Rect, Size};

fn clamp_point(p: Point, bounds: Size) -> Point {
    Point::new(
        p.x.min(bounds.width).max(0.0),
        p.y.min(bounds.height).max(0.0),
    )
}

/// Route a pointer event while in crop mode
pub fn handle_crop_pointer(state: &mut EditorState, canvas: &Canvas, event: PointerEvent) {
    let bounds = canvas.viewport.display;
    let p = event.position;
    match event.kind {
        PointerKind::Down => {
            if let Some(selection) = state.crop_selection {
                let handle = DragState::pick(&selection, p);
                if handle != DragState::None {
                    state.interaction = Interaction::CropDrag {
                        handle,
                        anchor: p,
                        origin: selection,
                    };
                    return;
                }
            }
            let start = clamp_point(p, bounds);
            state.interaction = Interaction::CropDraw {
                start,
                current: start,
                previous: state.crop_selection,
            };
        }
        PointerKind::Move => match &mut state.interaction {
            Interaction::CropDrag {
                handle,
                anchor,
                origin,
            } => {
                let next = handle.apply(*origin, p.x - anchor.x, p.y - anchor.y, bounds);
                state.crop_selection = Some(next);
            }
            Interaction::CropDraw { start, current, .. } => {
                *current = clamp_point(p, bounds);
                state.crop_selection = Some(Rect::from_corners(*start, *current));
            }
            _ => {}
        },
        PointerKind::Up => {
            if let Interaction::CropDraw {
                start, previous, ..
            } = std::mem::take(&mut state.interaction)
            {
                let drawn = Rect::from_corners(start, clamp_point(p, bounds));
                if drawn.width < 1.0 || drawn.height < 1.0 {
                    log::debug!("Ignoring degenerate crop selection {:?}", drawn);
                    state.crop_selection = previous;
                } else {
                    state.crop_selection = Some(drawn);
                }
            }
        }
    }
}
