//! Annotate-mode pointer and text handlers
//!
//! Each tool follows pointer-down → pointer-move* → pointer-up. Box tools keep
//! a preview until release; the arrow is built only on release; blur discards
//! its preview and samples the working image.

use std::collections::BTreeSet;

use super::redaction;
use crate::domain::{AnnotationKind, ObjectId, Point, Rect};
use crate::session::Canvas;
use crate::session::messages::{Key, KeyEvent, PointerEvent, PointerKind};
use crate::session::state::{BoxKind, EditorState, Interaction, Tool};

/// Arrows shorter than this are treated as stray clicks
pub const MIN_ARROW_LENGTH: f32 = 5.0;

/// Route a pointer event while in annotate mode
pub fn handle_annotate_pointer(state: &mut EditorState, canvas: &Canvas, event: PointerEvent) {
    match event.kind {
        PointerKind::Down => pointer_down(state, canvas, event),
        PointerKind::Move => pointer_move(state, event.position),
        PointerKind::Up => pointer_up(state, canvas, event.position),
    }
}

// ============================================================================
// Pointer phases
// ============================================================================

fn pointer_down(state: &mut EditorState, canvas: &Canvas, event: PointerEvent) {
    let p = event.position;
    let hit = state.layer.hit_test(p, canvas.config.hit_tolerance);

    if state.editing_text.is_some() && state.editing_text != hit {
        finish_text_edit(state);
    }

    // Only Select picks up existing objects; Text can refocus a label. Drawing
    // tools always start a new shape, even over another annotation.
    match (state.active_tool, hit) {
        (Tool::Select, Some(id)) => {
            select_object(state, id, event.modifiers.shift);
            if state.selection.contains(&id) {
                state.interaction = Interaction::MoveSelection { last: p };
            }
            return;
        }
        (Tool::Text, Some(id)) if is_text(state, id) => {
            select_object(state, id, false);
            begin_text_edit(state, id, false);
            return;
        }
        _ => {}
    }

    state.interaction = match state.active_tool {
        Tool::Select => {
            if !event.modifiers.shift {
                state.clear_selection();
            }
            Interaction::Marquee {
                start: p,
                current: p,
            }
        }
        Tool::Arrow => {
            state.clear_selection();
            Interaction::Arrow {
                start: p,
                current: p,
            }
        }
        Tool::Rect | Tool::Circle | Tool::Blur => {
            state.clear_selection();
            Interaction::Box {
                kind: box_kind(state.active_tool),
                start: p,
                current: p,
            }
        }
        Tool::Text => {
            let id = create_text(state, canvas, p);
            state.selection = BTreeSet::from([id]);
            Interaction::Idle
        }
        Tool::Freehand => {
            state.clear_selection();
            Interaction::Stroke { points: vec![p] }
        }
    };
}

fn pointer_move(state: &mut EditorState, p: Point) {
    match &mut state.interaction {
        Interaction::Arrow { current, .. }
        | Interaction::Box { current, .. }
        | Interaction::Marquee { current, .. } => *current = p,
        Interaction::Stroke { points } => {
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        Interaction::MoveSelection { last } => {
            let (dx, dy) = (p.x - last.x, p.y - last.y);
            *last = p;
            state.layer.translate(&state.selection, dx, dy);
        }
        _ => {}
    }
}

fn pointer_up(state: &mut EditorState, canvas: &Canvas, p: Point) {
    let settings = state.tool_settings;
    match std::mem::take(&mut state.interaction) {
        Interaction::Arrow { start, .. } => {
            if start.distance(p) < MIN_ARROW_LENGTH {
                log::debug!("Ignoring arrow shorter than {}px", MIN_ARROW_LENGTH);
                return;
            }
            state.layer.add(AnnotationKind::Arrow {
                start,
                end: p,
                color: settings.color,
                stroke_width: settings.stroke_width,
            });
        }
        Interaction::Box { kind, start, .. } => {
            let bounds = Rect::from_corners(start, p);
            commit_box(state, canvas, kind, bounds);
        }
        Interaction::Stroke { mut points } => {
            if points.last() != Some(&p) {
                points.push(p);
            }
            if points.len() < 2 {
                log::debug!("Ignoring single-point stroke");
                return;
            }
            state.layer.add(AnnotationKind::Freehand {
                points,
                color: settings.color,
                stroke_width: settings.stroke_width,
            });
        }
        Interaction::Marquee { start, .. } => {
            let area = Rect::from_corners(start, p);
            if !area.is_empty() {
                state.selection.extend(state.layer.intersecting(&area));
            }
        }
        Interaction::MoveSelection { last } => {
            state
                .layer
                .translate(&state.selection, p.x - last.x, p.y - last.y);
        }
        other => state.interaction = other,
    }
}

fn commit_box(state: &mut EditorState, canvas: &Canvas, kind: BoxKind, bounds: Rect) {
    let settings = state.tool_settings;
    let shape = match kind {
        BoxKind::Rect | BoxKind::Ellipse if bounds.is_empty() => {
            log::debug!("Ignoring empty {:?} at {:?}", kind, bounds);
            return;
        }
        BoxKind::Rect => AnnotationKind::Rect {
            bounds,
            color: settings.color,
            stroke_width: settings.stroke_width,
        },
        BoxKind::Ellipse => AnnotationKind::Ellipse {
            bounds,
            color: settings.color,
            stroke_width: settings.stroke_width,
        },
        BoxKind::Blur => match redaction::build_redaction(
            bounds,
            canvas.working,
            &canvas.viewport,
            canvas.config.min_redaction_size,
        ) {
            Ok(redaction) => redaction,
            Err(err) => {
                log::debug!("Rejected redaction {:?}: {}", bounds, err);
                return;
            }
        },
    };
    state.layer.add(shape);
}

fn box_kind(tool: Tool) -> BoxKind {
    match tool {
        Tool::Circle => BoxKind::Ellipse,
        Tool::Blur => BoxKind::Blur,
        _ => BoxKind::Rect,
    }
}

// ============================================================================
// Selection helpers
// ============================================================================

fn select_object(state: &mut EditorState, id: ObjectId, additive: bool) {
    if additive {
        if !state.selection.remove(&id) {
            state.selection.insert(id);
        }
    } else if !state.selection.contains(&id) {
        state.selection.clear();
        state.selection.insert(id);
    }
}

fn is_text(state: &EditorState, id: ObjectId) -> bool {
    state
        .layer
        .get(id)
        .is_some_and(|o| matches!(o.kind, AnnotationKind::Text { .. }))
}

// ============================================================================
// Text editing
// ============================================================================

fn create_text(state: &mut EditorState, canvas: &Canvas, at: Point) -> ObjectId {
    let settings = state.tool_settings;
    let id = state.layer.add(AnnotationKind::Text {
        position: at,
        content: canvas.config.text_placeholder.clone(),
        font_size: settings.font_size,
        color: settings.color,
    });
    begin_text_edit(state, id, true);
    id
}

fn begin_text_edit(state: &mut EditorState, id: ObjectId, placeholder: bool) {
    state.editing_text = Some(id);
    state.replace_text_on_type = placeholder;
}

/// Leave text edit focus, dropping the label if it ended up empty
pub fn finish_text_edit(state: &mut EditorState) {
    let Some(id) = state.editing_text.take() else {
        return;
    };
    state.replace_text_on_type = false;
    let empty = state.layer.get(id).is_some_and(|o| match &o.kind {
        AnnotationKind::Text { content, .. } => content.is_empty(),
        _ => false,
    });
    if empty {
        state.layer.remove_all(&BTreeSet::from([id]));
        state.selection.remove(&id);
    }
}

/// Feed a key to the focused text label. Returns whether the key was consumed.
pub fn handle_text_key(state: &mut EditorState, event: KeyEvent) -> bool {
    let Some(id) = state.editing_text else {
        return false;
    };
    let replace = state.replace_text_on_type;
    let Some(AnnotationKind::Text { content, .. }) = state.layer.get_mut(id).map(|o| &mut o.kind)
    else {
        state.editing_text = None;
        return false;
    };

    match event.key {
        Key::Character(c) if !event.modifiers.control && !c.is_control() => {
            if replace {
                content.clear();
            }
            content.push(c);
        }
        Key::Backspace => {
            if replace {
                content.clear();
            } else {
                content.pop();
            }
        }
        Key::Enter if event.modifiers.shift => content.push('\n'),
        Key::Enter | Key::Escape => {
            finish_text_edit(state);
            return true;
        }
        _ => return false,
    }
    state.replace_text_on_type = false;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EditorConfig, ShapeColor};
    use crate::domain::{Size, Viewport};
    use crate::session::messages::Modifiers;
    use crate::session::state::ToolSettings;
    use image::{Rgba, RgbaImage};
    use std::collections::BTreeSet;

    struct Fixture {
        image: RgbaImage,
        config: EditorConfig,
        state: EditorState,
    }

    impl Fixture {
        fn new(tool: Tool) -> Self {
            let mut state = EditorState::new(Size::new(200.0, 200.0), ToolSettings::default());
            state.active_tool = tool;
            Self {
                image: RgbaImage::from_pixel(200, 200, Rgba([10, 20, 30, 255])),
                config: EditorConfig::default(),
                state,
            }
        }

        fn drag(&mut self, from: (f32, f32), to: (f32, f32)) {
            self.send(PointerEvent::down(from.0, from.1));
            self.send(PointerEvent::moved(to.0, to.1));
            self.send(PointerEvent::up(to.0, to.1));
        }

        fn send(&mut self, event: PointerEvent) {
            let canvas = Canvas {
                working: &self.image,
                viewport: Viewport::identity(200, 200),
                config: &self.config,
            };
            handle_annotate_pointer(&mut self.state, &canvas, event);
        }

        fn key(&mut self, key: Key) -> bool {
            handle_text_key(&mut self.state, KeyEvent::new(key))
        }

        fn kinds(&self) -> Vec<&AnnotationKind> {
            self.state.layer.objects().iter().map(|o| &o.kind).collect()
        }
    }

    #[test]
    fn test_rect_preview_then_commit() {
        let mut f = Fixture::new(Tool::Rect);
        f.send(PointerEvent::down(50.0, 60.0));
        f.send(PointerEvent::moved(20.0, 100.0));
        match f.state.preview() {
            Some(crate::session::state::Preview::Shape(AnnotationKind::Rect { bounds, .. })) => {
                assert_eq!(bounds, Rect::new(20.0, 60.0, 30.0, 40.0));
            }
            other => panic!("unexpected preview {other:?}"),
        }
        assert!(f.state.layer.is_empty());
        f.send(PointerEvent::up(20.0, 100.0));
        assert_eq!(f.state.layer.len(), 1);
        assert!(f.state.preview().is_none());
    }

    #[test]
    fn test_circle_bounds_from_midpoint() {
        let mut f = Fixture::new(Tool::Circle);
        f.drag((10.0, 10.0), (50.0, 30.0));
        match f.kinds()[0] {
            AnnotationKind::Ellipse { bounds, .. } => {
                assert_eq!(bounds.center(), Point::new(30.0, 20.0));
                assert_eq!((bounds.width / 2.0, bounds.height / 2.0), (20.0, 10.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_arrow_built_on_release_only() {
        let mut f = Fixture::new(Tool::Arrow);
        f.send(PointerEvent::down(10.0, 10.0));
        f.send(PointerEvent::moved(60.0, 10.0));
        assert!(f.state.preview().is_none());
        f.send(PointerEvent::up(110.0, 10.0));
        match f.kinds()[0] {
            AnnotationKind::Arrow { start, end, .. } => {
                assert_eq!(*start, Point::new(10.0, 10.0));
                assert_eq!(*end, Point::new(110.0, 10.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_blur_small_region_rejected() {
        let mut f = Fixture::new(Tool::Blur);
        f.drag((10.0, 10.0), (16.0, 16.0));
        assert!(f.state.layer.is_empty());
        assert!(f.state.preview().is_none());
    }

    #[test]
    fn test_blur_samples_working_image() {
        let mut f = Fixture::new(Tool::Blur);
        f.send(PointerEvent::down(10.0, 10.0));
        f.send(PointerEvent::moved(60.0, 40.0));
        assert_eq!(
            f.state.preview(),
            Some(crate::session::state::Preview::PendingRedaction(Rect::new(
                10.0, 10.0, 50.0, 30.0
            )))
        );
        f.send(PointerEvent::up(60.0, 40.0));
        match f.kinds()[0] {
            AnnotationKind::Redaction { bounds, blocks, .. } => {
                assert_eq!(*bounds, Rect::new(10.0, 10.0, 50.0, 30.0));
                assert!(blocks.iter().all(|b| b.color == [10, 20, 30]));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_freehand_collects_points() {
        let mut f = Fixture::new(Tool::Freehand);
        f.send(PointerEvent::down(0.0, 0.0));
        for i in 1..=5 {
            f.send(PointerEvent::moved(i as f32 * 3.0, i as f32));
        }
        f.send(PointerEvent::up(15.0, 5.0));
        match f.kinds()[0] {
            AnnotationKind::Freehand { points, .. } => assert_eq!(points.len(), 6),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_text_placeholder_replaced_on_type() {
        let mut f = Fixture::new(Tool::Text);
        f.send(PointerEvent::down(30.0, 40.0));
        f.send(PointerEvent::up(30.0, 40.0));
        let id = f.state.editing_text.expect("text should have focus");
        assert!(f.key(Key::Character('H')));
        assert!(f.key(Key::Character('i')));
        assert!(f.key(Key::Enter));
        assert_eq!(f.state.editing_text, None);
        match &f.state.layer.get(id).unwrap().kind {
            AnnotationKind::Text {
                content,
                font_size,
                position,
                ..
            } => {
                assert_eq!(content, "Hi");
                assert_eq!(*font_size, ToolSettings::default().font_size);
                assert_eq!(*position, Point::new(30.0, 40.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_emptied_text_removed_on_finish() {
        let mut f = Fixture::new(Tool::Text);
        f.send(PointerEvent::down(30.0, 40.0));
        f.send(PointerEvent::up(30.0, 40.0));
        assert!(f.key(Key::Backspace));
        assert!(f.key(Key::Escape));
        assert!(f.state.layer.is_empty());
    }

    #[test]
    fn test_select_click_and_marquee() {
        let mut f = Fixture::new(Tool::Rect);
        f.drag((10.0, 10.0), (30.0, 30.0));
        f.drag((100.0, 100.0), (130.0, 130.0));
        f.drag((160.0, 10.0), (190.0, 30.0));
        let ids: Vec<_> = f.state.layer.objects().iter().map(|o| o.id).collect();

        f.state.active_tool = Tool::Select;
        f.send(PointerEvent::down(20.0, 20.0));
        f.send(PointerEvent::up(20.0, 20.0));
        assert_eq!(f.state.selection, BTreeSet::from([ids[0]]));

        f.send(PointerEvent::down(115.0, 115.0).with_modifiers(Modifiers::SHIFT));
        f.send(PointerEvent::up(115.0, 115.0));
        assert_eq!(f.state.selection, BTreeSet::from([ids[0], ids[1]]));

        f.drag((150.0, 0.0), (199.0, 50.0));
        assert_eq!(f.state.selection, BTreeSet::from([ids[2]]));
    }

    #[test]
    fn test_drag_moves_selection() {
        let mut f = Fixture::new(Tool::Rect);
        f.drag((10.0, 10.0), (30.0, 30.0));
        f.state.active_tool = Tool::Select;
        f.drag((20.0, 20.0), (70.0, 25.0));
        match f.kinds()[0] {
            AnnotationKind::Rect { bounds, .. } => {
                assert_eq!(*bounds, Rect::new(60.0, 15.0, 20.0, 20.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_drawing_over_redaction_leaves_it_in_place() {
        let mut f = Fixture::new(Tool::Blur);
        f.drag((10.0, 10.0), (110.0, 110.0));
        f.state.active_tool = Tool::Rect;
        f.drag((40.0, 40.0), (90.0, 90.0));
        f.state.active_tool = Tool::Arrow;
        f.drag((50.0, 50.0), (100.0, 60.0));

        let kinds = f.kinds();
        assert_eq!(kinds.len(), 3);
        match kinds[0] {
            AnnotationKind::Redaction { bounds, .. } => {
                assert_eq!(*bounds, Rect::new(10.0, 10.0, 100.0, 100.0));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(kinds[1], AnnotationKind::Rect { bounds, .. } if *bounds == Rect::new(40.0, 40.0, 50.0, 50.0)));
        assert!(matches!(kinds[2], AnnotationKind::Arrow { .. }));
        assert!(f.state.selection.is_empty());
    }

    #[test]
    fn test_text_tool_refocuses_existing_label() {
        let mut f = Fixture::new(Tool::Text);
        f.send(PointerEvent::down(30.0, 40.0));
        f.send(PointerEvent::up(30.0, 40.0));
        assert!(f.key(Key::Character('A')));
        assert!(f.key(Key::Enter));

        f.send(PointerEvent::down(32.0, 42.0));
        f.send(PointerEvent::up(32.0, 42.0));
        assert_eq!(f.state.layer.len(), 1);
        assert!(f.key(Key::Character('B')));
        match f.kinds()[0] {
            AnnotationKind::Text { content, .. } => assert_eq!(content, "AB"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_new_shapes_use_tool_settings() {
        let mut f = Fixture::new(Tool::Rect);
        let green = ShapeColor::from_rgb_u8(0, 200, 0);
        f.state.tool_settings.color = green;
        f.state.tool_settings.stroke_width = 7.0;
        f.drag((10.0, 10.0), (30.0, 30.0));
        match f.kinds()[0] {
            AnnotationKind::Rect {
                color,
                stroke_width,
                ..
            } => {
                assert_eq!(*color, green);
                assert_eq!(*stroke_width, 7.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
