//! Editing session owner and host command dispatch

use std::sync::Arc;

use image::RgbaImage;

use crate::annotations::handlers::{finish_text_edit, handle_annotate_pointer, handle_text_key};
use crate::capture::SourceImage;
use crate::config::EditorConfig;
use crate::domain::{
    AnnotationKind, MIN_CROP_EDGE, ObjectId, Rect, Size, Viewport, centered_crop,
};
use crate::error::{EditorError, Result};
use crate::render::compose::{self, ExportSnapshot};
use crate::session::Canvas;
use crate::session::crop::handle_crop_pointer;
use crate::session::messages::{EditorMsg, KeyEvent, PointerEvent};
use crate::session::shortcuts::handle_key_event;
use crate::session::state::{EditorState, Mode, Preview, Tool, ToolSetting, ToolSettings};

/// One open image and everything edited on it
#[derive(Debug)]
pub struct EditorSession {
    source: SourceImage,
    working: Arc<RgbaImage>,
    /// Bumped whenever `working` is replaced
    generation: u64,
    viewport: Viewport,
    state: EditorState,
}

impl EditorSession {
    fn new(source: SourceImage, tool_settings: ToolSettings) -> Self {
        let viewport = Viewport::identity(source.width(), source.height());
        Self {
            working: source.rgba.clone(),
            source,
            generation: 0,
            viewport,
            state: EditorState::new(viewport.display, tool_settings),
        }
    }

    /// Replace the working raster, keeping the display scale
    fn replace_working(&mut self, working: Arc<RgbaImage>) {
        self.viewport = self.viewport.rescaled(working.width(), working.height());
        self.working = working;
        self.generation += 1;
    }

    fn drop_annotations(&mut self) {
        let state = &mut self.state;
        state.editing_text = None;
        state.replace_text_on_type = false;
        state.layer.clear();
        state.clear_selection();
        state.cancel_interaction();
    }

    fn revert(&mut self) {
        if self.state.crop_applied {
            self.replace_working(self.source.rgba.clone());
            self.state.crop_applied = false;
            log::debug!(
                "Reverted crop, working image is {}x{} again",
                self.working.width(),
                self.working.height()
            );
        }
        self.drop_annotations();
        self.recenter_crop();
    }

    fn recenter_crop(&mut self) {
        let display = self.viewport.display;
        self.state.crop_selection = Some(centered_crop(display.width, display.height));
    }
}

/// `rect` clamped to `bounds`, if both edges are still at least `MIN_CROP_EDGE`
fn usable_crop(rect: Rect, bounds: Size) -> Option<Rect> {
    rect.clamp_to(bounds)
        .ok()
        .filter(|r| r.width >= MIN_CROP_EDGE && r.height >= MIN_CROP_EDGE)
}

/// The editor core a host drives with [`EditorMsg`]s.
///
/// At most one session is open at a time. Every call that needs a session
/// fails with [`EditorError::NoActiveSession`] when none is open.
#[derive(Debug, Default)]
pub struct Editor {
    config: EditorConfig,
    session: Option<EditorSession>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Decode `bytes` and start a session on it, replacing any open session
    pub fn open_session(&mut self, bytes: &[u8]) -> Result<()> {
        let source = SourceImage::decode(bytes)?;
        self.start(source);
        Ok(())
    }

    /// Start a session on an already decoded raster
    pub fn open_session_image(&mut self, rgba: RgbaImage) {
        self.start(SourceImage::from_rgba(rgba));
    }

    fn start(&mut self, source: SourceImage) {
        if self.session.is_some() {
            log::debug!("Replacing open editing session");
        }
        log::info!(
            "Opened editing session on {}x{} image",
            source.width(),
            source.height()
        );
        self.session = Some(EditorSession::new(
            source,
            ToolSettings::from_config(&self.config),
        ));
    }

    /// Discard the session without producing output
    pub fn cancel(&mut self) {
        if self.session.take().is_none() {
            log::debug!("Cancel requested with no open session");
        }
    }

    fn session(&self) -> Result<&EditorSession> {
        self.session.as_ref().ok_or(EditorError::NoActiveSession)
    }

    fn session_mut(&mut self) -> Result<&mut EditorSession> {
        self.session.as_mut().ok_or(EditorError::NoActiveSession)
    }

    // ========================================================================
    // Read access for host rendering
    // ========================================================================

    pub fn state(&self) -> Result<&EditorState> {
        Ok(&self.session()?.state)
    }

    pub fn working_image(&self) -> Result<&RgbaImage> {
        Ok(self.session()?.working.as_ref())
    }

    pub fn viewport(&self) -> Result<Viewport> {
        Ok(self.session()?.viewport)
    }

    pub fn generation(&self) -> Result<u64> {
        Ok(self.session()?.generation)
    }

    /// In-progress shape the host should draw on top of the layer
    pub fn preview(&self) -> Result<Option<Preview>> {
        Ok(self.session()?.state.preview())
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Apply one host message
    pub fn update(&mut self, msg: EditorMsg) -> Result<()> {
        match msg {
            EditorMsg::Pointer(event) => self.handle_pointer(event),
            EditorMsg::Key(event) => self.handle_key(event),
            EditorMsg::SetMode(mode) => self.set_mode(mode),
            EditorMsg::SetTool(tool) => self.set_tool(tool),
            EditorMsg::SetToolSetting(setting) => self.set_tool_setting(setting),
            EditorMsg::SetDisplaySize(width, height) => self.set_display_size(width, height),
            EditorMsg::SetCropSelection(rect) => self.set_crop_selection(rect),
            EditorMsg::SetText(id, text) => self.set_text(id, text),
            EditorMsg::DeleteSelected => self.delete_selected(),
            EditorMsg::ClearSelection => self.clear_selection(),
            EditorMsg::ResetCrop => self.reset_crop(),
            EditorMsg::RevertCrop => self.revert_crop(),
            EditorMsg::ApplyCrop => self.apply_crop(),
            EditorMsg::ClearAnnotations => self.clear_annotations(),
            EditorMsg::ResetAll => self.reset_all(),
        }
    }

    fn handle_pointer(&mut self, event: PointerEvent) -> Result<()> {
        let config = &self.config;
        let session = self.session.as_mut().ok_or(EditorError::NoActiveSession)?;
        let canvas = Canvas {
            working: session.working.as_ref(),
            viewport: session.viewport,
            config,
        };
        match session.state.mode {
            Mode::Crop => handle_crop_pointer(&mut session.state, &canvas, event),
            Mode::Annotate => handle_annotate_pointer(&mut session.state, &canvas, event),
        }
        Ok(())
    }

    fn handle_key(&mut self, event: KeyEvent) -> Result<()> {
        let shortcut = {
            let state = &mut self.session_mut()?.state;
            if handle_text_key(state, event) {
                return Ok(());
            }
            handle_key_event(state, event)
        };
        match shortcut {
            Some(msg) => self.update(msg),
            None => Ok(()),
        }
    }

    /// Switch modes. The pending crop selection survives; any gesture is dropped.
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        let state = &mut self.session_mut()?.state;
        finish_text_edit(state);
        state.cancel_interaction();
        if state.mode != mode {
            log::debug!("Mode {:?} -> {:?}", state.mode, mode);
            state.mode = mode;
        }
        Ok(())
    }

    pub fn set_tool(&mut self, tool: Tool) -> Result<()> {
        let state = &mut self.session_mut()?.state;
        finish_text_edit(state);
        state.cancel_interaction();
        state.active_tool = tool;
        Ok(())
    }

    /// Change a tool setting. Color and stroke width also restyle the selection.
    pub fn set_tool_setting(&mut self, setting: ToolSetting) -> Result<()> {
        let state = &mut self.session_mut()?.state;
        let restyled = match setting {
            ToolSetting::Color(color) => {
                state.tool_settings.color = color;
                state.layer.restyle_color(&state.selection, color)
            }
            ToolSetting::StrokeWidth(width) => {
                state.tool_settings.stroke_width = width;
                state.layer.restyle_stroke_width(&state.selection, width)
            }
            ToolSetting::FontSize(size) => {
                state.tool_settings.font_size = size;
                0
            }
        };
        if restyled > 0 {
            log::debug!("Restyled {} selected annotation(s)", restyled);
        }
        Ok(())
    }

    /// The host now shows the working image at `width x height`.
    ///
    /// Crop selection and annotation geometry are rescaled so they stay over
    /// the same pixels.
    pub fn set_display_size(&mut self, width: f32, height: f32) -> Result<()> {
        let session = self.session_mut()?;
        if !(width > 0.0 && height > 0.0) {
            log::debug!("Ignoring display size {}x{}", width, height);
            return Ok(());
        }
        let old = session.viewport.display;
        let new = Size::new(width, height);
        if old == new {
            return Ok(());
        }
        session.state.cancel_interaction();
        session.viewport.display = new;
        if old.is_empty() {
            // No previous scale to map from.
            log::debug!("Display size set on an empty image, recentering crop");
            session.recenter_crop();
            return Ok(());
        }
        let (sx, sy) = (width / old.width, height / old.height);
        let state = &mut session.state;
        state.layer.scale_all(sx, sy);
        if let Some(r) = state.crop_selection {
            let scaled = Rect::new(r.x * sx, r.y * sy, r.width * sx, r.height * sy);
            state.crop_selection = usable_crop(scaled, new);
            if state.crop_selection.is_none() {
                log::debug!("Crop selection {:?} too small after resize, recentering", scaled);
                session.recenter_crop();
            }
        }
        Ok(())
    }

    /// Replace the crop selection. Rectangles under one pixel on either side
    /// after clamping to the image are ignored.
    pub fn set_crop_selection(&mut self, rect: Rect) -> Result<()> {
        let session = self.session_mut()?;
        match usable_crop(rect, session.viewport.display) {
            Some(clamped) => {
                session.state.cancel_interaction();
                session.state.crop_selection = Some(clamped);
            }
            None => log::debug!("Ignoring crop selection {:?}", rect),
        }
        Ok(())
    }

    /// Replace the content of a text annotation
    pub fn set_text(&mut self, id: ObjectId, text: String) -> Result<()> {
        let state = &mut self.session_mut()?.state;
        match state.layer.get_mut(id).map(|o| &mut o.kind) {
            Some(AnnotationKind::Text { content, .. }) => {
                *content = text;
                if state.editing_text == Some(id) {
                    state.replace_text_on_type = false;
                }
            }
            _ => log::debug!("No text annotation {:?}", id),
        }
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<()> {
        let state = &mut self.session_mut()?.state;
        if let Some(id) = state.editing_text
            && state.selection.contains(&id)
        {
            state.editing_text = None;
            state.replace_text_on_type = false;
        }
        let removed = state.layer.remove_all(&state.selection);
        state.clear_selection();
        state.cancel_interaction();
        log::debug!("Deleted {} annotation(s)", removed);
        Ok(())
    }

    pub fn clear_selection(&mut self) -> Result<()> {
        self.session_mut()?.state.clear_selection();
        Ok(())
    }

    /// Re-center the pending selection, or revert if a crop was applied
    pub fn reset_crop(&mut self) -> Result<()> {
        let session = self.session_mut()?;
        session.state.cancel_interaction();
        if session.state.crop_applied {
            session.revert();
        } else {
            session.recenter_crop();
        }
        Ok(())
    }

    /// Restore the source image and drop annotations drawn against the crop
    pub fn revert_crop(&mut self) -> Result<()> {
        let session = self.session_mut()?;
        if !session.state.crop_applied {
            log::debug!("Revert requested with no applied crop");
            return Ok(());
        }
        session.revert();
        Ok(())
    }

    /// Replace the working image with the crop selection.
    ///
    /// Annotations move with the content they were drawn on.
    pub fn apply_crop(&mut self) -> Result<()> {
        let session = self.session_mut()?;
        session.state.cancel_interaction();
        let Some(selection) = session.state.crop_selection else {
            log::debug!("Apply crop requested with no selection");
            return Ok(());
        };
        let Some(cropped) = compose::crop_natural(&session.working, &session.viewport, selection)
        else {
            log::debug!("Crop selection {:?} is empty, ignoring it", selection);
            return Ok(());
        };
        log::debug!(
            "Applied crop {:?} -> {}x{}",
            session.viewport.to_natural(selection),
            cropped.width(),
            cropped.height()
        );
        session.replace_working(Arc::new(cropped));
        let state = &mut session.state;
        state.layer.translate_all(-selection.x, -selection.y);
        state.crop_selection = None;
        state.crop_applied = true;
        Ok(())
    }

    pub fn clear_annotations(&mut self) -> Result<()> {
        self.session_mut()?.drop_annotations();
        Ok(())
    }

    /// Revert any crop, drop annotations and return to crop mode
    pub fn reset_all(&mut self) -> Result<()> {
        let session = self.session_mut()?;
        session.revert();
        session.state.mode = Mode::Crop;
        Ok(())
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Capture what save would write, as of now
    pub fn snapshot(&self) -> Result<ExportSnapshot> {
        let session = self.session()?;
        Ok(ExportSnapshot {
            working: session.working.clone(),
            annotations: session
                .state
                .layer
                .objects()
                .iter()
                .map(|o| o.kind.clone())
                .collect(),
            pending_crop: session.state.pending_crop(),
            viewport: session.viewport,
            generation: session.generation,
        })
    }

    /// The output raster, before encoding
    pub fn flatten(&self) -> Result<RgbaImage> {
        compose::flatten(&self.snapshot()?)
    }

    /// The output raster encoded as JPEG
    pub fn save(&self) -> Result<Vec<u8>> {
        let snapshot = self.snapshot()?;
        let output = compose::flatten(&snapshot)?;
        log::info!(
            "Saving {}x{} output (generation {})",
            output.width(),
            output.height(),
            snapshot.generation
        );
        compose::encode_jpeg(&output, self.config.jpeg_quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeColor;
    use crate::domain::{Point, arrow_head};
    use crate::session::messages::Key;
    use image::Rgba;
    use std::collections::BTreeSet;
    use std::f32::consts::PI;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    fn editor_with(w: u32, h: u32) -> Editor {
        let mut editor = Editor::default();
        editor.open_session_image(gradient(w, h));
        editor
    }

    fn drag(editor: &mut Editor, from: (f32, f32), to: (f32, f32)) {
        editor.update(EditorMsg::pointer_down(from.0, from.1)).unwrap();
        editor.update(EditorMsg::pointer_move(to.0, to.1)).unwrap();
        editor.update(EditorMsg::pointer_up(to.0, to.1)).unwrap();
    }

    fn layer_len(editor: &Editor) -> usize {
        editor.state().unwrap().layer.len()
    }

    #[test]
    fn test_apply_crop_maps_display_to_natural() {
        let mut editor = editor_with(1000, 800);
        editor.set_display_size(500.0, 400.0).unwrap();
        editor
            .update(EditorMsg::SetCropSelection(Rect::new(100.0, 100.0, 400.0, 300.0)))
            .unwrap();

        editor.update(EditorMsg::ApplyCrop).unwrap();

        let working = editor.working_image().unwrap();
        assert_eq!(working.dimensions(), (800, 600));
        assert_eq!(working.get_pixel(0, 0), gradient(1000, 800).get_pixel(200, 200));
        assert_eq!(editor.viewport().unwrap().display, Size::new(400.0, 300.0));
        assert_eq!(editor.generation().unwrap(), 1);
        let state = editor.state().unwrap();
        assert!(state.crop_applied);
        assert_eq!(state.crop_selection, None);
    }

    #[test]
    fn test_revert_restores_source_and_clears_annotations() {
        let mut editor = editor_with(300, 200);
        editor.update(EditorMsg::ApplyCrop).unwrap();
        editor.set_mode(Mode::Annotate).unwrap();
        editor.set_tool(Tool::Rect).unwrap();
        drag(&mut editor, (10.0, 10.0), (60.0, 60.0));
        assert_eq!(layer_len(&editor), 1);

        editor.update(EditorMsg::RevertCrop).unwrap();

        assert_eq!(*editor.working_image().unwrap(), gradient(300, 200));
        let state = editor.state().unwrap();
        assert!(!state.crop_applied);
        assert!(state.layer.is_empty());
        assert_eq!(state.crop_selection, Some(centered_crop(300.0, 200.0)));
    }

    #[test]
    fn test_restyle_touches_only_selected_non_redactions() {
        let mut editor = editor_with(400, 400);
        editor.set_mode(Mode::Annotate).unwrap();
        editor.set_tool(Tool::Rect).unwrap();
        drag(&mut editor, (10.0, 10.0), (50.0, 50.0));
        drag(&mut editor, (100.0, 10.0), (150.0, 50.0));
        drag(&mut editor, (200.0, 10.0), (250.0, 50.0));
        editor.set_tool(Tool::Blur).unwrap();
        drag(&mut editor, (10.0, 200.0), (100.0, 300.0));
        assert_eq!(layer_len(&editor), 4);

        let ids: Vec<ObjectId> = editor.state().unwrap().layer.objects().iter().map(|o| o.id).collect();
        let redaction_before = editor.state().unwrap().layer.get(ids[3]).cloned();
        editor.session_mut().unwrap().state.selection = BTreeSet::from([ids[0], ids[1], ids[3]]);

        let blue = ShapeColor::from_rgb_u8(0, 0, 255);
        editor
            .update(EditorMsg::SetToolSetting(ToolSetting::Color(blue)))
            .unwrap();
        editor
            .update(EditorMsg::SetToolSetting(ToolSetting::StrokeWidth(7.0)))
            .unwrap();

        let state = editor.state().unwrap();
        let style = |id| match state.layer.get(id).map(|o| &o.kind) {
            Some(AnnotationKind::Rect {
                color,
                stroke_width,
                ..
            }) => (*color, *stroke_width),
            other => panic!("expected rect, got {other:?}"),
        };
        assert_eq!(style(ids[0]), (blue, 7.0));
        assert_eq!(style(ids[1]), (blue, 7.0));
        assert_eq!(style(ids[2]), (ShapeColor::default(), 3.0));
        assert_eq!(state.layer.get(ids[3]).cloned(), redaction_before);
        assert_eq!(state.tool_settings.color, blue);
    }

    #[test]
    fn test_small_blur_is_rejected() {
        let mut editor = editor_with(200, 200);
        editor.set_mode(Mode::Annotate).unwrap();
        editor.set_tool(Tool::Blur).unwrap();
        drag(&mut editor, (20.0, 20.0), (26.0, 26.0));
        assert_eq!(layer_len(&editor), 0);
        assert_eq!(editor.preview().unwrap(), None);
    }

    #[test]
    fn test_arrow_head_geometry() {
        let mut editor = editor_with(200, 200);
        editor.set_mode(Mode::Annotate).unwrap();
        editor.set_tool(Tool::Arrow).unwrap();
        drag(&mut editor, (10.0, 10.0), (110.0, 10.0));

        let state = editor.state().unwrap();
        let Some(AnnotationKind::Arrow {
            start,
            end,
            stroke_width,
            ..
        }) = state.layer.objects().first().map(|o| &o.kind)
        else {
            panic!("expected an arrow");
        };
        assert_eq!((*start, *end), (Point::new(10.0, 10.0), Point::new(110.0, 10.0)));
        let head = arrow_head(*start, *end, *stroke_width);
        let back_x = 110.0 - 21.0 * (PI / 6.0).cos();
        let back_dy = 21.0 * (PI / 6.0).sin();
        assert_eq!(head[0], Point::new(110.0, 10.0));
        assert!((head[1].x - back_x).abs() < 1e-3 && (head[1].y - (10.0 + back_dy)).abs() < 1e-3);
        assert!((head[2].x - back_x).abs() < 1e-3 && (head[2].y - (10.0 - back_dy)).abs() < 1e-3);
    }

    #[test]
    fn test_save_with_pending_crop_excludes_annotations() {
        let mut editor = editor_with(400, 300);
        editor.set_mode(Mode::Annotate).unwrap();
        editor.set_tool(Tool::Rect).unwrap();
        drag(&mut editor, (10.0, 10.0), (60.0, 60.0));
        drag(&mut editor, (200.0, 100.0), (260.0, 160.0));
        editor.set_mode(Mode::Crop).unwrap();

        let crop = centered_crop(400.0, 300.0);
        let expected = crop
            .to_pixel_rect(400, 300)
            .map(|px| {
                image::imageops::crop_imm(&gradient(400, 300), px.x, px.y, px.width(), px.height())
                    .to_image()
            })
            .unwrap();
        assert_eq!(editor.flatten().unwrap(), expected);

        let bytes = editor.save().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(
            (decoded.width(), decoded.height()),
            expected.dimensions()
        );
    }

    #[test]
    fn test_save_in_annotate_mode_composites() {
        let mut editor = Editor::default();
        editor.open_session_image(RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255])));
        editor.set_mode(Mode::Annotate).unwrap();
        editor.set_tool(Tool::Rect).unwrap();
        drag(&mut editor, (20.0, 20.0), (80.0, 80.0));

        let out = editor.flatten().unwrap();
        assert_eq!(out.dimensions(), (100, 100));
        assert_ne!(out.get_pixel(20, 50).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(50, 50).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_calls_without_session_fail() {
        let mut editor = Editor::default();
        assert!(matches!(
            editor.update(EditorMsg::ApplyCrop),
            Err(EditorError::NoActiveSession)
        ));
        assert!(matches!(editor.save(), Err(EditorError::NoActiveSession)));
        assert!(matches!(editor.flatten(), Err(EditorError::NoActiveSession)));
        assert!(matches!(
            editor.set_tool(Tool::Arrow),
            Err(EditorError::NoActiveSession)
        ));

        editor.open_session_image(gradient(10, 10));
        editor.cancel();
        assert!(!editor.has_session());
        assert!(matches!(editor.save(), Err(EditorError::NoActiveSession)));
    }

    #[test]
    fn test_open_session_rejects_undecodable_bytes() {
        let mut editor = Editor::default();
        assert!(matches!(
            editor.open_session(&[0, 1, 2, 3]),
            Err(EditorError::OpenSessionFailed(_))
        ));
        assert!(!editor.has_session());
    }

    #[test]
    fn test_mode_switch_keeps_crop_and_cancels_draw() {
        let mut editor = editor_with(200, 200);
        let crop = editor.state().unwrap().crop_selection;
        editor.set_mode(Mode::Annotate).unwrap();
        editor.set_tool(Tool::Rect).unwrap();
        editor.update(EditorMsg::pointer_down(10.0, 10.0)).unwrap();
        editor.update(EditorMsg::pointer_move(50.0, 50.0)).unwrap();
        assert!(editor.preview().unwrap().is_some());

        editor.set_mode(Mode::Crop).unwrap();
        assert_eq!(editor.preview().unwrap(), None);
        assert_eq!(editor.state().unwrap().crop_selection, crop);
        assert_eq!(layer_len(&editor), 0);
    }

    #[test]
    fn test_keys_edit_text_then_delete() {
        let mut editor = editor_with(200, 200);
        editor.set_mode(Mode::Annotate).unwrap();
        editor.set_tool(Tool::Text).unwrap();
        editor.update(EditorMsg::pointer_down(20.0, 20.0)).unwrap();
        editor.update(EditorMsg::pointer_up(20.0, 20.0)).unwrap();
        for c in "ok".chars() {
            editor.update(EditorMsg::key(Key::Character(c))).unwrap();
        }
        // Enter leaves edit focus, so Backspace then deletes the selected label.
        editor.update(EditorMsg::key(Key::Enter)).unwrap();
        match &editor.state().unwrap().layer.objects()[0].kind {
            AnnotationKind::Text { content, .. } => assert_eq!(content, "ok"),
            other => panic!("expected text, got {other:?}"),
        }
        editor.update(EditorMsg::key(Key::Backspace)).unwrap();
        assert_eq!(layer_len(&editor), 0);
    }

    #[test]
    fn test_enter_applies_crop() {
        let mut editor = editor_with(100, 80);
        editor.update(EditorMsg::key(Key::Enter)).unwrap();
        assert!(editor.state().unwrap().crop_applied);
        assert_eq!(editor.working_image().unwrap().dimensions(), (90, 72));
    }

    #[test]
    fn test_display_resize_rescales_geometry() {
        let mut editor = editor_with(400, 400);
        editor.set_mode(Mode::Annotate).unwrap();
        editor.set_tool(Tool::Rect).unwrap();
        drag(&mut editor, (100.0, 100.0), (200.0, 200.0));

        editor
            .update(EditorMsg::SetDisplaySize(200.0, 200.0))
            .unwrap();

        let state = editor.state().unwrap();
        assert_eq!(state.crop_selection, Some(centered_crop(200.0, 200.0)));
        match &state.layer.objects()[0].kind {
            AnnotationKind::Rect { bounds, .. } => {
                assert_eq!(*bounds, Rect::new(50.0, 50.0, 50.0, 50.0))
            }
            other => panic!("expected rect, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_crop_moves_annotations_with_content() {
        let mut editor = editor_with(100, 100);
        editor.set_mode(Mode::Annotate).unwrap();
        editor.set_tool(Tool::Rect).unwrap();
        drag(&mut editor, (20.0, 20.0), (40.0, 40.0));
        editor.set_mode(Mode::Crop).unwrap();
        editor
            .set_crop_selection(Rect::new(10.0, 10.0, 60.0, 60.0))
            .unwrap();
        editor.apply_crop().unwrap();

        match &editor.state().unwrap().layer.objects()[0].kind {
            AnnotationKind::Rect { bounds, .. } => {
                assert_eq!(*bounds, Rect::new(10.0, 10.0, 20.0, 20.0))
            }
            other => panic!("expected rect, got {other:?}"),
        }
    }

    #[test]
    fn test_crop_selection_is_clamped() {
        let mut editor = editor_with(100, 100);
        editor
            .set_crop_selection(Rect::new(50.0, -10.0, 100.0, 40.0))
            .unwrap();
        assert_eq!(
            editor.state().unwrap().crop_selection,
            Some(Rect::new(50.0, 0.0, 50.0, 30.0))
        );
        editor
            .set_crop_selection(Rect::new(200.0, 200.0, 10.0, 10.0))
            .unwrap();
        assert_eq!(
            editor.state().unwrap().crop_selection,
            Some(Rect::new(50.0, 0.0, 50.0, 30.0))
        );
    }

    #[test]
    fn test_sub_pixel_crop_selection_is_ignored() {
        let mut editor = editor_with(100, 100);
        let before = editor.state().unwrap().crop_selection;
        editor
            .set_crop_selection(Rect::new(0.0, 0.0, 0.5, 0.5))
            .unwrap();
        assert_eq!(editor.state().unwrap().crop_selection, before);

        // Grabbing the corner of the real selection still resizes cleanly.
        editor.update(EditorMsg::pointer_down(0.0, 0.0)).unwrap();
        editor.update(EditorMsg::pointer_move(5.0, 5.0)).unwrap();
        editor.update(EditorMsg::pointer_up(5.0, 5.0)).unwrap();
        let selection = editor.state().unwrap().crop_selection.unwrap();
        assert!(selection.width >= MIN_CROP_EDGE && selection.height >= MIN_CROP_EDGE);
    }

    #[test]
    fn test_mode_switch_mid_crop_draw_restores_selection() {
        let mut editor = editor_with(100, 100);
        editor
            .set_crop_selection(Rect::new(20.0, 20.0, 30.0, 30.0))
            .unwrap();
        editor.update(EditorMsg::pointer_down(0.0, 0.0)).unwrap();
        editor.update(EditorMsg::pointer_move(0.5, 0.5)).unwrap();
        editor.set_mode(Mode::Annotate).unwrap();
        editor.set_mode(Mode::Crop).unwrap();
        assert_eq!(
            editor.state().unwrap().crop_selection,
            Some(Rect::new(20.0, 20.0, 30.0, 30.0))
        );

        // Dragging from the image corner draws a fresh selection without panicking.
        drag(&mut editor, (0.0, 0.0), (3.0, 3.0));
        assert_eq!(
            editor.state().unwrap().crop_selection,
            Some(Rect::new(0.0, 0.0, 3.0, 3.0))
        );
    }

    #[test]
    fn test_display_resize_drops_collapsed_selection() {
        let mut editor = editor_with(1000, 1000);
        editor
            .set_crop_selection(Rect::new(10.0, 10.0, 2.0, 2.0))
            .unwrap();
        editor.set_display_size(100.0, 100.0).unwrap();
        assert_eq!(
            editor.state().unwrap().crop_selection,
            Some(centered_crop(100.0, 100.0))
        );
    }

    #[test]
    fn test_display_size_on_empty_image() {
        let mut editor = Editor::default();
        editor.open_session_image(RgbaImage::new(0, 0));
        editor.set_display_size(200.0, 100.0).unwrap();
        let state = editor.state().unwrap();
        let selection = state.crop_selection.unwrap();
        assert!(selection.x.is_finite() && selection.width.is_finite());
        assert_eq!(selection, centered_crop(200.0, 100.0));
        assert_eq!(editor.viewport().unwrap().display, Size::new(200.0, 100.0));
    }

    #[test]
    fn test_reset_all_returns_to_crop_mode() {
        let mut editor = editor_with(100, 100);
        editor.apply_crop().unwrap();
        editor.set_mode(Mode::Annotate).unwrap();
        editor.set_tool(Tool::Rect).unwrap();
        drag(&mut editor, (5.0, 5.0), (30.0, 30.0));

        editor.update(EditorMsg::ResetAll).unwrap();

        let state = editor.state().unwrap();
        assert_eq!(state.mode, Mode::Crop);
        assert!(!state.crop_applied);
        assert!(state.layer.is_empty());
        assert_eq!(editor.working_image().unwrap().dimensions(), (100, 100));
    }
}
