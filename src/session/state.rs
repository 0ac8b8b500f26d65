//! Editor session state
//!
//! Mode, active tool, crop selection, annotation layer and the gesture in
//! progress, plus the preview the host draws for that gesture.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::annotations::AnnotationLayer;
use crate::config::{EditorConfig, ShapeColor};
use crate::domain::{AnnotationKind, DragState, ObjectId, Point, Rect, Size, centered_crop};

/// Top-level editor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Crop,
    Annotate,
}

/// Annotate-mode tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Select,
    Arrow,
    Rect,
    Circle,
    Text,
    Freehand,
    Blur,
}

/// Style applied to new annotations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    pub color: ShapeColor,
    pub stroke_width: f32,
    pub font_size: f32,
}

impl ToolSettings {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            color: config.shape_color,
            stroke_width: config.stroke_width,
            font_size: config.font_size,
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

/// A single tool setting change from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolSetting {
    Color(ShapeColor),
    StrokeWidth(f32),
    FontSize(f32),
}

/// Box-shaped draft kinds that share the start/current preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    Rect,
    Ellipse,
    Blur,
}

/// In-progress pointer gesture
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    /// Arrow tool: only the endpoints are tracked until release
    Arrow { start: Point, current: Point },
    /// Rect/Circle/Blur tools: preview box between start and current
    Box {
        kind: BoxKind,
        start: Point,
        current: Point,
    },
    /// Freehand tool: points in pointer-sampling order
    Stroke { points: Vec<Point> },
    /// Dragging the selected annotations
    MoveSelection { last: Point },
    /// Select tool on empty space
    Marquee { start: Point, current: Point },
    /// Crop mode: moving or resizing the selection
    CropDrag {
        handle: DragState,
        anchor: Point,
        origin: Rect,
    },
    /// Crop mode: drawing a fresh selection
    CropDraw {
        start: Point,
        current: Point,
        previous: Option<Rect>,
    },
}

/// Transient shape the host should draw during a gesture
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Rect or ellipse exactly as it will be committed
    Shape(AnnotationKind),
    /// Dashed, translucent box marking a pending redaction
    PendingRedaction(Rect),
    /// Freehand stroke so far
    Stroke(AnnotationKind),
    /// Selection marquee
    Marquee(Rect),
}

/// All editing state of one session
#[derive(Debug, Clone)]
pub struct EditorState {
    pub mode: Mode,
    pub active_tool: Tool,
    pub crop_selection: Option<Rect>,
    pub crop_applied: bool,
    pub layer: AnnotationLayer,
    pub selection: BTreeSet<ObjectId>,
    pub tool_settings: ToolSettings,
    pub interaction: Interaction,
    /// Text annotation receiving key input
    pub editing_text: Option<ObjectId>,
    /// The first typed character replaces the whole text (placeholder still shown)
    pub replace_text_on_type: bool,
}

impl EditorState {
    /// Fresh state for an image displayed at `display`
    pub fn new(display: Size, tool_settings: ToolSettings) -> Self {
        Self {
            mode: Mode::Crop,
            active_tool: Tool::Select,
            crop_selection: Some(centered_crop(display.width, display.height)),
            crop_applied: false,
            layer: AnnotationLayer::default(),
            selection: BTreeSet::new(),
            tool_settings,
            interaction: Interaction::Idle,
            editing_text: None,
            replace_text_on_type: false,
        }
    }

    /// Drop any gesture in progress. A half-drawn crop selection is rolled back.
    pub fn cancel_interaction(&mut self) {
        match std::mem::take(&mut self.interaction) {
            Interaction::CropDraw { previous, .. } => self.crop_selection = previous,
            Interaction::CropDrag { origin, .. } => self.crop_selection = Some(origin),
            _ => {}
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Crop selection that save would honor
    pub fn pending_crop(&self) -> Option<Rect> {
        match self.mode {
            Mode::Crop => self.crop_selection,
            Mode::Annotate => None,
        }
    }

    /// Shape the host should render for the current gesture
    pub fn preview(&self) -> Option<Preview> {
        let settings = &self.tool_settings;
        match &self.interaction {
            Interaction::Box {
                kind,
                start,
                current,
            } => {
                let bounds = Rect::from_corners(*start, *current);
                Some(match kind {
                    BoxKind::Rect => Preview::Shape(AnnotationKind::Rect {
                        bounds,
                        color: settings.color,
                        stroke_width: settings.stroke_width,
                    }),
                    BoxKind::Ellipse => Preview::Shape(AnnotationKind::Ellipse {
                        bounds,
                        color: settings.color,
                        stroke_width: settings.stroke_width,
                    }),
                    BoxKind::Blur => Preview::PendingRedaction(bounds),
                })
            }
            Interaction::Stroke { points } => Some(Preview::Stroke(AnnotationKind::Freehand {
                points: points.clone(),
                color: settings.color,
                stroke_width: settings.stroke_width,
            })),
            Interaction::Marquee { start, current } => {
                Some(Preview::Marquee(Rect::from_corners(*start, *current)))
            }
            _ => None,
        }
    }
}
