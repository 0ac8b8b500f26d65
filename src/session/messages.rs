//! Message types for an editing session
//!
//! This module contains:
//! - Normalized pointer and keyboard events from the host
//! - EditorMsg, the single entry point for host commands

use super::state::{Mode, Tool, ToolSetting};
use crate::domain::{Point, Rect};

// ============================================================================
// Input Event Types
// ============================================================================

/// Pointer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// Keyboard modifiers held during an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        alt: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        control: false,
        alt: false,
    };
}

/// Pointer event in display coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Point,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Down, x, y)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Move, x, y)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Up, x, y)
    }

    fn new(kind: PointerKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Enter,
    Character(char),
}

/// Key press from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }
}

// ============================================================================
// Host Commands
// ============================================================================

/// Everything the host can ask of an open session
#[derive(Debug, Clone, PartialEq)]
pub enum EditorMsg {
    /// Pointer input routed through the active mode/tool
    Pointer(PointerEvent),
    /// Keyboard input (text editing or shortcuts)
    Key(KeyEvent),
    /// Switch between crop and annotate mode
    SetMode(Mode),
    /// Pick the annotate-mode tool
    SetTool(Tool),
    /// Change color, stroke width or font size
    SetToolSetting(ToolSetting),
    /// The working image is now shown at this size
    SetDisplaySize(f32, f32),
    /// Replace the crop selection (display coordinates, clamped to the image)
    SetCropSelection(Rect),
    /// Replace the content of a text annotation
    SetText(crate::domain::ObjectId, String),
    /// Delete every selected annotation
    DeleteSelected,
    /// Deselect without deleting
    ClearSelection,
    /// Re-center the crop selection, or revert an applied crop
    ResetCrop,
    /// Restore the source image and drop annotations
    RevertCrop,
    /// Replace the working image with the crop selection
    ApplyCrop,
    /// Remove every annotation
    ClearAnnotations,
    /// Revert crop, clear annotations, and return to crop mode
    ResetAll,
}

impl EditorMsg {
    pub fn pointer_down(x: f32, y: f32) -> Self {
        EditorMsg::Pointer(PointerEvent::down(x, y))
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        EditorMsg::Pointer(PointerEvent::moved(x, y))
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        EditorMsg::Pointer(PointerEvent::up(x, y))
    }

    pub fn key(key: Key) -> Self {
        EditorMsg::Key(KeyEvent::new(key))
    }
}
