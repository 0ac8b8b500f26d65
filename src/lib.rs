//! Crop, annotation and redaction editor core.
//!
//! A host opens a raster with [`Editor::open_session`], feeds it normalized
//! pointer and key events as [`EditorMsg`]s, and calls [`Editor::save`] for the
//! final JPEG.

pub mod annotations;
pub mod capture;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod render;
pub mod session;

pub use crate::config::{EditorConfig, ShapeColor};
pub use crate::core::editor::Editor;
pub use crate::error::{EditorError, RegionError, Result};
pub use crate::render::compose::ExportSnapshot;
pub use crate::session::messages::{EditorMsg, Key, KeyEvent, Modifiers, PointerEvent};
pub use crate::session::state::{Mode, Tool, ToolSetting};
