//! Editing session state machine
//!
//! This module contains:
//! - Session state (mode, tool, crop selection, annotation layer)
//! - Message types for host input
//! - Crop-mode pointer handling
//! - Keyboard shortcuts

pub mod crop;
pub mod messages;
pub mod shortcuts;
pub mod state;

use image::RgbaImage;

use crate::config::EditorConfig;
use crate::domain::Viewport;

/// Read-only context handed to every pointer handler.
///
/// Handlers receive this per call instead of holding references to the
/// session, so the current raster, scale and settings are always the ones in
/// effect when the event arrives.
#[derive(Clone, Copy)]
pub struct Canvas<'a> {
    pub working: &'a RgbaImage,
    pub viewport: Viewport,
    pub config: &'a EditorConfig,
}
