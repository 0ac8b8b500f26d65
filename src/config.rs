//! Configuration persistence for editor defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Serializable color representation for config storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for ShapeColor {
    fn default() -> Self {
        Self {
            r: 0.9,
            g: 0.1,
            b: 0.1,
        }
    }
}

impl ShapeColor {
    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::from_rgb_u8(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            255,
        ]
    }
}

/// Editor defaults persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Color for new annotations
    pub shape_color: ShapeColor,
    /// Stroke width for new shapes, in display pixels
    pub stroke_width: f32,
    /// Font size for new text labels, in display pixels
    pub font_size: f32,
    /// Placeholder content of a freshly placed text label
    pub text_placeholder: String,
    /// JPEG quality of saved output (1-100)
    pub jpeg_quality: u8,
    /// Smallest redaction edge accepted, in display pixels
    pub min_redaction_size: f32,
    /// Pointer slack when picking annotations, in display pixels
    pub hit_tolerance: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            shape_color: ShapeColor::default(),
            stroke_width: 3.0,
            font_size: 24.0,
            text_placeholder: "Text".to_string(),
            jpeg_quality: 90,
            min_redaction_size: 10.0,
            hit_tolerance: 4.0,
        }
    }
}

impl EditorConfig {
    /// Application directory under the platform config dir
    pub const APP_DIR: &'static str = "scribe-editor";

    /// Default config file location, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::APP_DIR).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from `path`, or return defaults if unavailable
    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(err) => {
                log::warn!("Could not read config {}: {}", path.display(), err);
                return Self::default();
            }
        };
        match serde_json::from_str::<Self>(&text) {
            Ok(config) => config.sanitized(),
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        match Self::default_path() {
            Some(path) => self.save_to(&path),
            None => log::error!("Could not determine config directory for saving"),
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent()
            && let Err(err) = std::fs::create_dir_all(parent)
        {
            log::error!("Could not create config dir {}: {}", parent.display(), err);
            return;
        }
        let text = match serde_json::to_string_pretty(self) {
            Ok(text) => text,
            Err(err) => {
                log::error!("Failed to serialize config: {:?}", err);
                return;
            }
        };
        if let Err(err) = std::fs::write(path, text) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    /// Clamp values a hand-edited file may have pushed out of range
    fn sanitized(mut self) -> Self {
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        self.stroke_width = self.stroke_width.max(1.0);
        self.font_size = self.font_size.max(GLYPH_MIN_SIZE);
        self.min_redaction_size = self.min_redaction_size.max(1.0);
        self.hit_tolerance = self.hit_tolerance.max(0.0);
        self
    }
}

const GLYPH_MIN_SIZE: f32 = 8.0;
