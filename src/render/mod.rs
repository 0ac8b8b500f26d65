//! Annotation rendering module
//!
//! This module contains:
//! - Geometry constants shared by previews and output rendering
//! - The toolkit-agnostic rendering surface trait
//! - A tiny-skia surface for full-resolution output
//! - Flattening and encoding of the saved raster

pub mod compose;
pub mod geometry;
pub mod image;
pub mod surface;
