//! Pure domain types with minimal dependencies
//!
//! This module contains geometry, annotation and crop-handle types used
//! throughout the editor. Nothing here touches pixels.

pub mod annotation;
pub mod geometry;
pub mod selection;

pub use annotation::*;
pub use geometry::*;
pub use selection::*;
