//! Image input module
//!
//! This module contains:
//! - Source image decoding (image.rs)

pub mod image;

pub use self::image::SourceImage;
