//! Source image type for an editing session

use std::sync::Arc;

use image::RgbaImage;

use crate::error::{EditorError, Result};

/// The decoded raster a session was opened with. Never modified.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub rgba: Arc<RgbaImage>,
}

impl SourceImage {
    /// Decode encoded image bytes (any format the `image` crate recognizes)
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let rgba = image::load_from_memory(bytes)
            .map_err(EditorError::OpenSessionFailed)?
            .to_rgba8();
        log::debug!(
            "SourceImage decoded: {}x{} pixels",
            rgba.width(),
            rgba.height()
        );
        Ok(Self::from_rgba(rgba))
    }

    /// Wrap an already decoded raster
    pub fn from_rgba(rgba: RgbaImage) -> Self {
        Self {
            rgba: Arc::new(rgba),
        }
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    #[test]
    fn test_decode_png() {
        let img = RgbaImage::from_pixel(7, 3, Rgba([1, 2, 3, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let source = SourceImage::decode(&bytes).unwrap();
        assert_eq!((source.width(), source.height()), (7, 3));
        assert_eq!(*source.rgba, img);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = SourceImage::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, EditorError::OpenSessionFailed(_)));
    }
}
