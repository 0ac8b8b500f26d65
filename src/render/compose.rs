//! Flattening and encoding of the final output raster
//!
//! Output is always at the working image's natural resolution. Cases are
//! checked in order:
//! 1. Crop mode with a pending selection: the cropped sub-image, annotations ignored
//! 2. Annotations present: the annotation layer composited over the working image
//! 3. Otherwise: the working image unchanged

use std::sync::Arc;

use image::RgbaImage;
use image::codecs::jpeg::JpegEncoder;

use super::image::PixmapSurface;
use super::surface::{RenderSurface, draw_annotations_in_order};
use crate::domain::{AnnotationKind, Rect, Viewport};
use crate::error::{EditorError, Result};

/// Everything save needs, captured at the moment save is invoked.
///
/// The snapshot shares the working raster instead of copying it and is
/// `Send`, so a host may compose it off the UI thread.
#[derive(Clone, Debug)]
pub struct ExportSnapshot {
    pub working: Arc<RgbaImage>,
    pub annotations: Vec<AnnotationKind>,
    /// Uncommitted crop selection in display coordinates
    pub pending_crop: Option<Rect>,
    pub viewport: Viewport,
    /// Working-image generation the snapshot was taken from
    pub generation: u64,
}

/// Produce the output raster for a snapshot
pub fn flatten(snapshot: &ExportSnapshot) -> Result<RgbaImage> {
    let working = snapshot.working.as_ref();

    if let Some(crop) = snapshot.pending_crop {
        match crop_natural(working, &snapshot.viewport, crop) {
            Some(cropped) => {
                if !snapshot.annotations.is_empty() {
                    log::debug!(
                        "Pending crop supersedes {} annotation(s) on save",
                        snapshot.annotations.len()
                    );
                }
                return Ok(cropped);
            }
            None => log::debug!("Pending crop {:?} is empty, ignoring it", crop),
        }
    }

    if !snapshot.annotations.is_empty() {
        return composite_annotations(working, &snapshot.annotations, &snapshot.viewport);
    }

    Ok(working.clone())
}

/// Extract a display-space rectangle from the natural-resolution raster
pub fn crop_natural(working: &RgbaImage, viewport: &Viewport, crop: Rect) -> Option<RgbaImage> {
    let natural = viewport.to_natural(crop);
    let px = natural.to_pixel_rect(working.width(), working.height())?;
    Some(image::imageops::crop_imm(working, px.x, px.y, px.width(), px.height()).to_image())
}

/// Rasterize annotations onto a transparent natural-size overlay and composite
/// it over `working`
pub fn composite_annotations(
    working: &RgbaImage,
    annotations: &[AnnotationKind],
    viewport: &Viewport,
) -> Result<RgbaImage> {
    let mut base = PixmapSurface::from_image(working, viewport)
        .ok_or_else(|| EditorError::Composite("working image has no pixels".into()))?;
    let mut overlay = PixmapSurface::overlay(viewport)
        .ok_or_else(|| EditorError::Composite("overlay has no pixels".into()))?;
    if (overlay.width(), overlay.height()) != working.dimensions() {
        return Err(EditorError::Composite(format!(
            "overlay {}x{} does not match working image {}x{}",
            overlay.width(),
            overlay.height(),
            working.width(),
            working.height()
        )));
    }

    draw_annotations_in_order(&mut overlay, annotations);
    base.draw_surface(&overlay);
    Ok(base.rasterize_to_buffer())
}

/// Encode as baseline JPEG (alpha dropped, no metadata)
pub fn encode_jpeg(img: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(EditorError::Encode)?;
    log::debug!(
        "Encoded {}x{} output ({} bytes, quality {})",
        img.width(),
        img.height(),
        bytes.len(),
        quality
    );
    Ok(bytes)
}
