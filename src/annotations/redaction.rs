//! Pixelated redaction sampling
//!
//! A redaction is a grid of opaque blocks whose colors are read once from the
//! working raster. Only the colors are kept, so the covered pixels cannot be
//! recovered from the annotation.

use image::RgbaImage;

use crate::domain::{AnnotationKind, Point, Rect, RedactionBlock, Viewport};
use crate::error::RegionError;

/// Smallest block edge in display pixels
pub const MIN_BLOCK: f32 = 8.0;
/// Largest block edge in display pixels
pub const MAX_BLOCK: f32 = 20.0;
/// Fill used when a block cannot be sampled
pub const FALLBACK_GRAY: [u8; 3] = [128, 128, 128];

/// Block edge for a region: coarser for large regions, never below 8 or above 20
pub fn block_size_for(width: f32, height: f32) -> f32 {
    (width.min(height) / 10.0).floor().clamp(MIN_BLOCK, MAX_BLOCK)
}

/// Read the RGB value at a natural-space point, clamped to the raster
fn sample_pixel(image: &RgbaImage, at: Point) -> Result<[u8; 3], RegionError> {
    let (w, h) = image.dimensions();
    let x = at.x.floor() as i64;
    let y = at.y.floor() as i64;
    if w == 0 || h == 0 || !at.x.is_finite() || !at.y.is_finite() {
        return Err(RegionError::SampleOutOfBounds {
            x,
            y,
            width: w,
            height: h,
        });
    }
    let cx = x.clamp(0, w as i64 - 1) as u32;
    let cy = y.clamp(0, h as i64 - 1) as u32;
    let [r, g, b, _] = image.get_pixel(cx, cy).0;
    Ok([r, g, b])
}

/// Split `region` into a block grid and sample each block's center.
///
/// `region` is in display space; `viewport` maps it onto `image`.
pub fn sample_blocks(region: Rect, image: &RgbaImage, viewport: &Viewport) -> Vec<RedactionBlock> {
    let block = block_size_for(region.width, region.height);
    let mut blocks = Vec::new();

    let mut by = 0.0;
    while by < region.height {
        let bh = block.min(region.height - by);
        let mut bx = 0.0;
        while bx < region.width {
            let bw = block.min(region.width - bx);
            let center = Point::new(region.x + bx + bw * 0.5, region.y + by + bh * 0.5);
            let color = match sample_pixel(image, viewport.to_natural_point(center)) {
                Ok(color) => color,
                Err(err) => {
                    log::trace!("Redaction sample fell back to gray: {}", err);
                    FALLBACK_GRAY
                }
            };
            blocks.push(RedactionBlock {
                x: bx,
                y: by,
                width: bw,
                height: bh,
                color,
            });
            bx += block;
        }
        by += block;
    }

    blocks
}

/// Build a redaction over `region`, or reject it if too small after clamping
pub fn build_redaction(
    region: Rect,
    image: &RgbaImage,
    viewport: &Viewport,
    min_size: f32,
) -> Result<AnnotationKind, RegionError> {
    let region = region.clamp_to(viewport.display)?;
    if region.width < min_size || region.height < min_size {
        return Err(RegionError::InvalidRegion);
    }
    Ok(AnnotationKind::Redaction {
        bounds: region,
        block_size: block_size_for(region.width, region.height),
        blocks: sample_blocks(region, image, viewport),
    })
}
