//! Shared constants and math for annotation rendering

/// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
pub const BEZIER_K: f32 = 0.552_284_8;

/// Pending-redaction preview styling
pub mod pending {
    /// Dash and gap length in display pixels
    pub const DASH: [f32; 2] = [6.0, 4.0];
    /// Outline width in display pixels
    pub const STROKE: f32 = 1.5;
    /// Outline alpha (0-255)
    pub const STROKE_ALPHA: u8 = 200;
    /// Fill alpha (0-255)
    pub const FILL_ALPHA: u8 = 60;
}

/// Marquee styling
pub mod marquee {
    pub const DASH: [f32; 2] = [4.0, 4.0];
    pub const STROKE: f32 = 1.0;
}

/// Calculate ellipse center and radii from bounding box
#[inline]
pub fn ellipse_from_bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> (f32, f32, f32, f32) {
    let cx = (min_x + max_x) * 0.5;
    let cy = (min_y + max_y) * 0.5;
    let rx = ((max_x - min_x) * 0.5).max(1.0);
    let ry = ((max_y - min_y) * 0.5).max(1.0);
    (cx, cy, rx, ry)
}
