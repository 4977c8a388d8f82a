//! Drawing primitives for particle sprites.
//!
//! A `Sprite` is a small square RGBA f64 buffer that a particle paints its
//! glow layers into before it is composited onto the frame.
//!
//! - `Sprite::reset` - Resize and clear, reusing the allocation
//! - `Sprite::fill_circle` - Filled circle that overwrites covered pixels
//! - `circle_span` - Pixel coordinates covered by a filled circle

use glam::DVec2;

/// Square RGBA buffer, row-major, 4 channels per pixel in [0.0, 1.0].
#[derive(Debug, Clone, Default)]
pub struct Sprite {
    size: usize,
    data: Vec<f64>,
}

impl Sprite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize to `size`×`size` and clear to transparent.
    ///
    /// The backing buffer grows as needed but never shrinks, so one scratch
    /// sprite can serve every particle in a frame.
    pub fn reset(&mut self, size: usize) {
        let required = size * size * 4;
        self.size = size;
        if self.data.len() < required {
            self.data.resize(required, 0.0);
        }
        self.data[..required].fill(0.0);
    }

    /// Side length in pixels.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Center of the sprite in pixel space.
    #[inline]
    pub fn center(&self) -> DVec2 {
        let half = self.size as f64 * 0.5;
        DVec2::new(half, half)
    }

    /// RGBA value at (row, col).
    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> [f64; 4] {
        let idx = (row * self.size + col) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Active RGBA data (size * size * 4 values).
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data[..self.size * self.size * 4]
    }

    /// Paint a filled circle, replacing (not blending) covered pixels.
    ///
    /// A pixel is covered when its center lies within `radius` of `center`.
    pub fn fill_circle(&mut self, center: DVec2, radius: f64, rgba: [f64; 4]) {
        let size = self.size;
        for (row, col) in circle_span(center, radius, (size, size)) {
            let idx = (row * size + col) * 4;
            self.data[idx..idx + 4].copy_from_slice(&rgba);
        }
    }
}

/// Generate (row, col) coordinates of a filled circle clipped to `shape`.
///
/// Uses the equation x² + y² <= r² evaluated at pixel centers.
pub fn circle_span(
    center: DVec2,
    radius: f64,
    shape: (usize, usize),
) -> impl Iterator<Item = (usize, usize)> {
    let (h, w) = shape;
    let r_sq = radius * radius;

    let (min_row, max_row, min_col, max_col) = if radius > 0.0 {
        (
            (center.y - radius).floor().max(0.0) as usize,
            ((center.y + radius).ceil().max(0.0) as usize).min(h),
            (center.x - radius).floor().max(0.0) as usize,
            ((center.x + radius).ceil().max(0.0) as usize).min(w),
        )
    } else {
        (0, 0, 0, 0)
    };

    (min_row..max_row).flat_map(move |row| {
        (min_col..max_col).filter_map(move |col| {
            let dx = col as f64 + 0.5 - center.x;
            let dy = row as f64 + 0.5 - center.y;
            (dx * dx + dy * dy <= r_sq).then_some((row, col))
        })
    })
}
