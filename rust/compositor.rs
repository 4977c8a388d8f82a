//! Frame compositing.
//!
//! `Frame` is the RGBA f64 target that particle sprites are blitted onto.
//! `to_rgb8` flattens it against a background color for presentation.

use glam::DVec2;

use crate::blending::{blend_over, BlendMode};
use crate::drawing::Sprite;
use crate::error::{FlameError, Result};

/// Anything a particle can composite its sprite onto.
pub trait Canvas {
    /// Blit `sprite` so that its center lands on `center`.
    fn composite(&mut self, sprite: &Sprite, center: DVec2);
}

/// RGBA f64 frame buffer, row-major, shape (height, width, 4).
#[derive(Debug, Clone)]
pub struct Frame {
    width: usize,
    height: usize,
    blend_mode: BlendMode,
    data: Vec<f64>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FlameError::InvalidFrameSize { width, height });
        }
        Ok(Self {
            width,
            height,
            blend_mode: BlendMode::Normal,
            data: vec![0.0; width * height * 4],
        })
    }

    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// RGBA value at (row, col).
    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> [f64; 4] {
        let idx = (row * self.width + col) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Fill the whole frame with an opaque color.
    pub fn clear(&mut self, rgb: [f64; 3]) {
        for px in self.data.chunks_exact_mut(4) {
            px[..3].copy_from_slice(&rgb);
            px[3] = 1.0;
        }
    }

    /// Convert to RGB u8, alpha-compositing against `bg`.
    ///
    /// ```text
    /// out = (1 - alpha) * bg + alpha * src, clamped and scaled to [0, 255]
    /// ```
    pub fn to_rgb8(&self, bg: [f64; 3]) -> Vec<u8> {
        let mut output = vec![0u8; self.width * self.height * 3];
        rgba2rgb_impl(&self.data, bg, &mut output);
        output
    }
}

impl Canvas for Frame {
    fn composite(&mut self, sprite: &Sprite, center: DVec2) {
        let size = sprite.size();
        if size == 0 {
            return;
        }

        let origin = (center - sprite.center()).round();
        let extent = size as f64;
        // Reject off-frame and non-finite origins before any integer math
        if !(origin.x > -extent
            && origin.y > -extent
            && origin.x < self.width as f64
            && origin.y < self.height as f64)
        {
            return;
        }
        let (ox, oy) = (origin.x as i64, origin.y as i64);

        let row_start = (-oy).max(0) as usize;
        let row_end = size.min((self.height as i64 - oy) as usize);
        let col_start = (-ox).max(0) as usize;
        let col_end = size.min((self.width as i64 - ox) as usize);
        let src = sprite.data();

        for row in row_start..row_end {
            let fy = (oy + row as i64) as usize;
            for col in col_start..col_end {
                let fx = (ox + col as i64) as usize;
                let s = (row * size + col) * 4;
                let d = (fy * self.width + fx) * 4;
                blend_over(&mut self.data[d..d + 4], &src[s..s + 4], self.blend_mode);
            }
        }
    }
}

/// Opaque RGB picture drawn under the particles every frame.
#[derive(Debug, Clone)]
pub struct Backdrop {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Backdrop {
    /// Build a backdrop from RGB8 pixels, row-major.
    ///
    /// # Arguments
    /// * `pixels` - RGB u8 data of length `width * height * 3`
    /// * `width` - Picture width in pixels
    /// * `height` - Picture height in pixels
    ///
    /// # Returns
    /// The backdrop with channels scaled to [0.0, 1.0], or an error when the
    /// buffer does not match the dimensions.
    pub fn from_rgb8(pixels: &[u8], width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FlameError::InvalidFrameSize { width, height });
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(3))
            .ok_or(FlameError::PixelBufferSize {
                expected: usize::MAX,
                actual: pixels.len(),
            })?;
        if pixels.len() != expected {
            return Err(FlameError::PixelBufferSize {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data: pixels.iter().map(|&c| c as f64 / 255.0).collect(),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }
}

impl Frame {
    /// Copy `backdrop` into the frame, centered horizontally along the top
    /// edge. Covered pixels become opaque; the rest are left alone.
    pub fn draw_backdrop(&mut self, backdrop: &Backdrop) {
        let ox = self.width as i64 / 2 - backdrop.width as i64 / 2;
        let col_start = (-ox).max(0) as usize;
        let col_end = backdrop
            .width
            .min((self.width as i64 - ox).max(0) as usize);
        let rows = backdrop.height.min(self.height);

        for row in 0..rows {
            for col in col_start..col_end {
                let s = (row * backdrop.width + col) * 3;
                let d = (row * self.width + (ox + col as i64) as usize) * 4;
                self.data[d..d + 3].copy_from_slice(&backdrop.data[s..s + 3]);
                self.data[d + 3] = 1.0;
            }
        }
    }
}

/// Flatten RGBA f64 pixels to RGB u8 against a background color.
pub fn rgba2rgb_impl(input: &[f64], bg: [f64; 3], output: &mut [u8]) {
    for (src, dst) in input.chunks_exact(4).zip(output.chunks_exact_mut(3)) {
        let alpha = src[3];
        let inv_alpha = 1.0 - alpha;

        for c in 0..3 {
            let composited = inv_alpha * bg[c] + alpha * src[c];
            let clamped = composited.clamp(0.0, 1.0);
            dst[c] = (clamped * 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            Frame::new(0, 10),
            Err(FlameError::InvalidFrameSize { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_clear_and_rgb8() {
        let mut frame = Frame::new(2, 2).unwrap();
        frame.clear([1.0, 0.0, 0.0]);
        assert_eq!(frame.to_rgb8([0.0; 3]), vec![255, 0, 0, 255, 0, 0, 255, 0, 0, 255, 0, 0]);
    }

    #[test]
    fn test_transparent_frame_shows_background() {
        let frame = Frame::new(1, 1).unwrap();
        assert_eq!(frame.to_rgb8([0.0, 1.0, 0.0]), vec![0, 255, 0]);
    }

    #[test]
    fn test_opaque_sprite_overwrites() {
        let mut frame = Frame::new(10, 10).unwrap();
        frame.clear([0.0; 3]);

        let mut sprite = Sprite::new();
        sprite.reset(2);
        let center = sprite.center();
        sprite.fill_circle(center, 2.0, [1.0, 1.0, 1.0, 1.0]);

        frame.composite(&sprite, DVec2::new(5.0, 5.0));
        // Sprite origin = (5,5) - (1,1) = (4,4)
        assert_eq!(frame.pixel(4, 4), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(frame.pixel(5, 5), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(frame.pixel(3, 3), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(frame.pixel(6, 6), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_composite_clips_at_edges() {
        let mut frame = Frame::new(4, 4).unwrap();
        frame.clear([0.0; 3]);

        let mut sprite = Sprite::new();
        sprite.reset(4);
        let center = sprite.center();
        sprite.fill_circle(center, 3.0, [0.0, 0.0, 1.0, 1.0]);

        frame.composite(&sprite, DVec2::new(0.0, 0.0));
        frame.composite(&sprite, DVec2::new(100.0, -50.0));
        assert_eq!(frame.pixel(0, 0), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(frame.pixel(3, 3), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_far_off_origin_is_skipped() {
        let mut frame = Frame::new(4, 4).unwrap();
        frame.clear([0.0; 3]);

        let mut sprite = Sprite::new();
        sprite.reset(4);
        let center = sprite.center();
        sprite.fill_circle(center, 3.0, [1.0, 1.0, 1.0, 1.0]);

        frame.composite(&sprite, DVec2::new(1e300, 1e300));
        frame.composite(&sprite, DVec2::new(-1e300, 2.0));
        frame.composite(&sprite, DVec2::new(f64::NAN, 2.0));
        frame.composite(&sprite, DVec2::new(f64::INFINITY, f64::NEG_INFINITY));
        assert!(frame.data().chunks_exact(4).all(|px| px == [0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_partial_overlap_on_far_edge() {
        let mut frame = Frame::new(4, 4).unwrap();
        frame.clear([0.0; 3]);

        let mut sprite = Sprite::new();
        sprite.reset(2);
        let center = sprite.center();
        sprite.fill_circle(center, 2.0, [1.0, 0.0, 0.0, 1.0]);

        // Origin (3,3): only the sprite's top-left pixel lands in the frame
        frame.composite(&sprite, DVec2::new(4.0, 4.0));
        assert_eq!(frame.pixel(3, 3), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(frame.pixel(2, 2), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_backdrop_size_checked() {
        assert!(matches!(
            Backdrop::from_rgb8(&[0; 5], 1, 2),
            Err(FlameError::PixelBufferSize { expected: 6, actual: 5 })
        ));
        assert!(Backdrop::from_rgb8(&[0; 3], usize::MAX, 2).is_err());
        assert!(Backdrop::from_rgb8(&[], 0, 2).is_err());
    }

    #[test]
    fn test_backdrop_centered_at_top() {
        let mut frame = Frame::new(4, 3).unwrap();
        frame.clear([0.0; 3]);
        let backdrop = Backdrop::from_rgb8(&[0, 255, 0, 0, 255, 0], 2, 1).unwrap();

        frame.draw_backdrop(&backdrop);
        assert_eq!(frame.pixel(0, 0), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(frame.pixel(0, 1), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(frame.pixel(0, 2), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(frame.pixel(0, 3), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(frame.pixel(1, 1), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_wide_backdrop_is_clipped() {
        let mut frame = Frame::new(2, 1).unwrap();
        let pixels: Vec<u8> = (0..4u8).flat_map(|i| [i * 60, 0, 0]).collect();
        let backdrop = Backdrop::from_rgb8(&pixels, 4, 1).unwrap();

        // Offset 1 - 2 = -1: frame shows backdrop columns 1 and 2
        frame.draw_backdrop(&backdrop);
        assert_eq!(frame.pixel(0, 0), [60.0 / 255.0, 0.0, 0.0, 1.0]);
        assert_eq!(frame.pixel(0, 1), [120.0 / 255.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_backdrop_shows_under_particles() {
        let mut frame = Frame::new(6, 6).unwrap();
        frame.clear([0.0; 3]);
        let backdrop = Backdrop::from_rgb8(&[0u8, 0, 255].repeat(36), 6, 6).unwrap();
        frame.draw_backdrop(&backdrop);

        let mut sprite = Sprite::new();
        sprite.reset(2);
        let center = sprite.center();
        sprite.fill_circle(center, 2.0, [1.0, 0.0, 0.0, 0.5]);
        frame.composite(&sprite, DVec2::new(3.0, 3.0));

        // Half-transparent red over blue keeps half the blue
        assert_eq!(frame.pixel(2, 2), [0.5, 0.0, 0.5, 1.0]);
        assert_eq!(frame.pixel(0, 0), [0.0, 0.0, 1.0, 1.0]);
    }
}
