//! Mask point extraction
//!
//! Turns an RGBA image into emitter anchors: keep opaque pixels whose color
//! passes one of the allowed per-channel threshold tests, thin the result
//! row-wise and shift it to the middle of the screen.

use std::fmt;
use std::str::FromStr;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{FlameError, Result};

/// Pixels at or below this alpha are ignored.
pub const ALPHA_CUTOFF: u8 = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Greater,
    Less,
    Equal,
}

impl Comparator {
    #[inline]
    pub fn test(self, value: u8, threshold: u8) -> bool {
        match self {
            Comparator::Greater => value > threshold,
            Comparator::Less => value < threshold,
            Comparator::Equal => value == threshold,
        }
    }
}

/// One channel's comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelTest {
    pub comparator: Comparator,
    pub threshold: u8,
}

impl ChannelTest {
    pub const fn gt(threshold: u8) -> Self {
        Self {
            comparator: Comparator::Greater,
            threshold,
        }
    }

    pub const fn lt(threshold: u8) -> Self {
        Self {
            comparator: Comparator::Less,
            threshold,
        }
    }

    pub const fn exactly(threshold: u8) -> Self {
        Self {
            comparator: Comparator::Equal,
            threshold,
        }
    }
}

/// R, G and B tests that must all pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCondition(pub [ChannelTest; 3]);

impl ColorCondition {
    #[inline]
    pub fn matches(&self, rgb: [u8; 3]) -> bool {
        self.0
            .iter()
            .zip(rgb)
            .all(|(t, v)| t.comparator.test(v, t.threshold))
    }
}

/// Named color conditions, tested in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    White,
    Red,
    Yellow,
    Black,
}

impl NamedColor {
    pub const ALL: [NamedColor; 4] = [
        NamedColor::White,
        NamedColor::Red,
        NamedColor::Yellow,
        NamedColor::Black,
    ];

    pub const fn condition(self) -> ColorCondition {
        use ChannelTest as T;
        match self {
            NamedColor::White => ColorCondition([T::gt(225), T::gt(225), T::gt(225)]),
            NamedColor::Red => ColorCondition([T::gt(100), T::lt(50), T::lt(50)]),
            NamedColor::Yellow => ColorCondition([T::gt(200), T::gt(200), T::lt(50)]),
            NamedColor::Black => ColorCondition([T::lt(20), T::lt(20), T::lt(20)]),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            NamedColor::White => "white",
            NamedColor::Red => "red",
            NamedColor::Yellow => "yellow",
            NamedColor::Black => "black",
        }
    }
}

impl fmt::Display for NamedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedColor {
    type Err = FlameError;

    fn from_str(s: &str) -> Result<Self> {
        NamedColor::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| FlameError::UnknownColor(s.to_string()))
    }
}

/// Collect (x, y) of every opaque pixel matching an allowed color.
///
/// Scans column by column (x outer, y inner). `pixels` is RGBA8, row-major.
/// A pixel matching several allowed colors is emitted once per match.
pub fn extract_points(
    pixels: &[u8],
    width: usize,
    height: usize,
    allowed: &[NamedColor],
) -> Result<Vec<(i64, i64)>> {
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
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

    let conditions: Vec<ColorCondition> = NamedColor::ALL
        .into_iter()
        .filter(|c| allowed.contains(c))
        .map(NamedColor::condition)
        .collect();

    let mut points = Vec::new();
    for x in 0..width {
        for y in 0..height {
            let idx = (y * width + x) * 4;
            let px = &pixels[idx..idx + 4];
            if px[3] <= ALPHA_CUTOFF {
                continue;
            }
            let rgb = [px[0], px[1], px[2]];
            for cond in &conditions {
                if cond.matches(rgb) {
                    points.push((x as i64, y as i64));
                }
            }
        }
    }

    log::debug!(
        "extracted {} mask points from {}x{} image",
        points.len(),
        width,
        height
    );
    Ok(points)
}

/// Sort by y (stable) and keep every `keep_every`-th point, starting with the first.
pub fn thin_points(mut points: Vec<(i64, i64)>, keep_every: usize) -> Vec<(i64, i64)> {
    points.sort_by_key(|&(_, y)| y);
    points.into_iter().step_by(keep_every.max(1)).collect()
}

/// Shift x so an image of `image_width` is centered on a screen of `screen_width`.
pub fn recenter(points: &mut [(i64, i64)], screen_width: usize, image_width: usize) {
    let shift = (screen_width / 2) as i64 - (image_width / 2) as i64;
    for p in points.iter_mut() {
        p.0 += shift;
    }
}

/// Settings for turning an image into mask anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    pub allowed: Vec<NamedColor>,
    pub keep_every: usize,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            allowed: vec![NamedColor::Black],
            keep_every: 10,
        }
    }
}

impl MaskConfig {
    /// Extract, thin and recenter in one pass.
    pub fn anchors(
        &self,
        pixels: &[u8],
        width: usize,
        height: usize,
        screen_width: usize,
    ) -> Result<Vec<DVec2>> {
        let raw = extract_points(pixels, width, height, &self.allowed)?;
        let mut points = thin_points(raw, self.keep_every);
        recenter(&mut points, screen_width, width);
        Ok(points
            .into_iter()
            .map(|(x, y)| DVec2::new(x as f64, y as f64))
            .collect())
    }
}
