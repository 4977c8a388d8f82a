//! Flame color palette
//!
//! Four palettes of three tiers each. A particle picks its tier from its
//! displayed radius: mid-sized embers are the coolest, the smallest sparks
//! are warm, and fresh large flames burn brightest.

/// Number of palettes (color indices 0..PALETTE_COUNT).
pub const PALETTE_COUNT: usize = 4;

/// RGB triples indexed by `[color_index][tier]`.
pub const FLAME_PALETTE: [[[u8; 3]; 3]; PALETTE_COUNT] = [
    [[20, 20, 20], [200, 200, 200], [255, 255, 255]],
    [[255, 255, 255], [255, 200, 100], [255, 250, 210]],
    [[250, 220, 55], [255, 170, 55], [255, 250, 220]],
    [[140, 170, 225], [100, 160, 250], [240, 240, 250]],
];

/// Brightness bucket within a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTier {
    /// Radius 3 or 4
    Ember = 0,
    /// Radius 1 or 2
    Spark = 1,
    /// Radius 5 and above
    Core = 2,
}

impl ColorTier {
    /// Tier for a displayed (integer) radius.
    #[inline]
    pub fn for_radius(radius: u32) -> Self {
        match radius {
            3 | 4 => ColorTier::Ember,
            1 | 2 => ColorTier::Spark,
            _ => ColorTier::Core,
        }
    }
}

/// Look up an RGB color. Out-of-range indices use the last palette.
#[inline]
pub fn flame_color(color_index: usize, tier: ColorTier) -> [u8; 3] {
    let row = color_index.min(PALETTE_COUNT - 1);
    FLAME_PALETTE[row][tier as usize]
}

/// RGBA color in [0.0, 1.0] from an RGB triple and an 8-bit alpha.
#[inline]
pub fn to_rgba_f64(rgb: [u8; 3], alpha: u8) -> [f64; 4] {
    [
        rgb[0] as f64 / 255.0,
        rgb[1] as f64 / 255.0,
        rgb[2] as f64 / 255.0,
        alpha as f64 / 255.0,
    ]
}
