//! Blend modes for compositing particle sprites onto the frame.
//!
//! All channels are f64 in [0.0, 1.0]. `blend_over` mixes the blended color
//! into the base by the layer's alpha, like a straight-alpha blit.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlameError;

/// How a sprite pixel combines with the frame underneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Layer color replaces base, weighted by alpha
    #[default]
    Normal,
    /// 1 - (1-b)(1-l)
    Screen,
    /// b + l, clamped
    Addition,
    /// max(b, l)
    LightenOnly,
}

impl BlendMode {
    /// Apply the mode to one channel.
    #[inline]
    pub fn apply(self, b: f64, l: f64) -> f64 {
        match self {
            BlendMode::Normal => l,
            BlendMode::Screen => 1.0 - (1.0 - b) * (1.0 - l),
            BlendMode::Addition => (b + l).min(1.0),
            BlendMode::LightenOnly => b.max(l),
        }
    }
}

impl FromStr for BlendMode {
    type Err = FlameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(BlendMode::Normal),
            "screen" => Ok(BlendMode::Screen),
            "addition" => Ok(BlendMode::Addition),
            "lighten_only" => Ok(BlendMode::LightenOnly),
            _ => Err(FlameError::UnknownBlendMode(s.to_string())),
        }
    }
}

/// Blend one RGBA layer pixel onto an RGBA base pixel in place.
///
/// ```text
/// out_rgb = mode(b, l) * la + b * (1 - la)
/// out_a   = la + ba * (1 - la)
/// ```
#[inline]
pub fn blend_over(base: &mut [f64], layer: &[f64], mode: BlendMode) {
    debug_assert!(base.len() >= 4 && layer.len() >= 4);

    let la = layer[3];
    if la <= 0.0 {
        return;
    }
    let inv = 1.0 - la;

    for c in 0..3 {
        let b = base[c];
        let blended = mode.apply(b, layer[c]);
        base[c] = blended * la + b * inv;
    }
    base[3] = la + base[3] * inv;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("screen".parse::<BlendMode>().unwrap(), BlendMode::Screen);
        assert_eq!(
            "lighten_only".parse::<BlendMode>().unwrap(),
            BlendMode::LightenOnly
        );
        assert!("glow".parse::<BlendMode>().is_err());
    }

    #[test]
    fn test_opaque_normal_replaces() {
        let mut base = [0.1, 0.2, 0.3, 1.0];
        blend_over(&mut base, &[0.9, 0.8, 0.7, 1.0], BlendMode::Normal);
        assert_eq!(base, [0.9, 0.8, 0.7, 1.0]);
    }

    #[test]
    fn test_transparent_layer_is_noop() {
        let mut base = [0.1, 0.2, 0.3, 1.0];
        blend_over(&mut base, &[0.9, 0.8, 0.7, 0.0], BlendMode::Screen);
        assert_eq!(base, [0.1, 0.2, 0.3, 1.0]);
    }

    #[test]
    fn test_half_alpha_mixes() {
        let mut base = [0.0, 0.0, 0.0, 1.0];
        blend_over(&mut base, &[1.0, 1.0, 1.0, 0.5], BlendMode::Normal);
        assert!((base[0] - 0.5).abs() < 1e-12);
        assert_eq!(base[3], 1.0);
    }

    #[test]
    fn test_addition_clamps() {
        assert_eq!(BlendMode::Addition.apply(0.8, 0.6), 1.0);
        assert!((BlendMode::Screen.apply(0.5, 0.5) - 0.75).abs() < 1e-12);
    }
}
