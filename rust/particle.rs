//! Flame particle
//!
//! A glowing dot that rises, wobbles sideways and shrinks until it burns
//! out. Its glow is a stack of concentric circles whose radius grows with
//! the square of the layer index while alpha falls off linearly.

use glam::DVec2;
use rand::Rng;

use crate::compositor::Canvas;
use crate::drawing::Sprite;
use crate::palette::{flame_color, to_rgba_f64, ColorTier};

/// Number of glow layers beyond the core.
pub const ALPHA_LAYERS: u32 = 2;

/// Radius multiplier applied to `layer²`.
pub const GLOW_CONSTANT: f64 = 0.75;

/// Burn rate is `BURN_STEP * n` for n in 1..=BURN_STEPS.
pub const BURN_STEP: f64 = 0.05;
pub const BURN_STEPS: u32 = 8;

/// One glowing flame dot owned by an emitter.
///
/// Dead once `original_r` reaches zero; the owning emitter then replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: DVec2,
    /// Displayed radius, never below 1
    radius: u32,
    /// Fractional radius; at or below zero means burnt out
    original_r: f64,
    burn_rate: f64,
    color: usize,
}

impl Particle {
    /// Create a particle with a random burn rate.
    ///
    /// # Arguments
    /// * `position` - Screen position of the particle center
    /// * `radius` - Initial whole radius; zero yields an already dead particle
    /// * `color` - Palette index
    /// * `rng` - Source for the burn rate draw
    pub fn new<R: Rng + ?Sized>(position: DVec2, radius: u32, color: usize, rng: &mut R) -> Self {
        Self {
            position,
            radius,
            original_r: radius as f64,
            burn_rate: BURN_STEP * rng.gen_range(1..=BURN_STEPS) as f64,
            color,
        }
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        self.position
    }

    #[inline]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    #[inline]
    pub fn original_r(&self) -> f64 {
        self.original_r
    }

    #[inline]
    pub fn burn_rate(&self) -> f64 {
        self.burn_rate
    }

    #[inline]
    pub fn color(&self) -> usize {
        self.color
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.original_r <= 0.0
    }

    /// Advance by `dt` frames: rise, drift and burn.
    ///
    /// Smaller particles rise faster. Drift is a random whole step in
    /// `[-radius, radius]` scaled by `dt`.
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) {
        let r = self.radius as f64;
        let wobble = self.radius as i64;

        self.position.y -= (7.0 - r) * dt / 4.0;
        self.position.x += rng.gen_range(-wobble..=wobble) as f64 * dt * 0.33;
        self.original_r -= self.burn_rate * dt;

        let whole = self.original_r.trunc();
        self.radius = if whole <= 0.0 { 1 } else { whole as u32 };
    }

    /// Palette tier for the current displayed radius.
    #[inline]
    pub fn tier(&self) -> ColorTier {
        ColorTier::for_radius(self.radius)
    }

    /// Side of the square sprite that holds every glow layer.
    #[inline]
    pub fn sprite_size(&self) -> usize {
        let layers_sq = (ALPHA_LAYERS * ALPHA_LAYERS) as f64;
        (2.0 * self.radius as f64 * layers_sq * GLOW_CONSTANT).ceil() as usize
    }

    /// Draw all glow layers into `scratch` and composite onto `canvas`.
    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C, scratch: &mut Sprite) {
        scratch.reset(self.sprite_size());
        let center = scratch.center();
        let rgb = flame_color(self.color, self.tier());

        // Outermost first so inner layers overwrite it
        for layer in (0..=ALPHA_LAYERS).rev() {
            let rgba = to_rgba_f64(rgb, layer_alpha(layer));
            scratch.fill_circle(center, layer_radius(self.radius, layer), rgba);
        }

        canvas.composite(scratch, self.position);
    }
}

/// Alpha of glow layer `layer`: `255 - layer * (255 / ALPHA_LAYERS - 5)`, floored at 0.
#[inline]
pub fn layer_alpha(layer: u32) -> u8 {
    let step = 255 / ALPHA_LAYERS as i32 - 5;
    (255 - layer as i32 * step).clamp(0, 255) as u8
}

/// Radius of glow layer `layer` for a particle of displayed radius `radius`.
#[inline]
pub fn layer_radius(radius: u32, layer: u32) -> f64 {
    radius as f64 * (layer * layer) as f64 * GLOW_CONSTANT
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct Recorder {
        blits: Vec<(usize, DVec2)>,
    }

    impl Canvas for Recorder {
        fn composite(&mut self, sprite: &Sprite, center: DVec2) {
            self.blits.push((sprite.size(), center));
        }
    }

    #[test]
    fn test_new_particle() {
        let mut rng = StdRng::seed_from_u64(7);
        let p = Particle::new(DVec2::new(10.0, 20.0), 4, 2, &mut rng);
        assert_eq!(p.radius(), 4);
        assert_eq!(p.original_r(), 4.0);
        assert_eq!(p.color(), 2);
        let n = (p.burn_rate() / BURN_STEP).round();
        assert!((1.0..=8.0).contains(&n));
        assert!((p.burn_rate() - BURN_STEP * n).abs() < 1e-12);
    }

    #[test]
    fn test_update_burns_exactly_burn_rate() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut p = Particle::new(DVec2::new(0.0, 0.0), 5, 0, &mut rng);
        let before = p.original_r();
        p.update(1.0, &mut rng);
        assert_eq!(p.original_r(), before - p.burn_rate());
    }

    #[test]
    fn test_update_is_deterministic_for_seed() {
        let run = || {
            let mut rng = StdRng::seed_from_u64(1234);
            let mut p = Particle::new(DVec2::new(50.0, 50.0), 3, 1, &mut rng);
            for _ in 0..5 {
                p.update(1.0, &mut rng);
            }
            p
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_rises_by_radius() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = Particle::new(DVec2::new(0.0, 100.0), 5, 0, &mut rng);
        p.update(1.0, &mut rng);
        assert_eq!(p.position().y, 99.5);

        let mut small = Particle::new(DVec2::new(0.0, 100.0), 1, 0, &mut rng);
        small.update(2.0, &mut rng);
        assert_eq!(small.position().y, 97.0);
    }

    #[test]
    fn test_drift_stays_within_radius() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let mut p = Particle::new(DVec2::new(0.0, 0.0), 3, 0, &mut rng);
            p.update(1.0, &mut rng);
            assert!(p.position().x.abs() <= 3.0 * 0.33 + 1e-12);
        }
    }

    #[test]
    fn test_displayed_radius_never_below_one() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut p = Particle::new(DVec2::new(0.0, 0.0), 2, 0, &mut rng);
        for _ in 0..200 {
            p.update(1.0, &mut rng);
            assert!(p.radius() >= 1);
        }
        assert!(p.is_dead());
        assert!(p.original_r() <= 0.0);
        assert_eq!(p.radius(), 1);
    }

    #[test]
    fn test_radius_truncates() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut p = Particle::new(DVec2::new(0.0, 0.0), 5, 0, &mut rng);
        p.update(1.0, &mut rng);
        // 5.0 - rate with rate in (0, 0.4] truncates to 4
        assert_eq!(p.radius(), 4);
        assert_eq!(p.tier(), ColorTier::Ember);
    }

    #[test]
    fn test_layer_alpha() {
        assert_eq!(layer_alpha(0), 255);
        assert_eq!(layer_alpha(1), 133);
        assert_eq!(layer_alpha(2), 11);
    }

    #[test]
    fn test_layer_radius() {
        assert_eq!(layer_radius(2, 0), 0.0);
        assert_eq!(layer_radius(2, 1), 1.5);
        assert_eq!(layer_radius(2, 2), 6.0);
    }

    #[test]
    fn test_sprite_fits_outer_layer() {
        let mut rng = StdRng::seed_from_u64(0);
        for radius in 1..=5 {
            let p = Particle::new(DVec2::ZERO, radius, 0, &mut rng);
            let outer = layer_radius(radius, ALPHA_LAYERS);
            assert!(p.sprite_size() as f64 >= 2.0 * outer);
        }
    }

    #[test]
    fn test_render_composites_once_at_position() {
        let mut rng = StdRng::seed_from_u64(21);
        let p = Particle::new(DVec2::new(30.0, 40.0), 3, 2, &mut rng);
        let mut canvas = Recorder::default();
        let mut scratch = Sprite::new();
        p.render(&mut canvas, &mut scratch);

        assert_eq!(canvas.blits, vec![(18, DVec2::new(30.0, 40.0))]);

        // Middle layer (radius 2.25, alpha 133) covers pixels near the center
        let [r, g, b, a] = scratch.pixel(9, 9);
        assert_eq!([r, g, b], [250.0 / 255.0, 220.0 / 255.0, 55.0 / 255.0]);
        assert_eq!(a, 133.0 / 255.0);
        // Outer glow (radius 9, alpha 11) near the rim
        assert_eq!(scratch.pixel(9, 1)[3], 11.0 / 255.0);
    }
}
