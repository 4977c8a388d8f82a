//! Flame emitter
//!
//! Holds a fixed-size pool of particles around an anchor point. Burnt-out
//! particles are reborn at the anchor with the color they had, so a
//! recolor through `regenerate` spreads by attrition.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::compositor::Canvas;
use crate::drawing::Sprite;
use crate::particle::Particle;

/// Where and how big new particles start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Inclusive horizontal offset range from the anchor
    pub jitter: (i32, i32),
    /// Inclusive initial radius range
    pub radius: (u32, u32),
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            jitter: (-1, -1),
            radius: (1, 5),
        }
    }
}

/// A constant-population particle source anchored at one point.
///
/// The population is `floor(intensity)` once generated; every particle
/// shares the emitter's palette index until a recolor spreads by rebirth.
#[derive(Debug, Clone)]
pub struct Emitter {
    anchor: DVec2,
    intensity: f64,
    color: usize,
    spawn: SpawnConfig,
    particles: Vec<Particle>,
}

impl Emitter {
    /// New emitter with intensity 1 and color 0, already populated.
    pub fn new<R: Rng + ?Sized>(anchor: DVec2, spawn: SpawnConfig, rng: &mut R) -> Self {
        let mut emitter = Self {
            anchor,
            intensity: 1.0,
            color: 0,
            spawn,
            particles: Vec::new(),
        };
        emitter.regenerate(0, rng);
        emitter
    }

    #[inline]
    pub fn anchor(&self) -> DVec2 {
        self.anchor
    }

    #[inline]
    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    #[inline]
    pub fn color(&self) -> usize {
        self.color
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Steady-state population: `floor(intensity)`, zero for non-positive values.
    #[inline]
    pub fn target_count(&self) -> usize {
        if self.intensity.is_finite() && self.intensity > 0.0 {
            self.intensity.floor() as usize
        } else {
            0
        }
    }

    /// Change intensity. Takes effect on the next `regenerate`.
    pub fn set_intensity(&mut self, intensity: f64) {
        self.intensity = intensity;
    }

    /// Drop every particle and spawn a fresh batch in `color`.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, color: usize, rng: &mut R) {
        self.color = color;
        self.particles.clear();
        for _ in 0..self.target_count() {
            let p = self.spawn_particle(color, rng);
            self.particles.push(p);
        }
    }

    /// Set intensity and regenerate in one step.
    pub fn promote<R: Rng + ?Sized>(&mut self, intensity: f64, color: usize, rng: &mut R) {
        self.set_intensity(intensity);
        self.regenerate(color, rng);
    }

    /// Age and draw every live particle; replace each dead one.
    ///
    /// Survivors keep their order and replacements are appended after
    /// them. A reborn particle is neither aged nor drawn until the next tick.
    ///
    /// # Arguments
    /// * `dt` - Elapsed time in target frames
    /// * `rng` - Source for drift and respawn draws
    /// * `canvas` - Target for every surviving particle's sprite
    /// * `scratch` - Reusable sprite buffer
    pub fn tick<R, C>(&mut self, dt: f64, rng: &mut R, canvas: &mut C, scratch: &mut Sprite)
    where
        R: Rng + ?Sized,
        C: Canvas + ?Sized,
    {
        let old = std::mem::take(&mut self.particles);
        let mut next = Vec::with_capacity(old.len());
        let mut reborn = Vec::new();

        for mut particle in old {
            if particle.is_dead() {
                reborn.push(self.spawn_particle(particle.color(), rng));
                continue;
            }
            particle.update(dt, rng);
            particle.render(canvas, scratch);
            next.push(particle);
        }

        next.extend(reborn);
        self.particles = next;
    }

    fn spawn_particle<R: Rng + ?Sized>(&self, color: usize, rng: &mut R) -> Particle {
        let (j0, j1) = self.spawn.jitter;
        let (r0, r1) = self.spawn.radius;
        let dx = rng.gen_range(j0.min(j1)..=j0.max(j1));
        let radius = rng.gen_range(r0.min(r1)..=r0.max(r1));
        let position = DVec2::new(self.anchor.x + dx as f64, self.anchor.y);
        Particle::new(position, radius, color, rng)
    }
}
