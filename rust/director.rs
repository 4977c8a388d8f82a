//! Scene director
//!
//! Stages emitters into the scene over time. Mask anchors arrive in small
//! batches first; once they are all burning, a frame counter gates the
//! promoted emitters of the two ring layouts and the curve path, which are
//! admitted one at a time. Emitters are never removed.

use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::compositor::Canvas;
use crate::config::SceneConfig;
use crate::drawing::Sprite;
use crate::emitter::{Emitter, SpawnConfig};
use crate::shapes;

/// Admission phase, strictly forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    SeedingMask,
    BuildingRingA,
    BuildingRingB,
    BuildingCurve,
    Steady,
}

impl Stage {
    pub const fn name(self) -> &'static str {
        match self {
            Stage::SeedingMask => "seeding_mask",
            Stage::BuildingRingA => "building_ring_a",
            Stage::BuildingRingB => "building_ring_b",
            Stage::BuildingCurve => "building_curve",
            Stage::Steady => "steady",
        }
    }
}

/// How emitters of one stage are created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Palette index for the stage's particles
    pub color: usize,
    pub intensity: f64,
    /// Emitters admitted per frame
    pub batch: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            color: 0,
            intensity: 1.0,
            batch: 1,
        }
    }
}

impl StageConfig {
    const fn promoted(color: usize) -> Self {
        Self {
            color,
            intensity: 10.0,
            batch: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagesConfig {
    /// Frames after the mask is complete before ring admission starts
    pub delay_frames: u64,
    pub mask: StageConfig,
    pub ring_a: StageConfig,
    pub ring_b: StageConfig,
    pub curve: StageConfig,
}

impl Default for StagesConfig {
    fn default() -> Self {
        Self {
            delay_frames: 1,
            mask: StageConfig {
                color: 0,
                intensity: 1.0,
                batch: 5,
            },
            ring_a: StageConfig::promoted(1),
            ring_b: StageConfig::promoted(2),
            curve: StageConfig::promoted(3),
        }
    }
}

/// The four ordered anchor sequences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequences {
    pub mask: Vec<DVec2>,
    pub ring_a: Vec<DVec2>,
    pub ring_b: Vec<DVec2>,
    pub curve: Vec<DVec2>,
}

impl Sequences {
    /// Mask anchors plus the built-in ring and curve layouts.
    pub fn with_reference_shapes(mask: Vec<DVec2>) -> Self {
        Self {
            mask,
            ring_a: shapes::ring_a(),
            ring_b: shapes::ring_b(),
            curve: shapes::curve_path(),
        }
    }

    pub fn total(&self) -> usize {
        self.mask.len() + self.ring_a.len() + self.ring_b.len() + self.curve.len()
    }
}

/// Owns every emitter in the scene and decides when new ones join.
///
/// Also owns the scene's random generator and the scratch sprite shared by
/// all particles, so a run is reproducible from its seed.
pub struct SceneDirector {
    sequences: Sequences,
    stages: StagesConfig,
    spawn: SpawnConfig,
    emitters: Vec<Emitter>,
    mask_active: usize,
    alpha: u64,
    stage: Stage,
    rng: StdRng,
    scratch: Sprite,
}

impl SceneDirector {
    /// Create a director with no active emitters.
    ///
    /// # Arguments
    /// * `sequences` - Anchor points for each stage, admitted in order
    /// * `stages` - Per-stage color, intensity and batch size plus the delay
    /// * `spawn` - Spawn ranges for every particle
    /// * `seed` - Seed for the scene's random generator
    pub fn new(sequences: Sequences, stages: StagesConfig, spawn: SpawnConfig, seed: u64) -> Self {
        let mut director = Self {
            sequences,
            stages,
            spawn,
            emitters: Vec::new(),
            mask_active: 0,
            alpha: 0,
            stage: Stage::SeedingMask,
            rng: StdRng::seed_from_u64(seed),
            scratch: Sprite::new(),
        };
        director.stage = director.compute_stage();
        director
    }

    pub fn from_config(sequences: Sequences, config: &SceneConfig) -> Self {
        Self::new(sequences, config.stages, config.spawn, config.seed)
    }

    #[inline]
    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.emitters.len()
    }

    #[inline]
    pub fn mask_active(&self) -> usize {
        self.mask_active
    }

    #[inline]
    pub fn alpha(&self) -> u64 {
        self.alpha
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[inline]
    pub fn sequences(&self) -> &Sequences {
        &self.sequences
    }

    pub fn total_particles(&self) -> usize {
        self.emitters.iter().map(|e| e.particles().len()).sum()
    }

    /// Admit this frame's emitters, then tick and draw every active one.
    ///
    /// # Arguments
    /// * `dt` - Elapsed time in target frames
    /// * `canvas` - Target for every particle sprite
    pub fn admit_and_advance<C: Canvas + ?Sized>(&mut self, dt: f64, canvas: &mut C) {
        self.admit();

        for emitter in &mut self.emitters {
            emitter.tick(dt, &mut self.rng, canvas, &mut self.scratch);
        }

        log::trace!(
            "frame: {} emitters, {} particles",
            self.emitters.len(),
            self.total_particles()
        );
    }

    fn admit(&mut self) {
        let mask_len = self.sequences.mask.len();

        if self.mask_active < mask_len {
            let stage = self.stages.mask;
            let qty = stage.batch.min(mask_len - self.mask_active);
            for &anchor in &self.sequences.mask[self.mask_active..self.mask_active + qty] {
                let mut emitter = Emitter::new(anchor, self.spawn, &mut self.rng);
                if stage.intensity != 1.0 || stage.color != 0 {
                    emitter.promote(stage.intensity, stage.color, &mut self.rng);
                }
                self.emitters.push(emitter);
            }
            self.mask_active += qty;
            log::debug!("admitted {} mask emitters ({}/{})", qty, self.mask_active, mask_len);
        } else {
            self.alpha = self.alpha.saturating_add(1);
        }

        if self.mask_active == mask_len && self.alpha >= self.stages.delay_frames {
            self.admit_shapes(mask_len);
        }

        let stage = self.compute_stage();
        if stage != self.stage {
            log::debug!("scene stage {} -> {}", self.stage.name(), stage.name());
            if stage == Stage::Steady {
                log::info!("scene steady with {} emitters", self.emitters.len());
            }
            self.stage = stage;
        }
    }

    /// Admit the next emitters from the first shape sequence with anchors left.
    fn admit_shapes(&mut self, mask_len: usize) {
        let mut consumed = self.emitters.len() - mask_len;
        let groups = [
            (&self.sequences.ring_a, self.stages.ring_a),
            (&self.sequences.ring_b, self.stages.ring_b),
            (&self.sequences.curve, self.stages.curve),
        ];

        for (seq, stage) in groups {
            if consumed < seq.len() {
                let qty = stage.batch.min(seq.len() - consumed);
                for &anchor in &seq[consumed..consumed + qty] {
                    let mut emitter = Emitter::new(anchor, self.spawn, &mut self.rng);
                    emitter.promote(stage.intensity, stage.color, &mut self.rng);
                    self.emitters.push(emitter);
                }
                return;
            }
            consumed -= seq.len();
        }
    }

    fn compute_stage(&self) -> Stage {
        let mask_len = self.sequences.mask.len();
        if self.mask_active < mask_len || self.alpha < self.stages.delay_frames {
            return Stage::SeedingMask;
        }

        let mut consumed = self.emitters.len() - mask_len;
        let groups = [
            (self.sequences.ring_a.len(), Stage::BuildingRingA),
            (self.sequences.ring_b.len(), Stage::BuildingRingB),
            (self.sequences.curve.len(), Stage::BuildingCurve),
        ];
        for (len, stage) in groups {
            if consumed < len {
                return stage;
            }
            consumed -= len;
        }
        Stage::Steady
    }
}
