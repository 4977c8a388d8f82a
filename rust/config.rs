//! Scene configuration
//!
//! Loaded from TOML. Every section and field falls back to its default, so
//! a partial file only overrides what it names.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::blending::BlendMode;
use crate::director::{StageConfig, StagesConfig};
use crate::emitter::SpawnConfig;
use crate::error::{FlameError, Result};
use crate::mask::MaskConfig;
use crate::palette::PALETTE_COUNT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: usize,
    pub height: usize,
    pub target_fps: f64,
    /// Clear color, RGB 0-255
    pub background: [u8; 3],
    pub blend_mode: BlendMode,
    /// Picture drawn under the particles, scaled to the screen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<PathBuf>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            target_fps: 60.0,
            background: [0, 0, 0],
            blend_mode: BlendMode::Normal,
            backdrop: None,
        }
    }
}

impl ScreenConfig {
    /// Background as f64 RGB in [0.0, 1.0].
    pub fn background_f64(&self) -> [f64; 3] {
        self.background.map(|c| c as f64 / 255.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for every random draw in the scene
    pub seed: u64,
    pub screen: ScreenConfig,
    pub spawn: SpawnConfig,
    pub stages: StagesConfig,
    pub mask: MaskConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED_F1A3,
            screen: ScreenConfig::default(),
            spawn: SpawnConfig::default(),
            stages: StagesConfig::default(),
            mask: MaskConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SceneConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let screen = &self.screen;
        if screen.width == 0 || screen.height == 0 {
            return Err(invalid(format!(
                "screen size must be non-zero, got {}x{}",
                screen.width, screen.height
            )));
        }
        if !(screen.target_fps.is_finite() && screen.target_fps > 0.0) {
            return Err(invalid(format!(
                "target_fps must be positive, got {}",
                screen.target_fps
            )));
        }

        let (j0, j1) = self.spawn.jitter;
        if j0 > j1 {
            return Err(invalid(format!("spawn jitter range [{j0}, {j1}] is reversed")));
        }
        let (r0, r1) = self.spawn.radius;
        if r0 == 0 || r0 > r1 {
            return Err(invalid(format!(
                "spawn radius range [{r0}, {r1}] must start at 1 or more and be ordered"
            )));
        }

        let stages = [
            ("mask", &self.stages.mask),
            ("ring_a", &self.stages.ring_a),
            ("ring_b", &self.stages.ring_b),
            ("curve", &self.stages.curve),
        ];
        for (name, stage) in stages {
            validate_stage(name, stage)?;
        }
        if self.stages.delay_frames == 0 {
            return Err(invalid("stages.delay_frames must be at least 1".to_string()));
        }

        if self.mask.keep_every == 0 {
            return Err(invalid("mask.keep_every must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn validate_stage(name: &str, stage: &StageConfig) -> Result<()> {
    if stage.color >= PALETTE_COUNT {
        return Err(invalid(format!(
            "stage {name}: color {} out of range (0..{PALETTE_COUNT})",
            stage.color
        )));
    }
    if !stage.intensity.is_finite() {
        return Err(invalid(format!("stage {name}: intensity must be finite")));
    }
    if stage.batch == 0 {
        return Err(invalid(format!("stage {name}: batch must be at least 1")));
    }
    Ok(())
}

fn invalid(msg: String) -> FlameError {
    FlameError::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::NamedColor;

    #[test]
    fn test_defaults_are_valid() {
        let config = SceneConfig::default();
        config.validate().unwrap();
        assert_eq!(config.stages.mask.batch, 5);
        assert_eq!(config.stages.curve.color, 3);
        assert_eq!(config.stages.ring_a.intensity, 10.0);
        assert_eq!(config.spawn.radius, (1, 5));
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(SceneConfig::from_toml_str("").unwrap(), SceneConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = SceneConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(SceneConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_override() {
        let config = SceneConfig::from_toml_str(
            r#"
            seed = 7

            [screen]
            width = 640
            blend_mode = "screen"

            [stages.ring_b]
            intensity = 4.0

            [mask]
            allowed = ["black", "red"]
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.screen.width, 640);
        assert_eq!(config.screen.height, 720);
        assert_eq!(config.screen.blend_mode, BlendMode::Screen);
        assert_eq!(config.stages.ring_b.intensity, 4.0);
        assert_eq!(config.stages.ring_b.batch, 1);
        assert_eq!(config.mask.allowed, vec![NamedColor::Black, NamedColor::Red]);
        assert_eq!(config.mask.keep_every, 10);
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            "[screen]\nwidth = 0",
            "[screen]\ntarget_fps = 0.0",
            "[spawn]\nradius = [0, 5]",
            "[spawn]\njitter = [2, -2]",
            "[stages.curve]\ncolor = 4",
            "[stages.mask]\nbatch = 0",
            "[stages]\ndelay_frames = 0",
            "[mask]\nkeep_every = 0",
        ];
        for case in cases {
            assert!(
                matches!(
                    SceneConfig::from_toml_str(case),
                    Err(FlameError::InvalidConfig(_))
                ),
                "accepted: {case}"
            );
        }
    }

    #[test]
    fn test_backdrop_path() {
        let config = SceneConfig::from_toml_str("[screen]\nbackdrop = \"images/night.jpg\"").unwrap();
        assert_eq!(
            config.screen.backdrop.as_deref(),
            Some(Path::new("images/night.jpg"))
        );

        let text = config.to_toml_string().unwrap();
        assert_eq!(SceneConfig::from_toml_str(&text).unwrap(), config);
        assert!(!SceneConfig::default().to_toml_string().unwrap().contains("backdrop"));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            SceneConfig::from_toml_str("seed = \"many\""),
            Err(FlameError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_background_f64() {
        let screen = ScreenConfig {
            background: [255, 0, 51],
            ..Default::default()
        };
        assert_eq!(screen.background_f64(), [1.0, 0.0, 0.2]);
    }
}
