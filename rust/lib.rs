//! Fire-particle emitter scenes
//!
//! Glowing particles rise and burn out around fixed anchors. A scene
//! director stages thousands of such emitters in over time:
//! - Mask anchors extracted from an image, in batches
//! - Two ring layouts and a bezier path, one promoted emitter per frame
//!
//! Each frame is rendered into an RGBA buffer ready for presentation.

pub mod blending;
pub mod clock;
pub mod compositor;
pub mod config;
pub mod director;
pub mod drawing;
pub mod emitter;
pub mod error;
pub mod mask;
pub mod palette;
pub mod particle;
pub mod shapes;

#[cfg(feature = "python")]
mod python;

pub use blending::BlendMode;
pub use clock::FrameClock;
pub use compositor::{Backdrop, Canvas, Frame};
pub use config::SceneConfig;
pub use director::{SceneDirector, Sequences, Stage};
pub use drawing::Sprite;
pub use emitter::{Emitter, SpawnConfig};
pub use error::{FlameError, Result};
pub use particle::Particle;

// Re-export for benchmarks
pub use compositor::rgba2rgb_impl;
