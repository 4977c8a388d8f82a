//! Python host bindings
//!
//! The host owns the window and event loop; it calls `step` once per
//! display frame and copies the finished frame out with `render_into`.

use glam::DVec2;
use numpy::{PyArray3, PyArrayMethods, PyReadonlyArray3, PyUntypedArrayMethods};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::clock::FrameClock;
use crate::compositor::{Backdrop, Frame};
use crate::config::SceneConfig;
use crate::director::{SceneDirector, Sequences};
use crate::mask::{MaskConfig, NamedColor};

/// A complete flame scene: director, frame buffer and frame clock.
#[pyclass(name = "FlameScene")]
pub struct PyFlameScene {
    director: SceneDirector,
    frame: Frame,
    clock: FrameClock,
    background: [f64; 3],
    backdrop: Option<Backdrop>,
}

#[pymethods]
impl PyFlameScene {
    /// Build a scene from mask anchors and an optional TOML config string.
    #[new]
    #[pyo3(signature = (mask_points, config_toml=None))]
    fn new(mask_points: Vec<(f64, f64)>, config_toml: Option<&str>) -> PyResult<Self> {
        let config = match config_toml {
            Some(text) => SceneConfig::from_toml_str(text)?,
            None => SceneConfig::default(),
        };

        let mask = mask_points
            .into_iter()
            .map(|(x, y)| DVec2::new(x, y))
            .collect();
        let director = SceneDirector::from_config(Sequences::with_reference_shapes(mask), &config);
        let frame = Frame::new(config.screen.width, config.screen.height)?
            .with_blend_mode(config.screen.blend_mode);

        Ok(Self {
            director,
            frame,
            clock: FrameClock::new(config.screen.target_fps),
            background: config.screen.background_f64(),
            backdrop: None,
        })
    }

    /// Advance one frame. Uses the wall clock when `dt` is omitted.
    ///
    /// Returns the `dt` that was applied.
    #[pyo3(signature = (dt=None))]
    fn step(&mut self, dt: Option<f64>) -> f64 {
        let dt = dt.unwrap_or_else(|| self.clock.tick());
        self.frame.clear(self.background);
        if let Some(backdrop) = &self.backdrop {
            self.frame.draw_backdrop(backdrop);
        }
        self.director.admit_and_advance(dt, &mut self.frame);
        dt
    }

    /// Copy the RGBA frame into a float array of shape (height, width, 4).
    fn render_into<'py>(&self, matrix: &Bound<'py, PyArray3<f64>>) -> PyResult<()> {
        let (h, w) = (self.frame.height(), self.frame.width());
        let shape = matrix.shape();
        if shape != [h, w, 4] {
            return Err(PyValueError::new_err(format!(
                "Matrix has shape {:?}, expected ({}, {}, 4)",
                shape, h, w
            )));
        }

        let data = self.frame.data();

        // SAFETY: the host hands us an array it does not touch during the call
        unsafe {
            let mut array = matrix.as_array_mut();
            for row in 0..h {
                for col in 0..w {
                    let idx = (row * w + col) * 4;
                    for c in 0..4 {
                        array[[row, col, c]] = data[idx + c];
                    }
                }
            }
        }
        Ok(())
    }

    /// Draw an RGB uint8 picture of shape (h, w, 3) under the flames,
    /// or clear it with `None`.
    #[pyo3(signature = (pixels=None))]
    fn set_backdrop(&mut self, pixels: Option<PyReadonlyArray3<'_, u8>>) -> PyResult<()> {
        let Some(pixels) = pixels else {
            self.backdrop = None;
            return Ok(());
        };
        let shape = pixels.shape();
        if shape[2] != 3 {
            return Err(PyValueError::new_err(format!(
                "Expected an RGB image of shape (h, w, 3), got {:?}",
                shape
            )));
        }
        let data = pixels
            .as_slice()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.backdrop = Some(Backdrop::from_rgb8(data, shape[1], shape[0])?);
        Ok(())
    }

    #[getter]
    fn active_emitters(&self) -> usize {
        self.director.active_count()
    }

    #[getter]
    fn total_particles(&self) -> usize {
        self.director.total_particles()
    }

    #[getter]
    fn stage(&self) -> &'static str {
        self.director.stage().name()
    }
}

/// Extract thinned, recentred mask anchors from an RGBA uint8 image.
#[pyfunction]
#[pyo3(signature = (pixels, screen_width, allowed=None, keep_every=10))]
fn extract_mask_points(
    pixels: PyReadonlyArray3<'_, u8>,
    screen_width: usize,
    allowed: Option<Vec<String>>,
    keep_every: usize,
) -> PyResult<Vec<(f64, f64)>> {
    let shape = pixels.shape();
    if shape.len() != 3 || shape[2] != 4 {
        return Err(PyValueError::new_err(format!(
            "Expected an RGBA image of shape (h, w, 4), got {:?}",
            shape
        )));
    }
    let (h, w) = (shape[0], shape[1]);

    let allowed = match allowed {
        Some(names) => names
            .iter()
            .map(|n| n.parse::<NamedColor>())
            .collect::<Result<Vec<_>, _>>()?,
        None => MaskConfig::default().allowed,
    };
    let config = MaskConfig {
        allowed,
        keep_every,
    };

    let data = pixels
        .as_slice()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let anchors = config.anchors(data, w, h, screen_width)?;

    Ok(anchors.into_iter().map(|p| (p.x, p.y)).collect())
}

/// Native flame particle scenes.
#[pymodule]
fn flame_sparks(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyFlameScene>()?;
    m.add_function(wrap_pyfunction!(extract_mask_points, m)?)?;
    m.add("PALETTE_COUNT", crate::palette::PALETTE_COUNT)?;
    Ok(())
}
