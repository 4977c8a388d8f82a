//! Error types for the fallible edges of the crate
//!
//! The scene core never fails; these cover frame allocation, mask input
//! and configuration loading.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlameError {
    #[error("Invalid frame size: {width}x{height}")]
    InvalidFrameSize { width: usize, height: usize },

    #[error("Invalid pixel buffer: expected {expected} bytes, got {actual}")]
    PixelBufferSize { expected: usize, actual: usize },

    #[error("Unknown color name: {0}")]
    UnknownColor(String),

    #[error("Unknown blend mode: {0}")]
    UnknownBlendMode(String),

    #[error("Config file error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Config validation error: {0}")]
    InvalidConfig(String),
}

#[cfg(feature = "python")]
impl From<FlameError> for pyo3::PyErr {
    fn from(err: FlameError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FlameError>;
