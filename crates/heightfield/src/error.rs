//! Errors raised when a surface is constructed with unusable parameters.

use thiserror::Error;

/// Invalid construction parameters for a heightfield or surface entity.
///
/// Sampling, normal computation, and height queries never fail; only the shape of
/// the grid and the scalar parameters are validated, once, up front.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HeightfieldError {
    #[error("grid resolution must be at least 1 subdivision per side")]
    ZeroResolution,
    #[error("grid resolution {0} produces more vertices than a u32 index can address")]
    ResolutionTooLarge(u32),
    #[error("surface size must be positive and finite, got {0}")]
    InvalidSize(f32),
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },
    #[error("wave field needs at least one wave component")]
    NoWaveComponents,
    #[error("wavelength must be positive and finite, got {0}")]
    InvalidWavelength(f32),
}

pub type Result<T> = std::result::Result<T, HeightfieldError>;

/// Reject NaN and infinities for a named scalar parameter.
pub(crate) fn ensure_finite(name: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(HeightfieldError::NonFinite { name, value })
    }
}
