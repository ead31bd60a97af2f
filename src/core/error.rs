//! Error types for tendril

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Build a config error for a named field.
    pub fn config(field: &str, reason: impl std::fmt::Display) -> Self {
        Error::Config(format!("{field}: {reason}"))
    }
}

/// Reject non-finite or non-positive values.
pub(crate) fn ensure_positive(field: &str, value: f64) -> crate::core::Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::config(field, format!("must be finite and > 0, got {value}")));
    }
    Ok(())
}

/// Reject non-finite or negative values.
pub(crate) fn ensure_non_negative(field: &str, value: f64) -> crate::core::Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::config(field, format!("must be finite and >= 0, got {value}")));
    }
    Ok(())
}

/// Reject non-finite values.
pub(crate) fn ensure_finite(field: &str, value: f64) -> crate::core::Result<()> {
    if !value.is_finite() {
        return Err(Error::config(field, format!("must be finite, got {value}")));
    }
    Ok(())
}

/// Reject values outside `[min, max]`.
pub(crate) fn ensure_in_range(field: &str, value: f64, min: f64, max: f64) -> crate::core::Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(Error::config(field, format!("must lie in [{min}, {max}], got {value}")));
    }
    Ok(())
}

/// Reject inverted or non-finite `(min, max)` ranges.
pub(crate) fn ensure_range(field: &str, range: (f64, f64)) -> crate::core::Result<()> {
    let (lo, hi) = range;
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(Error::config(field, format!("invalid range ({lo}, {hi})")));
    }
    Ok(())
}
