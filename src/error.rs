//! # Errors
//!
//! Structural input faults and the loading errors of the binaries.
//! Geometry builders never surface these: they log and draw nothing.

use thiserror::Error;

/// Faults in solver data or color stop tables
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("grid has no samples")]
    EmptyGrid,
    #[error("grid step must be finite and positive")]
    BadStep,
    #[error("{axis} axis declares {expected} samples but holds {found}")]
    ShapeMismatch {
        axis: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("every gain sample is the no-data marker")]
    AllSentinel,
    #[error("color scale needs at least two stops, got {0}")]
    TooFewStops(usize),
    #[error("color scale must start at t=0 and end at t=1")]
    BadStopAnchors,
    #[error("color stop {index} does not increase (t={t})")]
    NonMonotonicStops { index: usize, t: f32 },
}

/// Crate-level error for loading inputs and configuration
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
