//! # Grid Statistics
//!
//! One pass per grid update; every builder that normalizes takes the result
//! instead of rescanning.

use crate::constants::is_sentinel;
use crate::types::{FieldGrid, PatternGrid};

/// Extremes over the valid samples of a grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStats {
    pub max: f64,
    pub min: f64,
    pub valid_count: usize,
}

impl GridStats {
    /// Folds the samples accepted by `valid`; `None` when nothing qualifies
    pub fn scan<I>(values: I, valid: impl Fn(f64) -> bool) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        let mut valid_count = 0;

        for v in values.into_iter().filter(|&v| valid(v)) {
            max = max.max(v);
            min = min.min(v);
            valid_count += 1;
        }

        (valid_count > 0).then_some(Self { max, min, valid_count })
    }

    /// Sentinel-filtered gain statistics
    pub fn of_pattern(grid: &PatternGrid) -> Option<Self> {
        Self::scan(grid.gain_dbi.iter().flatten().copied(), |g| !is_sentinel(g))
    }

    /// Magnitude statistics over finite cells
    pub fn of_field(grid: &FieldGrid) -> Option<Self> {
        Self::scan(grid.magnitude.iter().flatten().copied(), f64::is_finite)
    }

    /// Range used for normalization, never narrower than `floor`
    pub fn range_with_floor(&self, floor: f64) -> f64 {
        (self.max - self.min).max(floor)
    }

    /// Maps `v` into [0, 1] against `min` and the floored range
    pub fn normalize(&self, v: f64, range_floor: f64) -> f64 {
        ((v - self.min) / self.range_with_floor(range_floor)).clamp(0.0, 1.0)
    }
}
