//! # Scene Configuration
//!
//! Per-layer options with defaults from [`crate::constants`]. Any subset can be
//! overridden from JSON; absent fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::types::Vec3;

/// Pattern surface, shells and slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternOptions {
    /// Render radius of a fully normalized sample
    pub scale: f64,
    /// Render-space center of the pattern
    pub center: Vec3,
    /// Normalized radius floor
    pub r_min: f64,
    /// Smallest gain range used for normalization (dB)
    pub gain_range_floor_db: f64,
    /// Solid surface: samples further below the peak collapse to the minimum
    pub noise_floor_db: Option<f64>,
    /// Same threshold for the nested shells (off unless set)
    pub shell_noise_floor_db: Option<f64>,
    /// Shell offsets below the peak, outer to inner (dB)
    pub shell_offsets_db: Vec<f64>,
    pub shell_opacities: Vec<f32>,
    /// Cut-plane sweep rate (deg/s)
    pub sweep_rate_deg_s: f64,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            center: Vec3::zero(),
            r_min: PATTERN_R_MIN,
            gain_range_floor_db: GAIN_RANGE_FLOOR_DB,
            noise_floor_db: Some(PATTERN_NOISE_FLOOR_DB),
            shell_noise_floor_db: None,
            shell_offsets_db: SHELL_OFFSETS_DB.to_vec(),
            shell_opacities: SHELL_OPACITIES.to_vec(),
            sweep_rate_deg_s: SLICE_SWEEP_RATE_DEG_S,
        }
    }
}

/// Current tubes and flow particles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentOptions {
    pub ring_segments: usize,
    pub tube_radius_min: f64,
    pub tube_radius_max: f64,
    pub particles_per_wire_max: usize,
    pub particle_budget: usize,
    pub particle_speed: f64,
    pub particle_size: f64,
}

impl Default for CurrentOptions {
    fn default() -> Self {
        Self {
            ring_segments: TUBE_RING_SEGMENTS,
            tube_radius_min: TUBE_RADIUS_MIN,
            tube_radius_max: TUBE_RADIUS_MAX,
            particles_per_wire_max: PARTICLES_PER_WIRE_MAX,
            particle_budget: PARTICLE_BUDGET,
            particle_speed: PARTICLE_BASE_SPEED,
            particle_size: PARTICLE_BASE_SIZE,
        }
    }
}

/// Near-field raster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    pub epsilon: f64,
    /// Normalized magnitude below which pixels are transparent
    pub alpha_cutoff: f64,
    pub opacity: u8,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            epsilon: FIELD_EPSILON,
            alpha_cutoff: FIELD_ALPHA_CUTOFF,
            opacity: FIELD_OPACITY,
        }
    }
}

/// Junction and end-cap markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JunctionOptions {
    pub tolerance: f64,
    pub junction_size: f64,
    pub end_cap_size: f64,
}

impl Default for JunctionOptions {
    fn default() -> Self {
        Self {
            tolerance: JUNCTION_TOLERANCE,
            junction_size: JUNCTION_MARKER_SIZE,
            end_cap_size: END_CAP_MARKER_SIZE,
        }
    }
}

/// Wire cylinders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireOptions {
    pub visual_radius_min: f64,
    pub visual_radius_max: f64,
    pub segments: usize,
}

impl Default for WireOptions {
    fn default() -> Self {
        Self {
            visual_radius_min: WIRE_VISUAL_RADIUS_MIN,
            visual_radius_max: WIRE_VISUAL_RADIUS_MAX,
            segments: WIRE_CYLINDER_SEGMENTS,
        }
    }
}

/// Pointer picking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickOptions {
    /// Minimum time between hover resolutions (s)
    pub min_interval_s: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self { min_interval_s: HOVER_MIN_INTERVAL_S }
    }
}

/// Scene configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub pattern: PatternOptions,
    pub current: CurrentOptions,
    pub field: FieldOptions,
    pub junction: JunctionOptions,
    pub wire: WireOptions,
    pub pick: PickOptions,
}

impl SceneConfig {
    pub fn from_json_str(s: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.pattern.shell_offsets_db, vec![3.0, 6.0, 10.0, 20.0]);
        assert_eq!(config.pattern.noise_floor_db, Some(30.0));
        assert_eq!(config.pattern.shell_noise_floor_db, None);
        assert_eq!(config.current.particle_budget, PARTICLE_BUDGET);
    }

    #[test]
    fn test_partial_override() {
        let config = SceneConfig::from_json_str(
            r#"{"pattern": {"scale": 2.5, "noise_floor_db": null}, "pick": {"min_interval_s": 0.1}}"#,
        )
        .unwrap();
        assert_eq!(config.pattern.scale, 2.5);
        assert_eq!(config.pattern.noise_floor_db, None);
        assert_eq!(config.pattern.r_min, PATTERN_R_MIN);
        assert_eq!(config.pick.min_interval_s, 0.1);
        assert_eq!(config.field, FieldOptions::default());
    }
}
