//! # Constants
//!
//! Fixed values shared by the geometry builders and the hit resolver.

// ============================================================================
// SOLVER DATA CONVENTIONS
// ============================================================================

/// Gain values at or below this marker mean "no sample here" (dBi)
pub const SENTINEL_GAIN_DBI: f64 = -999.0;

/// Physical wire radius (m) to display units (mm)
pub const METERS_TO_MM: f64 = 1000.0;

/// Returns true when a gain sample carries the "no data" marker
#[inline]
pub fn is_sentinel(gain_dbi: f64) -> bool {
    !gain_dbi.is_finite() || gain_dbi <= SENTINEL_GAIN_DBI
}

// ============================================================================
// PATTERN SURFACE
// ============================================================================

/// Smallest gain range used for normalization (dB)
pub const GAIN_RANGE_FLOOR_DB: f64 = 10.0;

/// Normalized radius floor; keeps nulls from collapsing into zero-area triangles
pub const PATTERN_R_MIN: f64 = 0.05;

/// Samples this far below the peak collapse to the minimum on the solid surface (dB)
pub const PATTERN_NOISE_FLOOR_DB: f64 = 30.0;

/// Offsets below the peak for the nested shells, outer to inner (dB)
pub const SHELL_OFFSETS_DB: [f64; 4] = [3.0, 6.0, 10.0, 20.0];

/// Shell opacities matching `SHELL_OFFSETS_DB`
pub const SHELL_OPACITIES: [f32; 4] = [0.45, 0.32, 0.22, 0.14];

/// Default cut-plane sweep rate (deg/s)
pub const SLICE_SWEEP_RATE_DEG_S: f64 = 20.0;

// ============================================================================
// CURRENTS
// ============================================================================

/// Points per tube ring
pub const TUBE_RING_SEGMENTS: usize = 8;

/// Visual tube radius clamp (render units)
pub const TUBE_RADIUS_MIN: f64 = 0.004;
pub const TUBE_RADIUS_MAX: f64 = 0.03;

/// Flow particle caps
pub const PARTICLES_PER_WIRE_MAX: usize = 40;
pub const PARTICLE_BUDGET: usize = 400;

/// Loop fractions per second at full current
pub const PARTICLE_BASE_SPEED: f64 = 0.5;

/// Point size at full current (render units)
pub const PARTICLE_BASE_SIZE: f64 = 0.02;

// ============================================================================
// NEAR FIELD
// ============================================================================

/// Floor for the field maximum; avoids dividing by zero on a dead grid
pub const FIELD_EPSILON: f64 = 1e-12;

/// Normalized magnitude below which a pixel is fully transparent
pub const FIELD_ALPHA_CUTOFF: f64 = 0.02;

/// Alpha for visible pixels
pub const FIELD_OPACITY: u8 = 200;

// ============================================================================
// WIRES AND JUNCTIONS
// ============================================================================

/// Endpoints closer than this are the same structural junction (m)
pub const JUNCTION_TOLERANCE: f64 = 0.01;

/// Marker sphere radii (render units)
pub const JUNCTION_MARKER_SIZE: f64 = 0.025;
pub const END_CAP_MARKER_SIZE: f64 = 0.012;

/// Visual wire radius clamp (render units)
pub const WIRE_VISUAL_RADIUS_MIN: f64 = 0.003;
pub const WIRE_VISUAL_RADIUS_MAX: f64 = 0.02;

/// Sides on each wire cylinder
pub const WIRE_CYLINDER_SEGMENTS: usize = 12;

// ============================================================================
// PICKING
// ============================================================================

/// Minimum time between two hover resolutions (s)
pub const HOVER_MIN_INTERVAL_S: f64 = 0.05;
