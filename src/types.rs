//! # Core Types
//!
//! Vector math and the solver records handed in by the data layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

// ============================================================================
// VECTOR TYPES (3D)
// ============================================================================

/// 3D vector for positions and directions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Points and vectors share one representation
pub type Point3 = Vec3;

impl Vec3 {
    /// Create new vector
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    /// Unit vectors
    pub const fn unit_x() -> Self { Self::new(1.0, 0.0, 0.0) }
    pub const fn unit_y() -> Self { Self::new(0.0, 1.0, 0.0) }
    pub const fn unit_z() -> Self { Self::new(0.0, 0.0, 1.0) }

    /// Magnitude squared
    pub fn mag_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Magnitude
    pub fn mag(&self) -> f64 {
        self.mag_squared().sqrt()
    }

    /// Unit vector, or zero when the input is (near) zero
    pub fn normalize(&self) -> Self {
        let m = self.mag();
        if m > 1e-15 {
            Self::new(self.x / m, self.y / m, self.z / m)
        } else {
            Self::zero()
        }
    }

    /// Dot product
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Scale by scalar
    pub fn scale(&self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Squared distance to `other`
    pub fn distance_squared(&self, other: &Self) -> f64 {
        (*self - *other).mag_squared()
    }

    /// Distance to `other`
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Linear interpolation, `t = 0` gives `self`
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        *self + (*other - *self) * t
    }

    /// No NaN or infinite component
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Narrow to render precision
    pub fn to_f32_array(&self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl std::ops::Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl std::ops::Mul<Vec3> for f64 {
    type Output = Vec3;
    fn mul(self, v: Vec3) -> Vec3 {
        Vec3::new(self * v.x, self * v.y, self * v.z)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl std::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4})", self.x, self.y, self.z)
    }
}

/// 2D point (grid origins, screen positions)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Float equality under which NaN equals NaN
fn same_f64(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn same_vec3(a: &Vec3, b: &Vec3) -> bool {
    same_f64(a.x, b.x) && same_f64(a.y, b.y) && same_f64(a.z, b.z)
}

fn same_table(a: &[Vec<f64>], b: &[Vec<f64>]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(ra, rb)| ra.len() == rb.len() && ra.iter().zip(rb).all(|(x, y)| same_f64(*x, *y)))
}

// ============================================================================
// WIRES AND CURRENTS
// ============================================================================

/// Solver tag number identifying a wire
pub type WireId = u32;

/// One straight wire of the antenna model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSample {
    pub tag: WireId,
    pub p1: Point3,
    pub p2: Point3,
    /// Physical radius (m)
    pub radius: f64,
    pub segment_count: u32,
}

impl WireSample {
    pub fn length(&self) -> f64 {
        self.p1.distance(&self.p2)
    }

    /// Like `==`, but NaN fields compare equal to NaN
    pub fn same_input(&self, other: &Self) -> bool {
        self.tag == other.tag
            && same_vec3(&self.p1, &other.p1)
            && same_vec3(&self.p2, &other.p2)
            && same_f64(self.radius, other.radius)
            && self.segment_count == other.segment_count
    }
}

/// Current phasor at the center of one wire segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentCurrent {
    pub tag: WireId,
    pub segment_index: u32,
    pub position: Point3,
    /// Amplitude (A), non-negative
    pub magnitude: f64,
    pub phase_deg: f64,
}

impl SegmentCurrent {
    /// Like `==`, but NaN fields compare equal to NaN
    pub fn same_input(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.segment_index == other.segment_index
            && same_vec3(&self.position, &other.position)
            && same_f64(self.magnitude, other.magnitude)
            && same_f64(self.phase_deg, other.phase_deg)
    }
}

// ============================================================================
// GRIDS
// ============================================================================

/// Far-field gain over a (theta x phi) grid, angles in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternGrid {
    pub theta_start: f64,
    pub theta_step: f64,
    pub theta_count: usize,
    pub phi_start: f64,
    pub phi_step: f64,
    pub phi_count: usize,
    /// `gain_dbi[theta_index][phi_index]`
    pub gain_dbi: Vec<Vec<f64>>,
}

impl PatternGrid {
    pub fn theta_at(&self, ti: usize) -> f64 {
        self.theta_start + ti as f64 * self.theta_step
    }

    pub fn phi_at(&self, pi: usize) -> f64 {
        self.phi_start + pi as f64 * self.phi_step
    }

    pub fn gain(&self, ti: usize, pi: usize) -> Option<f64> {
        self.gain_dbi.get(ti).and_then(|row| row.get(pi)).copied()
    }

    /// Like `==`, but NaN cells compare equal to NaN
    pub fn same_input(&self, other: &Self) -> bool {
        same_f64(self.theta_start, other.theta_start)
            && same_f64(self.theta_step, other.theta_step)
            && self.theta_count == other.theta_count
            && same_f64(self.phi_start, other.phi_start)
            && same_f64(self.phi_step, other.phi_step)
            && self.phi_count == other.phi_count
            && same_table(&self.gain_dbi, &other.gain_dbi)
    }

    /// Checks the declared counts against the gain table
    pub fn validate(&self) -> Result<(), InputError> {
        if self.theta_count == 0 || self.phi_count == 0 {
            return Err(InputError::EmptyGrid);
        }
        if !(self.theta_step.is_finite() && self.phi_step.is_finite())
            || self.theta_step <= 0.0
            || self.phi_step <= 0.0
        {
            return Err(InputError::BadStep);
        }
        if self.gain_dbi.len() != self.theta_count {
            return Err(InputError::ShapeMismatch {
                axis: "theta",
                expected: self.theta_count,
                found: self.gain_dbi.len(),
            });
        }
        if let Some(row) = self.gain_dbi.iter().find(|row| row.len() != self.phi_count) {
            return Err(InputError::ShapeMismatch {
                axis: "phi",
                expected: self.phi_count,
                found: row.len(),
            });
        }
        Ok(())
    }
}

/// Orientation of a near-field sampling plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldPlane {
    /// Constant height; grid axes are sim x and y
    Horizontal,
    /// Constant depth along sim y; grid axes are sim x and z
    Vertical,
}

/// 2D near-field magnitude grid on one plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGrid {
    pub plane: FieldPlane,
    pub origin: Point2,
    pub dx: f64,
    pub dy: f64,
    pub nx: usize,
    pub ny: usize,
    /// Height (horizontal plane) or depth (vertical plane), m
    pub height_or_depth: f64,
    /// `magnitude[ix][iy]`
    pub magnitude: Vec<Vec<f64>>,
}

impl FieldGrid {
    pub fn value(&self, ix: usize, iy: usize) -> Option<f64> {
        self.magnitude.get(ix).and_then(|col| col.get(iy)).copied()
    }

    /// Like `==`, but NaN cells compare equal to NaN
    pub fn same_input(&self, other: &Self) -> bool {
        self.plane == other.plane
            && same_f64(self.origin.x, other.origin.x)
            && same_f64(self.origin.y, other.origin.y)
            && same_f64(self.dx, other.dx)
            && same_f64(self.dy, other.dy)
            && self.nx == other.nx
            && self.ny == other.ny
            && same_f64(self.height_or_depth, other.height_or_depth)
            && same_table(&self.magnitude, &other.magnitude)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.nx == 0 || self.ny == 0 {
            return Err(InputError::EmptyGrid);
        }
        if !(self.dx.is_finite() && self.dy.is_finite()) || self.dx <= 0.0 || self.dy <= 0.0 {
            return Err(InputError::BadStep);
        }
        if self.magnitude.len() != self.nx {
            return Err(InputError::ShapeMismatch {
                axis: "x",
                expected: self.nx,
                found: self.magnitude.len(),
            });
        }
        if let Some(col) = self.magnitude.iter().find(|col| col.len() != self.ny) {
            return Err(InputError::ShapeMismatch {
                axis: "y",
                expected: self.ny,
                found: col.len(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// SIMULATION RESULT
// ============================================================================

/// Everything the data layer hands over for one solver run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationResult {
    pub wires: Vec<WireSample>,
    pub currents: Vec<SegmentCurrent>,
    pub pattern: Option<PatternGrid>,
    pub near_field: Option<FieldGrid>,
}

impl SimulationResult {
    pub fn from_json_str(s: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
