//! # Radiation Pattern Surfaces
//!
//! Turns a (theta x phi) gain grid into render geometry:
//!
//! - a solid surface whose radius and color follow normalized gain,
//! - nested shells where gain is floored at fixed offsets below the peak,
//! - a single-ring cut through the pattern for the sweep animation.
//!
//! Vertex `ti * phi_count + pi` of every surface mesh is grid sample
//! `(ti, pi)`; the hit resolver inverts picks with that layout. The phi axis
//! wraps (last column connects to the first), theta does not.

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::{ColorScale, Rgb};
use crate::config::PatternOptions;
use crate::constants::is_sentinel;
use crate::coords::{spherical_to_render_cartesian, wrap_degrees};
use crate::mesh::TriMesh;
use crate::stats::GridStats;
use crate::types::{PatternGrid, Vec3};

/// Which pattern surface a mesh came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceLayer {
    Solid,
    /// Index into the shell list, outer first
    Shell(usize),
}

/// One nested shell
#[derive(Debug, Clone, PartialEq)]
pub struct ShellMesh {
    pub index: usize,
    pub offset_db: f64,
    pub opacity: f32,
    pub mesh: TriMesh,
}

/// Which angle the cut plane holds fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SliceMode {
    /// Fixed azimuth; the ring runs over theta (a vertical great circle)
    AzimuthSweep,
    /// Fixed polar angle; the ring runs over phi (a cone cut)
    ElevationSweep,
}

/// Closed polyline through the pattern at one cut angle
#[derive(Debug, Clone, PartialEq)]
pub struct SlicePath {
    pub mode: SliceMode,
    pub angle_deg: f64,
    /// First point repeated at the end
    pub points: Vec<Vec3>,
    pub colors: Vec<Rgb>,
}

/// How a raw gain sample is reshaped before normalization
#[derive(Debug, Clone, Copy)]
struct GainShaping {
    /// Samples below `max - floor` collapse to the minimum
    noise_floor_db: Option<f64>,
    /// Samples are raised to at least `max - offset`
    shell_offset_db: Option<f64>,
}

/// Builds pattern geometry from one grid and its shared statistics
pub struct PatternSurfaceBuilder<'a> {
    grid: &'a PatternGrid,
    stats: GridStats,
    options: &'a PatternOptions,
    scale: ColorScale,
}

impl<'a> PatternSurfaceBuilder<'a> {
    /// `None` when the grid is malformed or holds no valid sample
    pub fn new(
        grid: &'a PatternGrid,
        stats: Option<GridStats>,
        options: &'a PatternOptions,
    ) -> Option<Self> {
        if let Err(e) = grid.validate() {
            warn!("pattern grid rejected: {e}");
            return None;
        }
        let Some(stats) = stats else {
            warn!("pattern grid rejected: {}", crate::error::InputError::AllSentinel);
            return None;
        };
        Some(Self { grid, stats, options, scale: ColorScale::gain() })
    }

    pub fn stats(&self) -> &GridStats {
        &self.stats
    }

    fn shaped_gain(&self, gain: f64, shaping: GainShaping) -> f64 {
        let mut g = gain;
        if let Some(floor) = shaping.noise_floor_db {
            if g < self.stats.max - floor {
                g = self.stats.min;
            }
        }
        if let Some(offset) = shaping.shell_offset_db {
            g = g.max(self.stats.max - offset);
        }
        g
    }

    /// Normalized gain in [0, 1]; the no-data marker maps to 0
    fn normalize(&self, gain: f64, shaping: GainShaping) -> f64 {
        if is_sentinel(gain) {
            return 0.0;
        }
        let g = self.shaped_gain(gain, shaping);
        self.stats.normalize(g, self.options.gain_range_floor_db)
    }

    /// Normalized gain of sample `(ti, pi)` as the solid surface sees it
    pub fn normalized(&self, ti: usize, pi: usize) -> Option<f64> {
        self.grid.gain(ti, pi).map(|g| self.normalize(g, self.solid_shaping()))
    }

    fn radius(&self, t: f64) -> f64 {
        t.max(self.options.r_min) * self.options.scale
    }

    fn vertex(&self, t: f64, theta: f64, phi: f64) -> Vec3 {
        self.options.center + spherical_to_render_cartesian(self.radius(t), theta, phi)
    }

    fn solid_shaping(&self) -> GainShaping {
        GainShaping { noise_floor_db: self.options.noise_floor_db, shell_offset_db: None }
    }

    fn surface(&self, shaping: GainShaping) -> Option<TriMesh> {
        let (nt, np) = (self.grid.theta_count, self.grid.phi_count);
        if nt < 2 || np < 2 {
            debug!("pattern grid {nt}x{np} too small to triangulate");
            return None;
        }

        let mut mesh = TriMesh::with_capacity(nt * np, 2 * (nt - 1) * np);
        for ti in 0..nt {
            let theta = self.grid.theta_at(ti);
            for pi in 0..np {
                let t = self.normalize(self.grid.gain_dbi[ti][pi], shaping);
                let position = self.vertex(t, theta, self.grid.phi_at(pi));
                mesh.push_vertex(position, Some(self.scale.sample(t)));
            }
        }

        let np32 = np as u32;
        for ti in 0..(nt as u32 - 1) {
            for pi in 0..np32 {
                let pn = (pi + 1) % np32;
                let a = ti * np32 + pi;
                let b = ti * np32 + pn;
                let c = (ti + 1) * np32 + pi;
                let d = (ti + 1) * np32 + pn;
                mesh.push_quad(a, b, c, d);
            }
        }

        let center = self.options.center;
        mesh.compute_normals(|p| p - center);
        Some(mesh)
    }

    /// Solid surface (variant A)
    pub fn solid(&self) -> Option<TriMesh> {
        let mesh = self.surface(self.solid_shaping())?;
        debug!(
            "pattern surface: {} vertices, {} triangles, gain {:.2}..{:.2} dBi",
            mesh.vertex_count(),
            mesh.triangle_count(),
            self.stats.min,
            self.stats.max
        );
        Some(mesh)
    }

    /// Nested shells (variant B), outer to inner
    pub fn shells(&self) -> Vec<ShellMesh> {
        let mut layers: Vec<(f64, f32)> = self
            .options
            .shell_offsets_db
            .iter()
            .enumerate()
            .map(|(i, &offset)| {
                let opacity = self
                    .options
                    .shell_opacities
                    .get(i)
                    .or(self.options.shell_opacities.last())
                    .copied()
                    .unwrap_or(0.2);
                (offset, opacity)
            })
            .collect();
        // smaller offset -> higher floor -> larger shell
        layers.sort_by(|a, b| a.0.total_cmp(&b.0));

        let shells: Vec<ShellMesh> = layers
            .par_iter()
            .enumerate()
            .filter_map(|(index, &(offset_db, opacity))| {
                let shaping = GainShaping {
                    noise_floor_db: self.options.shell_noise_floor_db,
                    shell_offset_db: Some(offset_db),
                };
                self.surface(shaping)
                    .map(|mesh| ShellMesh { index, offset_db, opacity, mesh })
            })
            .collect();

        debug!("pattern shells: {} built", shells.len());
        shells
    }

    /// Gain at a fractional grid position along one axis, sentinel-aware
    fn blend(g0: f64, g1: f64, frac: f64) -> f64 {
        match (is_sentinel(g0), is_sentinel(g1)) {
            (false, false) => g0 + (g1 - g0) * frac,
            (false, true) => g0,
            (true, false) => g1,
            (true, true) => g0,
        }
    }

    /// Gain at row `ti`, interpolated between the phi columns around `phi_deg`
    fn gain_at_phi(&self, ti: usize, phi_deg: f64) -> f64 {
        let np = self.grid.phi_count;
        let step = self.grid.phi_step;
        let pos = if step.abs() > f64::EPSILON {
            wrap_degrees(phi_deg - self.grid.phi_start) / step
        } else {
            0.0
        };
        let k0 = (pos.floor() as usize) % np;
        let k1 = (k0 + 1) % np;
        let row = &self.grid.gain_dbi[ti];
        Self::blend(row[k0], row[k1], pos - pos.floor())
    }

    /// Gain at column `pi`, interpolated between the theta rows around `theta_deg`
    fn gain_at_theta(&self, pi: usize, theta_deg: f64) -> f64 {
        let nt = self.grid.theta_count;
        let step = self.grid.theta_step;
        let pos = if step.abs() > f64::EPSILON {
            ((theta_deg - self.grid.theta_start) / step).clamp(0.0, (nt - 1) as f64)
        } else {
            0.0
        };
        let k0 = pos.floor() as usize;
        let k1 = (k0 + 1).min(nt - 1);
        Self::blend(self.grid.gain_dbi[k0][pi], self.grid.gain_dbi[k1][pi], pos - pos.floor())
    }

    /// Angular slice (variant C) at `angle_deg`.
    ///
    /// In elevation-sweep mode the swept angle runs 0..360 and folds back onto
    /// theta (0..180..0), so a constant-rate sweep oscillates pole to pole.
    pub fn slice(&self, mode: SliceMode, angle_deg: f64) -> Option<SlicePath> {
        let angle = wrap_degrees(angle_deg);
        let shaping = self.solid_shaping();
        let mut points = Vec::new();
        let mut colors = Vec::new();
        let mut push = |t: f64, theta: f64, phi: f64| {
            points.push(self.vertex(t, theta, phi));
            colors.push(self.scale.sample(t));
        };

        match mode {
            SliceMode::AzimuthSweep => {
                let nt = self.grid.theta_count;
                if nt < 2 {
                    return None;
                }
                let opposite = wrap_degrees(angle + 180.0);
                for ti in 0..nt {
                    let t = self.normalize(self.gain_at_phi(ti, angle), shaping);
                    push(t, self.grid.theta_at(ti), angle);
                }
                for ti in (0..nt).rev() {
                    let t = self.normalize(self.gain_at_phi(ti, opposite), shaping);
                    push(t, self.grid.theta_at(ti), opposite);
                }
            }
            SliceMode::ElevationSweep => {
                let np = self.grid.phi_count;
                if np < 2 {
                    return None;
                }
                let theta = if angle <= 180.0 { angle } else { 360.0 - angle };
                for pi in 0..np {
                    let t = self.normalize(self.gain_at_theta(pi, theta), shaping);
                    push(t, theta, self.grid.phi_at(pi));
                }
            }
        }

        let first = *points.first()?;
        let first_color = colors[0];
        points.push(first);
        colors.push(first_color);

        Some(SlicePath { mode, angle_deg: angle, points, colors })
    }
}

/// Sweep angle after `elapsed_s` seconds at a constant rate, wrapped to [0, 360)
pub fn sweep_angle(elapsed_s: f64, rate_deg_s: f64, start_deg: f64) -> f64 {
    wrap_degrees(start_deg + elapsed_s * rate_deg_s)
}
