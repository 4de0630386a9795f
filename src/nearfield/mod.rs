//! # Near-Field Maps
//!
//! Colorizes a 2D field-magnitude grid into an RGBA raster and places the
//! textured quad it maps onto.
//!
//! Raster layout: one scanline per `iy`, pixels along `ix` within it, so pixel
//! `(ix, iy)` starts at byte `(iy * nx + ix) * 4`. Cell `(ix, iy)` is centered
//! on grid coordinate `(ix, iy)`; [`sim_to_grid`] is the exact inverse of
//! [`grid_to_sim`], which is what the hit resolver relies on.

use log::{debug, warn};

use crate::color::{field_color, Rgba8};
use crate::config::FieldOptions;
use crate::coords::{render_to_sim, sim_to_render};
use crate::mesh::TriMesh;
use crate::stats::GridStats;
use crate::types::{FieldGrid, FieldPlane, Point3, Vec3};

/// RGBA8 pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<u8>,
}

impl Raster {
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * self.channels;
        let p = self.data.get(i..i + 4)?;
        Some(Rgba8 { r: p[0], g: p[1], b: p[2], a: p[3] })
    }
}

/// Grid coordinates (fractional) to a simulation-frame point on the plane
pub fn grid_to_sim(grid: &FieldGrid, gx: f64, gy: f64) -> Point3 {
    let u = grid.origin.x + gx * grid.dx;
    let v = grid.origin.y + gy * grid.dy;
    match grid.plane {
        FieldPlane::Horizontal => Vec3::new(u, v, grid.height_or_depth),
        FieldPlane::Vertical => Vec3::new(u, grid.height_or_depth, v),
    }
}

/// Simulation-frame point to fractional grid coordinates (off-plane axis ignored)
pub fn sim_to_grid(grid: &FieldGrid, p: Point3) -> (f64, f64) {
    let v = match grid.plane {
        FieldPlane::Horizontal => p.y,
        FieldPlane::Vertical => p.z,
    };
    ((p.x - grid.origin.x) / grid.dx, (v - grid.origin.y) / grid.dy)
}

/// Nearest in-bounds cell for a render-space hit point
pub fn render_point_to_cell(grid: &FieldGrid, hit: Point3) -> Option<(usize, usize)> {
    let (gx, gy) = sim_to_grid(grid, render_to_sim(hit));
    if !(gx.is_finite() && gy.is_finite()) {
        return None;
    }
    let (ix, iy) = (gx.round(), gy.round());
    if ix < 0.0 || iy < 0.0 || ix >= grid.nx as f64 || iy >= grid.ny as f64 {
        return None;
    }
    Some((ix as usize, iy as usize))
}

/// Colorizes the grid; `None` for malformed grids
pub fn rasterize(grid: &FieldGrid, stats: Option<GridStats>, options: &FieldOptions) -> Option<Raster> {
    if let Err(e) = grid.validate() {
        warn!("near-field grid rejected: {e}");
        return None;
    }
    let max_field = stats.map_or(0.0, |s| s.max).max(options.epsilon);

    let mut data = Vec::with_capacity(grid.nx * grid.ny * 4);
    for iy in 0..grid.ny {
        for ix in 0..grid.nx {
            let v = grid.magnitude[ix][iy];
            let t = if v.is_finite() { (v / max_field).clamp(0.0, 1.0) } else { 0.0 };
            let alpha = if !v.is_finite() || t < options.alpha_cutoff { 0 } else { options.opacity };
            let px = Rgba8::from_rgb(field_color(t), alpha);
            data.extend_from_slice(&[px.r, px.g, px.b, px.a]);
        }
    }

    Some(Raster { width: grid.nx, height: grid.ny, channels: 4, data })
}

/// Raster plus the render-space quad it is mapped onto
#[derive(Debug, Clone, PartialEq)]
pub struct NearFieldLayer {
    pub plane: FieldPlane,
    pub height_or_depth: f64,
    pub raster: Raster,
    /// Corners in render space: (ix-, iy-), (ix+, iy-), (ix-, iy+), (ix+, iy+)
    pub quad: TriMesh,
    /// Texture coordinates per quad corner; v follows scanlines
    pub uvs: [[f32; 2]; 4],
    pub max_field: f64,
}

pub fn build_layer(grid: &FieldGrid, stats: Option<GridStats>, options: &FieldOptions) -> Option<NearFieldLayer> {
    let raster = rasterize(grid, stats, options)?;

    let (x0, y0) = (-0.5, -0.5);
    let (x1, y1) = (grid.nx as f64 - 0.5, grid.ny as f64 - 0.5);
    let mut quad = TriMesh::with_capacity(4, 2);
    for (gx, gy) in [(x0, y0), (x1, y0), (x0, y1), (x1, y1)] {
        quad.push_vertex(sim_to_render(grid_to_sim(grid, gx, gy)), None);
    }
    quad.push_quad(0, 1, 2, 3);
    let normal = match grid.plane {
        FieldPlane::Horizontal => sim_to_render(Vec3::unit_z()),
        FieldPlane::Vertical => sim_to_render(Vec3::unit_y()),
    };
    quad.normals = vec![normal; 4];

    let max_field = stats.map_or(0.0, |s| s.max).max(options.epsilon);
    debug!(
        "near-field raster: {}x{} on {:?} plane at {:.3} m, peak {:.4e}",
        raster.width, raster.height, grid.plane, grid.height_or_depth, max_field
    );

    Some(NearFieldLayer {
        plane: grid.plane,
        height_or_depth: grid.height_or_depth,
        raster,
        quad,
        uvs: [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
        max_field,
    })
}
