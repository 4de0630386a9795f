//! # Triangle Meshes
//!
//! Renderer-neutral indexed triangle lists produced by every geometry builder.

use crate::color::Rgb;
use crate::types::Vec3;

/// Indexed triangle list in render space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Per-vertex colors, empty when the layer is flat-shaded
    pub colors: Vec<Rgb>,
    pub indices: Vec<u32>,
}

impl TriMesh {
    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::new(),
            colors: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(triangles * 3),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends a vertex and returns its index
    pub fn push_vertex(&mut self, position: Vec3, color: Option<Rgb>) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        if let Some(c) = color {
            self.colors.push(c);
        }
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Two triangles over the quad `a b / c d` (a-b along one edge, c-d the next row)
    pub fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, c, b, b, c, d]);
    }

    pub fn triangle(&self, t: usize) -> Option<[u32; 3]> {
        let base = t * 3;
        self.indices.get(base..base + 3).map(|s| [s[0], s[1], s[2]])
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|s| [s[0], s[1], s[2]])
    }

    /// Area-weighted face normals averaged per vertex, renormalized.
    /// Vertices touched only by degenerate faces fall back to `fallback(position)`.
    pub fn compute_normals(&mut self, fallback: impl Fn(Vec3) -> Vec3) {
        let mut acc = vec![Vec3::zero(); self.positions.len()];

        for [a, b, c] in self.triangles().collect::<Vec<_>>() {
            let (pa, pb, pc) = (
                self.positions[a as usize],
                self.positions[b as usize],
                self.positions[c as usize],
            );
            let face = (pb - pa).cross(&(pc - pa));
            acc[a as usize] += face;
            acc[b as usize] += face;
            acc[c as usize] += face;
        }

        self.normals = acc
            .iter()
            .zip(&self.positions)
            .map(|(n, &p)| {
                let unit = n.normalize();
                if unit == Vec3::zero() { fallback(p).normalize() } else { unit }
            })
            .collect();
    }

    /// Largest distance of any vertex from `center`
    pub fn bounding_radius(&self, center: Vec3) -> f64 {
        self.positions
            .iter()
            .map(|p| p.distance(&center))
            .fold(0.0, f64::max)
    }

    /// Appends another mesh, offsetting its indices
    pub fn append(&mut self, other: &TriMesh) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.colors.extend_from_slice(&other.colors);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }
}

/// Two vectors orthonormal to `direction`, using a reference axis that is not
/// near-parallel to it
pub fn orthonormal_frame(direction: Vec3) -> (Vec3, Vec3) {
    let t = direction.normalize();
    let reference = if t.y.abs() < 0.9 { Vec3::unit_y() } else { Vec3::unit_x() };
    let right = t.cross(&reference).normalize();
    let up = right.cross(&t).normalize();
    (right, up)
}

/// Closed cylinder between two render-space points
pub fn cylinder(a: Vec3, b: Vec3, radius: f64, segments: usize) -> TriMesh {
    let axis = b - a;
    if axis.mag() <= 1e-12 || segments < 3 || radius <= 0.0 {
        return TriMesh::default();
    }
    let (right, up) = orthonormal_frame(axis);
    let mut mesh = TriMesh::with_capacity(2 * segments + 2, 4 * segments);

    for end in [a, b] {
        for j in 0..segments {
            let angle = j as f64 / segments as f64 * std::f64::consts::TAU;
            let offset = right * (angle.cos() * radius) + up * (angle.sin() * radius);
            mesh.push_vertex(end + offset, None);
        }
    }
    let seg = segments as u32;
    for j in 0..seg {
        let jn = (j + 1) % seg;
        mesh.push_quad(j, jn, seg + j, seg + jn);
    }

    let cap_a = mesh.push_vertex(a, None);
    let cap_b = mesh.push_vertex(b, None);
    for j in 0..seg {
        let jn = (j + 1) % seg;
        mesh.push_triangle(cap_a, jn, j);
        mesh.push_triangle(cap_b, seg + j, seg + jn);
    }

    let mid = a.lerp(&b, 0.5);
    mesh.compute_normals(|p| p - mid);
    mesh
}

/// Low-poly UV sphere for markers
pub fn sphere(center: Vec3, radius: f64, rings: usize, sectors: usize) -> TriMesh {
    if radius <= 0.0 || rings < 2 || sectors < 3 {
        return TriMesh::default();
    }
    let mut mesh = TriMesh::with_capacity((rings + 1) * sectors, 2 * rings * sectors);
    for i in 0..=rings {
        let theta = 180.0 * i as f64 / rings as f64;
        for j in 0..sectors {
            let phi = 360.0 * j as f64 / sectors as f64;
            let p = crate::coords::spherical_to_render_cartesian(radius, theta, phi);
            mesh.push_vertex(center + p, None);
        }
    }
    let s = sectors as u32;
    for i in 0..rings as u32 {
        for j in 0..s {
            let jn = (j + 1) % s;
            mesh.push_quad(i * s + j, i * s + jn, (i + 1) * s + j, (i + 1) * s + jn);
        }
    }
    mesh.compute_normals(|p| p - center);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_winding() {
        let mut mesh = TriMesh::default();
        for p in [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ] {
            mesh.push_vertex(p, None);
        }
        mesh.push_quad(0, 1, 2, 3);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangle(1), Some([1, 2, 3]));
        assert_eq!(mesh.triangle(2), None);

        mesh.compute_normals(|_| Vec3::unit_y());
        for n in &mesh.normals {
            assert!((n.mag() - 1.0).abs() < 1e-12);
            assert!((n.z.abs() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_degenerate_normals_use_fallback() {
        let mut mesh = TriMesh::default();
        mesh.push_vertex(Vec3::zero(), None);
        mesh.push_vertex(Vec3::zero(), None);
        mesh.push_vertex(Vec3::new(0.0, 2.0, 0.0), None);
        mesh.push_triangle(0, 1, 2);
        mesh.compute_normals(|_| Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(mesh.normals[0], Vec3::unit_x());
    }

    #[test]
    fn test_frame_is_orthonormal() {
        for d in [Vec3::unit_y(), Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, -5.0, 0.01)] {
            let (r, u) = orthonormal_frame(d);
            let t = d.normalize();
            assert!(r.dot(&t).abs() < 1e-12);
            assert!(u.dot(&t).abs() < 1e-12);
            assert!(r.dot(&u).abs() < 1e-12);
            assert!((r.mag() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cylinder() {
        let mesh = cylinder(Vec3::zero(), Vec3::new(0.0, 1.0, 0.0), 0.1, 8);
        assert_eq!(mesh.vertex_count(), 18);
        assert_eq!(mesh.triangle_count(), 32);
        assert!((mesh.bounding_radius(Vec3::zero()) - (1.0f64 + 0.01).sqrt()).abs() < 1e-9);
        assert!(cylinder(Vec3::zero(), Vec3::zero(), 0.1, 8).is_empty());
    }

    #[test]
    fn test_append_offsets_indices() {
        let a = sphere(Vec3::zero(), 1.0, 4, 6);
        let mut merged = a.clone();
        merged.append(&a);
        assert_eq!(merged.vertex_count(), 2 * a.vertex_count());
        assert_eq!(merged.indices[a.indices.len()], a.indices[0] + a.vertex_count() as u32);
    }
}
