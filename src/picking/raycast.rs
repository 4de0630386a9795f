//! # Ray Picking
//!
//! Möller–Trumbore intersection against indexed triangle meshes. Both faces
//! count as hits since pattern shells and field planes are drawn double-sided.

use crate::mesh::TriMesh;
use crate::types::Vec3;

/// Pick ray in render space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.normalize() }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Closest hit on one mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    pub triangle: usize,
    /// Triangle corner closest to the hit (largest barycentric weight)
    pub vertex: u32,
    pub point: Vec3,
    pub distance: f64,
}

/// Ray parameter and barycentrics `(t, u, v)` of a hit, if any
pub fn intersect_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<(f64, f64, f64)> {
    const EPS: f64 = 1e-12;
    let e1 = b - a;
    let e2 = c - a;
    let p = ray.direction.cross(&e2);
    let det = e1.dot(&p);
    if det.abs() < EPS {
        return None;
    }
    let inv = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(&p) * inv;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(&e1);
    let v = ray.direction.dot(&q) * inv;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(&q) * inv;
    (t > EPS).then_some((t, u, v))
}

/// Nearest intersection of `ray` with `mesh`
pub fn raycast_mesh(ray: &Ray, mesh: &TriMesh) -> Option<MeshHit> {
    let mut best: Option<MeshHit> = None;
    for (triangle, [ia, ib, ic]) in mesh.triangles().enumerate() {
        let (a, b, c) = (
            mesh.positions[ia as usize],
            mesh.positions[ib as usize],
            mesh.positions[ic as usize],
        );
        let Some((t, u, v)) = intersect_triangle(ray, a, b, c) else { continue };
        if best.is_some_and(|h| h.distance <= t) {
            continue;
        }
        let w = 1.0 - u - v;
        let vertex = if w >= u && w >= v {
            ia
        } else if u >= v {
            ib
        } else {
            ic
        };
        best = Some(MeshHit { triangle, vertex, point: ray.at(t), distance: t });
    }
    best
}

/// Nearest hit across several meshes, with the index of the mesh that was hit
pub fn raycast<'m, I>(ray: &Ray, meshes: I) -> Option<(usize, MeshHit)>
where
    I: IntoIterator<Item = &'m TriMesh>,
{
    meshes
        .into_iter()
        .enumerate()
        .filter_map(|(i, m)| raycast_mesh(ray, m).map(|h| (i, h)))
        .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::sphere;

    fn unit_quad() -> TriMesh {
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
        mesh
    }

    #[test]
    fn test_hit_and_nearest_vertex() {
        let ray = Ray::new(Vec3::new(0.9, 0.8, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = raycast_mesh(&ray, &unit_quad()).unwrap();
        assert!((hit.distance - 5.0).abs() < 1e-12);
        assert!((hit.point.x - 0.9).abs() < 1e-12);
        assert_eq!(hit.vertex, 3);
    }

    #[test]
    fn test_miss_and_behind() {
        let quad = unit_quad();
        let beside = Ray::new(Vec3::new(2.0, 0.5, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(raycast_mesh(&beside, &quad).is_none());
        let away = Ray::new(Vec3::new(0.5, 0.5, 1.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(raycast_mesh(&away, &quad).is_none());
        let parallel = Ray::new(Vec3::new(0.5, 0.5, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(raycast_mesh(&parallel, &quad).is_none());
    }

    #[test]
    fn test_nearest_mesh_wins() {
        let near = sphere(Vec3::new(0.0, 0.0, 2.0), 0.5, 8, 12);
        let far = sphere(Vec3::new(0.0, 0.0, -2.0), 0.5, 8, 12);
        let ray = Ray::new(Vec3::new(0.0, 0.01, 10.0), Vec3::new(0.0, 0.0, -1.0));
        let (index, hit) = raycast(&ray, [&far, &near]).unwrap();
        assert_eq!(index, 1);
        assert!(hit.point.z > 2.0);
    }
}
