//! # Wire Junctions
//!
//! Finds endpoints shared by different wires and places one marker per
//! physical junction, plus smaller end-cap markers on free ends.

use log::debug;

use crate::config::JunctionOptions;
use crate::coords::sim_to_render;
use crate::types::{Vec3, WireId, WireSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Junction,
    EndCap,
}

/// Sphere marker in render space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: Vec3,
    pub size: f64,
}

#[derive(Debug, Clone, Copy)]
struct Endpoint {
    wire: usize,
    tag: WireId,
    position: Vec3,
}

fn endpoints(wires: &[WireSample]) -> Vec<Endpoint> {
    wires
        .iter()
        .enumerate()
        .flat_map(|(wire, w)| {
            [w.p1, w.p2].map(|p| Endpoint { wire, tag: w.tag, position: sim_to_render(p) })
        })
        .collect()
}

/// Endpoint pairs from different wires lying within `tolerance` of each other
fn joined_pairs(points: &[Endpoint], tolerance: f64) -> Vec<(usize, usize)> {
    let tol_sq = tolerance * tolerance;
    let mut pairs = Vec::new();
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            if points[i].wire != points[j].wire
                && points[i].position.distance_squared(&points[j].position) < tol_sq
            {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Disjoint sets over endpoint indices; every root is the lowest index of its set
struct Clusters {
    parent: Vec<usize>,
}

impl Clusters {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

/// Junction markers (one per connected cluster of joined endpoints, at its
/// first-found point) followed by end caps on every unjoined endpoint
pub fn detect(wires: &[WireSample], options: &JunctionOptions) -> Vec<Marker> {
    let points = endpoints(wires);
    let pairs = joined_pairs(&points, options.tolerance);

    let mut joined = vec![false; points.len()];
    let mut clusters = Clusters::new(points.len());
    for &(i, j) in &pairs {
        joined[i] = true;
        joined[j] = true;
        clusters.union(i, j);
    }

    let mut junctions: Vec<Marker> = Vec::new();
    let mut caps: Vec<Marker> = Vec::new();
    for (i, p) in points.iter().enumerate() {
        if !joined[i] {
            caps.push(Marker { kind: MarkerKind::EndCap, position: p.position, size: options.end_cap_size });
        } else if clusters.find(i) == i {
            junctions.push(Marker { kind: MarkerKind::Junction, position: p.position, size: options.junction_size });
        }
    }

    debug!(
        "junctions: {} markers over {} endpoints (tags {:?})",
        junctions.len(),
        points.len(),
        points.iter().zip(&joined).filter(|(_, &j)| j).map(|(p, _)| p.tag).collect::<Vec<_>>()
    );
    junctions.extend(caps);
    junctions
}

/// Only the junction markers
pub fn junctions(wires: &[WireSample], options: &JunctionOptions) -> Vec<Marker> {
    detect(wires, options)
        .into_iter()
        .filter(|m| m.kind == MarkerKind::Junction)
        .collect()
}
