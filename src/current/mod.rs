//! # Segment Currents
//!
//! Groups solver current samples per wire and builds colored tubes along them.
//! Every step after [`group_by_wire`] relies on the samples of a wire being
//! ordered by segment index.

pub mod particles;

use std::collections::BTreeMap;

use log::debug;

use crate::color::ColorScale;
use crate::config::CurrentOptions;
use crate::coords::sim_to_render;
use crate::mesh::{orthonormal_frame, TriMesh};
use crate::types::{SegmentCurrent, Vec3, WireId, WireSample};

pub use particles::{allocate_counts, FlowModel, FlowParticle, FlowWire};

/// The ordered current samples of one wire
#[derive(Debug, Clone, PartialEq)]
pub struct WireCurrents {
    pub tag: WireId,
    /// Sorted by `segment_index`
    pub samples: Vec<SegmentCurrent>,
}

impl WireCurrents {
    pub fn mean_magnitude(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|s| finite_or_zero(s.magnitude)).sum::<f64>()
            / self.samples.len() as f64
    }

    /// Sample closest to `sim_point` (squared Euclidean distance, linear scan)
    pub fn nearest(&self, sim_point: Vec3) -> Option<&SegmentCurrent> {
        self.samples.iter().min_by(|a, b| {
            a.position
                .distance_squared(&sim_point)
                .total_cmp(&b.position.distance_squared(&sim_point))
        })
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// Groups samples by wire tag (ascending) and orders each group by segment index
pub fn group_by_wire(currents: &[SegmentCurrent]) -> Vec<WireCurrents> {
    let mut groups: BTreeMap<WireId, Vec<SegmentCurrent>> = BTreeMap::new();
    for c in currents {
        groups.entry(c.tag).or_default().push(c.clone());
    }
    groups
        .into_iter()
        .map(|(tag, mut samples)| {
            samples.sort_by_key(|s| s.segment_index);
            WireCurrents { tag, samples }
        })
        .collect()
}

/// All wires' currents plus the global peak used for normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentSet {
    pub wires: Vec<WireCurrents>,
    pub max_magnitude: f64,
}

impl CurrentSet {
    pub fn new(currents: &[SegmentCurrent]) -> Self {
        let wires = group_by_wire(currents);
        let max_magnitude = currents
            .iter()
            .map(|c| finite_or_zero(c.magnitude))
            .fold(0.0, f64::max);
        Self { wires, max_magnitude }
    }

    pub fn wire(&self, tag: WireId) -> Option<&WireCurrents> {
        self.wires.iter().find(|w| w.tag == tag)
    }

    /// `magnitude / max_magnitude`, 0 when there is no current at all
    pub fn normalized(&self, magnitude: f64) -> f64 {
        if self.max_magnitude > 0.0 {
            (finite_or_zero(magnitude) / self.max_magnitude).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Render-space end points of the wire tagged `tag`, when its geometry is known
pub fn wire_span(wires: &[WireSample], tag: WireId) -> Option<(Vec3, Vec3)> {
    wires.iter().find(|w| w.tag == tag).map(|w| (sim_to_render(w.p1), sim_to_render(w.p2)))
}

/// Tube centerline with the magnitude at each point: the segment samples,
/// extended to the wire ends when `span` is known
fn tube_path(wire: &WireCurrents, span: Option<(Vec3, Vec3)>) -> Vec<(Vec3, f64)> {
    let mut path: Vec<(Vec3, f64)> =
        wire.samples.iter().map(|s| (sim_to_render(s.position), s.magnitude)).collect();
    let ends = path.first().copied().zip(path.last().copied());
    if let (Some((start, end)), Some((first, last))) = (span, ends) {
        if start.distance(&first.0) > 1e-12 {
            path.insert(0, (start, first.1));
        }
        if end.distance(&last.0) > 1e-12 {
            path.push((end, last.1));
        }
    }
    path
}

/// Tube around one wire's current path
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentTube {
    pub tag: WireId,
    pub mesh: TriMesh,
}

/// Tangent at sample `i`: forward difference at the start, backward at the
/// end, central elsewhere
fn tangent_at(points: &[Vec3], i: usize) -> Vec3 {
    let last = points.len() - 1;
    let d = if i == 0 {
        points[1] - points[0]
    } else if i == last {
        points[last] - points[last - 1]
    } else {
        points[i + 1] - points[i - 1]
    };
    d.normalize()
}

/// One tube per wire, running from end to end of the wire geometry in `wires`.
/// A wire with no geometry needs at least two samples.
pub fn build_tubes(set: &CurrentSet, wires: &[WireSample], options: &CurrentOptions) -> Vec<CurrentTube> {
    if set.max_magnitude <= 0.0 {
        debug!("current tubes skipped: no current");
        return Vec::new();
    }
    let scale = ColorScale::current();
    let ring = options.ring_segments.max(3);
    let (r_lo, r_hi) = (
        options.tube_radius_min.min(options.tube_radius_max),
        options.tube_radius_max.max(options.tube_radius_min),
    );

    let tubes: Vec<CurrentTube> = set
        .wires
        .iter()
        .filter_map(|wire| {
            let path = tube_path(wire, wire_span(wires, wire.tag));
            if path.len() < 2 {
                return None;
            }
            let points: Vec<Vec3> = path.iter().map(|(p, _)| *p).collect();
            let overall = (points[points.len() - 1] - points[0]).normalize();

            let mut mesh = TriMesh::with_capacity(points.len() * ring, 2 * (points.len() - 1) * ring);
            let mut prev_tangent = overall;
            for (i, (center, magnitude)) in path.iter().enumerate() {
                let mut tangent = tangent_at(&points, i);
                if tangent == Vec3::zero() {
                    tangent = prev_tangent;
                }
                if tangent == Vec3::zero() {
                    return None;
                }
                prev_tangent = tangent;

                let (right, up) = orthonormal_frame(tangent);
                let norm = set.normalized(*magnitude);
                let radius = r_lo + (r_hi - r_lo) * norm;
                let color = scale.sample(norm);
                for j in 0..ring {
                    let angle = j as f64 / ring as f64 * std::f64::consts::TAU;
                    let offset = right * (angle.cos() * radius) + up * (angle.sin() * radius);
                    mesh.push_vertex(*center + offset, Some(color));
                    mesh.normals.push(offset.normalize());
                }
            }

            let n = ring as u32;
            for i in 0..(points.len() as u32 - 1) {
                for j in 0..n {
                    let jn = (j + 1) % n;
                    mesh.push_quad(i * n + j, i * n + jn, (i + 1) * n + j, (i + 1) * n + jn);
                }
            }
            Some(CurrentTube { tag: wire.tag, mesh })
        })
        .collect();

    debug!("current tubes: {} wires, peak {:.4e} A", tubes.len(), set.max_magnitude);
    tubes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point3;

    pub(crate) fn sample(tag: WireId, segment_index: u32, z: f64, magnitude: f64) -> SegmentCurrent {
        SegmentCurrent {
            tag,
            segment_index,
            position: Point3::new(0.0, tag as f64, z),
            magnitude,
            phase_deg: 10.0 * segment_index as f64,
        }
    }

    #[test]
    fn test_grouping_restores_segment_order() {
        let input = vec![
            sample(2, 3, 0.3, 1.0),
            sample(1, 2, 0.2, 1.0),
            sample(2, 1, 0.1, 1.0),
            sample(1, 1, 0.1, 1.0),
            sample(2, 2, 0.2, 1.0),
            sample(1, 3, 0.3, 1.0),
        ];
        let groups = group_by_wire(&input);
        assert_eq!(groups.iter().map(|g| g.tag).collect::<Vec<_>>(), vec![1, 2]);
        for g in &groups {
            let order: Vec<u32> = g.samples.iter().map(|s| s.segment_index).collect();
            assert_eq!(order, vec![1, 2, 3]);
            assert!(g.samples.iter().all(|s| s.tag == g.tag));
        }
    }

    #[test]
    fn test_tangent_differences() {
        let pts = [Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0)];
        assert_eq!(tangent_at(&pts, 0), Vec3::unit_x());
        assert_eq!(tangent_at(&pts, 2), Vec3::unit_y());
        let mid = tangent_at(&pts, 1);
        assert!((mid.x - mid.y).abs() < 1e-12 && mid.z == 0.0);
    }

    #[test]
    fn test_tube_shape_and_radius() {
        let set = CurrentSet::new(&[
            sample(1, 1, -0.2, 0.0),
            sample(1, 2, 0.0, 2.0),
            sample(1, 3, 0.2, 1.0),
        ]);
        let options = CurrentOptions::default();
        let tubes = build_tubes(&set, &[], &options);
        assert_eq!(tubes.len(), 1);
        let mesh = &tubes[0].mesh;
        let n = options.ring_segments;
        assert_eq!(mesh.vertex_count(), 3 * n);
        assert_eq!(mesh.triangle_count(), 2 * 2 * n);
        assert_eq!(mesh.colors.len(), mesh.vertex_count());

        let center = sim_to_render(Point3::new(0.0, 1.0, 0.0));
        let r_peak = mesh.positions[n].distance(&center);
        assert!((r_peak - options.tube_radius_max).abs() < 1e-12);
        let first_center = sim_to_render(Point3::new(0.0, 1.0, -0.2));
        let r_zero = mesh.positions[0].distance(&first_center);
        assert!((r_zero - options.tube_radius_min).abs() < 1e-12);
        assert_eq!(mesh.colors[n], ColorScale::current().sample(1.0));
    }

    #[test]
    fn test_zero_current_draws_nothing() {
        let set = CurrentSet::new(&[sample(1, 1, 0.0, 0.0), sample(1, 2, 0.1, 0.0)]);
        assert_eq!(set.max_magnitude, 0.0);
        assert!(build_tubes(&set, &[], &CurrentOptions::default()).is_empty());
        assert!(build_tubes(&CurrentSet::default(), &[], &CurrentOptions::default()).is_empty());
    }

    #[test]
    fn test_single_sample_and_coincident_wires_skipped() {
        let set = CurrentSet::new(&[
            sample(1, 1, 0.0, 1.0),
            sample(2, 1, 0.5, 1.0),
            sample(2, 2, 0.5, 1.0),
        ]);
        assert!(build_tubes(&set, &[], &CurrentOptions::default()).is_empty());
    }

    #[test]
    fn test_one_segment_wire_gets_end_to_end_tube() {
        let set = CurrentSet::new(&[sample(1, 1, 0.0, 0.01)]);
        let wires = [WireSample {
            tag: 1,
            p1: Point3::new(0.0, 1.0, -0.25),
            p2: Point3::new(0.0, 1.0, 0.25),
            radius: 0.001,
            segment_count: 1,
        }];
        let options = CurrentOptions::default();
        assert!(build_tubes(&set, &[], &options).is_empty());

        let tubes = build_tubes(&set, &wires, &options);
        assert_eq!(tubes.len(), 1);
        let mesh = &tubes[0].mesh;
        let n = options.ring_segments;
        assert_eq!(mesh.vertex_count(), 3 * n);
        let start = sim_to_render(wires[0].p1);
        let end = sim_to_render(wires[0].p2);
        assert!((mesh.positions[0].distance(&start) - options.tube_radius_max).abs() < 1e-12);
        assert!((mesh.positions[2 * n].distance(&end) - options.tube_radius_max).abs() < 1e-12);
    }

    #[test]
    fn test_tube_reaches_wire_ends() {
        let set = CurrentSet::new(&[sample(2, 1, -0.1, 1.0), sample(2, 2, 0.1, 1.0)]);
        let wires = [WireSample {
            tag: 2,
            p1: Point3::new(0.0, 2.0, -0.2),
            p2: Point3::new(0.0, 2.0, 0.2),
            radius: 0.001,
            segment_count: 2,
        }];
        let tubes = build_tubes(&set, &wires, &CurrentOptions::default());
        let n = CurrentOptions::default().ring_segments;
        assert_eq!(tubes[0].mesh.vertex_count(), 4 * n);
        assert_eq!(tubes[0].mesh.triangle_count(), 2 * 3 * n);
    }

    #[test]
    fn test_nearest_sample() {
        let set = CurrentSet::new(&[sample(3, 1, 0.0, 1.0), sample(3, 2, 0.5, 1.0), sample(3, 3, 1.0, 1.0)]);
        let wire = set.wire(3).unwrap();
        let hit = wire.nearest(Point3::new(0.01, 3.0, 0.6)).unwrap();
        assert_eq!(hit.segment_index, 2);
        assert!(set.wire(9).is_none());
    }
}
