//! # Picking and Measurement
//!
//! Every pickable primitive carries a [`ProvenanceTag`] alongside its mesh.
//! [`HitResolver`] turns a tag plus the exact hit into the domain measurement
//! shown in the tooltip, reading only the immutable simulation snapshot.

pub mod raycast;
pub mod throttle;

use log::trace;
use serde::Serialize;

use crate::antenna::WireMetrics;
use crate::constants::is_sentinel;
use crate::coords::render_to_sim;
use crate::current::CurrentSet;
use crate::nearfield::render_point_to_cell;
use crate::pattern::SurfaceLayer;
use crate::types::{FieldGrid, FieldPlane, PatternGrid, Point3, WireId};

pub use raycast::{intersect_triangle, raycast, raycast_mesh, MeshHit, Ray};
pub use throttle::HoverThrottle;

/// Which builder produced a primitive and how to find its source sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvenanceTag {
    /// Pattern surface; the hit vertex index is `ti * phi_count + pi`
    Surface { layer: SurfaceLayer },
    /// Wire cylinder, by position in the model's wire list
    Wire { index: usize },
    /// Current tube of one wire
    Current { tag: WireId },
    /// Near-field plane
    NearField,
    /// Markers, slices, particles: drawn but never measured
    Decoration,
}

/// Tooltip record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Measurement {
    Pattern {
        theta_deg: f64,
        phi_deg: f64,
        gain_dbi: f64,
    },
    Wire {
        tag: WireId,
        length_m: f64,
        z_min_m: f64,
        z_max_m: f64,
        radius_mm: f64,
        segment_count: u32,
    },
    Current {
        tag: WireId,
        segment_index: u32,
        magnitude_a: f64,
        phase_deg: f64,
    },
    NearField {
        ix: usize,
        iy: usize,
        magnitude: f64,
        plane: FieldPlane,
        height_or_depth_m: f64,
    },
}

impl Measurement {
    /// Short tooltip text
    pub fn label(&self) -> String {
        match self {
            Measurement::Pattern { theta_deg, phi_deg, gain_dbi } => {
                format!("θ {theta_deg:.1}°  φ {phi_deg:.1}°  {gain_dbi:.2} dBi")
            }
            Measurement::Wire { tag, length_m, z_min_m, z_max_m, radius_mm, .. } => format!(
                "wire {tag}: {length_m:.3} m, z {z_min_m:.3}..{z_max_m:.3} m, r {radius_mm:.2} mm"
            ),
            Measurement::Current { tag, segment_index, magnitude_a, phase_deg } => format!(
                "wire {tag} seg {segment_index}: {:.3} mA ∠ {phase_deg:.1}°",
                magnitude_a * 1000.0
            ),
            Measurement::NearField { magnitude, plane, height_or_depth_m, .. } => {
                let at = match plane {
                    FieldPlane::Horizontal => "z",
                    FieldPlane::Vertical => "y",
                };
                format!("|E| {magnitude:.4e} V/m  ({at} = {height_or_depth_m:.2} m)")
            }
        }
    }
}

/// What was picked: the primitive's tag and where it was hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    pub tag: ProvenanceTag,
    /// Vertex of the hit triangle closest to the hit point
    pub vertex: Option<u32>,
    /// Exact hit point in render space
    pub point: Point3,
}

/// Read-only view of the data each tag refers back to
#[derive(Debug, Clone, Copy)]
pub struct HitResolver<'a> {
    pub pattern: Option<&'a PatternGrid>,
    pub wires: &'a [WireMetrics],
    pub currents: &'a CurrentSet,
    pub field: Option<&'a FieldGrid>,
}

impl<'a> HitResolver<'a> {
    /// Measurement for a pick; `None` for misses, stale or out-of-range indices
    pub fn resolve(&self, pick: Option<&Pick>) -> Option<Measurement> {
        let pick = pick?;
        let m = match pick.tag {
            ProvenanceTag::Surface { .. } => self.resolve_surface(pick.vertex?),
            ProvenanceTag::Wire { index } => self.resolve_wire(index),
            ProvenanceTag::Current { tag } => self.resolve_current(tag, pick.point),
            ProvenanceTag::NearField => self.resolve_near_field(pick.point),
            ProvenanceTag::Decoration => None,
        };
        trace!("pick {:?} -> {:?}", pick.tag, m);
        m
    }

    fn resolve_surface(&self, vertex: u32) -> Option<Measurement> {
        let grid = self.pattern?;
        if grid.phi_count == 0 {
            return None;
        }
        let v = vertex as usize;
        let (ti, pi) = (v / grid.phi_count, v % grid.phi_count);
        let gain = grid.gain(ti, pi)?;
        if is_sentinel(gain) {
            return None;
        }
        Some(Measurement::Pattern { theta_deg: grid.theta_at(ti), phi_deg: grid.phi_at(pi), gain_dbi: gain })
    }

    fn resolve_wire(&self, index: usize) -> Option<Measurement> {
        let m = self.wires.get(index)?;
        Some(Measurement::Wire {
            tag: m.tag,
            length_m: m.length,
            z_min_m: m.z_min,
            z_max_m: m.z_max,
            radius_mm: m.radius_mm,
            segment_count: m.segment_count,
        })
    }

    fn resolve_current(&self, tag: WireId, point: Point3) -> Option<Measurement> {
        let sim = render_to_sim(point);
        let sample = self.currents.wire(tag)?.nearest(sim)?;
        Some(Measurement::Current {
            tag: sample.tag,
            segment_index: sample.segment_index,
            magnitude_a: sample.magnitude,
            phase_deg: sample.phase_deg,
        })
    }

    fn resolve_near_field(&self, point: Point3) -> Option<Measurement> {
        let grid = self.field?;
        let (ix, iy) = render_point_to_cell(grid, point)?;
        let magnitude = grid.value(ix, iy).filter(|v| v.is_finite())?;
        Some(Measurement::NearField {
            ix,
            iy,
            magnitude,
            plane: grid.plane,
            height_or_depth_m: grid.height_or_depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::sim_to_render;
    use crate::nearfield::grid_to_sim;
    use crate::types::{Point2, SegmentCurrent, WireSample};

    fn pattern() -> PatternGrid {
        PatternGrid {
            theta_start: 0.0,
            theta_step: 45.0,
            theta_count: 3,
            phi_start: 0.0,
            phi_step: 90.0,
            phi_count: 4,
            gain_dbi: vec![
                vec![-999.0, -999.0, -999.0, -999.0],
                vec![1.0, 2.0, 3.0, 4.0],
                vec![5.0, 6.0, 7.0, 8.0],
            ],
        }
    }

    fn field() -> FieldGrid {
        FieldGrid {
            plane: FieldPlane::Vertical,
            origin: Point2::new(0.0, 0.0),
            dx: 0.1,
            dy: 0.1,
            nx: 4,
            ny: 5,
            height_or_depth: 0.3,
            magnitude: (0..4).map(|ix| (0..5).map(|iy| (ix * 10 + iy) as f64).collect()).collect(),
        }
    }

    fn currents() -> CurrentSet {
        CurrentSet::new(
            &(1..=3)
                .map(|i| SegmentCurrent {
                    tag: 7,
                    segment_index: i,
                    position: Point3::new(0.0, 0.0, i as f64 * 0.1),
                    magnitude: 0.01 * i as f64,
                    phase_deg: -15.0 * i as f64,
                })
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_surface_vertex_inverts_to_angles() {
        let grid = pattern();
        let set = CurrentSet::default();
        let resolver = HitResolver { pattern: Some(&grid), wires: &[], currents: &set, field: None };
        let pick = Pick { tag: ProvenanceTag::Surface { layer: SurfaceLayer::Solid }, vertex: Some(6), point: Point3::zero() };
        assert_eq!(
            resolver.resolve(Some(&pick)),
            Some(Measurement::Pattern { theta_deg: 45.0, phi_deg: 180.0, gain_dbi: 3.0 })
        );
        // sentinel sample and out-of-range vertex
        for vertex in [Some(2), Some(12), None] {
            let pick = Pick { vertex, ..pick };
            assert_eq!(resolver.resolve(Some(&pick)), None);
        }
    }

    #[test]
    fn test_wire_metrics_lookup() {
        let wire = WireSample { tag: 3, p1: Point3::new(0.0, 0.0, 1.0), p2: Point3::new(0.0, 0.0, 2.0), radius: 0.002, segment_count: 7 };
        let metrics = [WireMetrics::of(&wire)];
        let set = CurrentSet::default();
        let resolver = HitResolver { pattern: None, wires: &metrics, currents: &set, field: None };
        let pick = Pick { tag: ProvenanceTag::Wire { index: 0 }, vertex: None, point: Point3::zero() };
        match resolver.resolve(Some(&pick)) {
            Some(Measurement::Wire { tag, length_m, z_min_m, z_max_m, radius_mm, .. }) => {
                assert_eq!(tag, 3);
                assert!((length_m - 1.0).abs() < 1e-12);
                assert_eq!((z_min_m, z_max_m), (1.0, 2.0));
                assert!((radius_mm - 2.0).abs() < 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
        let stale = Pick { tag: ProvenanceTag::Wire { index: 5 }, ..pick };
        assert_eq!(resolver.resolve(Some(&stale)), None);
    }

    #[test]
    fn test_current_nearest_segment() {
        let set = currents();
        let resolver = HitResolver { pattern: None, wires: &[], currents: &set, field: None };
        let hit = sim_to_render(Point3::new(0.02, 0.0, 0.21));
        let pick = Pick { tag: ProvenanceTag::Current { tag: 7 }, vertex: Some(0), point: hit };
        assert_eq!(
            resolver.resolve(Some(&pick)),
            Some(Measurement::Current { tag: 7, segment_index: 2, magnitude_a: 0.02, phase_deg: -30.0 })
        );
        let unknown = Pick { tag: ProvenanceTag::Current { tag: 8 }, ..pick };
        assert_eq!(resolver.resolve(Some(&unknown)), None);
    }

    #[test]
    fn test_near_field_cell_and_bounds() {
        let grid = field();
        let set = CurrentSet::default();
        let resolver = HitResolver { pattern: None, wires: &[], currents: &set, field: Some(&grid) };
        let inside = sim_to_render(grid_to_sim(&grid, 2.2, 3.9));
        let pick = Pick { tag: ProvenanceTag::NearField, vertex: None, point: inside };
        assert_eq!(
            resolver.resolve(Some(&pick)),
            Some(Measurement::NearField { ix: 2, iy: 4, magnitude: 24.0, plane: FieldPlane::Vertical, height_or_depth_m: 0.3 })
        );
        let outside = Pick { point: sim_to_render(grid_to_sim(&grid, -1.0, 3.0)), ..pick };
        assert_eq!(resolver.resolve(Some(&outside)), None);
    }

    #[test]
    fn test_no_hit_and_decoration() {
        let set = CurrentSet::default();
        let resolver = HitResolver { pattern: None, wires: &[], currents: &set, field: None };
        assert_eq!(resolver.resolve(None), None);
        let pick = Pick { tag: ProvenanceTag::Decoration, vertex: Some(0), point: Point3::zero() };
        assert_eq!(resolver.resolve(Some(&pick)), None);
        let orphan = Pick { tag: ProvenanceTag::NearField, ..pick };
        assert_eq!(resolver.resolve(Some(&orphan)), None);
    }

    #[test]
    fn test_labels() {
        let m = Measurement::Current { tag: 1, segment_index: 2, magnitude_a: 0.0125, phase_deg: 45.0 };
        assert_eq!(m.label(), "wire 1 seg 2: 12.500 mA ∠ 45.0°");
        let json = serde_json::to_string(&Measurement::Pattern { theta_deg: 90.0, phi_deg: 0.0, gain_dbi: 2.15 }).unwrap();
        assert!(json.contains("\"kind\":\"pattern\""));
    }
}
