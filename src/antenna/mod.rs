//! # Antenna Model
//!
//! Wire cylinders for the structure itself and the per-wire figures shown on
//! hover.

use log::{debug, warn};

use crate::config::WireOptions;
use crate::constants::METERS_TO_MM;
use crate::coords::{sim_height, sim_to_render};
use crate::mesh::{cylinder, TriMesh};
use crate::types::{WireId, WireSample};

/// Hover figures for one wire, computed once per model load
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireMetrics {
    pub tag: WireId,
    /// Endpoint distance (m)
    pub length: f64,
    /// Lowest and highest endpoint height (m)
    pub z_min: f64,
    pub z_max: f64,
    pub radius_mm: f64,
    pub segment_count: u32,
}

impl WireMetrics {
    pub fn of(wire: &WireSample) -> Self {
        let (h1, h2) = (sim_height(&wire.p1), sim_height(&wire.p2));
        Self {
            tag: wire.tag,
            length: wire.length(),
            z_min: h1.min(h2),
            z_max: h1.max(h2),
            radius_mm: wire.radius * METERS_TO_MM,
            segment_count: wire.segment_count,
        }
    }
}

/// Cylinder for the wire at `index` in the model's wire list
#[derive(Debug, Clone, PartialEq)]
pub struct WireMesh {
    pub index: usize,
    pub tag: WireId,
    pub mesh: TriMesh,
}

/// One cylinder per wire with non-zero length; the visual radius is clamped
/// independently of the physical one
pub fn build_wires(wires: &[WireSample], options: &WireOptions) -> Vec<WireMesh> {
    let meshes: Vec<WireMesh> = wires
        .iter()
        .enumerate()
        .filter_map(|(index, w)| {
            let (a, b) = (sim_to_render(w.p1), sim_to_render(w.p2));
            if !(a.is_finite() && b.is_finite()) || a.distance(&b) <= 1e-12 {
                warn!("wire {} skipped: zero length or non-finite endpoints", w.tag);
                return None;
            }
            let radius = w.radius.clamp(options.visual_radius_min, options.visual_radius_max);
            let mesh = cylinder(a, b, radius, options.segments);
            (!mesh.is_empty()).then_some(WireMesh { index, tag: w.tag, mesh })
        })
        .collect();
    debug!("wires: {} of {} meshed", meshes.len(), wires.len());
    meshes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point3;

    #[test]
    fn test_metrics() {
        let w = WireSample {
            tag: 4,
            p1: Point3::new(0.0, 0.0, 2.0),
            p2: Point3::new(3.0, 4.0, -1.0),
            radius: 0.0015,
            segment_count: 9,
        };
        let m = WireMetrics::of(&w);
        assert!((m.length - (9.0f64 + 16.0 + 9.0).sqrt()).abs() < 1e-12);
        assert_eq!((m.z_min, m.z_max), (-1.0, 2.0));
        assert!((m.radius_mm - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_length_wire_skipped() {
        let wires = vec![
            WireSample { tag: 1, p1: Point3::zero(), p2: Point3::zero(), radius: 0.001, segment_count: 1 },
            WireSample { tag: 2, p1: Point3::zero(), p2: Point3::new(0.0, 0.0, 1.0), radius: 0.001, segment_count: 3 },
        ];
        let meshes = build_wires(&wires, &WireOptions::default());
        assert_eq!(meshes.len(), 1);
        assert_eq!((meshes[0].index, meshes[0].tag), (1, 2));
    }

    #[test]
    fn test_visual_radius_clamped() {
        let options = WireOptions::default();
        let wires = vec![WireSample {
            tag: 1,
            p1: Point3::zero(),
            p2: Point3::new(0.0, 0.0, 1.0),
            radius: 5.0,
            segment_count: 3,
        }];
        let mesh = &build_wires(&wires, &options)[0].mesh;
        let r = mesh.positions[0].distance(&sim_to_render(Point3::zero()));
        assert!((r - options.visual_radius_max).abs() < 1e-12);
    }
}
