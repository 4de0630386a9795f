//! # Demo Models
//!
//! Closed-form stand-ins for solver output: a center-fed half-wave dipole and
//! an inverted vee built from two wires sharing the feed point. Used by the
//! CLI and viewer when no result file is given, and by tests.

use std::f64::consts::PI;

use crate::types::{FieldGrid, FieldPlane, PatternGrid, Point2, SegmentCurrent, SimulationResult, Vec3, WireSample};

/// Free-space wavelength of the demo models (m)
pub const WAVELENGTH: f64 = 1.0;
/// Feed current amplitude (A)
pub const FEED_CURRENT: f64 = 0.01;
/// Peak gain of a half-wave dipole (dBi)
pub const DIPOLE_PEAK_DBI: f64 = 2.15;

const SEGMENTS: u32 = 11;
const WIRE_RADIUS: f64 = 0.001;

/// Half-wave dipole along sim z
pub fn dipole() -> SimulationResult {
    let half = WAVELENGTH / 4.0;
    let wire = WireSample {
        tag: 1,
        p1: Vec3::new(0.0, 0.0, -half),
        p2: Vec3::new(0.0, 0.0, half),
        radius: WIRE_RADIUS,
        segment_count: SEGMENTS,
    };
    let currents = standing_wave(&wire, Vec3::zero());
    SimulationResult {
        near_field: Some(near_field(&[wire.clone()], 0.3)),
        pattern: Some(dipole_pattern(5.0, 5.0)),
        currents,
        wires: vec![wire],
    }
}

/// Two quarter-wave legs drooping 45° from a common apex
pub fn inverted_vee() -> SimulationResult {
    let apex = Vec3::new(0.0, 0.0, 0.5);
    let leg = WAVELENGTH / 4.0;
    let d = leg / 2f64.sqrt();
    let wires: Vec<WireSample> = [(1, -1.0), (2, 1.0)]
        .into_iter()
        .map(|(tag, side)| WireSample {
            tag,
            p1: apex,
            p2: Vec3::new(side * d, 0.0, apex.z - d),
            radius: WIRE_RADIUS,
            segment_count: SEGMENTS,
        })
        .collect();
    let currents = wires.iter().flat_map(|w| standing_wave(w, apex)).collect();
    SimulationResult {
        near_field: Some(near_field(&wires, apex.z + 0.1)),
        pattern: Some(dipole_pattern(5.0, 5.0)),
        currents,
        wires,
    }
}

/// Sinusoidal standing wave, maximal at `feed`, one sample per segment center
fn standing_wave(wire: &WireSample, feed: Vec3) -> Vec<SegmentCurrent> {
    let k = 2.0 * PI / WAVELENGTH;
    let n = wire.segment_count.max(1);
    (0..n)
        .map(|i| {
            let position = wire.p1.lerp(&wire.p2, (i as f64 + 0.5) / n as f64);
            let d = position.distance(&feed);
            SegmentCurrent {
                tag: wire.tag,
                segment_index: i,
                position,
                magnitude: FEED_CURRENT * (k * d).cos().abs(),
                phase_deg: 0.0,
            }
        })
        .collect()
}

/// Half-wave dipole gain; the nulls along the axis use the no-data marker
fn dipole_pattern(theta_step: f64, phi_step: f64) -> PatternGrid {
    let theta_count = (180.0 / theta_step).round() as usize + 1;
    let phi_count = (360.0 / phi_step).round() as usize;
    let gain_dbi = (0..theta_count)
        .map(|ti| {
            let theta = (ti as f64 * theta_step).to_radians();
            let g = if theta.sin().abs() < 1e-9 {
                crate::constants::SENTINEL_GAIN_DBI
            } else {
                let f = ((PI / 2.0) * theta.cos()).cos() / theta.sin();
                DIPOLE_PEAK_DBI + 20.0 * f.abs().max(1e-6).log10()
            };
            vec![g; phi_count]
        })
        .collect();
    PatternGrid {
        theta_start: 0.0,
        theta_step,
        theta_count,
        phi_start: 0.0,
        phi_step,
        phi_count,
        gain_dbi,
    }
}

/// Quasi-static |E| falling off with distance to the nearest wire
fn near_field(wires: &[WireSample], height: f64) -> FieldGrid {
    let (nx, ny, step) = (41, 41, 0.05);
    let origin = Point2::new(-1.0, -1.0);
    let magnitude = (0..nx)
        .map(|ix| {
            (0..ny)
                .map(|iy| {
                    let p = Vec3::new(origin.x + ix as f64 * step, origin.y + iy as f64 * step, height);
                    let d = wires
                        .iter()
                        .map(|w| distance_to_segment(p, w.p1, w.p2))
                        .fold(f64::INFINITY, f64::min);
                    60.0 * FEED_CURRENT / (d + 0.01)
                })
                .collect()
        })
        .collect();
    FieldGrid {
        plane: FieldPlane::Horizontal,
        origin,
        dx: step,
        dy: step,
        nx,
        ny,
        height_or_depth: height,
        magnitude,
    }
}

fn distance_to_segment(p: Vec3, a: Vec3, b: Vec3) -> f64 {
    let ab = b - a;
    let len2 = ab.dot(&ab);
    if len2 <= 0.0 {
        return p.distance(&a);
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    p.distance(&a.lerp(&b, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dipole_inputs_validate() {
        let r = dipole();
        r.pattern.as_ref().unwrap().validate().unwrap();
        r.near_field.as_ref().unwrap().validate().unwrap();
        assert_eq!(r.currents.len(), SEGMENTS as usize);
    }

    #[test]
    fn test_dipole_peak_is_broadside() {
        let p = dipole().pattern.unwrap();
        let ti = 90 / 5;
        assert!((p.gain(ti, 0).unwrap() - DIPOLE_PEAK_DBI).abs() < 1e-9);
        assert!(crate::constants::is_sentinel(p.gain(0, 0).unwrap()));
    }

    #[test]
    fn test_current_peaks_at_feed() {
        let r = dipole();
        let mid = &r.currents[SEGMENTS as usize / 2];
        assert!(r.currents.iter().all(|c| c.magnitude <= mid.magnitude));
        assert!(r.currents.iter().all(|c| c.magnitude > 0.0));
    }

    #[test]
    fn test_vee_shares_apex() {
        let r = inverted_vee();
        assert_eq!(r.wires.len(), 2);
        assert_eq!(r.wires[0].p1, r.wires[1].p1);
    }
}
