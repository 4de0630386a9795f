//! # Coordinate Frames
//!
//! The solver works in a z-up frame with `theta` measured from +z and `phi`
//! counter-clockwise from +x. The renderer is y-up with -z pointing "north"
//! (forward), so sim `(x, y, z)` lands at render `(x, z, -y)`.
//!
//! Both directions are a pure axis permutation plus one negation, so a round
//! trip is exact in floating point.

use crate::types::{Point3, Vec3};

/// Simulation frame to render frame
#[inline]
pub fn sim_to_render(p: Point3) -> Point3 {
    Vec3::new(p.x, p.z, -p.y)
}

/// Render frame to simulation frame
#[inline]
pub fn render_to_sim(p: Point3) -> Point3 {
    Vec3::new(p.x, -p.z, p.y)
}

/// Spherical (r, theta, phi in degrees) to simulation cartesian
pub fn spherical_to_sim_cartesian(radius: f64, theta_deg: f64, phi_deg: f64) -> Point3 {
    let theta = theta_deg.to_radians();
    let phi = phi_deg.to_radians();
    let (sin_t, cos_t) = theta.sin_cos();
    let (sin_p, cos_p) = phi.sin_cos();
    Vec3::new(radius * sin_t * cos_p, radius * sin_t * sin_p, radius * cos_t)
}

/// Spherical (r, theta, phi in degrees) straight into the render frame
pub fn spherical_to_render_cartesian(radius: f64, theta_deg: f64, phi_deg: f64) -> Point3 {
    sim_to_render(spherical_to_sim_cartesian(radius, theta_deg, phi_deg))
}

/// Height of a simulation point (its vertical coordinate)
#[inline]
pub fn sim_height(p: &Point3) -> f64 {
    p.z
}

/// Wraps an angle into [0, 360)
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_exact() {
        let samples = [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-0.1, 1e-300, -7.5e12),
            Vec3::new(0.0, -0.0, f64::MIN_POSITIVE),
            Vec3::new(0.3333333333333333, -2.718281828, 1.0 / 3.0),
        ];
        for p in samples {
            assert_eq!(render_to_sim(sim_to_render(p)), p);
            assert_eq!(sim_to_render(render_to_sim(p)), p);
        }
    }

    #[test]
    fn test_vertical_axis_maps_to_render_up() {
        let up = sim_to_render(Vec3::unit_z());
        assert_eq!(up, Vec3::unit_y());
        // +y (sim) points away from the viewer
        assert_eq!(sim_to_render(Vec3::unit_y()), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_frame_stays_right_handed() {
        let x = sim_to_render(Vec3::unit_x());
        let y = sim_to_render(Vec3::unit_y());
        let z = sim_to_render(Vec3::unit_z());
        assert_eq!(x.cross(&y), z);
    }

    #[test]
    fn test_spherical_zenith_and_horizon() {
        let zenith = spherical_to_render_cartesian(2.0, 0.0, 123.0);
        assert!((zenith.y - 2.0).abs() < 1e-12);
        assert!(zenith.x.abs() < 1e-12 && zenith.z.abs() < 1e-12);

        let east = spherical_to_render_cartesian(1.0, 90.0, 90.0);
        // sim +y -> render -z
        assert!((east.z + 1.0).abs() < 1e-12);
        assert!(east.y.abs() < 1e-12);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert!(wrap_degrees(-1e-20) < 360.0);
    }
}
