//! # Visualization Module
//!
//! Engine-facing glue: flattens scene meshes into f32 vertex buffers and holds
//! the viewer's clock and layer toggles. The Bevy front end lives in
//! [`bevy`] behind the `bevy-viz` feature.
//!
//! ```bash
//! cargo run --bin antscope-viz --features bevy-viz --release -- result.json
//! ```

#[cfg(feature = "bevy-viz")]
pub mod bevy;

#[cfg(feature = "bevy-viz")]
pub use self::bevy::run_visualization;

use crate::color::Rgb;
use crate::mesh::TriMesh;
use crate::scene::{LayerVisibility, PatternView};

/// Upload-ready vertex data for one mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Converts `mesh`; vertices without a color take `base`, all at `opacity`
    pub fn from_mesh(mesh: &TriMesh, base: Rgb, opacity: f32) -> Self {
        let n = mesh.vertex_count();
        let color = |i: usize| {
            let c = mesh.colors.get(i).copied().unwrap_or(base);
            [c.r, c.g, c.b, opacity]
        };
        Self {
            positions: mesh.positions.iter().map(|p| p.to_f32_array()).collect(),
            normals: (0..n)
                .map(|i| mesh.normals.get(i).map_or([0.0, 1.0, 0.0], |v| v.to_f32_array()))
                .collect(),
            colors: (0..n).map(color).collect(),
            indices: mesh.indices.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Playback clock shared by the particle and slice animations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    pub running: bool,
    /// Animation seconds, advanced by wall time times `speed`
    pub time: f64,
    pub speed: f64,
}

impl Default for Playback {
    fn default() -> Self {
        Self { running: true, time: 0.0, speed: 1.0 }
    }
}

impl Playback {
    pub fn advance(&mut self, dt: f64) {
        if self.running {
            self.time += dt * self.speed;
        }
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }

    pub fn faster(&mut self) {
        self.speed = (self.speed * 2.0).min(16.0);
    }

    pub fn slower(&mut self) {
        self.speed = (self.speed / 2.0).max(1.0 / 16.0);
    }
}

/// Cycles Off -> Solid -> Shells
pub fn next_pattern_view(view: PatternView) -> PatternView {
    match view {
        PatternView::Off => PatternView::Solid,
        PatternView::Solid => PatternView::Shells,
        PatternView::Shells => PatternView::Off,
    }
}

/// One-line legend of the visible layers
pub fn visibility_legend(v: &LayerVisibility) -> String {
    let mut parts = Vec::new();
    if v.wires {
        parts.push("wires".to_string());
    }
    match v.pattern {
        PatternView::Off => {}
        PatternView::Solid => parts.push("pattern".to_string()),
        PatternView::Shells => parts.push("shells".to_string()),
    }
    if v.currents {
        parts.push("currents".to_string());
    }
    if v.particles {
        parts.push("flow".to_string());
    }
    if v.near_field {
        parts.push("near field".to_string());
    }
    if let Some(mode) = v.slice {
        parts.push(format!("{mode:?} slice"));
    }
    if parts.is_empty() {
        "nothing visible".to_string()
    } else {
        parts.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::sphere;
    use crate::types::Vec3;

    #[test]
    fn test_buffers_match_mesh() {
        let mesh = sphere(Vec3::zero(), 1.0, 4, 6);
        let buf = MeshBuffers::from_mesh(&mesh, Rgb::new(0.5, 0.5, 0.5), 0.3);
        assert_eq!(buf.positions.len(), mesh.vertex_count());
        assert_eq!(buf.normals.len(), mesh.vertex_count());
        assert_eq!(buf.colors.len(), mesh.vertex_count());
        assert_eq!(buf.indices.len(), mesh.triangle_count() * 3);
        assert!(buf.colors.iter().all(|c| c[3] == 0.3 && c[0] == 0.5));
    }

    #[test]
    fn test_playback() {
        let mut p = Playback::default();
        p.advance(0.5);
        p.faster();
        p.advance(0.5);
        assert!((p.time - 1.5).abs() < 1e-12);
        p.running = false;
        p.advance(10.0);
        assert!((p.time - 1.5).abs() < 1e-12);
        for _ in 0..10 {
            p.faster();
        }
        assert_eq!(p.speed, 16.0);
    }

    #[test]
    fn test_pattern_view_cycle() {
        let v = next_pattern_view(next_pattern_view(next_pattern_view(PatternView::Solid)));
        assert_eq!(v, PatternView::Solid);
    }

    #[test]
    fn test_legend() {
        let v = LayerVisibility::default();
        assert!(visibility_legend(&v).starts_with("wires | pattern"));
        let none = LayerVisibility {
            wires: false,
            markers: false,
            pattern: PatternView::Off,
            currents: false,
            particles: false,
            near_field: false,
            slice: None,
        };
        assert_eq!(visibility_legend(&none), "nothing visible");
    }
}
