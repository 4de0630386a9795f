//! # Scene
//!
//! Owns every visual layer built from one simulation result. Each layer is
//! memoized on its own input and options, so an update only rebuilds what
//! changed; a layer with unusable input is simply empty and the others still
//! draw. Animation (flow particles, sweep slice) is sampled from elapsed time.

pub mod memo;

use std::fmt::Write;

use log::{debug, info};

use crate::antenna::{build_wires, WireMesh, WireMetrics};
use crate::config::{CurrentOptions, FieldOptions, JunctionOptions, PatternOptions, SceneConfig, WireOptions};
use crate::constants::SLICE_SWEEP_RATE_DEG_S;
use crate::current::{build_tubes, CurrentSet, CurrentTube, FlowModel, FlowParticle};
use crate::junction::{self, Marker};
use crate::mesh::{sphere, TriMesh};
use crate::nearfield::{build_layer, NearFieldLayer};
use crate::pattern::{sweep_angle, PatternSurfaceBuilder, ShellMesh, SliceMode, SlicePath, SurfaceLayer};
use crate::picking::{raycast, HitResolver, Measurement, Pick, ProvenanceTag, Ray};
use crate::stats::GridStats;
use crate::types::{FieldGrid, PatternGrid, SegmentCurrent, SimulationResult, WireSample};

pub use memo::Memo;

/// Wire cylinders, hover figures and endpoint markers
#[derive(Debug, Clone, Default)]
pub struct WireLayer {
    pub meshes: Vec<WireMesh>,
    /// Indexed like the input wire list
    pub metrics: Vec<WireMetrics>,
    pub markers: Vec<Marker>,
    pub marker_meshes: Vec<TriMesh>,
}

/// Pattern surface and shells over one grid
#[derive(Debug, Clone, Default)]
pub struct PatternLayer {
    pub stats: Option<GridStats>,
    pub surface: Option<TriMesh>,
    pub shells: Vec<ShellMesh>,
}

/// Grouped currents, tubes and the particle model
#[derive(Debug, Clone, Default)]
pub struct CurrentLayer {
    pub set: CurrentSet,
    pub tubes: Vec<CurrentTube>,
    pub flow: FlowModel,
}

/// How the pattern is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternView {
    Off,
    #[default]
    Solid,
    Shells,
}

/// Which layers are drawn (and therefore pickable)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerVisibility {
    pub wires: bool,
    pub markers: bool,
    pub pattern: PatternView,
    pub currents: bool,
    pub particles: bool,
    pub near_field: bool,
    pub slice: Option<SliceMode>,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            wires: true,
            markers: true,
            pattern: PatternView::Solid,
            currents: true,
            particles: true,
            near_field: true,
            slice: None,
        }
    }
}

/// Which layers the last update rebuilt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub wires: bool,
    pub pattern: bool,
    pub currents: bool,
    pub near_field: bool,
}

type WireKey = (Vec<WireSample>, WireOptions, JunctionOptions);
type PatternKey = (Option<PatternGrid>, PatternOptions);
type CurrentKey = (Vec<WireSample>, Vec<SegmentCurrent>, CurrentOptions);
type FieldKey = (Option<FieldGrid>, FieldOptions);

fn wire_key(result: &SimulationResult, config: &SceneConfig) -> WireKey {
    (result.wires.clone(), config.wire.clone(), config.junction.clone())
}

/// Pattern input with the animation-only sweep rate pinned to its default
fn pattern_key(result: &SimulationResult, config: &SceneConfig) -> PatternKey {
    let options = PatternOptions { sweep_rate_deg_s: SLICE_SWEEP_RATE_DEG_S, ..config.pattern.clone() };
    (result.pattern.clone(), options)
}

fn current_key(result: &SimulationResult, config: &SceneConfig) -> CurrentKey {
    (result.wires.clone(), result.currents.clone(), config.current.clone())
}

fn field_key(result: &SimulationResult, config: &SceneConfig) -> FieldKey {
    (result.near_field.clone(), config.field.clone())
}

fn same_list<T>(a: &[T], b: &[T], same: fn(&T, &T) -> bool) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same(x, y))
}

fn same_option<T>(a: &Option<T>, b: &Option<T>, same: fn(&T, &T) -> bool) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => same(x, y),
        (None, None) => true,
        _ => false,
    }
}

fn same_wire_key(a: &WireKey, b: &WireKey) -> bool {
    same_list(&a.0, &b.0, WireSample::same_input) && a.1 == b.1 && a.2 == b.2
}

fn same_pattern_key(a: &PatternKey, b: &PatternKey) -> bool {
    same_option(&a.0, &b.0, PatternGrid::same_input) && a.1 == b.1
}

fn same_current_key(a: &CurrentKey, b: &CurrentKey) -> bool {
    same_list(&a.0, &b.0, WireSample::same_input)
        && same_list(&a.1, &b.1, SegmentCurrent::same_input)
        && a.2 == b.2
}

fn same_field_key(a: &FieldKey, b: &FieldKey) -> bool {
    same_option(&a.0, &b.0, FieldGrid::same_input) && a.1 == b.1
}

fn build_wire_layer(key: &WireKey) -> WireLayer {
    let (wires, options, junction_options) = key;
    let markers = junction::detect(wires, junction_options);
    WireLayer {
        meshes: build_wires(wires, options),
        metrics: wires.iter().map(WireMetrics::of).collect(),
        marker_meshes: markers.iter().map(|m| sphere(m.position, m.size, 6, 10)).collect(),
        markers,
    }
}

fn build_pattern_layer(key: &PatternKey) -> PatternLayer {
    let (grid, options) = key;
    let Some(grid) = grid else {
        return PatternLayer::default();
    };
    let stats = GridStats::of_pattern(grid);
    match PatternSurfaceBuilder::new(grid, stats, options) {
        Some(builder) => PatternLayer { stats, surface: builder.solid(), shells: builder.shells() },
        None => PatternLayer { stats, ..PatternLayer::default() },
    }
}

fn build_current_layer(key: &CurrentKey) -> CurrentLayer {
    let (wires, currents, options) = key;
    let set = CurrentSet::new(currents);
    CurrentLayer {
        tubes: build_tubes(&set, wires, options),
        flow: FlowModel::new(&set, wires, options),
        set,
    }
}

fn build_field_layer(key: &FieldKey) -> Option<NearFieldLayer> {
    let (grid, options) = key;
    let grid = grid.as_ref()?;
    build_layer(grid, GridStats::of_field(grid), options)
}

/// All layers of one simulation result
#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    wires: Memo<WireKey, WireLayer>,
    pattern: Memo<PatternKey, PatternLayer>,
    currents: Memo<CurrentKey, CurrentLayer>,
    field: Memo<FieldKey, Option<NearFieldLayer>>,
}

impl Scene {
    pub fn new(result: &SimulationResult, config: &SceneConfig) -> Self {
        let scene = Self {
            config: config.clone(),
            wires: Memo::with_same(wire_key(result, config), build_wire_layer, same_wire_key),
            pattern: Memo::with_same(pattern_key(result, config), build_pattern_layer, same_pattern_key),
            currents: Memo::with_same(current_key(result, config), build_current_layer, same_current_key),
            field: Memo::with_same(field_key(result, config), build_field_layer, same_field_key),
        };
        info!(
            "scene built: {} wires, {} current samples, pattern {}, near field {}",
            result.wires.len(),
            result.currents.len(),
            if scene.pattern().surface.is_some() { "yes" } else { "no" },
            if scene.near_field().is_some() { "yes" } else { "no" }
        );
        scene
    }

    /// Rebuilds the layers whose input or options changed
    pub fn update(&mut self, result: &SimulationResult, config: &SceneConfig) -> UpdateReport {
        let report = UpdateReport {
            wires: self.wires.refresh(&wire_key(result, config), build_wire_layer),
            pattern: self.pattern.refresh(&pattern_key(result, config), build_pattern_layer),
            currents: self.currents.refresh(&current_key(result, config), build_current_layer),
            near_field: self.field.refresh(&field_key(result, config), build_field_layer),
        };
        self.config = config.clone();
        debug!("scene update: {report:?}");
        report
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn wires(&self) -> &WireLayer {
        self.wires.value()
    }

    pub fn pattern(&self) -> &PatternLayer {
        self.pattern.value()
    }

    pub fn currents(&self) -> &CurrentLayer {
        self.currents.value()
    }

    pub fn near_field(&self) -> Option<&NearFieldLayer> {
        self.field.value().as_ref()
    }

    pub fn pattern_grid(&self) -> Option<&PatternGrid> {
        self.pattern.key().0.as_ref()
    }

    pub fn field_grid(&self) -> Option<&FieldGrid> {
        self.field.key().0.as_ref()
    }

    /// Read-only resolver over this scene's data
    pub fn resolver(&self) -> HitResolver<'_> {
        HitResolver {
            pattern: self.pattern_grid(),
            wires: &self.wires().metrics,
            currents: &self.currents().set,
            field: self.field_grid(),
        }
    }

    /// Visible pickable meshes with their provenance
    pub fn pickables(&self, visible: &LayerVisibility) -> Vec<(&TriMesh, ProvenanceTag)> {
        let mut out: Vec<(&TriMesh, ProvenanceTag)> = Vec::new();
        if visible.wires {
            out.extend(self.wires().meshes.iter().map(|w| (&w.mesh, ProvenanceTag::Wire { index: w.index })));
        }
        if visible.markers {
            out.extend(self.wires().marker_meshes.iter().map(|m| (m, ProvenanceTag::Decoration)));
        }
        match visible.pattern {
            PatternView::Off => {}
            PatternView::Solid => {
                if let Some(surface) = &self.pattern().surface {
                    out.push((surface, ProvenanceTag::Surface { layer: SurfaceLayer::Solid }));
                }
            }
            PatternView::Shells => out.extend(
                self.pattern()
                    .shells
                    .iter()
                    .map(|s| (&s.mesh, ProvenanceTag::Surface { layer: SurfaceLayer::Shell(s.index) })),
            ),
        }
        if visible.currents {
            out.extend(self.currents().tubes.iter().map(|t| (&t.mesh, ProvenanceTag::Current { tag: t.tag })));
        }
        if visible.near_field {
            if let Some(layer) = self.near_field() {
                out.push((&layer.quad, ProvenanceTag::NearField));
            }
        }
        out
    }

    /// Nearest visible primitive under `ray`
    pub fn pick(&self, ray: &Ray, visible: &LayerVisibility) -> Option<Pick> {
        let candidates = self.pickables(visible);
        let (index, hit) = raycast(ray, candidates.iter().map(|(m, _)| *m))?;
        Some(Pick { tag: candidates[index].1, vertex: Some(hit.vertex), point: hit.point })
    }

    /// Pick and resolve in one step
    pub fn measure(&self, ray: &Ray, visible: &LayerVisibility) -> Option<Measurement> {
        self.resolver().resolve(self.pick(ray, visible).as_ref())
    }

    /// Flow particles at elapsed time `t` (s)
    pub fn flow_particles(&self, t: f64) -> Vec<FlowParticle> {
        self.currents().flow.particles(t)
    }

    /// Cut-plane ring at elapsed time `t` (s), sweeping at the configured rate
    pub fn slice_at(&self, t: f64, mode: SliceMode) -> Option<SlicePath> {
        let grid = self.pattern_grid()?;
        let builder = PatternSurfaceBuilder::new(grid, self.pattern().stats, &self.pattern.key().1)?;
        builder.slice(mode, sweep_angle(t, self.config.pattern.sweep_rate_deg_s, 0.0))
    }

    /// Multi-line report of what each layer holds
    pub fn summary(&self) -> String {
        let mut s = String::new();
        let wires = self.wires();
        let _ = writeln!(s, "Wires:        {} meshed, {} markers", wires.meshes.len(), wires.markers.len());
        for m in &wires.metrics {
            let _ = writeln!(
                s,
                "  tag {:>3}: {:.3} m, z {:.3}..{:.3} m, r {:.2} mm, {} segments",
                m.tag, m.length, m.z_min, m.z_max, m.radius_mm, m.segment_count
            );
        }
        let pattern = self.pattern();
        match (&pattern.surface, pattern.stats) {
            (Some(surface), Some(stats)) => {
                let _ = writeln!(
                    s,
                    "Pattern:      {} vertices, {} triangles, {:.2}..{:.2} dBi, {} shells",
                    surface.vertex_count(),
                    surface.triangle_count(),
                    stats.min,
                    stats.max,
                    pattern.shells.len()
                );
            }
            _ => {
                let _ = writeln!(s, "Pattern:      none");
            }
        }
        let currents = self.currents();
        let _ = writeln!(
            s,
            "Currents:     {} wires, peak {:.4e} A, {} tubes, {} particles",
            currents.set.wires.len(),
            currents.set.max_magnitude,
            currents.tubes.len(),
            currents.flow.total()
        );
        match self.near_field() {
            Some(layer) => {
                let _ = writeln!(
                    s,
                    "Near field:   {}x{} raster, {:?} plane at {:.3} m, peak {:.4e}",
                    layer.raster.width, layer.raster.height, layer.plane, layer.height_or_depth, layer.max_field
                );
            }
            None => {
                let _ = writeln!(s, "Near field:   none");
            }
        }
        s
    }
}
