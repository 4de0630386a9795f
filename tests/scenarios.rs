//! End-to-end checks through the public API: scene building, picking and
//! the behavior each layer must show on degenerate input.

use antscope_rs::coords::{render_to_sim, sim_to_render};
use antscope_rs::current::{allocate_counts, group_by_wire, CurrentSet};
use antscope_rs::junction::{self, MarkerKind};
use antscope_rs::nearfield::grid_to_sim;
use antscope_rs::picking::{Pick, Ray};
use antscope_rs::scene::{LayerVisibility, PatternView};
use antscope_rs::stats::GridStats;
use antscope_rs::*;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn wire(tag: WireId, p1: Vec3, p2: Vec3) -> WireSample {
    WireSample { tag, p1, p2, radius: 0.002, segment_count: 9 }
}

fn currents_for(tag: WireId, n: u32) -> Vec<SegmentCurrent> {
    (0..n)
        .map(|i| SegmentCurrent {
            tag,
            segment_index: i,
            position: Vec3::new(tag as f64, 0.0, i as f64 * 0.1),
            magnitude: 0.001 * (1 + i) as f64,
            phase_deg: -10.0 * i as f64,
        })
        .collect()
}

#[test]
fn test_transform_round_trip_is_exact() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let p = Vec3::new(rng.gen_range(-1e3..1e3), rng.gen_range(-1e3..1e3), rng.gen_range(-1e3..1e3));
        assert_eq!(render_to_sim(sim_to_render(p)), p);
    }
}

#[test]
fn test_grouping_ignores_input_order() {
    let mut all: Vec<SegmentCurrent> = currents_for(2, 7).into_iter().chain(currents_for(1, 5)).collect();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        all.shuffle(&mut rng);
        let groups = group_by_wire(&all);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].tag, 1);
        assert_eq!(groups[1].tag, 2);
        for g in &groups {
            let order: Vec<u32> = g.samples.iter().map(|s| s.segment_index).collect();
            let expected: Vec<u32> = (0..order.len() as u32).collect();
            assert_eq!(order, expected);
        }
    }
}

#[test]
fn test_particles_deterministic_under_shuffled_input() {
    let base: Vec<SegmentCurrent> = currents_for(1, 6).into_iter().chain(currents_for(2, 4)).collect();
    let mut shuffled = base.clone();
    shuffled.shuffle(&mut StdRng::seed_from_u64(3));

    let a = SimulationResult { currents: base, ..SimulationResult::default() };
    let b = SimulationResult { currents: shuffled, ..SimulationResult::default() };
    let config = SceneConfig::default();
    let (sa, sb) = (Scene::new(&a, &config), Scene::new(&b, &config));
    for t in [0.0, 0.37, 5.0, 123.456] {
        assert_eq!(sa.flow_particles(t), sb.flow_particles(t));
    }
}

#[test]
fn test_particle_budget_scaling() {
    let scaled = allocate_counts(&[20, 20, 20], 30);
    assert_eq!(scaled.iter().sum::<usize>(), 30);
    assert!(scaled.windows(2).all(|w| w[0] >= w[1]));

    let scaled = allocate_counts(&[40, 25, 11], 30);
    assert_eq!(scaled.iter().sum::<usize>(), 30);
    assert!(scaled[0] >= scaled[1] && scaled[1] >= scaled[2]);
}

#[test]
fn test_one_segment_wire_carries_tube_and_particles() {
    let result = SimulationResult {
        wires: vec![WireSample {
            tag: 1,
            p1: Vec3::new(0.0, 0.0, -0.25),
            p2: Vec3::new(0.0, 0.0, 0.25),
            radius: 0.001,
            segment_count: 1,
        }],
        currents: vec![SegmentCurrent { tag: 1, segment_index: 1, position: Vec3::zero(), magnitude: 0.01, phase_deg: 0.0 }],
        ..SimulationResult::default()
    };
    let scene = Scene::new(&result, &SceneConfig::default());
    assert_eq!(scene.currents().tubes.len(), 1);
    assert!(scene.currents().flow.total() > 0);
    let flow = &scene.currents().flow.wires[0];
    assert_eq!(render_to_sim(flow.start), result.wires[0].p1);
    assert_eq!(render_to_sim(flow.end), result.wires[0].p2);
}

#[test]
fn test_shared_endpoint_gives_one_junction() {
    let wires = vec![
        wire(1, Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
        wire(2, Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
    ];
    let options = SceneConfig::default().junction;
    assert!((options.tolerance - 0.01).abs() < 1e-12);
    let found = junction::junctions(&wires, &options);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].position, Vec3::zero());
}

#[test]
fn test_vee_scene_markers() {
    let scene = Scene::new(&demo::inverted_vee(), &SceneConfig::default());
    let markers = &scene.wires().markers;
    assert_eq!(markers.iter().filter(|m| m.kind == MarkerKind::Junction).count(), 1);
    assert_eq!(markers.iter().filter(|m| m.kind == MarkerKind::EndCap).count(), 2);
}

#[test]
fn test_flat_pattern_has_uniform_minimum_radius() {
    let grid = PatternGrid {
        theta_start: 0.0,
        theta_step: 90.0,
        theta_count: 2,
        phi_start: 0.0,
        phi_step: 180.0,
        phi_count: 2,
        gain_dbi: vec![vec![0.0, 0.0], vec![0.0, 0.0]],
    };
    let mut config = SceneConfig::default();
    config.pattern.scale = 2.0;
    let builder = PatternSurfaceBuilder::new(&grid, GridStats::of_pattern(&grid), &config.pattern).unwrap();
    assert_eq!(builder.normalized(0, 0), Some(0.0));
    assert_eq!(builder.normalized(1, 1), Some(0.0));

    let mesh = builder.solid().unwrap();
    let expected = config.pattern.r_min * config.pattern.scale;
    assert_eq!(mesh.vertex_count(), 4);
    for p in &mesh.positions {
        assert!((p.mag() - expected).abs() < 1e-12);
    }
}

#[test]
fn test_all_sentinel_pattern_draws_nothing() {
    let grid = PatternGrid {
        theta_start: 0.0,
        theta_step: 10.0,
        theta_count: 3,
        phi_start: 0.0,
        phi_step: 90.0,
        phi_count: 4,
        gain_dbi: vec![vec![-999.0; 4]; 3],
    };
    let result = SimulationResult { pattern: Some(grid), ..demo::dipole() };
    let scene = Scene::new(&result, &SceneConfig::default());
    assert!(scene.pattern().surface.is_none());
    assert!(scene.pattern().shells.is_empty());
    assert!(!scene.wires().meshes.is_empty());
}

#[test]
fn test_zero_field_cell_is_transparent() {
    let grid = FieldGrid {
        plane: FieldPlane::Horizontal,
        origin: Point2::new(0.0, 0.0),
        dx: 0.1,
        dy: 0.1,
        nx: 1,
        ny: 1,
        height_or_depth: 0.0,
        magnitude: vec![vec![0.0]],
    };
    let scene = Scene::new(&SimulationResult { near_field: Some(grid), ..SimulationResult::default() }, &SceneConfig::default());
    let layer = scene.near_field().unwrap();
    assert_eq!(layer.raster.pixel(0, 0).unwrap().a, 0);
}

#[test]
fn test_out_of_range_field_hit_is_no_measurement() {
    let grid = FieldGrid {
        plane: FieldPlane::Vertical,
        origin: Point2::new(-0.5, 0.0),
        dx: 0.1,
        dy: 0.1,
        nx: 10,
        ny: 10,
        height_or_depth: 0.25,
        magnitude: vec![vec![1.0; 10]; 10],
    };
    let set = CurrentSet::default();
    let resolver = HitResolver { pattern: None, wires: &[], currents: &set, field: Some(&grid) };

    let outside = Pick { tag: ProvenanceTag::NearField, vertex: None, point: sim_to_render(grid_to_sim(&grid, -1.0, 3.0)) };
    assert_eq!(resolver.resolve(Some(&outside)), None);

    let inside = Pick { tag: ProvenanceTag::NearField, vertex: None, point: sim_to_render(grid_to_sim(&grid, 4.0, 3.0)) };
    match resolver.resolve(Some(&inside)) {
        Some(Measurement::NearField { ix, iy, magnitude, plane, height_or_depth_m }) => {
            assert_eq!((ix, iy), (4, 3));
            assert_eq!(magnitude, 1.0);
            assert_eq!(plane, FieldPlane::Vertical);
            assert_eq!(height_or_depth_m, 0.25);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_measure_through_scene_picks_near_field() {
    let scene = Scene::new(&demo::dipole(), &SceneConfig::default());
    let visible = LayerVisibility {
        wires: false,
        markers: false,
        pattern: PatternView::Off,
        currents: false,
        ..LayerVisibility::default()
    };
    // straight down onto the horizontal plane, well away from the wire
    let ray = Ray::new(Vec3::new(0.5, 5.0, -0.5), Vec3::new(0.0, -1.0, 0.0));
    match scene.measure(&ray, &visible) {
        Some(Measurement::NearField { plane, magnitude, .. }) => {
            assert_eq!(plane, FieldPlane::Horizontal);
            assert!(magnitude > 0.0);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_result_and_config_from_json() {
    let json = r#"{
        "wires": [{"tag": 3, "p1": {"x": 0, "y": 0, "z": 0}, "p2": {"x": 0, "y": 0, "z": 2},
                   "radius": 0.005, "segment_count": 4}],
        "currents": []
    }"#;
    let result = SimulationResult::from_json_str(json).unwrap();
    assert_eq!(result.wires.len(), 1);
    assert!(result.pattern.is_none());

    let config = SceneConfig::from_json_str(r#"{"pattern": {"scale": 2.5}}"#).unwrap();
    assert_eq!(config.pattern.scale, 2.5);
    assert_eq!(config.pattern.shell_offsets_db, vec![3.0, 6.0, 10.0, 20.0]);

    let scene = Scene::new(&result, &config);
    assert_eq!(scene.wires().metrics[0].length, 2.0);
    assert!(scene.currents().tubes.is_empty());
    assert!(scene.near_field().is_none());

    assert!(SimulationResult::from_json_str("{ not json").is_err());
}
