//! # Bevy 3D Viewer
//!
//! Real-time view of one simulation result: wires, pattern surface or shells,
//! current tubes with flow particles, the near-field plane and a sweeping
//! pattern slice. Hovering a primitive shows its measurement.
//!
//! ## Controls
//!
//! - Mouse drag: rotate camera
//! - Scroll: zoom
//! - Space: play/pause animation
//! - R: reset animation clock
//! - P: cycle pattern view (off, solid, shells)
//! - S: cycle slice (off, azimuth, elevation)
//! - F: toggle near field
//! - +/-: animation speed

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::window::PrimaryWindow;
use bevy_egui::{egui, EguiContexts, EguiPlugin};
use std::f32::consts::PI;

use super::{next_pattern_view, visibility_legend, MeshBuffers, Playback};
use crate::color::Rgb;
use crate::config::SceneConfig;
use crate::pattern::SliceMode;
use crate::picking::{HoverThrottle, Measurement};
use crate::scene::{LayerVisibility, PatternView, Scene as AntennaScene};
use crate::types::{Point2, SimulationResult};

const WIRE_COLOR: Rgb = Rgb::new(0.75, 0.72, 0.68);
const MARKER_COLOR: Rgb = Rgb::new(1.0, 0.85, 0.2);

// ============================================================================
// COMPONENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Wire,
    Marker,
    Surface,
    Shell,
    Tube,
    NearField,
}

/// Tags every entity spawned from the scene so it can be hidden or rebuilt
#[derive(Component)]
pub struct LayerEntity(pub LayerKind);

#[derive(Component)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub radius: f32,
    pub azimuth: f32,
    pub elevation: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            radius: 3.5,
            azimuth: PI / 4.0,
            elevation: PI / 6.0,
        }
    }
}

// ============================================================================
// RESOURCES
// ============================================================================

/// The loaded result and the scene built from it
#[derive(Resource)]
pub struct ViewerScene {
    pub result: SimulationResult,
    pub config: SceneConfig,
    pub scene: AntennaScene,
    /// Config edited in the UI; layers are refreshed on the next frame
    pub dirty: bool,
}

impl ViewerScene {
    pub fn new(result: SimulationResult, config: SceneConfig) -> Self {
        let scene = AntennaScene::new(&result, &config);
        Self { result, config, scene, dirty: false }
    }
}

#[derive(Resource, Default)]
pub struct UiState {
    pub visibility: LayerVisibility,
    pub playback: Playback,
}

#[derive(Resource)]
pub struct HoverState {
    pub throttle: HoverThrottle,
    pub cursor: Option<Vec2>,
    pub measurement: Option<Measurement>,
}

// ============================================================================
// MESH CONVERSION
// ============================================================================

fn to_bevy_mesh(buffers: MeshBuffers) -> Mesh {
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, buffers.positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, buffers.normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, buffers.colors)
        .with_inserted_indices(Indices::U32(buffers.indices))
}

fn bevy_color(c: Rgb) -> Color {
    Color::srgb(c.r, c.g, c.b)
}

fn bevy_vec(v: crate::types::Vec3) -> Vec3 {
    Vec3::from_array(v.to_f32_array())
}

fn pick_ray(ray: Ray3d) -> crate::picking::Ray {
    let d = |v: Vec3| crate::types::Vec3::new(v.x as f64, v.y as f64, v.z as f64);
    crate::picking::Ray::new(d(ray.origin), d(*ray.direction))
}

// ============================================================================
// BEVY APP BUILDER
// ============================================================================

/// Build and run the viewer for one result
pub fn run_visualization(result: SimulationResult, config: SceneConfig) {
    let hover_interval = config.pick.min_interval_s;
    let viewer = ViewerScene::new(result, config);
    log::info!("viewer starting\n{}", viewer.scene.summary());

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "antscope - antenna visualization".to_string(),
                        resolution: (1400., 900.).into(),
                        ..default()
                    }),
                    ..default()
                })
                // logging goes through env_logger, set up by the binary
                .disable::<bevy::log::LogPlugin>(),
        )
        .add_plugins(EguiPlugin)
        .insert_resource(viewer)
        .insert_resource(UiState::default())
        .insert_resource(HoverState {
            throttle: HoverThrottle::new(hover_interval),
            cursor: None,
            measurement: None,
        })
        .insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.04)))
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 400.0,
        })
        .add_systems(Startup, setup_scene)
        .add_systems(
            Update,
            (
                camera_controller,
                playback_update,
                refresh_layers,
                sync_visibility,
                draw_animation,
                hover_pick,
                ui_system,
                keyboard_input,
            ),
        )
        .run();
}

// ============================================================================
// SETUP
// ============================================================================

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    viewer: Res<ViewerScene>,
) {
    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_xyz(2.5, 1.5, 2.5).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        OrbitCamera::default(),
    ));

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            illuminance: 8000.0,
            ..default()
        },
        transform: Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -PI / 3.0, PI / 4.0, 0.0)),
        ..default()
    });

    spawn_layers(&mut commands, &mut meshes, &mut materials, &mut images, &viewer.scene);
}

fn spawn_layers(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    images: &mut Assets<Image>,
    scene: &AntennaScene,
) {
    let mut spawn = |mesh: Mesh, material: StandardMaterial, kind: LayerKind| {
        commands.spawn((
            PbrBundle {
                mesh: meshes.add(mesh),
                material: materials.add(material),
                ..default()
            },
            LayerEntity(kind),
        ));
    };

    let metal = StandardMaterial {
        base_color: Color::WHITE,
        metallic: 0.9,
        perceptual_roughness: 0.3,
        ..default()
    };
    let glow = StandardMaterial {
        base_color: Color::WHITE,
        unlit: true,
        ..default()
    };
    let translucent = |opacity: f32| StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 1.0, opacity),
        alpha_mode: AlphaMode::Blend,
        double_sided: true,
        cull_mode: None,
        ..default()
    };

    let wires = scene.wires();
    for w in &wires.meshes {
        spawn(to_bevy_mesh(MeshBuffers::from_mesh(&w.mesh, WIRE_COLOR, 1.0)), metal.clone(), LayerKind::Wire);
    }
    for m in &wires.marker_meshes {
        spawn(to_bevy_mesh(MeshBuffers::from_mesh(m, MARKER_COLOR, 1.0)), glow.clone(), LayerKind::Marker);
    }

    let pattern = scene.pattern();
    if let Some(surface) = &pattern.surface {
        let buffers = MeshBuffers::from_mesh(surface, Rgb::default(), 0.85);
        spawn(to_bevy_mesh(buffers), translucent(0.85), LayerKind::Surface);
    }
    for shell in &pattern.shells {
        let buffers = MeshBuffers::from_mesh(&shell.mesh, Rgb::default(), shell.opacity);
        spawn(to_bevy_mesh(buffers), translucent(shell.opacity), LayerKind::Shell);
    }

    for tube in &scene.currents().tubes {
        spawn(to_bevy_mesh(MeshBuffers::from_mesh(&tube.mesh, Rgb::default(), 1.0)), glow.clone(), LayerKind::Tube);
    }

    if let Some(layer) = scene.near_field() {
        let image = Image::new(
            Extent3d {
                width: layer.raster.width as u32,
                height: layer.raster.height as u32,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            layer.raster.data.clone(),
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        );
        let mesh = to_bevy_mesh(MeshBuffers::from_mesh(&layer.quad, Rgb::new(1.0, 1.0, 1.0), 1.0))
            .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, layer.uvs.to_vec());
        let material = StandardMaterial {
            base_color_texture: Some(images.add(image)),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            double_sided: true,
            cull_mode: None,
            ..default()
        };
        spawn(mesh, material, LayerKind::NearField);
    }

    log::debug!("layers spawned");
}

// ============================================================================
// UPDATE SYSTEMS
// ============================================================================

fn camera_controller(
    mut query: Query<(&mut Transform, &mut OrbitCamera)>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll: EventReader<MouseWheel>,
    keys: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
) {
    let Ok((mut transform, mut orbit)) = query.get_single_mut() else { return };
    let ui_has_pointer = contexts.ctx_mut().wants_pointer_input();

    if mouse_button.pressed(MouseButton::Left) && !ui_has_pointer {
        for ev in mouse_motion.read() {
            orbit.azimuth -= ev.delta.x * 0.005;
            orbit.elevation = (orbit.elevation - ev.delta.y * 0.005).clamp(-PI / 2.0 + 0.1, PI / 2.0 - 0.1);
        }
    } else {
        mouse_motion.clear();
    }

    for ev in scroll.read() {
        if !ui_has_pointer {
            orbit.radius = (orbit.radius * (1.0 - ev.y * 0.1)).clamp(0.3, 30.0);
        }
    }

    if keys.pressed(KeyCode::ArrowLeft) { orbit.azimuth += 0.02; }
    if keys.pressed(KeyCode::ArrowRight) { orbit.azimuth -= 0.02; }
    if keys.pressed(KeyCode::ArrowUp) { orbit.elevation = (orbit.elevation + 0.02).min(PI / 2.0 - 0.1); }
    if keys.pressed(KeyCode::ArrowDown) { orbit.elevation = (orbit.elevation - 0.02).max(-PI / 2.0 + 0.1); }

    let pos = Vec3::new(
        orbit.radius * orbit.elevation.cos() * orbit.azimuth.sin(),
        orbit.radius * orbit.elevation.sin(),
        orbit.radius * orbit.elevation.cos() * orbit.azimuth.cos(),
    ) + orbit.focus;

    *transform = Transform::from_translation(pos).looking_at(orbit.focus, Vec3::Y);
}

fn playback_update(time: Res<Time>, mut ui_state: ResMut<UiState>) {
    ui_state.playback.advance(time.delta_seconds_f64());
}

/// Re-runs the scene update after a config edit and respawns if anything changed
fn refresh_layers(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    mut viewer: ResMut<ViewerScene>,
    existing: Query<Entity, With<LayerEntity>>,
) {
    if !viewer.dirty {
        return;
    }
    let viewer = &mut *viewer;
    viewer.dirty = false;
    let report = viewer.scene.update(&viewer.result, &viewer.config);
    if !(report.wires || report.pattern || report.currents || report.near_field) {
        return;
    }
    for entity in &existing {
        commands.entity(entity).despawn_recursive();
    }
    spawn_layers(&mut commands, &mut meshes, &mut materials, &mut images, &viewer.scene);
    log::info!("layers rebuilt: {report:?}");
}

fn sync_visibility(ui_state: Res<UiState>, mut query: Query<(&LayerEntity, &mut Visibility)>) {
    let v = &ui_state.visibility;
    for (layer, mut visibility) in &mut query {
        let shown = match layer.0 {
            LayerKind::Wire => v.wires,
            LayerKind::Marker => v.markers,
            LayerKind::Surface => v.pattern == PatternView::Solid,
            LayerKind::Shell => v.pattern == PatternView::Shells,
            LayerKind::Tube => v.currents,
            LayerKind::NearField => v.near_field,
        };
        *visibility = if shown { Visibility::Visible } else { Visibility::Hidden };
    }
}

fn draw_animation(mut gizmos: Gizmos, ui_state: Res<UiState>, viewer: Res<ViewerScene>) {
    let t = ui_state.playback.time;
    if ui_state.visibility.particles {
        for p in viewer.scene.flow_particles(t) {
            gizmos.sphere(bevy_vec(p.position), Quat::IDENTITY, p.size as f32, bevy_color(p.color));
        }
    }
    if let Some(mode) = ui_state.visibility.slice {
        if let Some(path) = viewer.scene.slice_at(t, mode) {
            gizmos.linestrip_gradient(
                path.points.iter().zip(&path.colors).map(|(p, c)| (bevy_vec(*p), bevy_color(*c))),
            );
        }
    }
}

fn hover_pick(
    time: Res<Time>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    ui_state: Res<UiState>,
    viewer: Res<ViewerScene>,
    mut hover: ResMut<HoverState>,
) {
    let Ok(window) = windows.get_single() else { return };
    let now = time.elapsed_seconds_f64();

    let Some(cursor) = window.cursor_position() else {
        hover.cursor = None;
        hover.measurement = None;
        return;
    };
    let released = if hover.cursor != Some(cursor) {
        hover.cursor = Some(cursor);
        hover.throttle.push(Point2::new(cursor.x as f64, cursor.y as f64), now)
    } else {
        hover.throttle.poll(now)
    };
    let Some(at) = released else { return };

    let Ok((camera, camera_transform)) = cameras.get_single() else { return };
    let Some(ray) = camera.viewport_to_world(camera_transform, Vec2::new(at.x as f32, at.y as f32)) else {
        hover.measurement = None;
        return;
    };
    hover.measurement = viewer.scene.measure(&pick_ray(ray), &ui_state.visibility);
}

fn keyboard_input(keys: Res<ButtonInput<KeyCode>>, mut ui_state: ResMut<UiState>) {
    let ui_state = &mut *ui_state;
    if keys.just_pressed(KeyCode::Space) {
        ui_state.playback.running = !ui_state.playback.running;
        log::info!("animation {}", if ui_state.playback.running { "running" } else { "paused" });
    }
    if keys.just_pressed(KeyCode::KeyR) {
        ui_state.playback.reset();
    }
    if keys.just_pressed(KeyCode::KeyP) {
        ui_state.visibility.pattern = next_pattern_view(ui_state.visibility.pattern);
    }
    if keys.just_pressed(KeyCode::KeyS) {
        ui_state.visibility.slice = match ui_state.visibility.slice {
            None => Some(SliceMode::AzimuthSweep),
            Some(SliceMode::AzimuthSweep) => Some(SliceMode::ElevationSweep),
            Some(SliceMode::ElevationSweep) => None,
        };
    }
    if keys.just_pressed(KeyCode::KeyF) {
        ui_state.visibility.near_field = !ui_state.visibility.near_field;
    }
    if keys.just_pressed(KeyCode::Equal) { ui_state.playback.faster(); }
    if keys.just_pressed(KeyCode::Minus) { ui_state.playback.slower(); }
}

fn ui_system(
    mut contexts: EguiContexts,
    mut viewer: ResMut<ViewerScene>,
    mut ui_state: ResMut<UiState>,
    hover: Res<HoverState>,
) {
    let ctx = contexts.ctx_mut();
    let viewer = &mut *viewer;
    let ui_state = &mut *ui_state;

    egui::SidePanel::left("layers_panel").min_width(220.0).show(ctx, |ui| {
        ui.heading("Layers");
        let v = &mut ui_state.visibility;
        ui.checkbox(&mut v.wires, "Wires");
        ui.checkbox(&mut v.markers, "Junctions / ends");
        ui.checkbox(&mut v.currents, "Current tubes");
        ui.checkbox(&mut v.particles, "Current flow");
        ui.checkbox(&mut v.near_field, "Near field");

        ui.separator();
        ui.label("Pattern");
        ui.horizontal(|ui| {
            ui.radio_value(&mut v.pattern, PatternView::Off, "Off");
            ui.radio_value(&mut v.pattern, PatternView::Solid, "Solid");
            ui.radio_value(&mut v.pattern, PatternView::Shells, "Shells");
        });
        ui.label("Slice");
        ui.horizontal(|ui| {
            ui.radio_value(&mut v.slice, None, "Off");
            ui.radio_value(&mut v.slice, Some(SliceMode::AzimuthSweep), "Azimuth");
            ui.radio_value(&mut v.slice, Some(SliceMode::ElevationSweep), "Elevation");
        });

        ui.separator();
        ui.heading("Pattern Options");
        let p = &mut viewer.config.pattern;
        let mut changed = ui.add(egui::Slider::new(&mut p.scale, 0.2..=3.0).text("scale")).changed();
        let mut floor_on = p.noise_floor_db.is_some();
        let mut floor = p.noise_floor_db.unwrap_or(crate::constants::PATTERN_NOISE_FLOOR_DB);
        changed |= ui.checkbox(&mut floor_on, "noise floor").changed();
        changed |= ui.add_enabled(floor_on, egui::Slider::new(&mut floor, 5.0..=60.0).text("dB")).changed();
        p.noise_floor_db = floor_on.then_some(floor);
        changed |= ui.add(egui::Slider::new(&mut p.sweep_rate_deg_s, 1.0..=90.0).text("sweep °/s")).changed();
        if changed {
            viewer.dirty = true;
        }

        ui.separator();
        ui.heading("Animation");
        ui.horizontal(|ui| {
            let pb = &mut ui_state.playback;
            if ui.button(if pb.running { "⏸ PAUSE" } else { "▶ PLAY" }).clicked() {
                pb.running = !pb.running;
            }
            if ui.button("⟲").clicked() {
                pb.reset();
            }
            if ui.button("-").clicked() { pb.slower(); }
            ui.label(format!("{:.2}x", pb.speed));
            if ui.button("+").clicked() { pb.faster(); }
        });
        ui.label(format!("t = {:.1} s", ui_state.playback.time));

        ui.separator();
        ui.heading("Scene");
        ui.monospace(viewer.scene.summary());
    });

    egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(visibility_legend(&ui_state.visibility));
            ui.separator();
            ui.label("SPACE=Play/Pause, R=Reset, P=Pattern, S=Slice, F=Field, Mouse=Rotate, Scroll=Zoom");
        });
    });

    if let (Some(m), Some(c)) = (&hover.measurement, hover.cursor) {
        egui::Area::new(egui::Id::new("hover_tooltip"))
            .fixed_pos(egui::pos2(c.x + 16.0, c.y + 16.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(m.label());
                });
            });
    }
}
