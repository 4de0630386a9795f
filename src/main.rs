//! # ANTSCOPE-RS
//!
//! Builds every visual layer for one simulation result and reports what was
//! built. With `--measure`, casts a ray along each render axis toward the origin
//! and prints the measurements as JSON lines.
//!
//! ```bash
//! antscope                         # demo dipole
//! antscope vee                     # demo inverted vee
//! antscope result.json --config scene.json --measure
//! ```

use std::process::ExitCode;

use antscope_rs::picking::Ray;
use antscope_rs::scene::{LayerVisibility, PatternView};
use antscope_rs::*;

fn usage() {
    eprintln!("Usage: antscope [dipole|vee|RESULT.json] [--config SCENE.json] [--measure]");
}

fn load_result(source: Option<&str>) -> Result<SimulationResult> {
    match source {
        None | Some("dipole") => Ok(demo::dipole()),
        Some("vee") => Ok(demo::inverted_vee()),
        Some(path) => SimulationResult::from_path(path),
    }
}

fn measure_axes(scene: &Scene) {
    let views = [
        ("solid", LayerVisibility::default()),
        ("shells", LayerVisibility { pattern: PatternView::Shells, ..LayerVisibility::default() }),
    ];
    let axes = [
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, 0.2, 0.1),
    ];
    for (name, visible) in &views {
        for axis in axes {
            let ray = Ray::new(axis * 10.0, -axis);
            let line = match scene.measure(&ray, visible) {
                Some(m) => serde_json::to_string(&m).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}")),
                None => "null".to_string(),
            };
            println!("{name} from {axis}: {line}");
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let mut source = None;
    let mut config_path = None;
    let mut do_measure = false;
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => config_path = it.next().cloned(),
            "--measure" => do_measure = true,
            "-h" | "--help" => {
                usage();
                return Ok(());
            }
            other => source = Some(other.to_string()),
        }
    }

    let result = load_result(source.as_deref())?;
    let config = match config_path {
        Some(path) => SceneConfig::from_path(path)?,
        None => SceneConfig::default(),
    };

    println!("{}", info());
    println!();

    let start = std::time::Instant::now();
    let scene = Scene::new(&result, &config);
    let elapsed = start.elapsed();

    println!("{}", scene.summary());
    println!("Build time: {:.3} ms", elapsed.as_secs_f64() * 1e3);

    if do_measure {
        println!();
        measure_axes(&scene);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            usage();
            ExitCode::FAILURE
        }
    }
}
