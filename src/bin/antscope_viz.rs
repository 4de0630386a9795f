//! # ANTSCOPE-RS 3D Viewer
//!
//! Interactive view of an antenna simulation result using Bevy.
//!
//! ## Usage
//!
//! ```bash
//! # demo dipole (default)
//! cargo run --bin antscope-viz --features bevy-viz --release
//!
//! # demo inverted vee
//! cargo run --bin antscope-viz --features bevy-viz --release -- vee
//!
//! # solver output, optional scene config
//! cargo run --bin antscope-viz --features bevy-viz --release -- result.json scene.json
//! ```

use antscope_rs::visualization::run_visualization;
use antscope_rs::{demo, SceneConfig, SimulationResult};

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    let result = match args.get(1).map(|s| s.to_lowercase()) {
        Some(ref s) if s == "vee" => {
            log::info!("loading demo inverted vee");
            demo::inverted_vee()
        }
        Some(ref s) if s != "dipole" => match SimulationResult::from_path(&args[1]) {
            Ok(r) => r,
            Err(e) => {
                log::error!("cannot load {}: {e}", args[1]);
                std::process::exit(1);
            }
        },
        _ => {
            log::info!("loading demo dipole");
            println!("Usage: antscope-viz [dipole|vee|RESULT.json] [SCENE.json]");
            demo::dipole()
        }
    };

    let config = match args.get(2) {
        Some(path) => SceneConfig::from_path(path).unwrap_or_else(|e| {
            log::warn!("config {path} ignored: {e}");
            SceneConfig::default()
        }),
        None => SceneConfig::default(),
    };

    run_visualization(result, config);
}
