//! # ANTSCOPE-RS
//!
//! Visualization core for wire-antenna simulation results
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                          ANTSCOPE-RS                                        │
//! │            SimulationResult (immutable snapshot) → Scene                    │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │  coords      sim (z-up) ↔ render (y-up) frames                              │
//! │  color       gain / current / field color scales                            │
//! │  pattern     far-field surface, nested shells, sweeping slice               │
//! │  current     current tubes and budgeted flow particles                      │
//! │  nearfield   near-field magnitude → RGBA raster on a plane                  │
//! │  junction    shared wire endpoints and free ends                            │
//! │  picking     ray hits → provenance tag → measurement                        │
//! │  scene       memoized layers, animation sampling                            │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Builders are pure functions of their inputs; a layer whose input is
//! missing or malformed comes out empty while the rest still build.

pub mod constants;
pub mod types;
pub mod error;
pub mod config;
pub mod coords;
pub mod color;
pub mod stats;
pub mod mesh;
pub mod pattern;
pub mod current;
pub mod nearfield;
pub mod junction;
pub mod antenna;
pub mod picking;
pub mod scene;
pub mod demo;
pub mod visualization;

// Re-exports
pub use constants::*;
pub use types::*;
pub use error::{Error, InputError, Result};
pub use config::SceneConfig;
pub use color::{ColorScale, Rgb};
pub use pattern::{PatternSurfaceBuilder, SliceMode};
pub use picking::{HitResolver, Measurement, ProvenanceTag};
pub use scene::Scene;

/// ANTSCOPE version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Information about the library
pub fn info() -> String {
    format!(
        "ANTSCOPE-RS v{}\n\
         Wire-antenna simulation visualizer\n\
         Pattern surfaces, current tubes, near-field rasters, hit measurement",
        VERSION
    )
}
