#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Animated "digital rain" grid: cursors fall through a toroidal lattice,
//! leaving fading trails drawn as shimmering 2x2 sub-cells.
//!
//! The simulation and rasterizer are platform independent; the browser glue
//! (canvas surface, animation-frame scheduler, DOM controls) only compiles
//! for wasm32.

pub mod color;
pub mod config;
pub mod decay;
pub mod driver;
pub mod error;
pub mod grid;
pub mod motion;
pub mod raster;
pub mod sim;
pub mod surface;

pub use color::{hsl_to_rgb, ColorEngine, HueCycle, Rgb};
pub use config::{RainConfig, TrailMode};
pub use decay::DecayMap;
pub use driver::{Driver, DriverState, FrameOutcome, Scheduler};
pub use error::{RainError, Result};
pub use grid::{Cursor, Geometry, Grid, Position, Trail};
pub use motion::{Direction, Heading};
pub use sim::Simulation;
pub use surface::{DrawCommand, Glow, PixelSurface, Rect, RecordingSurface, Rgba, Surface};

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    mod controls;
    mod render;

    pub use controls::RainHandle;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
        controls::auto_mount()
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::RainHandle;
