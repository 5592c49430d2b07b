use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::debug;

use crate::color::ColorEngine;
use crate::config::{RainConfig, TrailMode};
use crate::decay::DecayMap;
use crate::grid::{Cursor, Geometry, Grid, Trail};
use crate::motion::{self, Direction, Heading};
use crate::raster::{self, Frame};
use crate::surface::Surface;

/// Fallback seed when neither the config nor the caller supplies one.
const DEFAULT_SEED: u64 = 0x5eed_ca11_ab1e;

/// Rotating offset into the quadrant alpha slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuadrantPhase(u8);

impl QuadrantPhase {
    pub fn get(self) -> usize {
        self.0 as usize
    }

    pub fn advance(&mut self) {
        self.0 = (self.0 + 1) % 4;
    }
}

/// All mutable state of the visualization.
pub struct Simulation {
    config: RainConfig,
    grid: Grid,
    decay: DecayMap,
    colors: ColorEngine,
    phase: QuadrantPhase,
    rng: SmallRng,
    ticks: u64,
}

impl Simulation {
    pub fn new(config: RainConfig) -> Self {
        let seed = config.seed.unwrap_or(DEFAULT_SEED);
        Self::with_seed(config, seed)
    }

    /// Like [`Simulation::new`] but `config.seed` still wins when present.
    pub fn with_seed(config: RainConfig, seed: u64) -> Self {
        let config = config.sanitized();
        let mut rng = SmallRng::seed_from_u64(config.seed.unwrap_or(seed));
        let geometry = config.geometry();
        let grid = Grid::new(geometry, &mut rng);
        let colors = ColorEngine::new(
            config.base_color,
            config.color_cycling,
            config.white_heads,
            config.hue_step,
        );
        Self {
            decay: DecayMap::new(geometry),
            grid,
            colors,
            phase: QuadrantPhase::default(),
            rng,
            ticks: 0,
            config,
        }
    }

    /// One accepted tick: motion, decay, quadrant rotation, then colour.
    pub fn step(&mut self) {
        let heading = Heading {
            direction: self.config.direction,
            party: self.config.party_mode,
        };
        let decay = self.config.trail_mode == TrailMode::Decay;
        let record = (!decay).then_some(self.config.trail_length);
        let steps = motion::advance(&mut self.grid, heading, record, &mut self.rng);

        if decay {
            for step in steps.iter().filter(|s| s.moved) {
                self.decay.vacate(step.from);
            }
            self.decay.decay(self.config.decay_step);
            for step in &steps {
                self.decay.occupy(step.to);
            }
        }

        self.phase.advance();
        self.colors.advance();
        self.ticks += 1;
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        raster::draw_frame(&self.frame(), surface);
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            geometry: self.grid.geometry(),
            cursors: self.grid.cursors(),
            trails: self.grid.trails(),
            decay: &self.decay,
            mode: self.config.trail_mode,
            trail_length: self.config.trail_length,
            colors: &self.colors,
            phase: self.phase.get(),
            glow: self.config.glow,
        }
    }

    /// Fresh cursors, empty trails and an unlit decay map for the current geometry.
    pub fn reinitialize(&mut self) {
        let geometry = self.config.geometry();
        self.grid.reinitialize(geometry, &mut self.rng);
        self.decay.reset(geometry);
    }

    pub fn toggle_color_cycling(&mut self) -> bool {
        self.config.color_cycling = !self.config.color_cycling;
        self.colors.cycling = self.config.color_cycling;
        debug!(enabled = self.config.color_cycling, "color cycling toggled");
        self.config.color_cycling
    }

    pub fn toggle_glow(&mut self) -> bool {
        self.config.glow = !self.config.glow;
        debug!(enabled = self.config.glow, "glow toggled");
        self.config.glow
    }

    pub fn toggle_party_mode(&mut self) -> bool {
        self.config.party_mode = !self.config.party_mode;
        debug!(enabled = self.config.party_mode, "party mode toggled");
        self.config.party_mode
    }

    pub fn cycle_direction(&mut self) -> Direction {
        self.config.direction = self.config.direction.next();
        debug!(direction = self.config.direction.label(), "direction changed");
        self.config.direction
    }

    /// Changing the length drops every existing trail.
    pub fn set_trail_length(&mut self, length: usize) {
        self.config.trail_length = length.max(1);
        self.grid.clear_trails();
        debug!(length = self.config.trail_length, "trail length changed");
    }

    pub fn set_trail_mode(&mut self, mode: TrailMode) {
        if self.config.trail_mode != mode {
            self.config.trail_mode = mode;
            self.grid.clear_trails();
            self.decay.reset(self.config.geometry());
        }
    }

    pub fn set_min_interval(&mut self, ms: f64) {
        self.config.min_interval_ms = if ms.is_finite() { ms.max(0.0) } else { 0.0 };
    }

    pub fn set_margin(&mut self, margin: u32) {
        self.config.margin = margin.min(Geometry::MAX_PIXELS);
        self.reinitialize();
    }

    pub fn set_cell_size(&mut self, cell_size: u32) {
        self.config.cell_size = cell_size.clamp(1, Geometry::MAX_PIXELS);
        self.reinitialize();
    }

    pub fn set_columns(&mut self, columns: u32) {
        self.config.columns = columns.clamp(1, Geometry::MAX_CELLS);
        self.reinitialize();
    }

    pub fn set_rows(&mut self, rows: u32) {
        self.config.rows = rows.clamp(1, Geometry::MAX_CELLS);
        self.reinitialize();
    }

    pub fn config(&self) -> &RainConfig {
        &self.config
    }

    pub fn geometry(&self) -> &Geometry {
        self.grid.geometry()
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.geometry().canvas_size()
    }

    pub fn cursors(&self) -> &[Cursor] {
        self.grid.cursors()
    }

    pub fn trails(&self) -> &[Trail] {
        self.grid.trails()
    }

    pub fn decay_map(&self) -> &DecayMap {
        &self.decay
    }

    pub fn colors(&self) -> &ColorEngine {
        &self.colors
    }

    pub fn hue(&self) -> f64 {
        self.colors.hue().hue()
    }

    pub fn phase(&self) -> usize {
        self.phase.get()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
