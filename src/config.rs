use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::Result;
use crate::grid::Geometry;
use crate::motion::Direction;

/// How vacated cells are remembered between frames.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrailMode {
    /// Each cursor keeps a bounded list of the cells it left.
    #[default]
    History,
    /// Vacated cells fade in place on a grid-wide opacity map.
    Decay,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RainConfig {
    pub columns: u32,
    pub rows: u32,
    pub cell_size: u32,
    pub margin: u32,
    /// Soft frame cap: frames arriving sooner than this after the last
    /// accepted tick are skipped.
    pub min_interval_ms: f64,
    pub trail_length: usize,
    pub trail_mode: TrailMode,
    pub direction: Direction,
    pub party_mode: bool,
    pub color_cycling: bool,
    pub hue_step: f64,
    pub base_color: Rgb,
    pub white_heads: bool,
    pub glow: bool,
    pub decay_step: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            columns: 60,
            rows: 60,
            cell_size: 14,
            margin: 1,
            min_interval_ms: 5.0,
            trail_length: 20,
            trail_mode: TrailMode::History,
            direction: Direction::Down,
            party_mode: false,
            color_cycling: false,
            hue_step: 1.0,
            base_color: Rgb::new(1, 236, 1),
            white_heads: true,
            glow: false,
            decay_step: 0.02,
            seed: None,
        }
    }
}

impl RainConfig {
    /// Parses a (possibly partial) JSON document; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Clamps every value into the range the simulation can work with.
    pub fn sanitized(mut self) -> Self {
        let geometry = self.geometry();
        self.columns = geometry.columns;
        self.rows = geometry.rows;
        self.cell_size = geometry.cell_size;
        self.margin = geometry.margin;
        self.trail_length = self.trail_length.max(1);
        if !self.min_interval_ms.is_finite() || self.min_interval_ms < 0.0 {
            self.min_interval_ms = 0.0;
        }
        if !self.hue_step.is_finite() || self.hue_step <= 0.0 {
            self.hue_step = 1.0;
        }
        if !self.decay_step.is_finite() || self.decay_step <= 0.0 {
            self.decay_step = 0.02;
        }
        self.decay_step = self.decay_step.min(1.0);
        self
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.columns, self.rows, self.cell_size, self.margin)
    }
}
