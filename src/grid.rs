use std::collections::VecDeque;

use rand::Rng;
use tracing::debug;

/// Lattice dimensions and the pixel layout of each cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub columns: u32,
    pub rows: u32,
    pub cell_size: u32,
    pub margin: u32,
}

impl Geometry {
    /// Upper bound on columns and rows.
    pub const MAX_CELLS: u32 = 4096;
    /// Upper bound on cell size and margin, in pixels.
    pub const MAX_PIXELS: u32 = 1024;

    pub fn new(columns: u32, rows: u32, cell_size: u32, margin: u32) -> Self {
        Self {
            columns: columns.clamp(1, Self::MAX_CELLS),
            rows: rows.clamp(1, Self::MAX_CELLS),
            cell_size: cell_size.clamp(1, Self::MAX_PIXELS),
            margin: margin.min(Self::MAX_PIXELS),
        }
    }

    /// Distance in pixels between the origins of neighbouring cells.
    pub fn pitch(&self) -> u32 {
        self.cell_size.saturating_add(self.margin)
    }

    /// Drawing surface size: `columns × pitch` by `rows × pitch`.
    pub fn canvas_size(&self) -> (u32, u32) {
        let pitch = self.pitch();
        (
            self.columns.saturating_mul(pitch),
            self.rows.saturating_mul(pitch),
        )
    }

    pub fn cell_origin(&self, pos: Position) -> (f64, f64) {
        let pitch = self.pitch() as f64;
        (pos.column as f64 * pitch, pos.row as f64 * pitch)
    }

    /// Side length of one of the four sub-cell quadrants.
    pub fn quadrant_size(&self) -> f64 {
        self.cell_size as f64 / 2.0
    }

    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.column < self.columns && pos.row < self.rows
    }

    /// Row-major index of `pos`.
    pub fn index(&self, pos: Position) -> usize {
        pos.row as usize * self.columns as usize + pos.column as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub column: u32,
    pub row: u32,
}

impl Position {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub position: Position,
    /// Chance in `[0.6, 1.0)` that the cursor moves on a given tick.
    pub speed: f64,
}

impl Cursor {
    pub const MIN_SPEED: f64 = 0.6;
    pub const SPEED_RANGE: f64 = 0.4;

    pub fn spawn<R: Rng + ?Sized>(column: u32, rows: u32, rng: &mut R) -> Self {
        Self {
            position: Position::new(column, rng.gen_range(0..rows)),
            speed: Self::MIN_SPEED + rng.gen::<f64>() * Self::SPEED_RANGE,
        }
    }
}

/// Previously occupied positions, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trail {
    entries: VecDeque<Position>,
}

impl Trail {
    /// Inserts at the front and evicts from the back beyond `capacity`.
    pub fn push(&mut self, pos: Position, capacity: usize) {
        self.entries.push_front(pos);
        self.entries.truncate(capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries paired with their age, newest (age 0) first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, Position)> + '_ {
        self.entries.iter().copied().enumerate()
    }
}

/// The cursors, one per column, and the trail each one leaves.
#[derive(Debug, Clone)]
pub struct Grid {
    geometry: Geometry,
    cursors: Vec<Cursor>,
    trails: Vec<Trail>,
}

impl Grid {
    pub fn new<R: Rng + ?Sized>(geometry: Geometry, rng: &mut R) -> Self {
        let mut grid = Self {
            geometry,
            cursors: Vec::new(),
            trails: Vec::new(),
        };
        grid.reinitialize(geometry, rng);
        grid
    }

    /// Rebuilds every cursor at a random row and empties every trail.
    pub fn reinitialize<R: Rng + ?Sized>(&mut self, geometry: Geometry, rng: &mut R) {
        self.geometry = geometry;
        self.cursors = (0..geometry.columns)
            .map(|column| Cursor::spawn(column, geometry.rows, rng))
            .collect();
        self.trails = vec![Trail::default(); self.cursors.len()];
        let (width, height) = geometry.canvas_size();
        debug!(
            columns = geometry.columns,
            rows = geometry.rows,
            width,
            height,
            "grid reinitialized"
        );
    }

    pub fn clear_trails(&mut self) {
        self.trails.iter_mut().for_each(Trail::clear);
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }

    pub(crate) fn parts_mut(&mut self) -> (&Geometry, &mut [Cursor], &mut [Trail]) {
        (&self.geometry, &mut self.cursors, &mut self.trails)
    }
}
