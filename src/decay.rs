use crate::grid::{Geometry, Position};

#[derive(Debug, Clone, Copy, PartialEq)]
struct DecayCell {
    opacity: f32,
    fading: bool,
}

impl Default for DecayCell {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            fading: false,
        }
    }
}

/// Grid-wide opacity map: vacated cells fade in place until they go dark.
#[derive(Debug, Clone)]
pub struct DecayMap {
    geometry: Geometry,
    cells: Vec<DecayCell>,
}

impl DecayMap {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            cells: vec![DecayCell::default(); geometry.cell_count()],
        }
    }

    pub fn reset(&mut self, geometry: Geometry) {
        *self = Self::new(geometry);
    }

    /// Starts fading a cell a cursor just left.
    pub fn vacate(&mut self, pos: Position) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.fading = true;
        }
    }

    /// Relights a cell a cursor now sits on.
    pub fn occupy(&mut self, pos: Position) {
        if let Some(cell) = self.cell_mut(pos) {
            *cell = DecayCell::default();
        }
    }

    /// Lowers every fading cell by `step`, stopping at zero.
    pub fn decay(&mut self, step: f32) {
        for cell in self.cells.iter_mut().filter(|c| c.fading) {
            cell.opacity = (cell.opacity - step).max(0.0);
        }
    }

    pub fn opacity(&self, pos: Position) -> Option<f32> {
        self.cell(pos).map(|c| c.opacity)
    }

    pub fn is_fading(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(|c| c.fading)
    }

    /// Fading cells that are still visible, in row-major order.
    pub fn visible(&self) -> impl Iterator<Item = (Position, f32)> + '_ {
        let columns = self.geometry.columns;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.fading && c.opacity > 0.0)
            .map(move |(i, c)| {
                let i = i as u32;
                (Position::new(i % columns, i / columns), c.opacity)
            })
    }

    fn cell(&self, pos: Position) -> Option<&DecayCell> {
        if !self.geometry.contains(pos) {
            return None;
        }
        self.cells.get(self.geometry.index(pos))
    }

    fn cell_mut(&mut self, pos: Position) -> Option<&mut DecayCell> {
        if !self.geometry.contains(pos) {
            return None;
        }
        let index = self.geometry.index(pos);
        self.cells.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_fully_lit_and_idle() {
        let map = DecayMap::new(Geometry::new(3, 2, 4, 0));
        assert_eq!(map.opacity(Position::new(2, 1)), Some(1.0));
        assert!(!map.is_fading(Position::new(2, 1)));
        assert_eq!(map.visible().count(), 0);
        assert_eq!(map.opacity(Position::new(3, 0)), None);
    }

    #[test]
    fn only_fading_cells_decay() {
        let mut map = DecayMap::new(Geometry::new(3, 2, 4, 0));
        map.vacate(Position::new(1, 1));
        map.decay(0.25);
        assert_eq!(map.opacity(Position::new(1, 1)), Some(0.75));
        assert_eq!(map.opacity(Position::new(0, 0)), Some(1.0));
        let visible: Vec<_> = map.visible().collect();
        assert_eq!(visible, vec![(Position::new(1, 1), 0.75)]);
    }

    #[test]
    fn clamps_at_zero_and_relights() {
        let mut map = DecayMap::new(Geometry::new(2, 2, 4, 0));
        let pos = Position::new(0, 1);
        map.vacate(pos);
        for _ in 0..5 {
            map.decay(0.5);
        }
        assert_eq!(map.opacity(pos), Some(0.0));
        assert_eq!(map.visible().count(), 0);

        map.occupy(pos);
        assert_eq!(map.opacity(pos), Some(1.0));
        assert!(!map.is_fading(pos));
    }
}
