use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::{Geometry, Grid, Position};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Down,
    Left,
    Up,
    Right,
}

impl Direction {
    /// Order the direction control steps through.
    pub const CYCLE: [Direction; 4] = [
        Direction::Down,
        Direction::Left,
        Direction::Up,
        Direction::Right,
    ];

    pub fn next(self) -> Self {
        let index = Self::CYCLE.iter().position(|d| *d == self).unwrap_or(0);
        Self::CYCLE[(index + 1) % Self::CYCLE.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Up => "Up",
            Direction::Right => "Right",
        }
    }

    /// The neighbouring cell in this direction on a torus.
    pub fn step(self, pos: Position, geometry: &Geometry) -> Position {
        let (cols, rows) = (geometry.columns, geometry.rows);
        match self {
            Direction::Down => Position::new(pos.column, (pos.row + 1) % rows),
            Direction::Up => Position::new(pos.column, (pos.row + rows - 1) % rows),
            Direction::Right => Position::new((pos.column + 1) % cols, pos.row),
            Direction::Left => Position::new((pos.column + cols - 1) % cols, pos.row),
        }
    }
}

/// Global movement settings applied to every cursor on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading {
    pub direction: Direction,
    /// Even-indexed cursors fall, odd-indexed ones rise, ignoring `direction`.
    pub party: bool,
}

impl Heading {
    pub fn for_cursor(&self, index: usize) -> Direction {
        match (self.party, index % 2) {
            (false, _) => self.direction,
            (true, 0) => Direction::Down,
            (true, _) => Direction::Up,
        }
    }
}

/// What happened to one cursor during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub from: Position,
    pub to: Position,
    pub moved: bool,
}

/// Rolls every cursor forward one tick. With `Some(capacity)` the pre-move
/// cell is pushed onto the cursor's trail; `None` leaves trails untouched.
pub fn advance<R: Rng + ?Sized>(
    grid: &mut Grid,
    heading: Heading,
    trail_length: Option<usize>,
    rng: &mut R,
) -> Vec<Step> {
    let (geometry, cursors, trails) = grid.parts_mut();
    cursors
        .iter_mut()
        .zip(trails.iter_mut())
        .enumerate()
        .map(|(index, (cursor, trail))| {
            let from = cursor.position;
            let moved = rng.gen::<f64>() < cursor.speed;
            if moved {
                cursor.position = heading.for_cursor(index).step(from, geometry);
            }
            if let Some(capacity) = trail_length {
                trail.push(from, capacity);
            }
            Step {
                from,
                to: cursor.position,
                moved,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn direction_cycle_visits_each_once() {
        let mut d = Direction::Down;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(d);
            d = d.next();
        }
        assert_eq!(seen, Direction::CYCLE.to_vec());
        assert_eq!(d, Direction::Down);
    }

    #[test]
    fn steps_wrap_around_edges() {
        let geometry = Geometry::new(4, 3, 10, 0);
        assert_eq!(Direction::Down.step(Position::new(1, 2), &geometry), Position::new(1, 0));
        assert_eq!(Direction::Up.step(Position::new(1, 0), &geometry), Position::new(1, 2));
        assert_eq!(Direction::Right.step(Position::new(3, 1), &geometry), Position::new(0, 1));
        assert_eq!(Direction::Left.step(Position::new(0, 1), &geometry), Position::new(3, 1));
    }

    #[test]
    fn party_mode_alternates() {
        let heading = Heading {
            direction: Direction::Left,
            party: true,
        };
        assert_eq!(heading.for_cursor(0), Direction::Down);
        assert_eq!(heading.for_cursor(1), Direction::Up);
        assert_eq!(heading.for_cursor(4), Direction::Down);

        let solo = Heading { party: false, ..heading };
        assert_eq!(solo.for_cursor(1), Direction::Left);
    }

    #[test]
    fn trail_records_vacated_cell() {
        let mut rng = SmallRng::seed_from_u64(3);
        let geometry = Geometry::new(5, 8, 10, 0);
        let mut grid = Grid::new(geometry, &mut rng);
        let heading = Heading {
            direction: Direction::Down,
            party: false,
        };
        let before: Vec<Position> = grid.cursors().iter().map(|c| c.position).collect();
        let steps = advance(&mut grid, heading, Some(4), &mut rng);
        for ((step, trail), start) in steps.iter().zip(grid.trails()).zip(&before) {
            assert_eq!(step.from, *start);
            assert_eq!(trail.iter().next(), Some((0, *start)));
            if step.moved {
                assert_eq!(step.to, Direction::Down.step(*start, &geometry));
            } else {
                assert_eq!(step.to, *start);
            }
        }
    }

    #[test]
    fn no_capacity_skips_trails() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut grid = Grid::new(Geometry::new(6, 6, 10, 0), &mut rng);
        let heading = Heading {
            direction: Direction::Right,
            party: false,
        };
        for _ in 0..10 {
            advance(&mut grid, heading, None, &mut rng);
        }
        assert!(grid.trails().iter().all(|t| t.is_empty()));
    }
}
