#![cfg(not(target_arch = "wasm32"))]

use digital_rain::{
    hsl_to_rgb, Direction, Geometry, Position, RainConfig, Rgb, Simulation, Trail, TrailMode,
};
use proptest::prelude::*;

fn config(columns: u32, rows: u32) -> RainConfig {
    RainConfig {
        columns,
        rows,
        cell_size: 6,
        margin: 1,
        seed: Some(42),
        ..RainConfig::default()
    }
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Up),
        Just(Direction::Right),
    ]
}

proptest! {
    #[test]
    fn cursors_stay_on_the_torus(
        seed in any::<u64>(),
        columns in 1u32..12,
        rows in 1u32..12,
        direction in direction(),
        party in any::<bool>(),
        ticks in 1usize..80,
    ) {
        let mut sim = Simulation::new(RainConfig {
            direction,
            party_mode: party,
            seed: Some(seed),
            ..config(columns, rows)
        });
        for _ in 0..ticks {
            sim.step();
            for cursor in sim.cursors() {
                prop_assert!(cursor.position.column < columns);
                prop_assert!(cursor.position.row < rows);
            }
        }
    }

    #[test]
    fn trails_never_exceed_capacity(
        seed in any::<u64>(),
        trail_length in 1usize..10,
        ticks in 0usize..40,
    ) {
        let mut sim = Simulation::new(RainConfig {
            trail_length,
            seed: Some(seed),
            ..config(5, 7)
        });
        for _ in 0..ticks {
            sim.step();
            for trail in sim.trails() {
                prop_assert!(trail.len() <= trail_length);
            }
        }
    }
}

#[test]
fn trail_holds_the_most_recent_vacated_cells() {
    let trail_length = 4;
    let mut sim = Simulation::new(RainConfig {
        trail_length,
        ..config(3, 9)
    });
    let mut history: Vec<Vec<Position>> = vec![Vec::new(); 3];
    for _ in 0..=trail_length {
        for (cells, cursor) in history.iter_mut().zip(sim.cursors()) {
            cells.push(cursor.position);
        }
        sim.step();
    }

    for (cells, trail) in history.iter().zip(sim.trails()) {
        let expected: Vec<Position> = cells.iter().rev().take(trail_length).copied().collect();
        let actual: Vec<Position> = trail.iter().map(|(_, p)| p).collect();
        assert_eq!(actual, expected);
        assert_eq!(trail.len(), trail_length);
    }
}

#[test]
fn party_mode_splits_columns() {
    let mut sim = Simulation::new(RainConfig {
        direction: Direction::Right,
        party_mode: true,
        ..config(6, 50)
    });
    let start: Vec<Position> = sim.cursors().iter().map(|c| c.position).collect();
    sim.step();
    for (index, (cursor, from)) in sim.cursors().iter().zip(&start).enumerate() {
        assert_eq!(cursor.position.column, from.column);
        if cursor.position == *from {
            continue;
        }
        let expected = if index % 2 == 0 {
            (from.row + 1) % 50
        } else {
            (from.row + 49) % 50
        };
        assert_eq!(cursor.position.row, expected);
    }
}

#[test]
fn hue_reflects_at_both_bounds() {
    let mut sim = Simulation::new(RainConfig {
        color_cycling: true,
        ..config(2, 2)
    });
    for _ in 0..360 {
        sim.step();
        assert!((0.0..=360.0).contains(&sim.hue()));
    }
    assert_eq!(sim.hue(), 360.0);
    assert!(!sim.colors().hue().is_forward());

    for _ in 0..360 {
        sim.step();
    }
    assert_eq!(sim.hue(), 0.0);
    assert!(sim.colors().hue().is_forward());
}

#[test]
fn hue_holds_still_when_cycling_is_off() {
    let mut sim = Simulation::new(config(2, 2));
    for _ in 0..10 {
        sim.step();
    }
    assert_eq!(sim.hue(), 0.0);
    assert!(sim.toggle_color_cycling());
    sim.step();
    assert_eq!(sim.hue(), 1.0);
}

#[test]
fn hsl_reference_points() {
    assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), Rgb::new(255, 0, 0));
    assert_eq!(hsl_to_rgb(120.0 / 360.0, 1.0, 0.5), Rgb::new(0, 255, 0));
    for h in [0.0, 0.25, 0.9] {
        for l in [0.0, 0.2, 0.5, 1.0] {
            let v = (l * 255.0_f64).round() as u8;
            assert_eq!(hsl_to_rgb(h, 0.0, l), Rgb::new(v, v, v));
        }
    }
}

#[test]
fn vacated_cell_fades_by_fixed_step() {
    let mut sim = Simulation::new(RainConfig {
        trail_mode: TrailMode::Decay,
        ..config(1, 100)
    });

    // wait for the single cursor to leave its cell
    let vacated = loop {
        let before = sim.cursors()[0].position;
        sim.step();
        if sim.cursors()[0].position != before {
            break before;
        }
    };

    let mut expected = 0.98_f32;
    for _ in 0..60 {
        let opacity = sim.decay_map().opacity(vacated).unwrap();
        assert!((opacity - expected).abs() < 1e-4, "{opacity} != {expected}");
        sim.step();
        expected = (expected - 0.02).max(0.0);
    }
    assert_eq!(sim.decay_map().opacity(vacated), Some(0.0));
}

#[test]
fn occupied_cells_are_always_lit() {
    let mut sim = Simulation::new(RainConfig {
        trail_mode: TrailMode::Decay,
        ..config(4, 3)
    });
    for _ in 0..200 {
        sim.step();
        for cursor in sim.cursors() {
            assert_eq!(sim.decay_map().opacity(cursor.position), Some(1.0));
            assert!(!sim.decay_map().is_fading(cursor.position));
        }
    }
}

#[test]
fn direction_control_cycles() {
    let mut sim = Simulation::new(config(2, 2));
    let seen: Vec<Direction> = (0..5).map(|_| sim.cycle_direction()).collect();
    assert_eq!(
        seen,
        vec![
            Direction::Left,
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ]
    );
}

#[test]
fn geometry_changes_reinitialize() {
    let mut sim = Simulation::new(RainConfig {
        trail_mode: TrailMode::History,
        ..config(5, 5)
    });
    for _ in 0..10 {
        sim.step();
    }
    assert!(sim.trails().iter().all(|t| !t.is_empty()));
    let before = sim.cursors().to_vec();

    sim.set_margin(3);
    assert_eq!(sim.canvas_size(), (5 * 9, 5 * 9));
    assert!(sim.trails().iter().all(Trail::is_empty));
    assert_eq!(sim.cursors().len(), before.len());
    for (old, new) in before.iter().zip(sim.cursors()) {
        assert_eq!(new.position.column, old.position.column);
        assert!(new.position.row < 5);
        // every respawn draws a fresh speed
        assert_ne!(new.speed, old.speed);
    }

    sim.set_columns(8);
    sim.set_rows(2);
    sim.set_cell_size(0);
    assert_eq!(sim.cursors().len(), 8);
    assert_eq!(sim.geometry().cell_size, 1);
    assert_eq!(sim.canvas_size(), (8 * 4, 2 * 4));
    for (column, cursor) in sim.cursors().iter().enumerate() {
        assert_eq!(cursor.position.column, column as u32);
        assert!(cursor.position.row < 2);
    }
}

#[test]
fn oversized_geometry_is_clamped() {
    let mut sim = Simulation::new(config(60, 60));
    sim.set_margin(100_000_000);
    assert_eq!(sim.config().margin, Geometry::MAX_PIXELS);
    assert_eq!(sim.canvas_size(), (60 * 1030, 60 * 1030));

    sim.set_cell_size(u32::MAX);
    sim.set_columns(u32::MAX);
    assert_eq!(sim.geometry().columns, Geometry::MAX_CELLS);
    assert_eq!(sim.canvas_size(), (4096 * 2048, 60 * 2048));
    sim.step();

    let sim = Simulation::new(
        RainConfig::from_json(r#"{"columns":2,"rows":2,"cellSize":4294967295,"margin":1}"#)
            .unwrap(),
    );
    assert_eq!(sim.canvas_size(), (2 * 1025, 2 * 1025));
}

#[test]
fn decay_mode_keeps_no_trails() {
    let mut sim = Simulation::new(RainConfig {
        trail_mode: TrailMode::Decay,
        ..config(6, 6)
    });
    for _ in 0..30 {
        sim.step();
    }
    assert!(sim.trails().iter().all(Trail::is_empty));
    assert!(sim.decay_map().visible().count() > 0);
}

#[test]
fn resize_clears_decay_map() {
    let mut sim = Simulation::new(RainConfig {
        trail_mode: TrailMode::Decay,
        ..config(3, 30)
    });
    for _ in 0..10 {
        sim.step();
    }
    assert!(sim.decay_map().visible().count() > 0);
    sim.set_rows(12);
    assert_eq!(sim.decay_map().visible().count(), 0);
}
