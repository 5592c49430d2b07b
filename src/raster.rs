use crate::color::{ColorEngine, Rgb};
use crate::config::TrailMode;
use crate::decay::DecayMap;
use crate::grid::{Cursor, Geometry, Position, Trail};
use crate::surface::{Glow, Rect, Rgba, Surface};

/// Quadrant `i` takes alpha slot `(phase + QUADRANT_ORDER[i]) % 4`.
pub const QUADRANT_ORDER: [usize; 4] = [0, 1, 3, 2];
pub const ALPHA_SLOTS: [f64; 4] = [1.0, 0.75, 0.5, 0.25];
pub const GLOW_BLUR: f64 = 10.0;
pub const GLOW_ALPHA: f64 = 0.75;

/// Everything the rasterizer reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub geometry: &'a Geometry,
    pub cursors: &'a [Cursor],
    pub trails: &'a [Trail],
    pub decay: &'a DecayMap,
    pub mode: TrailMode,
    pub trail_length: usize,
    pub colors: &'a ColorEngine,
    pub phase: usize,
    pub glow: bool,
}

/// Linear falloff for the trail entry `age` ticks old.
pub fn trail_opacity(age: usize, trail_length: usize) -> f64 {
    let len = trail_length.max(1) as f64;
    ((len - age as f64) / len).max(0.0)
}

/// Alpha of each of the four quadrants for a cell drawn at `opacity`.
pub fn quadrant_alphas(opacity: f64, phase: usize) -> [f64; 4] {
    QUADRANT_ORDER.map(|order| opacity * ALPHA_SLOTS[(phase + order) % ALPHA_SLOTS.len()])
}

/// Clears the surface and redraws trails, then heads.
pub fn draw_frame<S: Surface + ?Sized>(frame: &Frame<'_>, surface: &mut S) {
    let (width, height) = frame.geometry.canvas_size();
    surface.clear(width as f64, height as f64);

    let trail_color = frame.colors.trail_color();
    match frame.mode {
        TrailMode::History => {
            for trail in frame.trails {
                for (age, pos) in trail.iter().rev() {
                    let opacity = trail_opacity(age, frame.trail_length);
                    draw_cell(frame, surface, pos, opacity, trail_color);
                }
            }
        }
        TrailMode::Decay => {
            for (pos, opacity) in frame.decay.visible() {
                draw_cell(frame, surface, pos, opacity as f64, trail_color);
            }
        }
    }

    let head_color = frame.colors.head_color();
    for cursor in frame.cursors {
        draw_cell(frame, surface, cursor.position, 1.0, head_color);
    }
}

fn draw_cell<S: Surface + ?Sized>(
    frame: &Frame<'_>,
    surface: &mut S,
    pos: Position,
    opacity: f64,
    rgb: Rgb,
) {
    surface.set_glow(frame.glow.then(|| Glow {
        blur: GLOW_BLUR,
        color: Rgba::new(rgb, GLOW_ALPHA),
    }));

    let (x, y) = frame.geometry.cell_origin(pos);
    let q = frame.geometry.quadrant_size();
    for (i, alpha) in quadrant_alphas(opacity, frame.phase).into_iter().enumerate() {
        surface.set_fill(Rgba::new(rgb, alpha));
        surface.fill_rect(Rect::new(
            x + (i % 2) as f64 * q,
            y + (i / 2) as f64 * q,
            q,
            q,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_falls_off_linearly() {
        assert_eq!(trail_opacity(0, 20), 1.0);
        assert_eq!(trail_opacity(10, 20), 0.5);
        assert_eq!(trail_opacity(19, 20), 0.05);
        assert_eq!(trail_opacity(25, 20), 0.0);
    }

    #[test]
    fn quadrants_rotate_each_phase() {
        assert_eq!(quadrant_alphas(1.0, 0), [1.0, 0.75, 0.25, 0.5]);
        assert_eq!(quadrant_alphas(1.0, 1), [0.75, 0.5, 1.0, 0.25]);
        assert_eq!(quadrant_alphas(1.0, 2), [0.5, 0.25, 0.75, 1.0]);
        assert_eq!(quadrant_alphas(1.0, 3), [0.25, 1.0, 0.5, 0.75]);
        assert_eq!(quadrant_alphas(0.5, 4), [0.5, 0.375, 0.125, 0.25]);
    }
}
