//! Drawing surfaces the rasterizer renders into.
//!
//! The browser backend wraps a `CanvasRenderingContext2d`; the types here let
//! the same draw calls be recorded for tests or blitted into an RGBA buffer on
//! the host.

use crate::color::Rgb;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f64,
}

impl Rgba {
    pub fn new(rgb: Rgb, alpha: f64) -> Self {
        Self { rgb, alpha }
    }

    /// CSS `rgba(...)` form accepted by canvas fill and shadow styles.
    pub fn css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.rgb.r, self.rgb.g, self.rgb.b, self.alpha
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Shadow styling used for the glow effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub blur: f64,
    pub color: Rgba,
}

pub trait Surface {
    /// Clears `width × height` pixels from the origin.
    fn clear(&mut self, width: f64, height: f64);
    fn set_fill(&mut self, color: Rgba);
    /// `None` turns the shadow off.
    fn set_glow(&mut self, glow: Option<Glow>);
    fn fill_rect(&mut self, rect: Rect);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { width: f64, height: f64 },
    Fill(Rgba),
    Glow(Option<Glow>),
    Rect(Rect),
}

/// Keeps every call in order.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill rectangles paired with the fill colour active when each was drawn.
    pub fn filled(&self) -> Vec<(Rgba, Rect)> {
        let mut fill = None;
        let mut out = Vec::new();
        for command in &self.commands {
            match command {
                DrawCommand::Fill(color) => fill = Some(*color),
                DrawCommand::Rect(rect) => {
                    if let Some(color) = fill {
                        out.push((color, *rect));
                    }
                }
                _ => {}
            }
        }
        out
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn set_fill(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::Fill(color));
    }

    fn set_glow(&mut self, glow: Option<Glow>) {
        self.commands.push(DrawCommand::Glow(glow));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Rect(rect));
    }
}

/// Software RGBA raster with source-over blending. Glow is not emulated.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    fill: Rgba,
}

impl PixelSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 4],
            fill: Rgba::new(Rgb::default(), 1.0),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * 4;
        let mut px = [0; 4];
        px.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(px)
    }

    fn span(start: f64, len: f64, limit: usize) -> std::ops::Range<usize> {
        let lo = start.round().clamp(0.0, limit as f64) as usize;
        let hi = (start + len).round().clamp(0.0, limit as f64) as usize;
        lo..hi.max(lo)
    }
}

impl Surface for PixelSurface {
    fn clear(&mut self, width: f64, height: f64) {
        let xs = Self::span(0.0, width, self.width);
        for y in Self::span(0.0, height, self.height) {
            let row = y * self.width * 4;
            self.pixels[row + xs.start * 4..row + xs.end * 4].fill(0);
        }
    }

    fn set_fill(&mut self, color: Rgba) {
        self.fill = color;
    }

    fn set_glow(&mut self, _glow: Option<Glow>) {}

    fn fill_rect(&mut self, rect: Rect) {
        let alpha = self.fill.alpha.clamp(0.0, 1.0);
        if alpha == 0.0 {
            return;
        }
        let src = [self.fill.rgb.r, self.fill.rgb.g, self.fill.rgb.b];
        let xs = Self::span(rect.x, rect.width, self.width);
        for y in Self::span(rect.y, rect.height, self.height) {
            for x in xs.clone() {
                let offset = (y * self.width + x) * 4;
                let px = &mut self.pixels[offset..offset + 4];
                for (dst, s) in px.iter_mut().zip(src) {
                    *dst = (s as f64 * alpha + *dst as f64 * (1.0 - alpha)).round() as u8;
                }
                let dst_a = px[3] as f64 / 255.0;
                px[3] = ((alpha + dst_a * (1.0 - alpha)) * 255.0).round() as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_string() {
        let c = Rgba::new(Rgb::new(1, 236, 1), 0.75);
        assert_eq!(c.css(), "rgba(1, 236, 1, 0.75)");
    }

    #[test]
    fn pixel_surface_blends_source_over() {
        let mut surface = PixelSurface::new(4, 4);
        surface.set_fill(Rgba::new(Rgb::new(200, 100, 0), 1.0));
        surface.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0));
        surface.set_fill(Rgba::new(Rgb::new(0, 0, 0), 0.5));
        surface.fill_rect(Rect::new(1.0, 1.0, 2.0, 2.0));

        assert_eq!(surface.pixel(0, 0), Some([200, 100, 0, 255]));
        assert_eq!(surface.pixel(1, 1), Some([100, 50, 0, 255]));
        assert_eq!(surface.pixel(2, 2), Some([0, 0, 0, 128]));
        assert_eq!(surface.pixel(3, 3), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(4, 0), None);

        surface.clear(4.0, 4.0);
        assert!(surface.as_rgba().iter().all(|b| *b == 0));
    }

    #[test]
    fn recording_pairs_rects_with_fill() {
        let mut surface = RecordingSurface::new();
        let red = Rgba::new(Rgb::new(255, 0, 0), 1.0);
        surface.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        surface.set_fill(red);
        surface.fill_rect(Rect::new(1.0, 0.0, 1.0, 1.0));
        assert_eq!(surface.filled(), vec![(red, Rect::new(1.0, 0.0, 1.0, 1.0))]);
    }
}
