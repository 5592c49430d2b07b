use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

/// Converts HSL (all components in `[0, 1]`) to RGB, rounding each channel.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    if s == 0.0 {
        let v = channel(l);
        return Rgb::new(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Rgb::new(
        channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        channel(hue_to_rgb(p, q, h)),
        channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Hue in degrees that sweeps back and forth across `[0, 360]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueCycle {
    hue: f64,
    step: f64,
    forward: bool,
}

impl HueCycle {
    pub const MAX: f64 = 360.0;

    pub fn new(step: f64) -> Self {
        Self {
            hue: 0.0,
            step,
            forward: true,
        }
    }

    pub fn hue(&self) -> f64 {
        self.hue
    }

    pub fn is_forward(&self) -> bool {
        self.forward
    }

    /// Moves one step and reflects at either bound.
    pub fn advance(&mut self) {
        let delta = if self.forward { self.step } else { -self.step };
        self.hue = (self.hue + delta).clamp(0.0, Self::MAX);
        if self.hue >= Self::MAX || self.hue <= 0.0 {
            self.forward = !self.forward;
        }
    }
}

/// Picks the color for heads and trail cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorEngine {
    pub base: Rgb,
    pub cycling: bool,
    pub white_heads: bool,
    hue: HueCycle,
}

impl ColorEngine {
    pub fn new(base: Rgb, cycling: bool, white_heads: bool, hue_step: f64) -> Self {
        Self {
            base,
            cycling,
            white_heads,
            hue: HueCycle::new(hue_step),
        }
    }

    pub fn hue(&self) -> &HueCycle {
        &self.hue
    }

    /// Advances the hue when cycling; a static palette leaves it untouched.
    pub fn advance(&mut self) {
        if self.cycling {
            self.hue.advance();
        }
    }

    pub fn trail_color(&self) -> Rgb {
        if self.cycling {
            hsl_to_rgb(self.hue.hue() / HueCycle::MAX, 1.0, 0.5)
        } else {
            self.base
        }
    }

    pub fn head_color(&self) -> Rgb {
        if self.white_heads {
            Rgb::WHITE
        } else {
            self.trail_color()
        }
    }
}
