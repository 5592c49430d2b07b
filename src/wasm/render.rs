use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{window, CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::driver::Scheduler;
use crate::error::{RainError, Result};
use crate::surface::{Glow, Rect, Rgba, Surface};

/// `CanvasRenderingContext2d` behind the [`Surface`] trait.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| RainError::Dom("canvas: get_context threw".into()))?
            .ok_or_else(|| RainError::Dom("canvas: missing 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RainError::Dom("canvas: context is not 2d".into()))?;
        Ok(Self { canvas, ctx })
    }

    pub fn resize(&self, (width, height): (u32, u32)) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn set_fill(&mut self, color: Rgba) {
        self.ctx.set_fill_style_str(&color.css());
    }

    fn set_glow(&mut self, glow: Option<Glow>) {
        match glow {
            Some(glow) => {
                self.ctx.set_shadow_blur(glow.blur);
                self.ctx.set_shadow_color(&glow.color.css());
                self.ctx.set_shadow_offset_x(0.0);
                self.ctx.set_shadow_offset_y(0.0);
            }
            None => self.ctx.set_shadow_blur(0.0),
        }
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
    }
}

/// Frame callback slot. It is filled after the closure is built so the
/// closure can hand a reference to itself back to `request_animation_frame`.
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Schedules frames with `requestAnimationFrame`.
pub struct RafScheduler {
    window: Window,
    callback: FrameCallback,
}

impl RafScheduler {
    pub fn new(callback: FrameCallback) -> Result<Self> {
        let window = window().ok_or_else(|| RainError::Dom("no window".into()))?;
        Ok(Self { window, callback })
    }
}

impl Scheduler for RafScheduler {
    type Handle = i32;

    fn schedule(&mut self) -> Result<i32> {
        let callback = self.callback.borrow();
        let closure = callback
            .as_ref()
            .ok_or_else(|| RainError::Schedule("frame callback not installed".into()))?;
        self.window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|err| RainError::Schedule(format!("{err:?}")))
    }

    fn cancel(&mut self, handle: i32) {
        self.window.cancel_animation_frame(handle).ok();
    }
}

/// `performance.now()` in milliseconds, or 0 when unavailable.
pub fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_default()
}
