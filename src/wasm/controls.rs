use std::cell::RefCell;
use std::rc::Rc;

use serde_wasm_bindgen::from_value;
use tracing::{error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, HtmlCanvasElement, HtmlInputElement};

use super::render::{now_ms, CanvasSurface, FrameCallback, RafScheduler};
use crate::config::{RainConfig, TrailMode};
use crate::driver::Driver;
use crate::sim::Simulation;

/// Canvas id the bundled page uses; `start` mounts on it automatically.
pub const DEFAULT_CANVAS_ID: &str = "gridCanvas";

struct App {
    driver: Driver<RafScheduler>,
    surface: CanvasSurface,
}

impl App {
    /// Resizes the canvas to the grid and draws one frame.
    fn redraw(&mut self) {
        self.surface.resize(self.driver.sim().canvas_size());
        self.driver.sim().render(&mut self.surface);
    }
}

#[wasm_bindgen]
pub struct RainHandle {
    app: Rc<RefCell<App>>,
    /// The frame closure holds its own `Rc` to `app`; dropping the handle
    /// empties this slot so both are released.
    callback: FrameCallback,
}

#[wasm_bindgen]
impl RainHandle {
    /// Attaches to the canvas with id `canvas_id`. `options` is a partial
    /// config object; `null`/`undefined` keeps every default.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, options: JsValue) -> Result<RainHandle, JsValue> {
        let config = if options.is_null() || options.is_undefined() {
            RainConfig::default()
        } else {
            from_value::<RainConfig>(options).map_err(js_error)?
        };

        let document = document()?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| format!("canvas '{canvas_id}' not found"))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| "element is not a canvas")?;
        let surface = CanvasSurface::new(canvas).map_err(js_error)?;

        let seed = (js_sys::Math::random() * (1u64 << 53) as f64) as u64;
        let sim = Simulation::with_seed(config, seed);

        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let scheduler = RafScheduler::new(callback.clone()).map_err(js_error)?;
        let app = Rc::new(RefCell::new(App {
            driver: Driver::new(sim, scheduler),
            surface,
        }));

        let frame_app = app.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            let mut app = frame_app.borrow_mut();
            let App { driver, surface } = &mut *app;
            if let Err(err) = driver.on_frame(timestamp, surface) {
                error!(%err, "frame failed");
            }
        }) as Box<dyn FnMut(f64)>));

        app.borrow_mut().redraw();
        Ok(RainHandle { app, callback })
    }

    pub fn start(&self) -> Result<(), JsValue> {
        self.app
            .borrow_mut()
            .driver
            .start(now_ms())
            .map_err(js_error)
    }

    pub fn stop(&self) {
        self.app.borrow_mut().driver.stop();
    }

    /// Returns `true` when the animation is running afterwards.
    pub fn toggle(&self) -> Result<bool, JsValue> {
        self.app
            .borrow_mut()
            .driver
            .toggle(now_ms())
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.app.borrow().driver.is_running()
    }

    /// Returns the label of the new direction.
    #[wasm_bindgen(js_name = cycleDirection)]
    pub fn cycle_direction(&self) -> String {
        let direction = self.app.borrow_mut().driver.sim_mut().cycle_direction();
        direction.label().to_string()
    }

    #[wasm_bindgen(js_name = toggleColorCycling)]
    pub fn toggle_color_cycling(&self) -> bool {
        self.app.borrow_mut().driver.sim_mut().toggle_color_cycling()
    }

    #[wasm_bindgen(js_name = toggleGlow)]
    pub fn toggle_glow(&self) -> bool {
        self.app.borrow_mut().driver.sim_mut().toggle_glow()
    }

    #[wasm_bindgen(js_name = togglePartyMode)]
    pub fn toggle_party_mode(&self) -> bool {
        self.app.borrow_mut().driver.sim_mut().toggle_party_mode()
    }

    #[wasm_bindgen(js_name = setTrailLength)]
    pub fn set_trail_length(&self, length: u32) {
        self.app
            .borrow_mut()
            .driver
            .sim_mut()
            .set_trail_length(length as usize);
    }

    #[wasm_bindgen(js_name = setMinInterval)]
    pub fn set_min_interval(&self, ms: f64) {
        self.app.borrow_mut().driver.sim_mut().set_min_interval(ms);
    }

    /// `"history"` or `"decay"`.
    #[wasm_bindgen(js_name = setTrailMode)]
    pub fn set_trail_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode = match mode {
            "history" => TrailMode::History,
            "decay" => TrailMode::Decay,
            other => return Err(js_error(format!("unknown trail mode '{other}'"))),
        };
        self.app.borrow_mut().driver.sim_mut().set_trail_mode(mode);
        Ok(())
    }

    #[wasm_bindgen(js_name = setMargin)]
    pub fn set_margin(&self, margin: u32) {
        self.reshape(|sim| sim.set_margin(margin));
    }

    #[wasm_bindgen(js_name = setCellSize)]
    pub fn set_cell_size(&self, cell_size: u32) {
        self.reshape(|sim| sim.set_cell_size(cell_size));
    }

    #[wasm_bindgen(js_name = setColumns)]
    pub fn set_columns(&self, columns: u32) {
        self.reshape(|sim| sim.set_columns(columns));
    }

    #[wasm_bindgen(js_name = setRows)]
    pub fn set_rows(&self, rows: u32) {
        self.reshape(|sim| sim.set_rows(rows));
    }

    #[wasm_bindgen(js_name = canvasWidth)]
    pub fn canvas_width(&self) -> u32 {
        self.app.borrow().driver.sim().canvas_size().0
    }

    #[wasm_bindgen(js_name = canvasHeight)]
    pub fn canvas_height(&self) -> u32 {
        self.app.borrow().driver.sim().canvas_size().1
    }
}

impl Drop for RainHandle {
    fn drop(&mut self) {
        if let Ok(mut app) = self.app.try_borrow_mut() {
            app.driver.stop();
        }
        self.callback.borrow_mut().take();
    }
}

impl RainHandle {
    /// Applies a geometry change, which re-initializes the grid, then redraws.
    fn reshape(&self, change: impl FnOnce(&mut Simulation)) {
        let mut app = self.app.borrow_mut();
        change(app.driver.sim_mut());
        app.redraw();
    }
}

#[wasm_bindgen]
pub fn version() -> String {
    format!("digital-rain {}", env!("CARGO_PKG_VERSION"))
}

/// Mounts on the bundled page's canvas, if present, and wires its controls.
pub fn auto_mount() -> Result<(), JsValue> {
    let document = document()?;
    if document.get_element_by_id(DEFAULT_CANVAS_ID).is_none() {
        return Ok(());
    }
    let handle = Rc::new(RainHandle::new(DEFAULT_CANVAS_ID, JsValue::UNDEFINED)?);
    bind_controls(&document, &handle)
}

fn bind_controls(document: &Document, handle: &Rc<RainHandle>) -> Result<(), JsValue> {
    on_click(document, "startButton", handle, |handle, button| {
        match handle.toggle() {
            Ok(running) => button.set_text_content(Some(if running { "Stop" } else { "Start" })),
            Err(err) => warn!(?err, "toggle failed"),
        }
    })?;
    on_click(document, "directionButton", handle, |handle, button| {
        let label = handle.cycle_direction();
        button.set_text_content(Some(&format!("Direction: {label}")));
    })?;
    on_click(document, "toggleColorButton", handle, |handle, _| {
        handle.toggle_color_cycling();
    })?;
    on_click(document, "toggleGlowButton", handle, |handle, _| {
        handle.toggle_glow();
    })?;
    on_click(document, "partyButton", handle, |handle, _| {
        handle.toggle_party_mode();
    })?;

    on_number(document, "trailLengthInput", handle, |h, v| h.set_trail_length(v))?;
    on_number(document, "marginInput", handle, |h, v| h.set_margin(v))?;
    on_number(document, "cellSizeInput", handle, |h, v| h.set_cell_size(v))?;
    on_number(document, "columnsInput", handle, |h, v| h.set_columns(v))?;
    on_number(document, "rowsInput", handle, |h, v| h.set_rows(v))?;
    Ok(())
}

fn on_click(
    document: &Document,
    id: &str,
    handle: &Rc<RainHandle>,
    action: impl Fn(&RainHandle, &web_sys::Element) + 'static,
) -> Result<(), JsValue> {
    let Some(element) = document.get_element_by_id(id) else {
        return Ok(());
    };
    let handle = handle.clone();
    let target = element.clone();
    let closure = Closure::wrap(Box::new(move || action(&handle, &target)) as Box<dyn FnMut()>);
    element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn on_number(
    document: &Document,
    id: &str,
    handle: &Rc<RainHandle>,
    action: impl Fn(&RainHandle, u32) + 'static,
) -> Result<(), JsValue> {
    let Some(element) = document.get_element_by_id(id) else {
        return Ok(());
    };
    let input = element
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| format!("#{id} is not an input"))?;
    let handle = handle.clone();
    let target = input.clone();
    let closure = Closure::wrap(Box::new(move || match target.value().trim().parse::<u32>() {
        Ok(value) => action(&handle, value),
        Err(_) => warn!(value = %target.value(), "ignoring non-numeric input"),
    }) as Box<dyn FnMut()>);
    input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn document() -> Result<Document, JsValue> {
    Ok(window()
        .ok_or("no window")?
        .document()
        .ok_or("no document")?)
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsError::new(&err.to_string()).into()
}
