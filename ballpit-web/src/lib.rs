//! Browser host for the ballpit simulation
//!
//! Mounts the simulation on an HTML canvas: frames come from
//! `requestAnimationFrame`, the viewport follows the window, and pointer or
//! touch movement drives the anchor.

mod canvas2d;
mod frame;

use std::cell::RefCell;
use std::rc::Rc;

use ballpit::{SimulationConfig, SimulationState, Viewport};
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, Window,
};

pub use canvas2d::Canvas2dSurface;
pub use frame::{AnimationFrameClock, FrameCallback};

type SharedState = Rc<RefCell<SimulationState<AnimationFrameClock>>>;
type SharedSurface = Rc<RefCell<Canvas2dSurface>>;

/// Initialize WASM panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// A running ball pit bound to one canvas
#[wasm_bindgen]
pub struct Ballpit {
    state: SharedState,
    callback: FrameCallback,
    listeners: Vec<Listener>,
    destroyed: bool,
}

#[wasm_bindgen]
impl Ballpit {
    /// Mount on `canvas` and start animating
    ///
    /// `config_json` overrides any subset of the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config_json: Option<String>) -> Result<Ballpit, JsValue> {
        let window = web_sys::window().ok_or("no global window")?;
        let config = match config_json {
            Some(json) => SimulationConfig::from_json_str(&json)
                .map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => SimulationConfig::default(),
        };

        let surface: SharedSurface = Rc::new(RefCell::new(Canvas2dSurface::new(canvas.clone())?));
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let clock = AnimationFrameClock::new(window.clone(), Rc::clone(&callback));
        let pending = clock.pending_handle();
        let state: SharedState = Rc::new(RefCell::new(SimulationState::new(config, clock)));

        {
            let state = Rc::clone(&state);
            let surface = Rc::clone(&surface);
            *callback.borrow_mut() = Some(Closure::new(move |_timestamp: f64| {
                AnimationFrameClock::frame_fired(&pending);
                let (Ok(mut state), Ok(mut surface)) = (state.try_borrow_mut(), surface.try_borrow_mut())
                else {
                    return;
                };
                state.on_frame(Some(&mut *surface));
            }));
        }

        let mut ballpit = Ballpit {
            state,
            callback,
            listeners: Vec::new(),
            destroyed: false,
        };
        fit_to_window(&window, &ballpit.state, &surface);
        ballpit.listen(&window, &canvas, &surface)?;
        tracing::info!("ballpit mounted");
        Ok(ballpit)
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.state.try_borrow().is_ok_and(|state| state.is_running())
    }

    /// Stop the loop and detach every listener; later calls do nothing
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.teardown();
        }
        for listener in self.listeners.drain(..) {
            if let Err(e) = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.closure.as_ref().unchecked_ref(),
            ) {
                tracing::warn!(error = ?e, event = listener.event, "failed to remove listener");
            }
        }
        // breaks the state -> clock -> callback -> state cycle
        self.callback.borrow_mut().take();
        tracing::info!("ballpit destroyed");
    }
}

impl Ballpit {
    fn listen(
        &mut self,
        window: &Window,
        canvas: &HtmlCanvasElement,
        surface: &SharedSurface,
    ) -> Result<(), JsValue> {
        let on_resize: Closure<dyn FnMut(Event)> = {
            let window = window.clone();
            let state = Rc::clone(&self.state);
            let surface = Rc::clone(surface);
            Closure::new(move |_event: Event| fit_to_window(&window, &state, &surface))
        };
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
        self.listeners.push(Listener {
            target: window.clone().into(),
            event: "resize",
            closure: on_resize,
        });

        let on_pointer: Closure<dyn FnMut(Event)> = {
            let canvas = canvas.clone();
            let state = Rc::clone(&self.state);
            Closure::new(move |event: Event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                move_anchor(&state, &canvas, event.offset_x() as f32, event.offset_y() as f32);
            })
        };
        canvas.add_event_listener_with_callback("pointermove", on_pointer.as_ref().unchecked_ref())?;
        self.listeners.push(Listener {
            target: canvas.clone().into(),
            event: "pointermove",
            closure: on_pointer,
        });

        // touchmove must be non-passive so dragging moves the anchor, not the page
        let on_touch: Closure<dyn FnMut(Event)> = {
            let canvas = canvas.clone();
            let state = Rc::clone(&self.state);
            Closure::new(move |event: Event| {
                event.prevent_default();
                let Some(touch) = event
                    .dyn_ref::<TouchEvent>()
                    .and_then(|event| event.touches().get(0))
                else {
                    return;
                };
                let rect = canvas.get_bounding_client_rect();
                let x = touch.client_x() as f64 - rect.left();
                let y = touch.client_y() as f64 - rect.top();
                move_anchor(&state, &canvas, x as f32, y as f32);
            })
        };
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        canvas.add_event_listener_with_callback_and_add_event_listener_options(
            "touchmove",
            on_touch.as_ref().unchecked_ref(),
            &options,
        )?;
        self.listeners.push(Listener {
            target: canvas.clone().into(),
            event: "touchmove",
            closure: on_touch,
        });

        Ok(())
    }
}

impl Drop for Ballpit {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn window_viewport(window: &Window) -> Viewport {
    let dimension = |value: Result<JsValue, JsValue>| {
        value
            .ok()
            .and_then(|v| v.as_f64())
            .filter(|v| v.is_finite() && *v >= 1.0)
            .map_or(1, |v| v as u32)
    };
    Viewport::new(
        dimension(window.inner_width()),
        dimension(window.inner_height()),
        window.device_pixel_ratio(),
    )
}

fn fit_to_window(window: &Window, state: &SharedState, surface: &SharedSurface) {
    let viewport = window_viewport(window);
    if !viewport.fits_backing_limit() {
        tracing::warn!(
            width = viewport.width,
            height = viewport.height,
            pixels = viewport.backing_pixels(),
            "viewport exceeds the backing store limit, keeping the previous size"
        );
        return;
    }
    let (Ok(mut state), Ok(mut surface)) = (state.try_borrow_mut(), surface.try_borrow_mut()) else {
        return;
    };
    surface.resize(viewport.width, viewport.height, viewport.backing_size());
    state.resize(viewport);
}

fn move_anchor(state: &SharedState, canvas: &HtmlCanvasElement, x: f32, y: f32) {
    let width = canvas.client_width() as f32;
    let height = canvas.client_height() as f32;
    if let Ok(mut state) = state.try_borrow_mut() {
        state.pointer_moved(x, y, width, height);
    }
}
