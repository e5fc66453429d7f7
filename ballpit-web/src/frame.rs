//! `requestAnimationFrame` scheduling

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ballpit::FrameClock;
use js_sys::Function;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

/// Slot for the per-frame callback, filled once the simulation state exists
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// [`FrameClock`] backed by the window's animation frames
///
/// At most one frame is pending at a time. The callback must call
/// [`AnimationFrameClock::frame_fired`] (through a clone of the handle from
/// [`AnimationFrameClock::pending_handle`]) before doing any work.
pub struct AnimationFrameClock {
    window: Window,
    callback: FrameCallback,
    pending: Rc<Cell<Option<i32>>>,
}

impl AnimationFrameClock {
    pub fn new(window: Window, callback: FrameCallback) -> Self {
        Self {
            window,
            callback,
            pending: Rc::new(Cell::new(None)),
        }
    }

    /// Shared view of the pending request id
    pub fn pending_handle(&self) -> Rc<Cell<Option<i32>>> {
        Rc::clone(&self.pending)
    }

    /// Mark the pending request as delivered
    pub fn frame_fired(pending: &Cell<Option<i32>>) {
        pending.set(None);
    }
}

impl FrameClock for AnimationFrameClock {
    fn request_frame(&mut self) {
        if self.pending.get().is_some() {
            return;
        }
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            tracing::warn!("frame requested before the callback was installed");
            return;
        };
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref::<Function>())
        {
            Ok(id) => self.pending.set(Some(id)),
            Err(e) => tracing::error!(error = ?e, "requestAnimationFrame failed"),
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(id) = self.pending.take() {
            if let Err(e) = self.window.cancel_animation_frame(id) {
                tracing::warn!(error = ?e, id, "cancelAnimationFrame failed");
            }
        }
    }
}
