//! 2D canvas drawing surface

use std::f64::consts::TAU;

use ballpit::{Rgba, Surface};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// [`Surface`] over a canvas's 2D context
pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Canvas2dSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("Failed to get 2d context: {:?}", e))?
            .ok_or("2d context not available")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "Failed to cast to CanvasRenderingContext2d")?;

        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Size the backing store in device pixels and the element in CSS pixels
    pub fn resize(&mut self, css_width: u32, css_height: u32, backing: (u32, u32)) {
        self.canvas.set_width(backing.0);
        self.canvas.set_height(backing.1);

        let style = self.canvas.style();
        for (property, value) in [("width", css_width), ("height", css_height)] {
            if let Err(e) = style.set_property(property, &format!("{value}px")) {
                tracing::warn!(error = ?e, property, "failed to set canvas style");
            }
        }
    }
}

impl Surface for Canvas2dSurface {
    fn pixel_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn scale(&mut self, x: f64, y: f64) {
        if let Err(e) = self.ctx.scale(x, y) {
            tracing::warn!(error = ?e, "canvas scale failed");
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        if let Err(e) = self.ctx.translate(x, y) {
            tracing::warn!(error = ?e, "canvas translate failed");
        }
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        if color.is_transparent() {
            return;
        }
        self.ctx.begin_path();
        if self.ctx.arc(cx, cy, radius.max(0.0), 0.0, TAU).is_err() {
            return;
        }
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
    }
}
