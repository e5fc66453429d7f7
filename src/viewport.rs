//! Viewport dimensions and the values derived from them

use crate::config::SimulationConfig;

/// Largest backing store a host should allocate (8192 x 8192 device pixels)
pub const MAX_BACKING_PIXELS: u64 = 8192 * 8192;

/// Visible drawing area in CSS pixels plus the display's pixel density
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// A missing, zero or non-finite pixel ratio falls back to 1
    pub fn new(width: u32, height: u32, device_pixel_ratio: f64) -> Self {
        let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Backing-store size in device pixels
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width as f64 * self.device_pixel_ratio).round() as u32,
            (self.height as f64 * self.device_pixel_ratio).round() as u32,
        )
    }

    /// Backing-store area in device pixels
    pub fn backing_pixels(&self) -> u64 {
        let (width, height) = self.backing_size();
        width as u64 * height as u64
    }

    /// Whether a backing store for this viewport stays under [`MAX_BACKING_PIXELS`]
    pub fn fits_backing_limit(&self) -> bool {
        self.backing_pixels() <= MAX_BACKING_PIXELS
    }

    /// The scale parameter `k` that sizes particle radii, clamped to `max_scale`
    pub fn scale_parameter(&self, config: &SimulationConfig) -> f32 {
        (self.width as f32 / config.scale_divisor).min(config.max_scale)
    }

    /// Quantized `k`; the dataset is regenerated only when this changes
    pub fn scale_bucket(&self, config: &SimulationConfig) -> u32 {
        (self.width as f32 / config.scale_divisor)
            .floor()
            .min(config.max_scale.floor()) as u32
    }

    /// Strength of the anchor's charge for this viewport width
    pub fn anchor_charge(&self, config: &SimulationConfig) -> f32 {
        -config.anchor_charge_scale * self.width as f32
    }
}
