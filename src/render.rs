//! Per-tick draw pass
//!
//! The renderer speaks to a [`Surface`], a small subset of the Canvas 2D API
//! (state stack, scale, translate, clear, filled circles). The browser host
//! implements it over `CanvasRenderingContext2d`; [`PixelSurface`] implements
//! it in software.
//!
//! [`PixelSurface`]: crate::surface::PixelSurface

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorParseError;
use crate::particle::Particle;

/// An 8-bit straight-alpha color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Opaque color from its channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// CSS `rgba(...)` form, for canvas fill styles
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            self.a as f32 / 255.0
        )
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.eq_ignore_ascii_case("transparent") {
            return Ok(Self::TRANSPARENT);
        }

        let digits = text
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(s.to_string()));
        }

        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
        let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).map(|n| n * 17);
        let bad_digit = |_| ColorParseError::BadDigit(s.to_string());

        match digits.len() {
            3 => Ok(Self::rgb(
                nibble(0).map_err(bad_digit)?,
                nibble(1).map_err(bad_digit)?,
                nibble(2).map_err(bad_digit)?,
            )),
            6 | 8 => Ok(Self {
                r: byte(0).map_err(bad_digit)?,
                g: byte(2).map_err(bad_digit)?,
                b: byte(4).map_err(bad_digit)?,
                a: if digits.len() == 8 {
                    byte(6).map_err(bad_digit)?
                } else {
                    255
                },
            }),
            _ => Err(ColorParseError::BadLength(s.to_string())),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.a {
            0 if (self.r, self.g, self.b) == (0, 0, 0) => write!(f, "transparent"),
            255 => write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b),
            a => write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, a),
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}

/// Ordinal group → color mapping
///
/// Entry 0 belongs to the anchor and is transparent by default. Groups past
/// the end wrap around, the way an ordinal scale extends its domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<Rgba>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(vec![
            Rgba::TRANSPARENT,
            Rgba::rgb(0x89, 0x86, 0x87),
            Rgba::rgb(0xC1, 0xC1, 0xC1),
            Rgba::rgb(0x9F, 0x91, 0xC2),
            Rgba::rgb(0x7F, 0x64, 0xA8),
            Rgba::rgb(0xBC, 0xBA, 0xBD),
        ])
    }
}

impl Palette {
    pub fn new(colors: Vec<Rgba>) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Number of follower groups (every entry except the anchor's)
    pub fn group_count(&self) -> usize {
        self.colors.len().saturating_sub(1)
    }

    /// Resolve the fill color for a group
    pub fn color_of(&self, group: usize) -> Rgba {
        if self.colors.is_empty() {
            return Rgba::TRANSPARENT;
        }
        self.colors[group % self.colors.len()]
    }
}

/// A 2D drawing target with a Canvas-style transform stack
///
/// Coordinates passed to drawing calls are transformed by the current
/// transform; `save`/`restore` push and pop it.
pub trait Surface {
    /// Backing-store size in device pixels
    fn pixel_size(&self) -> (u32, u32);

    fn save(&mut self);

    fn restore(&mut self);

    fn scale(&mut self, x: f64, y: f64);

    fn translate(&mut self, x: f64, y: f64);

    /// Reset the rectangle to fully transparent
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba);
}

/// Draws the particle set, color-coded by group
#[derive(Debug, Clone)]
pub struct Renderer {
    palette: Palette,
    device_pixel_ratio: f64,
}

impl Renderer {
    pub fn new(palette: Palette, device_pixel_ratio: f64) -> Self {
        Self {
            palette,
            device_pixel_ratio,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        self.device_pixel_ratio = ratio;
    }

    /// Clear the surface and draw every particle around its visual center
    ///
    /// The surface's transform state is restored before returning, so
    /// repeated frames never accumulate transforms.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, particles: &[Particle]) {
        let (pixel_width, pixel_height) = surface.pixel_size();
        let ratio = self.device_pixel_ratio;
        let width = pixel_width as f64 / ratio;
        let height = pixel_height as f64 / ratio;

        surface.save();
        surface.scale(ratio, ratio);
        surface.clear_rect(0.0, 0.0, width, height);
        surface.translate(width / 2.0, height / 2.0);

        for particle in particles {
            surface.fill_circle(
                particle.position.x as f64,
                particle.position.y as f64,
                particle.radius as f64,
                self.palette.color_of(particle.group),
            );
        }

        surface.restore();
    }
}
