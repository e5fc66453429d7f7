//! ballpit - an always-hot 2D ball pit.
//!
//! A few hundred circles of random size are pulled toward the center of the
//! viewport, kept from overlapping, and shoved around by one invisible anchor
//! that follows the pointer. The simulation never cools to rest.
//!
//! The core is host-agnostic: drawing goes through [`render::Surface`] and
//! frame scheduling through [`simulation::FrameClock`]. The `ballpit` binary
//! drives it headlessly; the `ballpit-web` crate mounts it on an HTML canvas.

pub mod anchor;
pub mod collision;
pub mod config;
pub mod dataset;
pub mod error;
pub mod forces;
pub mod headless;
pub mod integrator;
pub mod lifecycle;
pub mod particle;
pub mod render;
pub mod simulation;
pub mod spatial;
pub mod surface;
pub mod viewport;

pub use config::SimulationConfig;
pub use lifecycle::{ResizeOutcome, SimulationState};
pub use particle::{Particle, Role};
pub use render::{Palette, Renderer, Rgba, Surface};
pub use simulation::{FrameClock, FrameOutcome, Simulation, SimulationLoop};
pub use viewport::Viewport;
