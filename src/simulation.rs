//! Tick pipeline and the frame-driven loop
//!
//! A [`Simulation`] owns one running copy of a dataset and advances it one
//! tick at a time. A [`SimulationLoop`] wraps it in a `Stopped`/`Running`
//! state machine driven by a host-supplied [`FrameClock`].

use glam::Vec2;
use tracing::{debug, info, trace};

use crate::anchor::AnchorTracker;
use crate::collision::CollisionResolver;
use crate::config::SimulationConfig;
use crate::dataset::Dataset;
use crate::forces::ForceField;
use crate::integrator::{Integrator, Temperature};
use crate::particle::Particle;
use crate::render::{Renderer, Surface};
use crate::viewport::Viewport;

/// One running simulation
#[derive(Debug, Clone)]
pub struct Simulation {
    particles: Vec<Particle>,
    force_field: ForceField,
    collisions: CollisionResolver,
    integrator: Integrator,
    temperature: Temperature,
    time_step: f32,
    ticks: u64,
}

impl Simulation {
    /// Start from a fresh copy of `dataset`, tuned for `viewport`
    pub fn new(dataset: &Dataset, viewport: &Viewport, config: &SimulationConfig) -> Self {
        Self {
            particles: dataset.instantiate(),
            force_field: ForceField::new(config.center_strength, viewport.anchor_charge(config)),
            collisions: CollisionResolver::new(config.collision_iterations, config.collision_padding),
            integrator: Integrator::new(config.velocity_decay),
            temperature: Temperature::new(config.alpha, config.alpha_target, config.alpha_decay),
            time_step: config.time_step,
            ticks: 0,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn alpha(&self) -> f32 {
        self.temperature.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance one tick: anchor override, forces, collisions, integration
    pub fn tick(&mut self, anchor: &AnchorTracker) {
        self.ticks += 1;
        if self.particles.is_empty() {
            return;
        }

        anchor.apply(&mut self.particles);
        let alpha = self.temperature.advance();

        let mut forces: Vec<Vec2> = self.force_field.compute(&self.particles, alpha);
        self.collisions.resolve(&self.particles, &mut forces);
        self.integrator
            .step(&mut self.particles, &forces, self.time_step);

        trace!(tick = self.ticks, alpha, "tick");
    }
}

/// Display-refresh trigger supplied by the host
///
/// After `request_frame`, the host calls back into the loop (through
/// [`SimulationLoop::on_frame`]) on the next refresh. `cancel_frame` drops a
/// pending request; it must be safe to call when nothing is pending.
pub trait FrameClock {
    fn request_frame(&mut self);

    fn cancel_frame(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// What a frame callback did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The loop is stopped; nothing ran and no frame was requested
    Skipped,
    /// Ticked, but there was no surface to draw on
    Simulated,
    /// Ticked and drew
    Rendered,
}

/// Owns the running simulation and its renderer
#[derive(Debug)]
pub struct SimulationLoop {
    running: Option<Simulation>,
    renderer: Renderer,
}

impl SimulationLoop {
    pub fn new(renderer: Renderer) -> Self {
        Self {
            running: None,
            renderer,
        }
    }

    pub fn state(&self) -> LoopState {
        if self.running.is_some() {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.running.as_ref()
    }

    pub fn simulation_mut(&mut self) -> Option<&mut Simulation> {
        self.running.as_mut()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Begin running `simulation`, stopping any previous one first
    pub fn start<C: FrameClock + ?Sized>(&mut self, simulation: Simulation, clock: &mut C) {
        self.stop(clock);
        info!(particles = simulation.particles().len(), "simulation started");
        self.running = Some(simulation);
        clock.request_frame();
    }

    /// Stop and cancel any pending frame; calling it again does nothing
    pub fn stop<C: FrameClock + ?Sized>(&mut self, clock: &mut C) {
        if let Some(simulation) = self.running.take() {
            clock.cancel_frame();
            info!(ticks = simulation.ticks(), "simulation stopped");
        }
    }

    /// Frame callback: tick, draw if a surface is available, ask for the next frame
    pub fn on_frame<S, C>(
        &mut self,
        anchor: &AnchorTracker,
        surface: Option<&mut S>,
        clock: &mut C,
    ) -> FrameOutcome
    where
        S: Surface + ?Sized,
        C: FrameClock + ?Sized,
    {
        let Some(simulation) = self.running.as_mut() else {
            debug!("frame delivered to a stopped loop");
            return FrameOutcome::Skipped;
        };

        simulation.tick(anchor);

        let outcome = match surface {
            Some(surface) => {
                self.renderer.draw(surface, simulation.particles());
                FrameOutcome::Rendered
            }
            None => {
                trace!("no drawing surface, skipping render");
                FrameOutcome::Simulated
            }
        };

        clock.request_frame();
        outcome
    }
}
