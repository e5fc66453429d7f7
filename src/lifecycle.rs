//! Viewport-driven lifecycle
//!
//! [`SimulationState`] ties together the dataset, the loop, the anchor tracker
//! and the frame clock. Every resize stops the running loop before anything
//! changes and starts a new one afterwards; the dataset itself is regenerated
//! only when the quantized scale parameter changes.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::anchor::AnchorTracker;
use crate::config::SimulationConfig;
use crate::dataset::{Dataset, DatasetGenerator};
use crate::particle::Particle;
use crate::render::{Renderer, Surface};
use crate::simulation::{FrameClock, FrameOutcome, Simulation, SimulationLoop};
use crate::viewport::Viewport;

/// What a resize did to the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// Same scale bucket: the loop restarted on the existing dataset
    Restarted,
    /// New scale bucket: a new dataset was generated
    Regenerated,
}

/// Owned simulation state for one drawing surface
pub struct SimulationState<C: FrameClock> {
    config: SimulationConfig,
    generator: DatasetGenerator,
    rng: StdRng,
    clock: C,
    viewport: Option<Viewport>,
    dataset: Option<Dataset>,
    anchor: AnchorTracker,
    sim_loop: SimulationLoop,
    regenerations: u64,
}

impl<C: FrameClock> SimulationState<C> {
    pub fn new(config: SimulationConfig, clock: C) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let renderer = Renderer::new(config.palette.clone(), 1.0);

        Self {
            generator: DatasetGenerator::from_config(&config),
            config,
            rng,
            clock,
            viewport: None,
            dataset: None,
            anchor: AnchorTracker::new(),
            sim_loop: SimulationLoop::new(renderer),
            regenerations: 0,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn anchor(&self) -> &AnchorTracker {
        &self.anchor
    }

    /// Particles of the running simulation, if any
    pub fn particles(&self) -> Option<&[Particle]> {
        self.sim_loop.simulation().map(Simulation::particles)
    }

    /// Current temperature of the running simulation
    pub fn alpha(&self) -> Option<f32> {
        self.sim_loop.simulation().map(Simulation::alpha)
    }

    pub fn is_running(&self) -> bool {
        self.sim_loop.is_running()
    }

    /// Number of datasets generated so far
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }

    /// Apply a new viewport: stop, maybe regenerate, restart
    pub fn resize(&mut self, viewport: Viewport) -> ResizeOutcome {
        self.sim_loop.stop(&mut self.clock);

        let bucket = viewport.scale_bucket(&self.config);
        let outcome = match &self.dataset {
            Some(dataset) if dataset.bucket() == bucket => ResizeOutcome::Restarted,
            _ => {
                let k = viewport.scale_parameter(&self.config);
                let particles = self.generator.generate(k, &mut self.rng);
                self.dataset = Some(Dataset::new(particles, k, bucket));
                self.regenerations += 1;
                info!(k, bucket, "generated dataset");
                ResizeOutcome::Regenerated
            }
        };
        debug!(
            width = viewport.width,
            height = viewport.height,
            ?outcome,
            "viewport resized"
        );

        self.sim_loop
            .renderer_mut()
            .set_device_pixel_ratio(viewport.device_pixel_ratio);
        self.viewport = Some(viewport);

        if let Some(dataset) = &self.dataset {
            let simulation = Simulation::new(dataset, &viewport, &self.config);
            self.sim_loop.start(simulation, &mut self.clock);
        }
        outcome
    }

    /// Stop for good (component teardown); safe to repeat
    pub fn teardown(&mut self) {
        self.sim_loop.stop(&mut self.clock);
    }

    /// Route a canvas-local pointer position to the anchor
    ///
    /// Ignored until a simulation is running.
    pub fn pointer_moved(&mut self, x: f32, y: f32, canvas_width: f32, canvas_height: f32) -> bool {
        match self.sim_loop.simulation_mut() {
            Some(simulation) => self.anchor.on_pointer_move(
                simulation.particles_mut(),
                x,
                y,
                canvas_width,
                canvas_height,
            ),
            None => false,
        }
    }

    /// Host frame callback
    pub fn on_frame<S: Surface + ?Sized>(&mut self, surface: Option<&mut S>) -> FrameOutcome {
        self.sim_loop.on_frame(&self.anchor, surface, &mut self.clock)
    }
}
