//! Velocity integration, damping and the sustained temperature

use glam::Vec2;

use crate::particle::Particle;

/// Advances positions from accumulated forces
#[derive(Debug, Clone)]
pub struct Integrator {
    /// Fraction of velocity removed every step
    pub velocity_decay: f32,
}

impl Integrator {
    pub fn new(velocity_decay: f32) -> Self {
        Self { velocity_decay }
    }

    /// One step: `v = (v + f·dt)(1 - decay)`, then `p += v·dt`
    ///
    /// Pinned particles snap to their fixed position and lose their velocity.
    pub fn step(&self, particles: &mut [Particle], forces: &[Vec2], dt: f32) {
        let retain = 1.0 - self.velocity_decay;

        for (i, particle) in particles.iter_mut().enumerate() {
            if let Some(fixed) = particle.fixed_position {
                particle.position = fixed;
                particle.velocity = Vec2::ZERO;
                continue;
            }

            let force = forces.get(i).copied().unwrap_or(Vec2::ZERO);
            particle.velocity = (particle.velocity + force * dt) * retain;
            particle.position += particle.velocity * dt;
        }
    }
}

/// Simulation temperature (alpha)
///
/// Alpha eases toward a nonzero target and stays there, so the pit never
/// cools to rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub alpha: f32,
    pub target: f32,
    pub decay: f32,
}

impl Temperature {
    pub fn new(alpha: f32, target: f32, decay: f32) -> Self {
        Self {
            alpha,
            target,
            decay,
        }
    }

    /// Move one step toward the target and return the new alpha
    pub fn advance(&mut self) -> f32 {
        self.alpha += (self.target - self.alpha) * self.decay;
        self.alpha
    }
}
