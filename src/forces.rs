//! Centering and anchor repulsion
//!
//! Forces are returned as per-particle velocity deltas; nothing here touches
//! positions or velocities directly.

use glam::Vec2;

use crate::particle::{Particle, Role, jiggle};

/// Below this squared distance the many-body falloff is softened
const DISTANCE_MIN2: f32 = 1.0;

/// Per-tick force computation
#[derive(Debug, Clone)]
pub struct ForceField {
    /// Pull toward the origin on both axes
    pub center_strength: f32,
    /// Charge carried by the anchor; negative repels
    pub anchor_charge: f32,
}

impl ForceField {
    pub fn new(center_strength: f32, anchor_charge: f32) -> Self {
        Self {
            center_strength,
            anchor_charge,
        }
    }

    /// Charge a particle exerts on everyone else
    pub fn charge(&self, role: Role) -> f32 {
        match role {
            Role::Anchor => self.anchor_charge,
            Role::Follower => 0.0,
        }
    }

    /// Compute the force on every particle at temperature `alpha`
    pub fn compute(&self, particles: &[Particle], alpha: f32) -> Vec<Vec2> {
        let mut forces = vec![Vec2::ZERO; particles.len()];
        self.apply_centering(particles, alpha, &mut forces);
        self.apply_repulsion(particles, alpha, &mut forces);
        forces
    }

    fn apply_centering(&self, particles: &[Particle], alpha: f32, forces: &mut [Vec2]) {
        for (force, particle) in forces.iter_mut().zip(particles) {
            *force -= particle.position * self.center_strength * alpha;
        }
    }

    /// Many-body repulsion from every charged particle
    ///
    /// Only the anchor carries charge, so this is linear in the particle count.
    fn apply_repulsion(&self, particles: &[Particle], alpha: f32, forces: &mut [Vec2]) {
        let sources: Vec<(usize, Vec2, f32)> = particles
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.position, self.charge(p.role)))
            .filter(|&(_, _, charge)| charge != 0.0)
            .collect();

        for (i, particle) in particles.iter().enumerate() {
            for &(j, source, charge) in &sources {
                if i == j {
                    continue;
                }

                let mut delta = source - particle.position;
                let mut l = delta.length_squared();
                if delta.x == 0.0 {
                    delta.x = jiggle(i);
                    l += delta.x * delta.x;
                }
                if delta.y == 0.0 {
                    delta.y = jiggle(i + 1);
                    l += delta.y * delta.y;
                }
                if l < DISTANCE_MIN2 {
                    l = (DISTANCE_MIN2 * l).sqrt();
                }

                forces[i] += delta * (charge * alpha / l);
            }
        }
    }
}
