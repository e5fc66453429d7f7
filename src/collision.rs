//! Soft collision constraint
//!
//! Overlap is resolved on predicted positions (`position + velocity + force`)
//! by adding separating displacements to the force buffer. Velocities are never
//! reflected, so strong external forces can still squeeze particles together.

use glam::Vec2;
use tracing::trace;

use crate::particle::{Particle, jiggle};
use crate::spatial::SpatialGrid;

/// Iterative pairwise separation
#[derive(Debug, Clone)]
pub struct CollisionResolver {
    /// Passes per tick
    pub iterations: usize,
    /// Extra gap required between any two surfaces
    pub padding: f32,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self {
            iterations: 2,
            padding: 1.0,
        }
    }
}

impl CollisionResolver {
    pub fn new(iterations: usize, padding: f32) -> Self {
        Self { iterations, padding }
    }

    /// Push overlapping pairs apart, accumulating the displacement into `forces`
    ///
    /// `forces` must be the same length as `particles`. Each overlapping pair
    /// is separated by its full penetration depth, split by mass (`r²`). A
    /// pinned particle's share is dropped when the integrator snaps it back to
    /// its fixed position, so its partner only ever receives its own share.
    pub fn resolve(&self, particles: &[Particle], forces: &mut [Vec2]) {
        debug_assert_eq!(particles.len(), forces.len());
        let max_radius = particles.iter().map(|p| p.radius).fold(0.0_f32, f32::max);
        let cell_size = 2.0 * max_radius + self.padding;
        if particles.len() < 2 || !(cell_size.is_finite() && cell_size > 0.0) {
            return;
        }

        for pass in 0..self.iterations {
            let predicted: Vec<Vec2> = particles
                .iter()
                .zip(forces.iter())
                .map(|(p, f)| p.predicted(*f))
                .collect();
            let grid = SpatialGrid::build(cell_size, &predicted);
            let mut contacts = 0usize;

            for (i, a) in particles.iter().enumerate() {
                let pi = a.predicted(forces[i]);
                let ri2 = a.radius * a.radius;

                for j in grid.neighbors(predicted[i]) {
                    if j <= i {
                        continue;
                    }
                    let b = &particles[j];
                    let reach = a.radius + b.radius + self.padding;

                    let mut delta = pi - b.predicted(forces[j]);
                    let mut l = delta.length_squared();
                    if l >= reach * reach {
                        continue;
                    }

                    if delta.x == 0.0 {
                        delta.x = jiggle(i);
                        l += delta.x * delta.x;
                    }
                    if delta.y == 0.0 {
                        delta.y = jiggle(j);
                        l += delta.y * delta.y;
                    }
                    let l = l.sqrt();
                    let push = delta * ((reach - l) / l);

                    let rj2 = b.radius * b.radius;
                    let share_a = rj2 / (ri2 + rj2);
                    forces[i] += push * share_a;
                    forces[j] -= push * (1.0 - share_a);
                    contacts += 1;
                }
            }

            trace!(pass, contacts, "collision pass");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::Integrator;
    use crate::particle::Role;

    fn ball(x: f32, y: f32, radius: f32) -> Particle {
        Particle::new(radius, 1, Role::Follower, Vec2::new(x, y))
    }

    fn separation(particles: &[Particle], forces: &[Vec2]) -> f32 {
        particles[0]
            .predicted(forces[0])
            .distance(particles[1].predicted(forces[1]))
    }

    #[test]
    fn separates_overlapping_pair() {
        let particles = [ball(0.0, 0.0, 5.0), ball(3.0, 0.0, 5.0)];
        let mut forces = vec![Vec2::ZERO; 2];

        CollisionResolver::default().resolve(&particles, &mut forces);

        assert!(separation(&particles, &forces) >= 11.0 - 1e-4);
        // equal radii share the push evenly
        assert!((forces[0].x + 4.0).abs() < 1e-4);
        assert!((forces[1].x - 4.0).abs() < 1e-4);
    }

    #[test]
    fn heavier_particle_moves_less() {
        let particles = [ball(0.0, 0.0, 8.0), ball(5.0, 0.0, 2.0)];
        let mut forces = vec![Vec2::ZERO; 2];

        CollisionResolver::default().resolve(&particles, &mut forces);

        assert!(forces[0].length() < forces[1].length());
        assert!(separation(&particles, &forces) >= 11.0 - 1e-4);
    }

    #[test]
    fn separated_pair_is_left_alone() {
        let particles = [ball(0.0, 0.0, 5.0), ball(12.0, 0.0, 5.0)];
        let mut forces = vec![Vec2::ZERO; 2];

        CollisionResolver::default().resolve(&particles, &mut forces);

        assert_eq!(forces, vec![Vec2::ZERO; 2]);
    }

    #[test]
    fn resolution_is_idempotent() {
        let particles = [ball(0.0, 0.0, 5.0), ball(0.0, 4.0, 3.0)];
        let mut forces = vec![Vec2::ZERO; 2];
        let resolver = CollisionResolver::default();

        resolver.resolve(&particles, &mut forces);
        let settled = forces.clone();
        resolver.resolve(&particles, &mut forces);

        for (after, before) in forces.iter().zip(&settled) {
            assert!(after.distance(*before) < 1e-4);
        }
    }

    #[test]
    fn pinned_partner_still_splits_by_mass() {
        let mut anchor = Particle::new(5.0, 0, Role::Anchor, Vec2::ZERO);
        anchor.fixed_position = Some(Vec2::ZERO);
        let mut particles = [anchor, ball(2.0, 0.0, 5.0)];
        let mut forces = vec![Vec2::ZERO; 2];

        CollisionResolver::new(1, 1.0).resolve(&particles, &mut forces);

        // depth 9 shared evenly; the anchor's half is lost to the pin
        assert!((forces[0].x + 4.5).abs() < 1e-4);
        assert!((forces[1].x - 4.5).abs() < 1e-4);

        Integrator::new(0.0).step(&mut particles, &forces, 1.0);
        assert_eq!(particles[0].position, Vec2::ZERO);
        assert!((particles[1].position.x - 6.5).abs() < 1e-4);
    }

    #[test]
    fn two_pinned_particles_stay_put() {
        let mut a = Particle::new(5.0, 0, Role::Anchor, Vec2::ZERO);
        a.fixed_position = Some(Vec2::ZERO);
        let mut b = ball(3.0, 0.0, 5.0);
        b.fixed_position = Some(Vec2::new(3.0, 0.0));
        let mut particles = [a, b];
        let mut forces = vec![Vec2::ZERO; 2];

        CollisionResolver::default().resolve(&particles, &mut forces);
        Integrator::new(0.04).step(&mut particles, &forces, 1.0);

        assert_eq!(particles[0].position, Vec2::ZERO);
        assert_eq!(particles[1].position, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn coincident_centers_are_split() {
        let particles = [ball(1.0, 1.0, 2.0), ball(1.0, 1.0, 2.0)];
        let mut forces = vec![Vec2::ZERO; 2];

        CollisionResolver::default().resolve(&particles, &mut forces);

        assert!(forces.iter().all(|f| f.is_finite()));
        assert!(separation(&particles, &forces) >= 5.0 - 1e-3);
    }

    #[test]
    fn accounts_for_velocity_and_prior_force() {
        let mut moving = ball(20.0, 0.0, 5.0);
        moving.velocity = Vec2::new(-15.0, 0.0);
        let particles = [ball(0.0, 0.0, 5.0), moving];
        let mut forces = vec![Vec2::ZERO; 2];

        CollisionResolver::default().resolve(&particles, &mut forces);

        assert!(separation(&particles, &forces) >= 11.0 - 1e-4);
        assert!(forces[1].x > 0.0);
    }

    #[test]
    fn empty_and_single_sets_are_noops() {
        let resolver = CollisionResolver::default();
        resolver.resolve(&[], &mut []);

        let mut forces = vec![Vec2::ZERO];
        resolver.resolve(&[ball(0.0, 0.0, 1.0)], &mut forces);
        assert_eq!(forces[0], Vec2::ZERO);
    }
}
