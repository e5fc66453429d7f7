//! Initial particle set generation
//!
//! A dataset fixes each particle's radius and group. Positions start on a
//! phyllotaxis spiral around the origin, with the anchor pinned at the center.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::config::SimulationConfig;
use crate::particle::{Particle, Role};

/// Default population size
pub const PARTICLE_COUNT: usize = 350;

/// Upper clamp for the scale parameter `k`
pub const MAX_SCALE: f32 = 6.0;

const INITIAL_RADIUS: f32 = 10.0;

/// Builds particle sets for a given scale parameter
#[derive(Debug, Clone)]
pub struct DatasetGenerator {
    pub count: usize,
    /// Number of follower groups (palette entries past the anchor's)
    pub n_colors: usize,
    pub max_scale: f32,
    pub initial_radius: f32,
}

impl DatasetGenerator {
    pub fn new(count: usize, n_colors: usize) -> Self {
        Self {
            count,
            n_colors,
            max_scale: MAX_SCALE,
            initial_radius: INITIAL_RADIUS,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            count: config.particle_count,
            n_colors: config.palette.group_count(),
            max_scale: config.max_scale,
            initial_radius: config.initial_radius,
        }
    }

    /// Generate `count` particles with radii uniform in `[k, 3k)`
    ///
    /// `k` is clamped to `max_scale` first (and kept strictly positive), so
    /// two calls that differ only in an over-large `k` draw from the same
    /// distribution.
    pub fn generate<R: Rng + ?Sized>(&self, k: f32, rng: &mut R) -> Vec<Particle> {
        let k = k.min(self.max_scale).max(f32::MIN_POSITIVE);
        let radii = Uniform::new(k, k * 3.0);
        let initial_angle = PI * (3.0 - 5.0_f32.sqrt());

        (0..self.count)
            .map(|i| {
                let radius = radii.sample(rng);
                if i == 0 {
                    let mut anchor = Particle::new(radius, 0, Role::Anchor, Vec2::ZERO);
                    anchor.fixed_position = Some(Vec2::ZERO);
                    return anchor;
                }

                let group = i % self.n_colors.max(1) + 1;
                let r = self.initial_radius * (0.5 + i as f32).sqrt();
                let angle = i as f32 * initial_angle;
                Particle::new(
                    radius,
                    group,
                    Role::Follower,
                    Vec2::new(r * angle.cos(), r * angle.sin()),
                )
            })
            .collect()
    }
}

/// Generate a dataset with the default layout constants
pub fn generate<R: Rng + ?Sized>(count: usize, n_colors: usize, k: f32, rng: &mut R) -> Vec<Particle> {
    DatasetGenerator::new(count, n_colors).generate(k, rng)
}

/// An immutable particle set plus the scale it was generated for
///
/// Running simulations work on their own copy, so a dataset is never mutated
/// while a loop references it.
#[derive(Debug, Clone)]
pub struct Dataset {
    particles: Vec<Particle>,
    scale: f32,
    bucket: u32,
}

impl Dataset {
    pub fn new(particles: Vec<Particle>, scale: f32, bucket: u32) -> Self {
        Self {
            particles,
            scale,
            bucket,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Scale parameter `k` the radii were drawn for
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Quantized scale that gates regeneration
    pub fn bucket(&self) -> u32 {
        self.bucket
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// A copy of the particles in their initial layout
    pub fn instantiate(&self) -> Vec<Particle> {
        self.particles.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn radii_fall_in_scale_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let particles = generate(PARTICLE_COUNT, 5, 3.0, &mut rng);

        assert_eq!(particles.len(), PARTICLE_COUNT);
        assert!(particles.iter().all(|p| (3.0..=9.0).contains(&p.radius)));
    }

    #[test]
    fn groups_cycle_after_anchor() {
        let mut rng = StdRng::seed_from_u64(2);
        let particles = generate(12, 5, 2.0, &mut rng);

        assert_eq!(particles[0].group, 0);
        assert_eq!(particles[0].role, Role::Anchor);
        for (i, p) in particles.iter().enumerate().skip(1) {
            assert_eq!(p.group, i % 5 + 1);
            assert_eq!(p.role, Role::Follower);
        }
    }

    #[test]
    fn anchor_starts_pinned_at_origin() {
        let mut rng = StdRng::seed_from_u64(3);
        let particles = generate(4, 5, 2.0, &mut rng);

        assert_eq!(particles[0].position, Vec2::ZERO);
        assert_eq!(particles[0].fixed_position, Some(Vec2::ZERO));
        assert!(particles[1..].iter().all(|p| !p.is_pinned()));
    }

    #[test]
    fn followers_start_on_distinct_spiral_points() {
        let mut rng = StdRng::seed_from_u64(4);
        let particles = generate(50, 5, 2.0, &mut rng);

        for (i, p) in particles.iter().enumerate().skip(1) {
            let expected = 10.0 * (0.5 + i as f32).sqrt();
            assert!((p.position.length() - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn oversized_scale_is_clamped() {
        let clamped = generate(30, 5, 10.0, &mut StdRng::seed_from_u64(9));
        let capped = generate(30, 5, 6.0, &mut StdRng::seed_from_u64(9));
        assert_eq!(clamped, capped);
    }

    #[test]
    fn zero_scale_still_yields_positive_radii() {
        let particles = generate(10, 5, 0.0, &mut StdRng::seed_from_u64(5));
        assert!(particles.iter().all(|p| p.radius > 0.0));
    }

    #[test]
    fn empty_dataset_is_allowed() {
        let particles = generate(0, 5, 2.0, &mut StdRng::seed_from_u64(6));
        assert!(particles.is_empty());
        assert!(Dataset::new(particles, 2.0, 0).is_empty());
    }

    #[test]
    fn generator_reads_config() {
        let config = SimulationConfig {
            particle_count: 7,
            ..Default::default()
        };
        let generator = DatasetGenerator::from_config(&config);
        assert_eq!(generator.count, 7);
        assert_eq!(generator.n_colors, 5);
    }
}
