//! Particle state shared by every stage of the tick pipeline

use glam::Vec2;

/// Magnitude of the nudge used to split coincident points
const JIGGLE: f32 = 1e-6;

/// What a particle does in the simulation
///
/// The anchor is the single pointer-driven particle: it is the only source of
/// repulsion and never feels it. Everything else is a follower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Anchor,
    Follower,
}

/// A circular body in simulation space (origin at the viewport center)
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Radius in CSS pixels
    pub radius: f32,
    /// Palette index; group 0 is reserved for the anchor
    pub group: usize,
    pub role: Role,
    pub position: Vec2,
    pub velocity: Vec2,
    /// When set, the integrator pins the particle here every tick
    pub fixed_position: Option<Vec2>,
}

impl Particle {
    /// Create a particle at rest
    pub fn new(radius: f32, group: usize, role: Role, position: Vec2) -> Self {
        Self {
            radius,
            group,
            role,
            position,
            velocity: Vec2::ZERO,
            fixed_position: None,
        }
    }

    pub fn is_anchor(&self) -> bool {
        self.role == Role::Anchor
    }

    pub fn is_pinned(&self) -> bool {
        self.fixed_position.is_some()
    }

    /// Where the particle ends up if `force` is applied this tick
    pub fn predicted(&self, force: Vec2) -> Vec2 {
        self.position + self.velocity + force
    }
}

/// Tiny, index-keyed offset used when two points coincide on an axis
pub(crate) fn jiggle(salt: usize) -> f32 {
    if salt % 2 == 0 { JIGGLE } else { -JIGGLE }
}
