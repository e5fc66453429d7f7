//! Pointer-driven anchor
//!
//! Pointer coordinates arrive in canvas-local CSS pixels and are converted to
//! simulation space (origin at the canvas center). The latest target is
//! re-applied every tick, so the anchor sits exactly under the pointer no
//! matter what forces accumulated.

use glam::Vec2;
use tracing::trace;

use crate::particle::Particle;

/// Convert a canvas-local point to simulation space
pub fn to_simulation_space(x: f32, y: f32, canvas_width: f32, canvas_height: f32) -> Vec2 {
    Vec2::new(x - canvas_width / 2.0, y - canvas_height / 2.0)
}

/// Remembers the last pointer position and pins the anchor to it
#[derive(Debug, Clone, Default)]
pub struct AnchorTracker {
    target: Option<Vec2>,
}

impl AnchorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last recorded pointer position in simulation space
    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Record a pointer move and pin the anchor to it
    ///
    /// Returns `false` without recording anything when there is no particle
    /// set yet.
    pub fn on_pointer_move(
        &mut self,
        particles: &mut [Particle],
        x: f32,
        y: f32,
        canvas_width: f32,
        canvas_height: f32,
    ) -> bool {
        if particles.is_empty() {
            return false;
        }

        let target = to_simulation_space(x, y, canvas_width, canvas_height);
        trace!(x = target.x, y = target.y, "anchor target");
        self.target = Some(target);
        self.apply(particles);
        true
    }

    /// Pin the anchor to the recorded target, if any
    pub fn apply(&self, particles: &mut [Particle]) {
        let Some(target) = self.target else {
            return;
        };
        if let Some(anchor) = particles.iter_mut().find(|p| p.is_anchor()) {
            anchor.fixed_position = Some(target);
        }
    }

    pub fn clear(&mut self) {
        self.target = None;
    }
}
