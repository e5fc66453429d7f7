//! Simulation tuning and config file loading
//!
//! Every field has a default, so a config file only needs the values it
//! overrides. Files are dispatched on extension: `.yaml`/`.yml` or `.json`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::render::Palette;

/// Tuning knobs for the whole simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Population size of every dataset
    pub particle_count: usize,
    /// `k = viewport_width / scale_divisor`
    pub scale_divisor: f32,
    /// Upper clamp for `k`
    pub max_scale: f32,
    /// Centering force strength on both axes
    pub center_strength: f32,
    /// Anchor charge is `-anchor_charge_scale * viewport_width`
    pub anchor_charge_scale: f32,
    /// Extra separation required between any two particles
    pub collision_padding: f32,
    /// Collision passes per tick
    pub collision_iterations: usize,
    /// Fraction of velocity removed every tick (friction)
    pub velocity_decay: f32,
    /// Starting temperature
    pub alpha: f32,
    /// Temperature the simulation is held at
    pub alpha_target: f32,
    /// Rate at which alpha approaches its target
    pub alpha_decay: f32,
    /// Integrator step
    pub time_step: f32,
    /// Spacing of the initial phyllotaxis layout
    pub initial_radius: f32,
    pub palette: Palette,
    /// Seed for radius sampling; drawn from entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: 350,
            scale_divisor: 200.0,
            max_scale: 6.0,
            center_strength: 0.004,
            anchor_charge_scale: 2.0 / 50.0,
            collision_padding: 1.0,
            collision_iterations: 2,
            velocity_decay: 0.04,
            alpha: 1.0,
            alpha_target: 0.3,
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            time_step: 1.0,
            initial_radius: 10.0,
            palette: Palette::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load a config file, choosing the format from its extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::UnknownExtension(path.display().to_string()))?;

        let ext = ext.to_ascii_lowercase();
        if !matches!(ext.as_str(), "yaml" | "yml" | "json") {
            return Err(ConfigError::UnsupportedFormat(ext));
        }

        let text = std::fs::read_to_string(path)?;
        let config: Self = if ext == "json" {
            serde_json::from_str(&text)?
        } else {
            serde_yaml::from_str(&text)?
        };
        debug!(path = %path.display(), "loaded simulation config");

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config (used by the browser host)
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the effective config as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.palette.len() < 2 {
            return invalid("palette needs an anchor color and at least one group color");
        }
        if !(0.0..=1.0).contains(&self.velocity_decay) {
            return invalid("velocity_decay must be within [0, 1]");
        }
        if !positive(self.scale_divisor) {
            return invalid("scale_divisor must be positive");
        }
        if !positive(self.max_scale) {
            return invalid("max_scale must be positive");
        }
        if !positive(self.time_step) {
            return invalid("time_step must be positive");
        }
        if !(self.collision_padding.is_finite() && self.collision_padding >= 0.0) {
            return invalid("collision_padding must not be negative");
        }
        Ok(())
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
