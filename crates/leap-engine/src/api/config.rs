use serde::{Deserialize, Serialize};

use crate::api::error::LevelError;
use crate::core::geometry::Rect;

/// Simulation parameters owned by a level.
///
/// Handed by reference to every physics and update call; nothing reads these
/// values from global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Box that clamps every positional write.
    pub world_bounds: Rect,
    /// Global gravity switch. Jumps are also disabled while this is off.
    pub gravity_enabled: bool,
    /// Downward speed contributed by gravity each tick, before scaling.
    pub gravity: f32,
    /// Step used by swept movement resolution. Must be positive and smaller
    /// than every entity extent.
    pub epsilon: f32,
    /// Side length of a spatial grid cell.
    pub cell_size: f32,
    /// Global speed constant applied with the tick delta to raw velocities.
    pub physics_speed: f32,
    /// Blend factor for `MovementType::Smooth` (0 keeps the old velocity, 1 snaps to the new one).
    pub smoothing: f32,
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Maximum number of fixed ticks a single frame may run.
    pub max_steps_per_frame: u32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            world_bounds: Rect::new(0.0, 0.0, 4096.0, 2048.0),
            gravity_enabled: true,
            gravity: 15.0,
            epsilon: 0.2,
            cell_size: 128.0,
            physics_speed: 60.0,
            smoothing: 0.2,
            fixed_dt: 1.0 / 60.0,
            max_steps_per_frame: 10,
        }
    }
}

impl LevelConfig {
    /// Parse a configuration from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let config: LevelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_world_bounds(mut self, bounds: Rect) -> Self {
        self.world_bounds = bounds;
        self
    }

    pub fn with_gravity(mut self, enabled: bool, gravity: f32) -> Self {
        self.gravity_enabled = enabled;
        self.gravity = gravity;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Scale factor turning a raw per-tick speed into a displacement.
    pub fn speed_scale(&self, dt: f32) -> f32 {
        dt * self.physics_speed
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if !(self.epsilon > 0.0) {
            return Err(LevelError::InvalidConfig(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if !(self.cell_size > 0.0) {
            return Err(LevelError::InvalidConfig(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        if !(self.fixed_dt > 0.0) {
            return Err(LevelError::InvalidConfig(format!(
                "fixed timestep must be positive, got {}",
                self.fixed_dt
            )));
        }
        if !(self.world_bounds.size.x > 0.0 && self.world_bounds.size.y > 0.0) {
            return Err(LevelError::InvalidConfig(
                "world bounds must have a positive size".into(),
            ));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(LevelError::InvalidConfig(format!(
                "smoothing must be in (0, 1], got {}",
                self.smoothing
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(LevelConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_epsilon_is_rejected() {
        let config = LevelConfig::default().with_epsilon(0.0);
        assert!(matches!(config.validate(), Err(LevelError::InvalidConfig(_))));
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config = LevelConfig::from_json(r#"{ "gravity": 9.5, "gravity_enabled": false }"#).unwrap();
        assert_eq!(config.gravity, 9.5);
        assert!(!config.gravity_enabled);
        assert_eq!(config.epsilon, LevelConfig::default().epsilon);
    }

    #[test]
    fn invalid_json_config_is_reported() {
        let err = LevelConfig::from_json(r#"{ "cell_size": -1.0 }"#).unwrap_err();
        assert!(matches!(err, LevelError::InvalidConfig(_)));
    }
}
