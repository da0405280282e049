use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};
use thiserror::Error;

use crate::grid::WorldSize;

/// Hard ceiling on the population; buffers are sized from `agent_count`.
pub const MAX_AGENTS: u32 = 1_000_000;
/// Upper bound on probes per agent.
pub const MAX_SENSORS: u32 = 9;
/// Largest probe footprint half-width, in cells.
pub const MAX_SENSOR_SIZE: u32 = 4;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("agent count {count} outside 1..={max}")]
    AgentCount { count: u32, max: u32 },
    #[error("sensor count {0} must be odd and within 1..={max}", max = MAX_SENSORS)]
    SensorCount(u32),
    #[error("sensor size {0} exceeds {max}", max = MAX_SENSOR_SIZE)]
    SensorSize(u32),
    #[error("{field} = {value} is not finite")]
    NotFinite { field: &'static str, value: f32 },
    #[error("{field} = {value} outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("world {width}x{height} has no cells")]
    EmptyWorld { width: u32, height: u32 },
}

/// Deposition colour. Each channel is an intensity in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::new(0.0, 1.0, 0.5)
    }
}

/// Per-frame simulation parameters.
///
/// Read-only for the duration of a frame; the host stages edits and hands a
/// fresh value to the next `step`. Every field has a default so a partial
/// JSON document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    pub agent_count: u32,
    pub agent_color: Rgb,
    /// Cells travelled per frame at `dt = 1`.
    pub speed: f32,
    /// Radians turned per frame when steering.
    pub turn_speed: f32,
    /// Angle spanned by the outermost probes, radians.
    pub sensor_fov: f32,
    pub sensor_count: u32,
    pub sensor_distance: f32,
    /// Sideways shift of every probe along the left perpendicular.
    pub sensor_offset: f32,
    /// Probe footprint half-width: 0 samples a single cell, 1 a 3x3 block.
    pub sensor_size: u32,
    pub fade_speed: f32,
    /// Blend factor toward the 3x3 neighbourhood mean. 0 disables diffusion.
    pub diffuse_rate: f32,
    /// Frame time in units of one nominal frame.
    pub dt: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            agent_count: 100_000,
            agent_color: Rgb::default(),
            speed: 3.0,
            turn_speed: 0.2,
            sensor_fov: 70f32.to_radians(),
            sensor_count: 3,
            sensor_distance: 5.0,
            sensor_offset: 0.0,
            sensor_size: 1,
            fade_speed: 0.003,
            diffuse_rate: 0.0,
            dt: 1.0,
        }
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field, value });
    }
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl SimParams {
    /// Reject anything the kernels are not defined for. Values are never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_count == 0 || self.agent_count > MAX_AGENTS {
            return Err(ConfigError::AgentCount {
                count: self.agent_count,
                max: MAX_AGENTS,
            });
        }
        if self.sensor_count == 0 || self.sensor_count % 2 == 0 || self.sensor_count > MAX_SENSORS {
            return Err(ConfigError::SensorCount(self.sensor_count));
        }
        if self.sensor_size > MAX_SENSOR_SIZE {
            return Err(ConfigError::SensorSize(self.sensor_size));
        }
        check_range("agent_color.r", self.agent_color.r, 0.0, 1.0)?;
        check_range("agent_color.g", self.agent_color.g, 0.0, 1.0)?;
        check_range("agent_color.b", self.agent_color.b, 0.0, 1.0)?;
        check_range("speed", self.speed, 0.0, 64.0)?;
        check_range("turn_speed", self.turn_speed, 0.0, PI)?;
        check_range("sensor_fov", self.sensor_fov, 0.0, TAU)?;
        check_range("sensor_distance", self.sensor_distance, 0.0, 100.0)?;
        check_range("sensor_offset", self.sensor_offset, -50.0, 50.0)?;
        check_range("fade_speed", self.fade_speed, 0.0, 1.0)?;
        check_range("diffuse_rate", self.diffuse_rate, 0.0, 1.0)?;
        check_range("dt", self.dt, 0.0, 4.0)?;
        if self.dt == 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "dt",
                value: self.dt,
                min: f32::MIN_POSITIVE,
                max: 4.0,
            });
        }
        Ok(())
    }

    /// Multiplier applied to every cell once per frame. Exactly 1 when fading is off.
    pub fn decay_factor(&self) -> f32 {
        (-self.fade_speed * self.dt).exp()
    }

    /// Angular offset of probe `i` from the agent's heading.
    ///
    /// Probes are spread evenly over `[-fov/2, +fov/2]`; index 0 is the
    /// rightmost (clockwise) probe and the middle index looks straight ahead.
    pub fn probe_angle(&self, i: u32) -> f32 {
        if self.sensor_count <= 1 {
            return 0.0;
        }
        let step = self.sensor_fov / (self.sensor_count - 1) as f32;
        -0.5 * self.sensor_fov + i as f32 * step
    }
}

pub fn validate_world(world: WorldSize) -> Result<(), ConfigError> {
    if world.is_empty() {
        return Err(ConfigError::EmptyWorld {
            width: world.width,
            height: world.height,
        });
    }
    Ok(())
}
