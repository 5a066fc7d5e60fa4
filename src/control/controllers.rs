//! PD controller turning a desired field vector into actuation

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::memory::ErrorMemory;
use crate::common::geometry::normalize_angle;
use crate::error::{ControllerError, Result};
use crate::world::AgentState;

/// Proportional and derivative gains for heading and speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlGains {
    pub angular_p: f64,
    pub angular_d: f64,
    pub speed_p: f64,
    pub speed_d: f64,
}

impl Default for ControlGains {
    fn default() -> Self {
        ControlGains {
            angular_p: 1.0,
            angular_d: 1.0,
            speed_p: 1.0,
            speed_d: 1.0,
        }
    }
}

impl ControlGains {
    pub fn validate(&self) -> Result<()> {
        for (name, gain) in [
            ("angular_p", self.angular_p),
            ("angular_d", self.angular_d),
            ("speed_p", self.speed_p),
            ("speed_d", self.speed_d),
        ] {
            if !gain.is_finite() {
                return Err(ControllerError::InvalidConfig(format!(
                    "gain {} must be finite",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// How the derivative term relates to elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DerivativeMode {
    /// Plain per-tick backward difference
    #[default]
    FixedStep,
    /// Difference scaled by `nominal_tick_secs / elapsed`
    TimeScaled { nominal_tick_secs: f64 },
}

impl DerivativeMode {
    /// Multiplier applied to a per-tick difference
    fn scale(&self, elapsed: Option<Duration>) -> f64 {
        match (self, elapsed) {
            (DerivativeMode::TimeScaled { nominal_tick_secs }, Some(elapsed))
                if elapsed.as_secs_f64() > 0.0 =>
            {
                nominal_tick_secs / elapsed.as_secs_f64()
            }
            _ => 1.0,
        }
    }
}

/// What the speed channel of a command means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedOutputMode {
    /// Controller output is a correction added to the current speed
    #[default]
    Acceleration,
    /// Controller output is sent as the speed itself
    Velocity,
}

/// Result of one controller step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlOutput {
    pub speed: f64,
    pub angular_velocity: f64,
    /// Target minus current speed, before gains
    pub speed_error: f64,
}

/// PD controller with no integral term. Error memory lives outside the
/// controller, one slot per tank.
#[derive(Debug, Clone, Default)]
pub struct PdController {
    gains: ControlGains,
    derivative: DerivativeMode,
    speed_output: SpeedOutputMode,
}

impl PdController {
    /// Create a new PD controller
    pub fn new(
        gains: ControlGains,
        derivative: DerivativeMode,
        speed_output: SpeedOutputMode,
    ) -> Self {
        PdController {
            gains,
            derivative,
            speed_output,
        }
    }

    /// Advance the controller one tick for `agent`, updating its memory slot.
    ///
    /// `elapsed` is only consulted in time-scaled derivative mode.
    pub fn step(
        &self,
        agent: &AgentState,
        memory: &mut ErrorMemory,
        target_speed: f64,
        target_heading: f64,
        elapsed: Option<Duration>,
    ) -> ControlOutput {
        let g = &self.gains;
        let scale = self.derivative.scale(elapsed);
        let current_speed = agent.speed();

        let angle_error = normalize_angle(target_heading - agent.angle);
        let delta_angle_error = normalize_angle(angle_error - memory.last_angle_error);
        let angular_velocity =
            normalize_angle(g.angular_p * angle_error + g.angular_d * delta_angle_error * scale);

        let speed_error = target_speed - current_speed;
        let delta_speed_error = speed_error - memory.last_speed_error;
        let speed_cmd = g.speed_p * speed_error + g.speed_d * delta_speed_error * scale;

        memory.last_angle_error = angle_error;
        memory.last_speed_error = speed_error;

        let speed = match self.speed_output {
            SpeedOutputMode::Acceleration => speed_cmd + current_speed,
            SpeedOutputMode::Velocity => speed_cmd,
        };

        debug!(
            agent = %agent.id,
            angle_error,
            delta_angle_error,
            speed_error,
            delta_speed_error,
            "pd step"
        );

        ControlOutput {
            speed,
            angular_velocity,
            speed_error,
        }
    }
}
