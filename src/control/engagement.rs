//! Fire/no-fire decision

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::common::geometry::{bearing, normalize_angle};
use crate::error::{ControllerError, Result};
use crate::world::AgentState;

/// Which cone is used to decide whether an enemy is in the line of fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementMode {
    /// `atan2(dx, dy)` with the axes swapped. The cone is measured from the
    /// +y axis, independent of heading.
    #[default]
    Reference,
    /// Conventional bearing relative to the tank's heading
    Forward,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    pub mode: EngagementMode,
    /// Speed error above which the tank assumes it is blocked and fires
    pub speed_error_threshold: f64,
    /// Half-width of the firing cone, radians
    pub cone_half_angle: f64,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        EngagementConfig {
            mode: EngagementMode::Reference,
            speed_error_threshold: 1.0,
            cone_half_angle: FRAC_PI_2,
        }
    }
}

impl EngagementConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.speed_error_threshold.is_finite() || self.speed_error_threshold < 0.0 {
            return Err(ControllerError::InvalidConfig(
                "speed_error_threshold must be finite and non-negative".to_string(),
            ));
        }
        if !self.cone_half_angle.is_finite() || self.cone_half_angle <= 0.0 {
            return Err(ControllerError::InvalidConfig(
                "cone_half_angle must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngagementHeuristic {
    config: EngagementConfig,
}

impl EngagementHeuristic {
    /// Create a new heuristic with the given cone and threshold
    pub fn new(config: EngagementConfig) -> Self {
        EngagementHeuristic { config }
    }

    /// Fire when the tank seems blocked or a living enemy sits in the cone.
    /// Dead tanks in `enemies` are ignored.
    pub fn should_shoot(
        &self,
        speed_error: f64,
        agent: &AgentState,
        enemies: &[AgentState],
    ) -> bool {
        if speed_error.abs() > self.config.speed_error_threshold {
            return true;
        }

        enemies
            .iter()
            .filter(|enemy| enemy.is_alive())
            .any(|enemy| self.off_axis_angle(agent, enemy).abs() < self.config.cone_half_angle)
    }

    fn off_axis_angle(&self, agent: &AgentState, enemy: &AgentState) -> f64 {
        match self.config.mode {
            EngagementMode::Reference => {
                let d = enemy.position - agent.position;
                d.x.atan2(d.y)
            }
            EngagementMode::Forward => {
                normalize_angle(bearing(&agent.position, &enemy.position) - agent.angle)
            }
        }
    }
}
