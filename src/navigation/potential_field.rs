//! Potential field model
//!
//! Superposes an attractive pull toward the goal with repulsive and
//! tangential pushes from every obstacle. Each obstacle contributes twice:
//! once per corner (short range, governed by the corner radius) and once from
//! its centroid (the full influence radius). The tangential terms make the
//! tank circulate around an obstacle instead of stalling head-on against it.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::common::geometry::{bearing, distance, normalize_angle, polar};
use crate::common::types::{Point2D, Vector2D};
use crate::error::{ControllerError, Result};
use crate::world::{AgentState, Obstacle, WorldConstants};

/// Force magnitudes and influence ranges of the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Pull toward the goal, in speed units
    pub attractive_force: f64,
    /// Push away from obstacle corners and centroids, in speed units
    pub repulsive_force: f64,
    /// Circulation around obstacles, in speed units
    pub tangential_force: f64,
    /// Range of goal damping and centroid influence, in world units
    pub influence_radius: f64,
    /// Corner range as a fraction of `influence_radius`
    pub corner_influence: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            attractive_force: 25.0,
            repulsive_force: 25.0,
            tangential_force: 25.0,
            influence_radius: 90.0,
            corner_influence: 0.75,
        }
    }
}

impl FieldConfig {
    /// Range within which a single corner acts on the tank
    pub fn corner_radius(&self) -> f64 {
        self.influence_radius * self.corner_influence
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("attractive_force", self.attractive_force),
            ("repulsive_force", self.repulsive_force),
            ("tangential_force", self.tangential_force),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ControllerError::InvalidConfig(format!(
                    "{} must be finite and non-negative",
                    name
                )));
            }
        }
        if !self.influence_radius.is_finite() || self.influence_radius <= 0.0 {
            return Err(ControllerError::InvalidConfig(
                "influence_radius must be positive".to_string(),
            ));
        }
        if !(self.corner_influence > 0.0 && self.corner_influence <= 1.0) {
            return Err(ControllerError::InvalidConfig(
                "corner_influence must be in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Desired motion produced by the field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldVector {
    pub speed: f64,
    /// Heading in (-pi, pi]
    pub heading: f64,
}

/// The three partial forces acting on a tank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldComponents {
    pub attractive: Vector2D,
    pub repulsive: Vector2D,
    pub tangential: Vector2D,
}

impl FieldComponents {
    pub fn total(&self) -> Vector2D {
        self.attractive + self.repulsive + self.tangential
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldModel {
    config: FieldConfig,
}

impl FieldModel {
    /// Create a new field model
    pub fn new(config: FieldConfig) -> Self {
        FieldModel { config }
    }

    /// Desired speed and heading for `agent` heading to `goal`.
    ///
    /// Speed never exceeds `constants.max_speed`.
    pub fn field_vector(
        &self,
        agent: &AgentState,
        goal: &Point2D,
        obstacles: &[Obstacle],
        constants: &WorldConstants,
    ) -> Result<FieldVector> {
        let components = self.components(agent, goal, obstacles)?;
        trace!(
            agent = %agent.id,
            attractive = ?(components.attractive.x, components.attractive.y),
            repulsive = ?(components.repulsive.x, components.repulsive.y),
            tangential = ?(components.tangential.x, components.tangential.y),
            "field components"
        );

        let total = components.total();
        Ok(FieldVector {
            speed: total.norm().min(constants.max_speed),
            heading: normalize_angle(total.y.atan2(total.x)),
        })
    }

    /// Each partial force at the agent's position, before clamping
    pub fn components(
        &self,
        agent: &AgentState,
        goal: &Point2D,
        obstacles: &[Obstacle],
    ) -> Result<FieldComponents> {
        let mut repulsive = Vector2D::zeros();
        let mut tangential = Vector2D::zeros();
        for obstacle in obstacles {
            repulsive += self.repulsion(&agent.position, obstacle)?;
            tangential += self.tangential(&agent.position, obstacle)?;
        }

        Ok(FieldComponents {
            attractive: self.attraction(&agent.position, goal),
            repulsive,
            tangential,
        })
    }

    /// Pull toward the goal, fading linearly to zero inside the influence radius
    fn attraction(&self, position: &Point2D, goal: &Point2D) -> Vector2D {
        let cfg = &self.config;
        let d = distance(position, goal);
        let theta = bearing(position, goal);
        if d > cfg.influence_radius {
            polar(cfg.attractive_force, theta)
        } else {
            polar(cfg.attractive_force * d / cfg.influence_radius, theta)
        }
    }

    fn repulsion(&self, position: &Point2D, obstacle: &Obstacle) -> Result<Vector2D> {
        let cfg = &self.config;
        let r = cfg.corner_radius();
        let mut force = Vector2D::zeros();

        for corner in obstacle.points() {
            let d = distance(position, corner);
            if d <= r {
                force -= polar(cfg.repulsive_force * (r - d) / r, bearing(position, corner));
            }
        }

        let center = obstacle.centroid()?;
        let d_c = distance(position, &center);
        if d_c < cfg.influence_radius {
            force -= polar(
                cfg.repulsive_force * (cfg.influence_radius - d_c) / cfg.influence_radius,
                bearing(position, &center),
            );
        }

        Ok(force)
    }

    fn tangential(&self, position: &Point2D, obstacle: &Obstacle) -> Result<Vector2D> {
        let cfg = &self.config;
        let r = cfg.corner_radius();
        let mut force = Vector2D::zeros();

        for corner in obstacle.points() {
            let d = distance(position, corner);
            if d <= r {
                let rotated = bearing(position, corner) + FRAC_PI_2;
                force -= polar(cfg.tangential_force * d / r, rotated);
            }
        }

        // Constant inside the radius so circulation stays strong near the core
        let center = obstacle.centroid()?;
        if distance(position, &center) < cfg.influence_radius {
            let rotated = bearing(position, &center) + FRAC_PI_2;
            force -= polar(cfg.tangential_force, rotated);
        }

        Ok(force)
    }
}
