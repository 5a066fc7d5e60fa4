//! World state as seen by the controller
pub mod model;

pub use self::model::{
    AgentId, AgentState, Base, Flag, Obstacle, Shot, TankStatus, TeamColor, WorldConstants,
};

use crate::common::types::Point2D;
use crate::error::{ControllerError, Result};

/// Everything the arena reports for one tick
#[derive(Debug, Clone, Default)]
pub struct WorldSnapshot {
    pub my_tanks: Vec<AgentState>,
    pub other_tanks: Vec<AgentState>,
    pub flags: Vec<Flag>,
    pub shots: Vec<Shot>,
    pub obstacles: Vec<Obstacle>,
    pub bases: Vec<Base>,
}

impl WorldSnapshot {
    /// Tanks of other teams, dead or alive
    pub fn enemies(&self, team: TeamColor) -> Vec<AgentState> {
        self.other_tanks
            .iter()
            .filter(|tank| tank.color != team)
            .cloned()
            .collect()
    }

    pub fn base_of(&self, team: TeamColor) -> Option<&Base> {
        self.bases.iter().find(|base| base.color == team)
    }

    /// Check the preconditions the field and goal math rely on
    pub fn validate(&self, constants: &WorldConstants) -> Result<()> {
        if let Some(i) = self.obstacles.iter().position(|o| o.points().is_empty()) {
            return Err(ControllerError::MalformedWorldState(format!(
                "obstacle {} has no corner points",
                i
            )));
        }

        if self.base_of(constants.team).is_none() {
            return Err(ControllerError::MalformedWorldState(format!(
                "no base reported for team {}",
                constants.team
            )));
        }

        for tank in self.my_tanks.iter().chain(&self.other_tanks) {
            let finite = is_finite_point(&tank.position)
                && tank.velocity.iter().all(|v| v.is_finite())
                && tank.angle.is_finite();
            if !finite {
                return Err(ControllerError::MalformedWorldState(format!(
                    "{} {} has non-finite kinematics",
                    tank.color, tank.id
                )));
            }
        }

        if let Some(i) = self
            .obstacles
            .iter()
            .position(|o| !o.points().iter().all(is_finite_point))
        {
            return Err(ControllerError::MalformedWorldState(format!(
                "obstacle {} has a non-finite corner",
                i
            )));
        }

        if let Some(flag) = self.flags.iter().find(|f| !is_finite_point(&f.position)) {
            return Err(ControllerError::MalformedWorldState(format!(
                "{} flag has a non-finite position",
                flag.color
            )));
        }

        if let Some(base) = self
            .bases
            .iter()
            .find(|b| !b.corners.iter().all(is_finite_point))
        {
            return Err(ControllerError::MalformedWorldState(format!(
                "{} base has a non-finite corner",
                base.color
            )));
        }

        Ok(())
    }
}

fn is_finite_point(point: &Point2D) -> bool {
    point.x.is_finite() && point.y.is_finite()
}

/// Supplies arena state to the controller
pub trait WorldSource {
    /// Game constants; called once at startup
    fn constants(&mut self) -> Result<WorldConstants>;

    /// Current world state; called once per tick
    fn snapshot(&mut self) -> Result<WorldSnapshot>;
}
