//! Navigation: where to go and which way to push
pub mod goal;
pub mod potential_field;

use self::goal::GoalSelector;
use self::potential_field::{FieldConfig, FieldModel, FieldVector};
use crate::common::types::Point2D;
use crate::error::Result;
use crate::world::{AgentState, WorldConstants, WorldSnapshot};

/// Desired motion for one tank along with the goal it was derived from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationPlan {
    pub goal: Point2D,
    pub field: FieldVector,
}

/// Goal selection followed by field evaluation
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    goals: GoalSelector,
    field: FieldModel,
}

impl Navigator {
    /// Create a new navigator over a field with the given tuning
    pub fn new(field: FieldConfig) -> Self {
        Navigator {
            goals: GoalSelector::new(),
            field: FieldModel::new(field),
        }
    }

    /// Compute the desired speed and heading for `agent` in this snapshot
    pub fn plan(
        &self,
        agent: &AgentState,
        snapshot: &WorldSnapshot,
        constants: &WorldConstants,
    ) -> Result<NavigationPlan> {
        let goal = self
            .goals
            .select_goal(agent, &snapshot.flags, &snapshot.bases, constants)?;
        let field = self
            .field
            .field_vector(agent, &goal, &snapshot.obstacles, constants)?;
        Ok(NavigationPlan { goal, field })
    }
}
