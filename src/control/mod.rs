//! Control module: PD law, error memory and engagement
pub mod command;
pub mod controllers;
pub mod engagement;
pub mod memory;

use std::time::Duration;

use self::command::ActuationCommand;
use self::controllers::PdController;
use self::engagement::EngagementHeuristic;
use self::memory::ErrorMemory;
use crate::navigation::potential_field::FieldVector;
use crate::world::AgentState;

/// Controller and engagement heuristic run back to back for one tank
#[derive(Debug, Clone, Default)]
pub struct ControlStack {
    controller: PdController,
    engagement: EngagementHeuristic,
}

impl ControlStack {
    /// Create a new stack from a controller and an engagement heuristic
    pub fn new(controller: PdController, engagement: EngagementHeuristic) -> Self {
        ControlStack {
            controller,
            engagement,
        }
    }

    /// Compute the command for `agent` and advance its memory slot
    pub fn actuate(
        &self,
        agent: &AgentState,
        memory: &mut ErrorMemory,
        desired: FieldVector,
        enemies: &[AgentState],
        elapsed: Option<Duration>,
    ) -> ActuationCommand {
        let output = self
            .controller
            .step(agent, memory, desired.speed, desired.heading, elapsed);
        let shoot = self
            .engagement
            .should_shoot(output.speed_error, agent, enemies);

        ActuationCommand {
            agent: agent.id,
            speed: output.speed,
            angular_velocity: output.angular_velocity,
            shoot,
        }
    }
}
