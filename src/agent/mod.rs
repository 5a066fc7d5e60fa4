//! Per-tick orchestration of goal selection, field, controller and engagement

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::control::command::{ActuationCommand, CommandSink};
use crate::control::controllers::PdController;
use crate::control::engagement::EngagementHeuristic;
use crate::control::memory::ControllerMemory;
use crate::control::ControlStack;
use crate::error::Result;
use crate::navigation::Navigator;
use crate::world::{AgentState, WorldConstants, WorldSnapshot, WorldSource};

/// Which of the team's tanks the loop drives
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ControlledAgents {
    /// Every tank in the roster
    #[default]
    All,
    /// The first `count` roster entries. `count = 2` is the two-tank
    /// compatibility mode.
    Prefix { count: usize },
    /// Tanks whose roster index is listed
    Ids { ids: BTreeSet<usize> },
}

impl ControlledAgents {
    /// Tanks from `roster` to drive this tick, in roster order
    pub fn select<'a>(&self, roster: &'a [AgentState]) -> Vec<&'a AgentState> {
        match self {
            ControlledAgents::All => roster.iter().collect(),
            ControlledAgents::Prefix { count } => {
                if roster.len() < *count {
                    warn!(
                        expected = *count,
                        available = roster.len(),
                        "roster shorter than controlled prefix"
                    );
                }
                roster.iter().take(*count).collect()
            }
            ControlledAgents::Ids { ids } => roster
                .iter()
                .filter(|tank| ids.contains(&tank.id.0))
                .collect(),
        }
    }
}

/// Drives a team of tanks from a world source to a command sink
pub struct AgentLoop<S: WorldSource, K: CommandSink> {
    source: S,
    sink: K,
    constants: WorldConstants,
    controlled: ControlledAgents,
    navigator: Navigator,
    control: ControlStack,
    memory: ControllerMemory,
    last_tick: Option<Instant>,
    ticks: u64,
}

impl<S: WorldSource, K: CommandSink> AgentLoop<S, K> {
    /// Fetch constants and the initial roster, and zero the error memory of
    /// every controlled tank in it
    pub fn new(mut source: S, sink: K, config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        let constants = source.constants()?;
        let roster = source.snapshot()?;
        let memory = ControllerMemory::for_roster(
            config
                .agents
                .select(&roster.my_tanks)
                .into_iter()
                .map(|tank| tank.id),
        );

        info!(
            team = %constants.team,
            max_speed = constants.max_speed,
            tanks = memory.len(),
            "agent loop configured"
        );

        Ok(AgentLoop {
            source,
            sink,
            constants,
            controlled: config.agents,
            navigator: Navigator::new(config.field),
            control: ControlStack::new(
                PdController::new(config.gains, config.derivative, config.speed_output),
                EngagementHeuristic::new(config.engagement),
            ),
            memory,
            last_tick: None,
            ticks: 0,
        })
    }

    pub fn constants(&self) -> &WorldConstants {
        &self.constants
    }

    pub fn memory(&self) -> &ControllerMemory {
        &self.memory
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Fetch a snapshot, compute every controlled tank's command and submit
    /// them as one batch
    pub fn tick(&mut self) -> Result<Vec<ActuationCommand>> {
        let now = Instant::now();
        let elapsed = self.last_tick.map(|last| now.duration_since(last));
        self.last_tick = Some(now);

        let snapshot = self.source.snapshot()?;
        let commands = self.plan_tick(&snapshot, elapsed)?;
        self.sink.submit(&commands)?;
        self.ticks += 1;
        Ok(commands)
    }

    /// Compute the command batch for `snapshot`.
    ///
    /// Memory is only committed once every controlled tank has a command, so
    /// a failure leaves the previous tick's errors in place.
    pub fn plan_tick(
        &mut self,
        snapshot: &WorldSnapshot,
        elapsed: Option<Duration>,
    ) -> Result<Vec<ActuationCommand>> {
        snapshot.validate(&self.constants)?;
        let enemies = snapshot.enemies(self.constants.team);

        let controlled = self.controlled.select(&snapshot.my_tanks);
        let mut commands = Vec::with_capacity(controlled.len());
        let mut staged = Vec::with_capacity(controlled.len());

        for tank in controlled {
            if !self.memory.contains(tank.id) {
                debug!(agent = %tank.id, "new tank in roster, starting from zero error");
            }
            let mut slot = self.memory.snapshot_of(tank.id);
            let plan = self.navigator.plan(tank, snapshot, &self.constants)?;
            let command = self
                .control
                .actuate(tank, &mut slot, plan.field, &enemies, elapsed);

            debug!(
                agent = %tank.id,
                goal = ?(plan.goal.x, plan.goal.y),
                target_speed = plan.field.speed,
                target_heading = plan.field.heading,
                speed = command.speed,
                angvel = command.angular_velocity,
                shoot = command.shoot,
                "command"
            );

            staged.push((tank.id, slot));
            commands.push(command);
        }

        self.memory.commit(staged);
        Ok(commands)
    }

    /// Tick until `running` is cleared
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        while running.load(Ordering::SeqCst) {
            self.tick()?;
        }
        info!(ticks = self.ticks, "agent loop stopped");
        Ok(())
    }

    /// Give back the collaborators
    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }
}
