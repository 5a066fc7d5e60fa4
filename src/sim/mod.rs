//! In-process sandbox arena
//!
//! A small kinematic stand-in for the arena server: it serves snapshots and
//! accepts command batches, integrating the last batch each time a snapshot
//! is requested. Tanks move along their heading at the commanded speed
//! (clamped to the max speed), turn at the commanded angular velocity and
//! pick up enemy flags they drive over. Shots are not simulated.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::common::geometry::{distance, normalize_angle, polar};
use crate::common::types::Point2D;
use crate::control::command::{ActuationCommand, CommandSink};
use crate::error::{ControllerError, Result};
use crate::world::{
    AgentState, Base, Flag, Obstacle, TeamColor, WorldConstants, WorldSnapshot, WorldSource,
};

const DEFAULT_TIME_STEP: f64 = 0.1;
const DEFAULT_PICKUP_RADIUS: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct SandboxArena {
    constants: WorldConstants,
    state: WorldSnapshot,
    pending: Vec<ActuationCommand>,
    time_step: f64,
    pickup_radius: f64,
    batches: usize,
}

impl SandboxArena {
    /// Create a new arena starting from `state`
    pub fn new(constants: WorldConstants, state: WorldSnapshot) -> Self {
        SandboxArena {
            constants,
            state,
            pending: Vec::new(),
            time_step: DEFAULT_TIME_STEP,
            pickup_radius: DEFAULT_PICKUP_RADIUS,
            batches: 0,
        }
    }

    /// Simulated seconds advanced per snapshot
    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_pickup_radius(mut self, radius: f64) -> Self {
        self.pickup_radius = radius;
        self
    }

    pub fn state(&self) -> &WorldSnapshot {
        &self.state
    }

    pub fn pending_commands(&self) -> &[ActuationCommand] {
        &self.pending
    }

    /// Number of batches received so far
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Advance the world by one time step under the pending commands
    pub fn advance(&mut self) {
        let dt = self.time_step;
        let max_speed = self.constants.max_speed;
        let half = self.constants.world_size / 2.0;

        for tank in self.state.my_tanks.iter_mut() {
            if let Some(cmd) = self.pending.iter().find(|c| c.agent == tank.id) {
                let speed = cmd.speed.clamp(-max_speed, max_speed);
                tank.angle = normalize_angle(tank.angle + cmd.angular_velocity * dt);
                tank.velocity = polar(speed, tank.angle);
            }
            tank.position += tank.velocity * dt;
            tank.position.x = tank.position.x.clamp(-half, half);
            tank.position.y = tank.position.y.clamp(-half, half);
        }

        self.update_flags();
    }

    fn update_flags(&mut self) {
        for tank in self.state.my_tanks.iter_mut() {
            if tank.flag.is_some() || !tank.is_alive() {
                continue;
            }
            let reach = self.pickup_radius;
            if let Some(flag) = self.state.flags.iter_mut().find(|flag| {
                flag.color != tank.color
                    && flag.possessor.is_none()
                    && distance(&flag.position, &tank.position) <= reach
            }) {
                debug!(agent = %tank.id, flag = %flag.color, "flag picked up");
                flag.possessor = Some(tank.color);
                tank.flag = Some(flag.color);
            }
        }

        // Carried flags travel with their carrier
        for tank in &self.state.my_tanks {
            if let Some(color) = tank.flag {
                if let Some(flag) = self.state.flags.iter_mut().find(|f| f.color == color) {
                    flag.position = tank.position;
                }
            }
        }
    }

    /// A small two-team arena with a few obstacles between the bases
    pub fn demo() -> Result<Self> {
        let constants = WorldConstants::new(TeamColor::Red, 25.0, 800.0)?;
        let state = WorldSnapshot {
            my_tanks: (0..3)
                .map(|i| {
                    AgentState::new(
                        i,
                        TeamColor::Red,
                        Point2D::new(-340.0 + 20.0 * i as f64, -340.0),
                        std::f64::consts::FRAC_PI_4,
                    )
                })
                .collect(),
            other_tanks: (0..2)
                .map(|i| {
                    AgentState::new(
                        i,
                        TeamColor::Blue,
                        Point2D::new(340.0 - 20.0 * i as f64, 340.0),
                        -3.0 * std::f64::consts::FRAC_PI_4,
                    )
                })
                .collect(),
            flags: vec![
                Flag {
                    color: TeamColor::Red,
                    possessor: None,
                    position: Point2D::new(-370.0, -370.0),
                },
                Flag {
                    color: TeamColor::Blue,
                    possessor: None,
                    position: Point2D::new(370.0, 370.0),
                },
            ],
            shots: Vec::new(),
            obstacles: vec![
                square(-100.0, -100.0, 40.0)?,
                square(100.0, 100.0, 40.0)?,
                Obstacle::new(vec![
                    Point2D::new(-20.0, -20.0),
                    Point2D::new(20.0, -20.0),
                    Point2D::new(0.0, 30.0),
                ])?,
            ],
            bases: vec![base(TeamColor::Red, -370.0, -370.0), base(TeamColor::Blue, 370.0, 370.0)],
        };
        Ok(SandboxArena::new(constants, state))
    }
}

fn square(cx: f64, cy: f64, half: f64) -> Result<Obstacle> {
    Obstacle::new(vec![
        Point2D::new(cx - half, cy - half),
        Point2D::new(cx + half, cy - half),
        Point2D::new(cx + half, cy + half),
        Point2D::new(cx - half, cy + half),
    ])
}

fn base(color: TeamColor, cx: f64, cy: f64) -> Base {
    Base {
        color,
        corners: [
            Point2D::new(cx - 30.0, cy - 30.0),
            Point2D::new(cx + 30.0, cy - 30.0),
            Point2D::new(cx + 30.0, cy + 30.0),
            Point2D::new(cx - 30.0, cy + 30.0),
        ],
    }
}

impl WorldSource for SandboxArena {
    fn constants(&mut self) -> Result<WorldConstants> {
        Ok(self.constants.clone())
    }

    fn snapshot(&mut self) -> Result<WorldSnapshot> {
        self.advance();
        Ok(self.state.clone())
    }
}

impl CommandSink for SandboxArena {
    fn submit(&mut self, commands: &[ActuationCommand]) -> Result<()> {
        if let Some(cmd) = commands
            .iter()
            .find(|c| !c.speed.is_finite() || !c.angular_velocity.is_finite())
        {
            return Err(ControllerError::Sink(format!(
                "non-finite command for {}",
                cmd.agent
            )));
        }
        self.pending = commands.to_vec();
        self.batches += 1;
        Ok(())
    }
}

/// Lets one arena serve as both source and sink of an agent loop
#[derive(Debug, Clone)]
pub struct SharedArena(pub Rc<RefCell<SandboxArena>>);

impl SharedArena {
    /// Create a new shared handle to `arena`
    pub fn new(arena: SandboxArena) -> Self {
        SharedArena(Rc::new(RefCell::new(arena)))
    }
}

impl WorldSource for SharedArena {
    fn constants(&mut self) -> Result<WorldConstants> {
        self.0.borrow_mut().constants()
    }

    fn snapshot(&mut self) -> Result<WorldSnapshot> {
        self.0.borrow_mut().snapshot()
    }
}

impl CommandSink for SharedArena {
    fn submit(&mut self, commands: &[ActuationCommand]) -> Result<()> {
        self.0.borrow_mut().submit(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::AgentId;

    #[test]
    fn commanded_tank_moves_along_heading() {
        let mut arena = SandboxArena::demo().unwrap().with_time_step(1.0);
        let start = arena.state().my_tanks[0].position;
        let idle_start = arena.state().my_tanks[1].position;
        arena
            .submit(&[ActuationCommand {
                agent: AgentId(0),
                speed: 10.0,
                angular_velocity: 0.0,
                shoot: false,
            }])
            .unwrap();
        let snapshot = arena.snapshot().unwrap();
        let moved = distance(&start, &snapshot.my_tanks[0].position);
        assert!((moved - 10.0).abs() < 1e-9);
        // Uncommanded tanks stay put
        assert_eq!(snapshot.my_tanks[1].position, idle_start);
    }

    #[test]
    fn speed_is_clamped_to_max() {
        let mut arena = SandboxArena::demo().unwrap().with_time_step(1.0);
        let start = arena.state().my_tanks[0].position;
        arena
            .submit(&[ActuationCommand {
                agent: AgentId(0),
                speed: 500.0,
                angular_velocity: 0.0,
                shoot: true,
            }])
            .unwrap();
        arena.advance();
        let moved = distance(&start, &arena.state().my_tanks[0].position);
        assert!((moved - 25.0).abs() < 1e-9);
    }

    #[test]
    fn driving_over_enemy_flag_picks_it_up() {
        let mut arena = SandboxArena::demo().unwrap();
        arena.state.my_tanks[0].position = Point2D::new(368.0, 370.0);
        arena.advance();
        let tank = &arena.state().my_tanks[0];
        assert_eq!(tank.flag, Some(TeamColor::Blue));
        let flag = arena
            .state()
            .flags
            .iter()
            .find(|f| f.color == TeamColor::Blue)
            .unwrap();
        assert_eq!(flag.possessor, Some(TeamColor::Red));
        assert_eq!(flag.position, tank.position);
    }

    #[test]
    fn non_finite_commands_are_rejected() {
        let mut arena = SandboxArena::demo().unwrap();
        let result = arena.submit(&[ActuationCommand {
            agent: AgentId(0),
            speed: f64::NAN,
            angular_velocity: 0.0,
            shoot: false,
        }]);
        assert!(matches!(result, Err(ControllerError::Sink(_))));
        assert_eq!(arena.batches(), 0);
    }
}
