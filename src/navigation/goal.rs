//! Goal selection

use crate::common::geometry::distance;
use crate::common::types::Point2D;
use crate::error::{ControllerError, Result};
use crate::world::{AgentState, Base, Flag, WorldConstants};

/// Picks the point a tank should currently be driving toward
#[derive(Debug, Clone, Default)]
pub struct GoalSelector;

impl GoalSelector {
    /// Create a new goal selector
    pub fn new() -> Self {
        GoalSelector
    }

    /// Nearest capturable flag, or the home base when carrying or when no
    /// flag qualifies.
    pub fn select_goal(
        &self,
        agent: &AgentState,
        flags: &[Flag],
        bases: &[Base],
        constants: &WorldConstants,
    ) -> Result<Point2D> {
        if !agent.is_carrying_flag() {
            if let Some(flag) = self.closest_enemy_flag(agent, flags, constants) {
                return Ok(flag.position);
            }
        }

        bases
            .iter()
            .find(|base| base.color == agent.color)
            .map(Base::centroid)
            .ok_or_else(|| {
                ControllerError::MalformedWorldState(format!(
                    "no base reported for team {}",
                    agent.color
                ))
            })
    }

    /// Flags not owned or held by the agent's team, within twice the world
    /// size. Ties go to the first flag in the list.
    pub fn closest_enemy_flag<'a>(
        &self,
        agent: &AgentState,
        flags: &'a [Flag],
        constants: &WorldConstants,
    ) -> Option<&'a Flag> {
        let mut best_dist = 2.0 * constants.world_size;
        let mut closest = None;
        for flag in flags {
            if flag.color == agent.color || flag.possessor == Some(agent.color) {
                continue;
            }
            let dist = distance(&agent.position, &flag.position);
            if dist < best_dist {
                best_dist = dist;
                closest = Some(flag);
            }
        }
        closest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TeamColor;

    fn constants() -> WorldConstants {
        WorldConstants::new(TeamColor::Red, 25.0, 800.0).unwrap()
    }

    fn flag(color: TeamColor, x: f64, y: f64) -> Flag {
        Flag {
            color,
            possessor: None,
            position: Point2D::new(x, y),
        }
    }

    fn red_base() -> Base {
        Base {
            color: TeamColor::Red,
            corners: [
                Point2D::new(-400.0, -400.0),
                Point2D::new(-360.0, -400.0),
                Point2D::new(-360.0, -360.0),
                Point2D::new(-400.0, -360.0),
            ],
        }
    }

    fn red_tank() -> AgentState {
        AgentState::new(0, TeamColor::Red, Point2D::new(0.0, 0.0), 0.0)
    }

    #[test]
    fn own_flag_is_skipped_even_when_nearest() {
        let flags = [flag(TeamColor::Red, 5.0, 0.0), flag(TeamColor::Blue, 50.0, 0.0)];
        let goal = GoalSelector::new()
            .select_goal(&red_tank(), &flags, &[red_base()], &constants())
            .unwrap();
        assert_eq!(goal, Point2D::new(50.0, 0.0));
    }

    #[test]
    fn flag_held_by_own_team_is_skipped() {
        let mut held = flag(TeamColor::Green, 10.0, 0.0);
        held.possessor = Some(TeamColor::Red);
        let flags = [held, flag(TeamColor::Blue, 0.0, 70.0)];
        let goal = GoalSelector::new()
            .select_goal(&red_tank(), &flags, &[red_base()], &constants())
            .unwrap();
        assert_eq!(goal, Point2D::new(0.0, 70.0));
    }

    #[test]
    fn ties_go_to_first_encountered() {
        let flags = [flag(TeamColor::Green, 30.0, 0.0), flag(TeamColor::Blue, -30.0, 0.0)];
        let chosen = GoalSelector::new()
            .closest_enemy_flag(&red_tank(), &flags, &constants())
            .unwrap();
        assert_eq!(chosen.color, TeamColor::Green);
    }

    #[test]
    fn carrier_heads_home() {
        let mut tank = red_tank();
        tank.flag = Some(TeamColor::Blue);
        let flags = [flag(TeamColor::Blue, 50.0, 0.0)];
        let goal = GoalSelector::new()
            .select_goal(&tank, &flags, &[red_base()], &constants())
            .unwrap();
        assert_eq!(goal, Point2D::new(-380.0, -380.0));
    }

    #[test]
    fn no_eligible_flag_falls_back_to_base() {
        let flags = [flag(TeamColor::Red, 50.0, 0.0)];
        let goal = GoalSelector::new()
            .select_goal(&red_tank(), &flags, &[red_base()], &constants())
            .unwrap();
        assert_eq!(goal, Point2D::new(-380.0, -380.0));
    }

    #[test]
    fn flags_beyond_search_radius_are_ignored() {
        let flags = [flag(TeamColor::Blue, 1700.0, 0.0)];
        assert!(GoalSelector::new()
            .closest_enemy_flag(&red_tank(), &flags, &constants())
            .is_none());
    }

    #[test]
    fn missing_home_base_is_malformed() {
        let err = GoalSelector::new()
            .select_goal(&red_tank(), &[], &[], &constants())
            .unwrap_err();
        assert!(matches!(err, ControllerError::MalformedWorldState(_)));
    }
}
