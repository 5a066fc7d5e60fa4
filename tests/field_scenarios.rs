//! End-to-end checks of goal selection, field and controller working together

use std::f64::consts::PI;

use tankfield_core::common::geometry::{bearing, normalize_angle};
use tankfield_core::common::types::Point2D;
use tankfield_core::control::controllers::PdController;
use tankfield_core::control::engagement::EngagementHeuristic;
use tankfield_core::control::memory::ErrorMemory;
use tankfield_core::control::ControlStack;
use tankfield_core::navigation::goal::GoalSelector;
use tankfield_core::navigation::potential_field::FieldModel;
use tankfield_core::world::{AgentState, Base, Flag, Obstacle, TeamColor, WorldConstants};

const EPS: f64 = 1e-9;

fn constants(max_speed: f64) -> WorldConstants {
    WorldConstants::new(TeamColor::Red, max_speed, 800.0).unwrap()
}

fn red_tank(x: f64, y: f64) -> AgentState {
    AgentState::new(0, TeamColor::Red, Point2D::new(x, y), 0.0)
}

#[test]
fn open_field_run_toward_distant_goal() {
    let constants = constants(30.0);
    let tank = red_tank(0.0, 0.0);
    let field = FieldModel::default()
        .field_vector(&tank, &Point2D::new(100.0, 0.0), &[], &constants)
        .unwrap();
    assert!((field.speed - 25.0).abs() < EPS);
    assert!(field.heading.abs() < EPS);

    let pd = PdController::default();
    let mut memory = ErrorMemory::default();
    let out = pd.step(&tank, &mut memory, field.speed, field.heading, None);
    assert!(out.angular_velocity.abs() < EPS);
    // speed error 25, delta 25, unit gains, current speed 0
    assert!((out.speed - 50.0).abs() < EPS);
    assert!((memory.last_speed_error - 25.0).abs() < EPS);
}

#[test]
fn open_field_speed_vanishes_at_goal() {
    let tank = red_tank(12.0, -4.0);
    let field = FieldModel::default()
        .field_vector(&tank, &Point2D::new(12.0, -4.0), &[], &constants(25.0))
        .unwrap();
    assert_eq!(field.speed, 0.0);
}

#[test]
fn low_max_speed_caps_open_field_run() {
    let field = FieldModel::default()
        .field_vector(&red_tank(0.0, 0.0), &Point2D::new(-500.0, 0.0), &[], &constants(7.5))
        .unwrap();
    assert!((field.speed - 7.5).abs() < EPS);
    assert!((field.heading - PI).abs() < EPS);
}

#[test]
fn triangle_in_the_way_bends_the_heading() {
    let triangle = Obstacle::new(vec![
        Point2D::new(40.0, -10.0),
        Point2D::new(60.0, -10.0),
        Point2D::new(50.0, 20.0),
    ])
    .unwrap();
    assert_eq!(triangle.centroid().unwrap(), Point2D::new(50.0, 0.0));

    let tank = red_tank(10.0, 0.0);
    let goal = Point2D::new(200.0, 0.0);
    let model = FieldModel::default();
    let components = model
        .components(&tank, &goal, std::slice::from_ref(&triangle))
        .unwrap();
    assert!(components.total().y.abs() > 1.0);

    let field = model
        .field_vector(&tank, &goal, &[triangle], &constants(25.0))
        .unwrap();
    let straight = bearing(&tank.position, &goal);
    assert!(normalize_angle(field.heading - straight).abs() > 0.1);
    assert!(field.speed <= 25.0);
}

#[test]
fn own_flag_loses_to_farther_enemy_flag() {
    let base = Base {
        color: TeamColor::Red,
        corners: [
            Point2D::new(-100.0, -100.0),
            Point2D::new(-80.0, -100.0),
            Point2D::new(-80.0, -80.0),
            Point2D::new(-100.0, -80.0),
        ],
    };
    let flags = [
        Flag {
            color: TeamColor::Red,
            possessor: None,
            position: Point2D::new(5.0, 0.0),
        },
        Flag {
            color: TeamColor::Green,
            possessor: None,
            position: Point2D::new(0.0, 50.0),
        },
    ];
    let goal = GoalSelector::new()
        .select_goal(&red_tank(0.0, 0.0), &flags, &[base], &constants(25.0))
        .unwrap();
    assert_eq!(goal, Point2D::new(0.0, 50.0));
}

#[test]
fn blocked_tank_fires_regardless_of_enemies() {
    let stack = ControlStack::new(PdController::default(), EngagementHeuristic::default());
    let tank = red_tank(0.0, 0.0);
    let field = FieldModel::default()
        .field_vector(&tank, &Point2D::new(300.0, 0.0), &[], &constants(25.0))
        .unwrap();
    let command = stack.actuate(&tank, &mut ErrorMemory::default(), field, &[], None);
    assert!(command.shoot);

    // Already cruising at the target speed: no reason to fire
    let mut cruising = tank.clone();
    cruising.velocity = tankfield_core::common::types::Vector2D::new(25.0, 0.0);
    let mut memory = ErrorMemory::default();
    let command = stack.actuate(&cruising, &mut memory, field, &[], None);
    assert!(!command.shoot);
    assert!((command.speed - 25.0).abs() < EPS);
}
