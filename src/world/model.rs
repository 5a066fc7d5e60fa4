//! Arena records as delivered by a world source

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::geometry::centroid;
use crate::common::types::{Point2D, Vector2D};
use crate::error::{ControllerError, Result};

/// Team colors used by the arena server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamColor {
    Red,
    Green,
    Blue,
    Purple,
}

impl FromStr for TeamColor {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(TeamColor::Red),
            "green" => Ok(TeamColor::Green),
            "blue" => Ok(TeamColor::Blue),
            "purple" => Ok(TeamColor::Purple),
            other => Err(ControllerError::InvalidConstant {
                name: "team".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TeamColor::Red => "red",
            TeamColor::Green => "green",
            TeamColor::Blue => "blue",
            TeamColor::Purple => "purple",
        };
        f.write_str(name)
    }
}

/// Stable identity of a tank, matching the server roster index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub usize);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tank#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TankStatus {
    Alive,
    Dead,
}

/// Kinematic state of one tank for the current tick
#[derive(Debug, Clone)]
pub struct AgentState {
    pub id: AgentId,
    pub color: TeamColor,
    pub position: Point2D,
    pub velocity: Vector2D,
    /// Heading in radians
    pub angle: f64,
    /// Color of the flag being carried, if any
    pub flag: Option<TeamColor>,
    pub status: TankStatus,
}

impl AgentState {
    /// A living tank at rest with no flag
    pub fn new(id: usize, color: TeamColor, position: Point2D, angle: f64) -> Self {
        AgentState {
            id: AgentId(id),
            color,
            position,
            velocity: Vector2D::zeros(),
            angle,
            flag: None,
            status: TankStatus::Alive,
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    pub fn is_alive(&self) -> bool {
        self.status == TankStatus::Alive
    }

    pub fn is_carrying_flag(&self) -> bool {
        self.flag.is_some()
    }
}

/// A closed polygon the tanks must steer around
#[derive(Debug, Clone)]
pub struct Obstacle {
    points: Vec<Point2D>,
}

impl Obstacle {
    /// Build an obstacle; a polygon with no corners is rejected
    pub fn new(points: Vec<Point2D>) -> Result<Self> {
        if points.is_empty() {
            return Err(ControllerError::MalformedWorldState(
                "obstacle with zero corner points".to_string(),
            ));
        }
        Ok(Obstacle { points })
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn centroid(&self) -> Result<Point2D> {
        centroid(&self.points)
    }
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub color: TeamColor,
    pub possessor: Option<TeamColor>,
    pub position: Point2D,
}

#[derive(Debug, Clone)]
pub struct Base {
    pub color: TeamColor,
    pub corners: [Point2D; 4],
}

impl Base {
    /// Mean of the four corners, computed on every call
    pub fn centroid(&self) -> Point2D {
        let sum = self
            .corners
            .iter()
            .fold(Vector2D::zeros(), |acc, c| acc + c.coords);
        Point2D::from(sum / 4.0)
    }
}

#[derive(Debug, Clone)]
pub struct Shot {
    pub position: Point2D,
    pub velocity: Vector2D,
}

/// Game constants fetched once when an agent starts
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConstants {
    pub team: TeamColor,
    /// Maximum tank speed; the field model clamps to it
    pub max_speed: f64,
    pub world_size: f64,
}

impl WorldConstants {
    /// Create a new set of constants; speed and size must be positive and finite
    pub fn new(team: TeamColor, max_speed: f64, world_size: f64) -> Result<Self> {
        check_positive("tankspeed", max_speed)?;
        check_positive("worldsize", world_size)?;
        Ok(WorldConstants {
            team,
            max_speed,
            world_size,
        })
    }

    /// Build constants from the raw key/value list an arena server reports.
    ///
    /// `team`, `tankspeed` and `worldsize` are required; nothing is defaulted
    /// since a substituted max speed would silently change clamping.
    pub fn from_pairs(pairs: &HashMap<String, String>) -> Result<Self> {
        let team = require(pairs, "team")?.parse::<TeamColor>()?;
        let max_speed = parse_number(pairs, "tankspeed")?;
        let world_size = parse_number(pairs, "worldsize")?;
        WorldConstants::new(team, max_speed, world_size)
    }
}

fn require<'a>(pairs: &'a HashMap<String, String>, key: &str) -> Result<&'a str> {
    pairs
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ControllerError::MissingConstant(key.to_string()))
}

fn parse_number(pairs: &HashMap<String, String>, key: &str) -> Result<f64> {
    let raw = require(pairs, key)?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ControllerError::InvalidConstant {
            name: key.to_string(),
            value: raw.to_string(),
        })
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ControllerError::InvalidConstant {
            name: name.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}
