//! Potential-field motion control for arena tanks.
//!
//! Each tick a snapshot from a [`WorldSource`] is turned into one
//! [`ActuationCommand`] per controlled tank: goal selection, a potential
//! field over goal and obstacles, a PD controller with per-tank error
//! memory, and a fire/no-fire heuristic. Commands go out as one batch to a
//! [`CommandSink`].
pub mod agent;
pub mod common;
pub mod config;
pub mod control;
pub mod error;
pub mod navigation;
pub mod sim;
pub mod world;

pub use crate::agent::{AgentLoop, ControlledAgents};
pub use crate::config::ControllerConfig;
pub use crate::control::command::{ActuationCommand, CommandSink};
pub use crate::error::{ControllerError, Result};
pub use crate::world::{WorldConstants, WorldSnapshot, WorldSource};
