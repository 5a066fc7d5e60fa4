//! Actuation commands and their destination

use crate::error::Result;
use crate::world::AgentId;

/// Low-level command for one tank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuationCommand {
    pub agent: AgentId,
    /// Forward-positive speed
    pub speed: f64,
    /// Radians per tick, in (-pi, pi]
    pub angular_velocity: f64,
    pub shoot: bool,
}

/// Accepts one batch of commands per tick
pub trait CommandSink {
    fn submit(&mut self, commands: &[ActuationCommand]) -> Result<()>;
}

/// Sink that keeps every submitted batch
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub batches: Vec<Vec<ActuationCommand>>,
}

impl RecordingSink {
    /// Create a new sink with no recorded batches
    pub fn new() -> Self {
        RecordingSink::default()
    }

    pub fn last_batch(&self) -> Option<&[ActuationCommand]> {
        self.batches.last().map(Vec::as_slice)
    }
}

impl CommandSink for RecordingSink {
    fn submit(&mut self, commands: &[ActuationCommand]) -> Result<()> {
        self.batches.push(commands.to_vec());
        Ok(())
    }
}
