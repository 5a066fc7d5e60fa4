//! Per-tank controller error memory

use std::collections::HashMap;

use crate::world::AgentId;

/// Errors from the previous tick, used for the derivative terms
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ErrorMemory {
    pub last_speed_error: f64,
    pub last_angle_error: f64,
}

/// One error slot per controlled tank, addressed by identity
#[derive(Debug, Clone, Default)]
pub struct ControllerMemory {
    slots: HashMap<AgentId, ErrorMemory>,
}

impl ControllerMemory {
    /// Zeroed slots for every id in the roster
    pub fn for_roster<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = AgentId>,
    {
        ControllerMemory {
            slots: ids.into_iter().map(|id| (id, ErrorMemory::default())).collect(),
        }
    }

    pub fn get(&self, id: AgentId) -> Option<&ErrorMemory> {
        self.slots.get(&id)
    }

    /// Current slot for `id`, zeroed if the tank has not been seen before
    pub fn snapshot_of(&self, id: AgentId) -> ErrorMemory {
        self.slots.get(&id).copied().unwrap_or_default()
    }

    /// Store updated slots; existing entries are overwritten, never removed
    pub fn commit<I>(&mut self, updates: I)
    where
        I: IntoIterator<Item = (AgentId, ErrorMemory)>,
    {
        self.slots.extend(updates);
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
