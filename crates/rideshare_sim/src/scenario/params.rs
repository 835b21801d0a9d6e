use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::SimResult;

/// Upper bound on executed events unless configured otherwise.
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// Simulation end time. When set, the runner stops once the next event would
/// fall strictly after this timestamp and discards everything still queued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Resource)]
pub struct SimulationEndTime(pub Option<u64>);

/// Run configuration, loadable from JSON.
///
/// ```json
/// { "end_time": 120, "max_steps": 50000 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Events after this timestamp are discarded unexecuted.
    pub end_time: Option<u64>,
    /// Safety limit on executed events; a run that hits it stops early.
    pub max_steps: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            end_time: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(input: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn with_end_time(mut self, end_time: u64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}
