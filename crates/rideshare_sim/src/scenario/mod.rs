//! Scenario setup: turn loaded event records into entities and seeded events.

mod build;
mod params;

pub use build::{build_simulation, Roster};
pub use params::{SimulationConfig, SimulationEndTime, DEFAULT_MAX_STEPS};
