//! Discrete-event simulation of a ride-sharing marketplace.
//!
//! Riders and drivers are ECS entities; the [dispatcher::Dispatcher], the event
//! [clock::SimulationClock] and the [monitor::MonitorResource] are world
//! resources. [runner] pops one event at a time and runs the system for its kind.

pub mod clock;
pub mod dispatcher;
pub mod ecs;
pub mod error;
pub mod geo;
pub mod loader;
pub mod monitor;
pub mod runner;
pub mod scenario;
pub mod simulation;
pub mod systems;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::{SequencingError, SimError, SimResult};
pub use simulation::{RunSummary, Simulation};
