//! A self-contained simulation: world, schedule and configuration in one value.

use std::path::Path;

use bevy_ecs::prelude::{Schedule, World};
use serde::Serialize;

use crate::clock::SimulationClock;
use crate::dispatcher::Dispatcher;
use crate::ecs::{Driver, Rider};
use crate::error::SimResult;
use crate::geo::{TravelMetric, TravelMetricResource};
use crate::loader::{load_events_path, EventRecord};
use crate::monitor::{ActivityLog, Monitor, MonitorResource};
use crate::runner::{run_next_event, run_until_empty, simulation_schedule};
use crate::scenario::{build_simulation, Roster, SimulationConfig};

/// Outcome of [Simulation::run].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Events executed.
    pub steps: usize,
    /// Timestamp of the last executed event.
    pub final_time: u64,
    /// Events dropped unexecuted because they fell after the end time.
    pub discarded: usize,
    /// Events still queued because the step limit was hit.
    pub pending: usize,
}

pub struct Simulation {
    world: World,
    schedule: Schedule,
    config: SimulationConfig,
}

impl Simulation {
    /// Build a simulation over `records` that records activities in an [ActivityLog].
    pub fn new(records: &[EventRecord], config: SimulationConfig) -> SimResult<Self> {
        Self::with_parts(records, config, Box::new(ActivityLog::new()), None)
    }

    /// Load the event file at `path` and build a simulation over it.
    pub fn from_path(path: &Path, config: SimulationConfig) -> SimResult<Self> {
        let records = load_events_path(path)?;
        Self::new(&records, config)
    }

    /// Build with a custom monitor and, optionally, a custom travel metric.
    pub fn with_parts(
        records: &[EventRecord],
        config: SimulationConfig,
        monitor: Box<dyn Monitor>,
        metric: Option<Box<dyn TravelMetric>>,
    ) -> SimResult<Self> {
        let mut world = World::new();
        world.insert_resource(MonitorResource::new(monitor));
        if let Some(metric) = metric {
            world.insert_resource(TravelMetricResource::new(metric));
        }
        build_simulation(&mut world, records, &config)?;
        Ok(Self {
            world,
            schedule: simulation_schedule(),
            config,
        })
    }

    /// Execute one event. Returns false once there is nothing left to run.
    pub fn step(&mut self) -> SimResult<bool> {
        Ok(run_next_event(&mut self.world, &mut self.schedule)?)
    }

    /// Run until the queue drains, the end time passes or the step limit is hit.
    pub fn run(&mut self) -> SimResult<RunSummary> {
        log::info!(
            "running simulation (end time {:?}, max {} steps)",
            self.config.end_time,
            self.config.max_steps
        );
        let steps = run_until_empty(&mut self.world, &mut self.schedule, self.config.max_steps)?;
        let clock = self.world.resource::<SimulationClock>();
        let summary = RunSummary {
            steps,
            final_time: clock.now(),
            discarded: clock.discarded(),
            pending: clock.len(),
        };
        log::info!(
            "simulation finished after {} events at t={}",
            summary.steps,
            summary.final_time
        );
        Ok(summary)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn monitor(&self) -> &dyn Monitor {
        &**self.world.resource::<MonitorResource>()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        self.world.resource::<Dispatcher>()
    }

    pub fn now(&self) -> u64 {
        self.world.resource::<SimulationClock>().now()
    }

    /// Driver state by external identifier.
    pub fn driver(&self, id: &str) -> Option<&Driver> {
        let entity = self.world.resource::<Roster>().driver(id)?;
        self.world.get::<Driver>(entity)
    }

    /// Rider state by external identifier (latest rider with that id).
    pub fn rider(&self, id: &str) -> Option<&Rider> {
        let entity = self.world.resource::<Roster>().rider(id)?;
        self.world.get::<Rider>(entity)
    }
}
