#![allow(dead_code)]

use bevy_ecs::prelude::{Entity, World};
use rideshare_sim::clock::{Event, EventKind};
use rideshare_sim::error::SequencingError;
use rideshare_sim::geo::{Position, TravelMetric, TravelMetricResource};
use rideshare_sim::loader::EventRecord;
use rideshare_sim::monitor::{Activity, MonitorResource};
use rideshare_sim::runner::{
    run_next_event_with_hook, run_until_empty_with_hook, simulation_schedule,
};
use rideshare_sim::scenario::{build_simulation, Roster, SimulationConfig};

/// Builder configuration for reproducible test worlds.
#[derive(Debug, Clone, Default)]
pub struct TestWorldConfig {
    pub end_time: Option<u64>,
}

/// Builds a world from event records the same way the binary does.
#[derive(Default)]
pub struct TestWorldBuilder {
    config: TestWorldConfig,
    records: Vec<EventRecord>,
    metric: Option<Box<dyn TravelMetric>>,
}

impl TestWorldBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard events after `end_time`.
    pub fn with_end_time(mut self, end_time: u64) -> Self {
        self.config.end_time = Some(end_time);
        self
    }

    /// Replace the Manhattan metric.
    pub fn with_metric(mut self, metric: Box<dyn TravelMetric>) -> Self {
        self.metric = Some(metric);
        self
    }

    pub fn driver(mut self, timestamp: u64, id: &str, at: (i64, i64), speed: u64) -> Self {
        self.records
            .push(EventRecord::driver(timestamp, id, Position::new(at.0, at.1), speed));
        self
    }

    pub fn rider(
        mut self,
        timestamp: u64,
        id: &str,
        origin: (i64, i64),
        destination: (i64, i64),
        patience: u64,
    ) -> Self {
        self.records.push(EventRecord::rider(
            timestamp,
            id,
            Position::new(origin.0, origin.1),
            Position::new(destination.0, destination.1),
            patience,
        ));
        self
    }

    /// Build the ECS world with the configured resources and seeded events.
    pub fn build(self) -> World {
        let mut world = World::new();
        if let Some(metric) = self.metric {
            world.insert_resource(TravelMetricResource::new(metric));
        }
        let config = SimulationConfig {
            end_time: self.config.end_time,
            ..SimulationConfig::default()
        };
        build_simulation(&mut world, &self.records, &config).expect("seed events");
        world
    }
}

/// Run the world to completion and return every executed event in order.
pub fn run_and_trace(world: &mut World) -> Result<Vec<Event>, SequencingError> {
    let mut schedule = simulation_schedule();
    let mut trace = Vec::new();
    run_until_empty_with_hook(world, &mut schedule, 100_000, |_, event| trace.push(*event))?;
    Ok(trace)
}

/// Execute events up to and including the first one matching `stop`.
pub fn run_until<F>(world: &mut World, mut stop: F) -> Vec<Event>
where
    F: FnMut(&Event) -> bool,
{
    let mut schedule = simulation_schedule();
    let mut trace = Vec::new();
    loop {
        let ran = run_next_event_with_hook(world, &mut schedule, |_, event| trace.push(*event))
            .expect("event");
        if !ran || trace.last().is_some_and(&mut stop) {
            break;
        }
    }
    trace
}

pub fn driver(world: &World, id: &str) -> Entity {
    world.resource::<Roster>().driver(id).expect("driver in roster")
}

pub fn rider(world: &World, id: &str) -> Entity {
    world.resource::<Roster>().rider(id).expect("rider in roster")
}

pub fn activities(world: &World) -> Vec<Activity> {
    world.resource::<MonitorResource>().activities().to_vec()
}

pub fn labels(trace: &[Event]) -> Vec<&'static str> {
    trace.iter().map(|event| event.kind.label()).collect()
}

pub fn is_kind(event: &Event, label: &str) -> bool {
    event.kind.label() == label
}

pub fn pickup_of(event: &Event) -> Option<(Entity, Entity)> {
    match event.kind {
        EventKind::Pickup { driver, rider } => Some((driver, rider)),
        _ => None,
    }
}
