//! Test helpers for common test setup and utilities.
//!
//! This module provides shared test utilities to reduce duplication across test files.

use bevy_ecs::prelude::{Entity, World};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::dispatcher::Dispatcher;
use crate::ecs::{Driver, DriverId, Rider, RiderId};
use crate::error::SequencingError;
use crate::geo::{Position, TravelMetricResource};
use crate::monitor::MonitorResource;
use crate::runner::{simulation_schedule, SimulationFault};
use crate::scenario::SimulationEndTime;

/// Create a basic test world with essential resources.
///
/// The monitor is an [crate::monitor::ActivityLog], the metric is Manhattan and
/// there is no end time. For file-driven scenarios use
/// [crate::scenario::build_simulation] instead.
pub fn create_test_world() -> World {
    let mut world = World::new();
    world.insert_resource(SimulationClock::default());
    world.insert_resource(Dispatcher::default());
    world.insert_resource(TravelMetricResource::default());
    world.insert_resource(MonitorResource::default());
    world.insert_resource(SimulationFault::default());
    world.insert_resource(SimulationEndTime(None));
    world
}

/// Spawn an idle, unregistered driver.
pub fn spawn_driver(world: &mut World, id: &str, at: (i64, i64), speed: u64) -> Entity {
    world
        .spawn(Driver::new(DriverId::new(id), Position::new(at.0, at.1), speed))
        .id()
}

/// Spawn an idle driver and register it with the dispatcher.
pub fn spawn_registered_driver(
    world: &mut World,
    id: &str,
    at: (i64, i64),
    speed: u64,
) -> Entity {
    let entity = spawn_driver(world, id, at, speed);
    world
        .resource_mut::<Dispatcher>()
        .register(entity, &DriverId::new(id));
    entity
}

/// Spawn a waiting rider that requested at `requested_at`.
pub fn spawn_rider(
    world: &mut World,
    id: &str,
    origin: (i64, i64),
    destination: (i64, i64),
    patience: u64,
    requested_at: u64,
) -> Entity {
    world
        .spawn(Rider::new(
            RiderId::new(id),
            Position::new(origin.0, origin.1),
            Position::new(destination.0, destination.1),
            patience,
            requested_at,
        ))
        .id()
}

/// Execute a single event through the full schedule without touching the queue.
///
/// Follow-up events land in [SimulationClock]; a sequencing error is returned.
pub fn run_event(world: &mut World, timestamp: u64, kind: EventKind) -> Result<(), SequencingError> {
    world.insert_resource(CurrentEvent(Event {
        timestamp,
        seq: 0,
        kind,
    }));
    let mut schedule = simulation_schedule();
    schedule.run(world);
    match world.resource_mut::<SimulationFault>().take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
