//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each step
//! pops the next event from [SimulationClock], inserts it as [CurrentEvent],
//! then runs the schedule. Exactly one event executes per step and it runs to
//! completion before the next one is popped.

use bevy_ecs::prelude::{Res, ResMut, Resource, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;
use bevy_ecs::system::{In, IntoSystem};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::error::SequencingError;
use crate::scenario::SimulationEndTime;
use crate::systems::{
    cancellation::cancellation_system, driver_request::driver_request_system,
    dropoff::dropoff_system, pickup::pickup_system, rider_request::rider_request_system,
};

/// First sequencing error raised by an event system during the current step.
#[derive(Debug, Default, Resource)]
pub struct SimulationFault(Option<SequencingError>);

impl SimulationFault {
    pub fn take(&mut self) -> Option<SequencingError> {
        self.0.take()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

/// Pipe target for event systems: keeps the first error for the runner.
pub fn record_fault(
    In(result): In<Result<(), SequencingError>>,
    mut fault: ResMut<SimulationFault>,
) {
    if let Err(err) = result {
        log::error!("sequencing violation: {err}");
        if fault.0.is_none() {
            fault.0 = Some(err);
        }
    }
}

// Condition functions for each event kind
fn is_rider_request(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, EventKind::RiderRequest { .. }))
        .unwrap_or(false)
}

fn is_driver_request(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, EventKind::DriverRequest { .. }))
        .unwrap_or(false)
}

fn is_pickup(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, EventKind::Pickup { .. }))
        .unwrap_or(false)
}

fn is_dropoff(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, EventKind::Dropoff { .. }))
        .unwrap_or(false)
}

fn is_cancellation(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, EventKind::Cancellation { .. }))
        .unwrap_or(false)
}

/// Runs one simulation step: pops the next event, inserts it as [CurrentEvent], then runs the schedule.
///
/// Returns `Ok(true)` if an event was processed and `Ok(false)` if the clock was empty. When
/// [SimulationEndTime] is set and the next event falls after it, every pending event is
/// discarded unexecuted and `Ok(false)` is returned. A sequencing error raised by the event
/// is returned as `Err`; the run must not continue after that.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> Result<bool, SequencingError> {
    run_next_event_with_hook(world, schedule, |_, _| {})
}

/// Runs one simulation step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    mut hook: F,
) -> Result<bool, SequencingError>
where
    F: FnMut(&World, &Event),
{
    let stop_at = world.get_resource::<SimulationEndTime>().and_then(|e| e.0);
    let Some(mut clock) = world.get_resource_mut::<SimulationClock>() else {
        return Ok(false);
    };
    if let (Some(end), Some(ts)) = (stop_at, clock.next_event_time()) {
        if ts > end {
            let dropped = clock.discard_pending();
            log::info!("end time {end} reached; discarded {dropped} pending events");
            return Ok(false);
        }
    }

    let Some(event) = clock.pop_next() else {
        return Ok(false);
    };
    log::debug!("t={} executing {}", event.timestamp, event.kind.label());
    world.insert_resource(CurrentEvent(event));

    schedule.run(world);

    if let Some(err) = world
        .get_resource_mut::<SimulationFault>()
        .and_then(|mut fault| fault.take())
    {
        return Err(err);
    }
    hook(world, &event);
    Ok(true)
}

/// Runs simulation steps until the event queue is empty or `max_steps` is reached.
/// Returns the number of steps executed.
pub fn run_until_empty(
    world: &mut World,
    schedule: &mut Schedule,
    max_steps: usize,
) -> Result<usize, SequencingError> {
    run_until_empty_with_hook(world, schedule, max_steps, |_, _| {})
}

/// Runs simulation steps until empty and invokes `hook` after each step.
pub fn run_until_empty_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    max_steps: usize,
    mut hook: F,
) -> Result<usize, SequencingError>
where
    F: FnMut(&World, &Event),
{
    let mut steps = 0;
    while steps < max_steps && run_next_event_with_hook(world, schedule, &mut hook)? {
        steps += 1;
    }
    if steps == max_steps {
        let pending = world
            .get_resource::<SimulationClock>()
            .map_or(0, SimulationClock::len);
        if pending > 0 {
            log::warn!("stopped after {max_steps} steps with {pending} events still queued");
        }
    }
    Ok(steps)
}

/// Builds the simulation schedule: one system per event kind, each run only when
/// [CurrentEvent] is of its kind and piped into [record_fault].
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.add_systems((
        // RiderRequest
        rider_request_system
            .pipe(record_fault)
            .run_if(is_rider_request),
        // DriverRequest
        driver_request_system
            .pipe(record_fault)
            .run_if(is_driver_request),
        // Pickup
        pickup_system.pipe(record_fault).run_if(is_pickup),
        // Dropoff
        dropoff_system.pipe(record_fault).run_if(is_dropoff),
        // Cancellation
        cancellation_system
            .pipe(record_fault)
            .run_if(is_cancellation),
    ));

    schedule
}
