use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, Resource, World};

use crate::clock::{EventKind, SimulationClock};
use crate::dispatcher::Dispatcher;
use crate::ecs::{Driver, DriverId, Rider, RiderId};
use crate::error::SequencingError;
use crate::geo::TravelMetricResource;
use crate::loader::{EventRecord, RequestRecord};
use crate::monitor::MonitorResource;
use crate::runner::SimulationFault;
use crate::scenario::params::{SimulationConfig, SimulationEndTime};

/// Entities spawned from the event file, keyed by their external identifiers.
#[derive(Debug, Default, Resource)]
pub struct Roster {
    drivers: HashMap<DriverId, Entity>,
    riders: HashMap<RiderId, Entity>,
}

impl Roster {
    pub fn driver(&self, id: &str) -> Option<Entity> {
        self.drivers.get(&DriverId::new(id)).copied()
    }

    /// Latest rider spawned under `id`.
    pub fn rider(&self, id: &str) -> Option<Entity> {
        self.riders.get(&RiderId::new(id)).copied()
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn rider_count(&self) -> usize {
        self.riders.len()
    }
}

/// Populate `world` with the simulation resources, one entity per driver
/// identifier and per rider record, and the seeded request events.
///
/// Resources already present (a custom [TravelMetricResource] or
/// [MonitorResource], say) are kept. Records are scheduled in slice order, so
/// among requests sharing a timestamp the earlier line runs first. A driver
/// identifier seen again reuses the entity spawned for its first record.
pub fn build_simulation(
    world: &mut World,
    records: &[EventRecord],
    config: &SimulationConfig,
) -> Result<(), SequencingError> {
    world.init_resource::<SimulationClock>();
    world.init_resource::<Dispatcher>();
    world.init_resource::<TravelMetricResource>();
    world.init_resource::<MonitorResource>();
    world.init_resource::<SimulationFault>();
    world.insert_resource(SimulationEndTime(config.end_time));

    let mut roster = world.remove_resource::<Roster>().unwrap_or_default();

    for record in records {
        let kind = match &record.request {
            RequestRecord::Driver {
                id,
                location,
                speed,
            } => {
                let driver = match roster.drivers.get(id) {
                    Some(&entity) => entity,
                    None => {
                        let entity = world.spawn(Driver::new(id.clone(), *location, *speed)).id();
                        roster.drivers.insert(id.clone(), entity);
                        entity
                    }
                };
                EventKind::DriverRequest { driver }
            }
            RequestRecord::Rider {
                id,
                origin,
                destination,
                patience,
            } => {
                let rider = world
                    .spawn(Rider::new(
                        id.clone(),
                        *origin,
                        *destination,
                        *patience,
                        record.timestamp,
                    ))
                    .id();
                roster.riders.insert(id.clone(), rider);
                EventKind::RiderRequest { rider }
            }
        };
        world
            .resource_mut::<SimulationClock>()
            .schedule(record.timestamp, kind)?;
    }

    log::info!(
        "seeded {} events for {} drivers and {} riders",
        records.len(),
        roster.driver_count(),
        roster.rider_count()
    );
    world.insert_resource(roster);
    Ok(())
}
