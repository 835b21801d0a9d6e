use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{Driver, Rider};
use crate::error::SequencingError;
use crate::monitor::{Action, Category, MonitorResource};

/// The rider arrives. The driver is freed and immediately asks for another rider.
pub fn dropoff_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut monitor: ResMut<MonitorResource>,
    mut riders: Query<&mut Rider>,
    mut drivers: Query<&mut Driver>,
) -> Result<(), SequencingError> {
    let EventKind::Dropoff {
        driver: driver_entity,
        rider: rider_entity,
    } = event.0.kind
    else {
        return Ok(());
    };
    let now = event.0.timestamp;
    let mut driver = drivers
        .get_mut(driver_entity)
        .map_err(|_| SequencingError::MissingEntity {
            entity: driver_entity,
            expected: "driver",
        })?;
    let mut rider = riders
        .get_mut(rider_entity)
        .map_err(|_| SequencingError::MissingEntity {
            entity: rider_entity,
            expected: "rider",
        })?;

    let carried = driver.end_ride()?;
    if carried != rider_entity {
        return Err(SequencingError::RiderMismatch {
            driver: driver.id.clone(),
            expected: rider_entity,
            found: carried,
        });
    }
    rider.satisfied();

    monitor.notify(
        now,
        Category::Driver,
        Action::Dropoff,
        driver.id.as_str(),
        driver.location,
    );
    monitor.notify(
        now,
        Category::Rider,
        Action::Dropoff,
        rider.id.as_str(),
        rider.destination,
    );

    clock.schedule(
        now,
        EventKind::DriverRequest {
            driver: driver_entity,
        },
    )?;
    Ok(())
}
