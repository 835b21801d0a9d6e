use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::dispatcher::Dispatcher;
use crate::ecs::{Driver, Rider};
use crate::error::SequencingError;
use crate::geo::TravelMetricResource;
use crate::monitor::{Action, Category, MonitorResource};

/// A driver asks for a rider. The driver is registered on first request; if
/// someone is waiting, the driver heads for the longest-waiting rider.
pub fn driver_request_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut dispatcher: ResMut<Dispatcher>,
    metric: Res<TravelMetricResource>,
    mut monitor: ResMut<MonitorResource>,
    riders: Query<&Rider>,
    mut drivers: Query<&mut Driver>,
) -> Result<(), SequencingError> {
    let EventKind::DriverRequest {
        driver: driver_entity,
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

    monitor.notify(
        now,
        Category::Driver,
        Action::Request,
        driver.id.as_str(),
        driver.location,
    );

    if driver.availability().is_none() {
        // A repeated external request while the driver is still busy: it will
        // come back on its own after the current trip.
        dispatcher.register(driver_entity, &driver.id);
        log::debug!("driver {} requested a rider while busy", driver.id);
        return Ok(());
    }

    let Some(rider_entity) = dispatcher.request_rider(driver_entity, &driver.id) else {
        return Ok(());
    };
    let rider = riders
        .get(rider_entity)
        .map_err(|_| SequencingError::MissingEntity {
            entity: rider_entity,
            expected: "rider",
        })?;

    let eta = driver.start_drive(rider.origin, &**metric);
    dispatcher.remove_waiting(rider_entity);
    log::debug!("driver {} heading to rider {} (eta {eta})", driver.id, rider.id);

    clock.schedule(
        now.saturating_add(eta),
        EventKind::Pickup {
            driver: driver_entity,
            rider: rider_entity,
        },
    )?;
    Ok(())
}
