use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::dispatcher::Dispatcher;
use crate::ecs::{Driver, Rider};
use crate::error::SequencingError;
use crate::geo::TravelMetricResource;
use crate::monitor::{Action, Category, MonitorResource};

/// A rider asks for a driver. The nearest idle driver (if any) starts toward the
/// pickup; the rider's patience timeout is scheduled either way.
pub fn rider_request_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut dispatcher: ResMut<Dispatcher>,
    metric: Res<TravelMetricResource>,
    mut monitor: ResMut<MonitorResource>,
    riders: Query<&Rider>,
    mut drivers: Query<&mut Driver>,
) -> Result<(), SequencingError> {
    let EventKind::RiderRequest { rider: rider_entity } = event.0.kind else {
        return Ok(());
    };
    let now = event.0.timestamp;
    let rider = riders
        .get(rider_entity)
        .map_err(|_| SequencingError::MissingEntity {
            entity: rider_entity,
            expected: "rider",
        })?;

    monitor.notify(
        now,
        Category::Rider,
        Action::Request,
        rider.id.as_str(),
        rider.origin,
    );

    let matched = dispatcher.request_driver(rider_entity, rider.origin, &**metric, |driver| {
        drivers.get(driver).ok().and_then(Driver::availability)
    });

    if let Some(driver_entity) = matched {
        let mut driver =
            drivers
                .get_mut(driver_entity)
                .map_err(|_| SequencingError::MissingEntity {
                    entity: driver_entity,
                    expected: "driver",
                })?;
        let eta = driver.start_drive(rider.origin, &**metric);
        clock.schedule(
            now.saturating_add(eta),
            EventKind::Pickup {
                driver: driver_entity,
                rider: rider_entity,
            },
        )?;
    }

    clock.schedule(
        now.saturating_add(rider.patience),
        EventKind::Cancellation {
            rider: rider_entity,
        },
    )?;
    Ok(())
}
