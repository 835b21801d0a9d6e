use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{Driver, Rider, RiderStatus};
use crate::error::SequencingError;
use crate::geo::TravelMetricResource;
use crate::monitor::{Action, Category, MonitorResource};

/// The driver reaches the pickup point. A waiting rider gets in; a rider who
/// already cancelled sends the driver straight back to the dispatcher.
pub fn pickup_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    metric: Res<TravelMetricResource>,
    mut monitor: ResMut<MonitorResource>,
    mut riders: Query<&mut Rider>,
    mut drivers: Query<&mut Driver>,
) -> Result<(), SequencingError> {
    let EventKind::Pickup {
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

    driver.end_drive()?;

    match rider.status {
        RiderStatus::Waiting => {
            let ride_time = driver.start_ride(rider_entity, &rider, &**metric);
            rider.picked_up_at = Some(now);
            monitor.notify(
                now,
                Category::Rider,
                Action::Pickup,
                rider.id.as_str(),
                rider.origin,
            );
            monitor.notify(
                now,
                Category::Driver,
                Action::Pickup,
                driver.id.as_str(),
                driver.location,
            );
            clock.schedule(
                now.saturating_add(ride_time),
                EventKind::Dropoff {
                    driver: driver_entity,
                    rider: rider_entity,
                },
            )?;
        }
        RiderStatus::Cancelled => {
            log::debug!("driver {} found rider {} gone", driver.id, rider.id);
            clock.schedule(
                now,
                EventKind::DriverRequest {
                    driver: driver_entity,
                },
            )?;
        }
        RiderStatus::Satisfied => {
            log::warn!(
                "pickup at {now} for rider {} who is already satisfied; ignoring",
                rider.id
            );
        }
    }
    Ok(())
}
