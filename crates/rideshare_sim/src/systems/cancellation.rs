use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind};
use crate::dispatcher::Dispatcher;
use crate::ecs::Rider;
use crate::error::SequencingError;
use crate::monitor::{Action, Category, MonitorResource};

/// The rider's patience runs out. Only a rider still waiting for a car is
/// cancelled; riders already on board or dropped off are left alone.
pub fn cancellation_system(
    event: Res<CurrentEvent>,
    mut dispatcher: ResMut<Dispatcher>,
    mut monitor: ResMut<MonitorResource>,
    mut riders: Query<&mut Rider>,
) -> Result<(), SequencingError> {
    let EventKind::Cancellation {
        rider: rider_entity,
    } = event.0.kind
    else {
        return Ok(());
    };
    let now = event.0.timestamp;
    let mut rider = riders
        .get_mut(rider_entity)
        .map_err(|_| SequencingError::MissingEntity {
            entity: rider_entity,
            expected: "rider",
        })?;

    if !rider.is_waiting() || rider.is_on_board() {
        log::debug!("cancellation for rider {} is stale", rider.id);
        return Ok(());
    }

    dispatcher.cancel_ride(rider_entity, &mut rider);
    monitor.notify(
        now,
        Category::Rider,
        Action::Cancel,
        rider.id.as_str(),
        rider.origin,
    );
    Ok(())
}
