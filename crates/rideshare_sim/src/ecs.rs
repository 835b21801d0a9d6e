//! Rider and driver components and the driver's drive/ride state machine.

use std::fmt;

use bevy_ecs::prelude::{Component, Entity};
use serde::{Deserialize, Serialize};

use crate::error::SequencingError;
use crate::geo::{travel_time, Position, TravelMetric};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiderId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DriverId(pub String);

impl RiderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DriverId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RiderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cancelled and Satisfied are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiderStatus {
    Waiting,
    Cancelled,
    Satisfied,
}

#[derive(Debug, Clone, PartialEq, Eq, Component)]
pub struct Rider {
    pub id: RiderId,
    pub origin: Position,
    pub destination: Position,
    /// How long the rider waits after requesting before giving up.
    pub patience: u64,
    pub status: RiderStatus,
    /// Simulation time of the rider's request.
    pub requested_at: u64,
    /// Simulation time when a driver picked the rider up; set in pickup_system.
    pub picked_up_at: Option<u64>,
}

impl Rider {
    pub fn new(
        id: RiderId,
        origin: Position,
        destination: Position,
        patience: u64,
        requested_at: u64,
    ) -> Self {
        Self {
            id,
            origin,
            destination,
            patience,
            status: RiderStatus::Waiting,
            requested_at,
            picked_up_at: None,
        }
    }

    /// Unconditional; callers check [Rider::status] first.
    pub fn cancel(&mut self) {
        self.status = RiderStatus::Cancelled;
    }

    /// Unconditional; callers check [Rider::status] first.
    pub fn satisfied(&mut self) {
        self.status = RiderStatus::Satisfied;
    }

    pub fn is_waiting(&self) -> bool {
        self.status == RiderStatus::Waiting
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, RiderStatus::Cancelled | RiderStatus::Satisfied)
    }

    /// True once a driver has the rider on board.
    pub fn is_on_board(&self) -> bool {
        self.picked_up_at.is_some()
    }
}

/// What the dispatcher needs to know about an idle driver to rank it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverAvailability {
    pub location: Position,
    pub speed: u64,
}

/// A driver moves through Idle -> driving to pickup -> carrying a rider -> Idle.
///
/// `destination` is set exactly while `idle` is false. `rider` is only set while
/// carrying; the drive toward a pickup has a destination but no rider yet.
#[derive(Debug, Clone, PartialEq, Eq, Component)]
pub struct Driver {
    pub id: DriverId,
    pub location: Position,
    /// Distance units per time unit; always positive for loaded drivers.
    pub speed: u64,
    pub idle: bool,
    pub destination: Option<Position>,
    pub rider: Option<Entity>,
}

impl Driver {
    pub fn new(id: DriverId, location: Position, speed: u64) -> Self {
        Self {
            id,
            location,
            speed,
            idle: true,
            destination: None,
            rider: None,
        }
    }

    /// Time to reach `target` from the current location.
    pub fn travel_time_to(&self, target: Position, metric: &dyn TravelMetric) -> u64 {
        travel_time(metric.distance(self.location, target), self.speed)
    }

    /// Location and speed when the driver is idle with nobody assigned.
    pub fn availability(&self) -> Option<DriverAvailability> {
        (self.idle && self.rider.is_none()).then_some(DriverAvailability {
            location: self.location,
            speed: self.speed,
        })
    }

    /// Head for `target`; returns the drive's duration.
    pub fn start_drive(&mut self, target: Position, metric: &dyn TravelMetric) -> u64 {
        let duration = self.travel_time_to(target, metric);
        self.destination = Some(target);
        self.idle = false;
        duration
    }

    pub fn end_drive(&mut self) -> Result<(), SequencingError> {
        let destination = self
            .destination
            .take()
            .ok_or_else(|| SequencingError::NoDestination {
                driver: self.id.clone(),
            })?;
        self.location = destination;
        self.idle = true;
        Ok(())
    }

    /// Take `rider` on board and head for their destination; returns the ride's duration.
    pub fn start_ride(
        &mut self,
        rider_entity: Entity,
        rider: &Rider,
        metric: &dyn TravelMetric,
    ) -> u64 {
        let duration = self.travel_time_to(rider.destination, metric);
        self.destination = Some(rider.destination);
        self.idle = false;
        self.rider = Some(rider_entity);
        duration
    }

    /// Arrive at the rider's destination; returns the rider who got out.
    pub fn end_ride(&mut self) -> Result<Entity, SequencingError> {
        let rider = self.rider.ok_or_else(|| SequencingError::NoRider {
            driver: self.id.clone(),
        })?;
        self.end_drive()?;
        self.rider = None;
        Ok(rider)
    }
}
