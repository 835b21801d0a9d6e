//! Error types.
//!
//! Domain outcomes such as "no driver available" or "rider gave up" are not
//! errors; they live in component state and the dispatcher's waiting list.
//! [SequencingError] means the engine produced an inconsistent event sequence
//! and the run must stop.

use bevy_ecs::prelude::Entity;
use thiserror::Error;

use crate::ecs::DriverId;
use crate::loader::LoadError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencingError {
    #[error("driver {driver} ended a drive with no destination set")]
    NoDestination { driver: DriverId },

    #[error("driver {driver} ended a ride with no rider on board")]
    NoRider { driver: DriverId },

    #[error("driver {driver} dropped off {found:?} but the event names {expected:?}")]
    RiderMismatch {
        driver: DriverId,
        expected: Entity,
        found: Entity,
    },

    #[error("event references entity {entity:?} which is not a {expected}")]
    MissingEntity {
        entity: Entity,
        expected: &'static str,
    },

    #[error("event scheduled at {timestamp} while the clock is already at {now}")]
    ScheduledInPast { now: u64, timestamp: u64 },
}

/// Top-level error for loading, configuring and running a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Sequencing(#[from] SequencingError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
