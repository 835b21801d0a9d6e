//! Grid geometry: positions, Manhattan distance and the travel metric seam.
//!
//! The engine never computes distances directly. Every travel-time decision goes
//! through the [TravelMetric] installed as [TravelMetricResource], so alternative
//! geometries can be swapped in without touching event logic.

use std::fmt;
use std::str::FromStr;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point on the city grid, addressed by row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: i64,
    pub col: i64,
}

impl Position {
    pub const fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid position {input:?}: expected \"row,column\"")]
pub struct ParsePositionError {
    pub input: String,
}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePositionError {
            input: s.to_string(),
        };
        let (row, col) = s.split_once(',').ok_or_else(err)?;
        let row = row.trim().parse::<i64>().map_err(|_| err())?;
        let col = col.trim().parse::<i64>().map_err(|_| err())?;
        Ok(Self { row, col })
    }
}

/// Sum of the absolute row and column offsets between two positions,
/// saturating at `u64::MAX` for points at opposite ends of the grid.
pub fn manhattan_distance(a: Position, b: Position) -> u64 {
    a.row.abs_diff(b.row).saturating_add(a.col.abs_diff(b.col))
}

/// Whole time units needed to cover `distance` at `speed`, rounded down.
///
/// A zero speed never arrives; the loader rejects such drivers, so this only
/// guards against a hand-built driver.
pub fn travel_time(distance: u64, speed: u64) -> u64 {
    distance.checked_div(speed).unwrap_or(u64::MAX)
}

/// Distance function consumed by the dispatcher and the driver state machine.
pub trait TravelMetric: Send + Sync {
    /// Non-negative distance between two positions.
    fn distance(&self, from: Position, to: Position) -> u64;
}

/// City-block distance; the default metric.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManhattanMetric;

impl TravelMetric for ManhattanMetric {
    fn distance(&self, from: Position, to: Position) -> u64 {
        manhattan_distance(from, to)
    }
}

/// Resource wrapper for the travel metric trait object.
#[derive(Resource)]
pub struct TravelMetricResource(pub Box<dyn TravelMetric>);

impl TravelMetricResource {
    pub fn new(metric: Box<dyn TravelMetric>) -> Self {
        Self(metric)
    }
}

impl Default for TravelMetricResource {
    fn default() -> Self {
        Self::new(Box::new(ManhattanMetric))
    }
}

impl std::ops::Deref for TravelMetricResource {
    type Target = dyn TravelMetric;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
