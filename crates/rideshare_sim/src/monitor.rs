//! Monitor: a passive sink for rider and driver activities.
//!
//! Event systems call [Monitor::notify] as things happen. The engine never
//! reads anything back, so a monitor cannot influence the run. [ActivityLog]
//! keeps every activity and derives the end-of-run report from them.

use std::collections::BTreeMap;
use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::geo::{manhattan_distance, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Rider,
    Driver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    Request,
    Cancel,
    Pickup,
    Dropoff,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Rider => "rider",
            Category::Driver => "driver",
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Request => "request",
            Action::Cancel => "cancel",
            Action::Pickup => "pickup",
            Action::Dropoff => "dropoff",
        })
    }
}

/// One notification as received by a monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub timestamp: u64,
    pub category: Category,
    pub action: Action,
    pub id: String,
    pub position: Position,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -- {} {} {} at {}",
            self.timestamp, self.category, self.id, self.action, self.position
        )
    }
}

/// End-of-run statistics derived from the recorded activities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MonitorReport {
    pub rider_count: usize,
    pub driver_count: usize,
    /// Mean time from request to pickup, over riders that were picked up.
    pub rider_wait_time: f64,
    /// Mean distance each driver covered between its recorded positions.
    pub driver_total_distance: f64,
    /// Mean distance each driver covered with a rider on board.
    pub driver_ride_distance: f64,
}

pub trait Monitor: Send + Sync {
    fn notify(
        &mut self,
        timestamp: u64,
        category: Category,
        action: Action,
        id: &str,
        position: Position,
    );

    /// Activities retained by this monitor, oldest first.
    fn activities(&self) -> &[Activity] {
        &[]
    }

    fn report(&self) -> Option<MonitorReport> {
        None
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMonitor;

impl Monitor for NoopMonitor {
    fn notify(&mut self, _: u64, _: Category, _: Action, _: &str, _: Position) {}
}

/// Records every activity in arrival order.
#[derive(Debug, Default, Clone)]
pub struct ActivityLog {
    activities: Vec<Activity>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn by_id(&self, category: Category) -> BTreeMap<&str, Vec<&Activity>> {
        let mut grouped: BTreeMap<&str, Vec<&Activity>> = BTreeMap::new();
        for activity in self.activities.iter().filter(|a| a.category == category) {
            grouped.entry(activity.id.as_str()).or_default().push(activity);
        }
        grouped
    }

    fn average_wait_time(riders: &BTreeMap<&str, Vec<&Activity>>) -> f64 {
        let mut total = 0u64;
        let mut picked_up = 0usize;
        for activities in riders.values() {
            let mut requested_at = None;
            for activity in activities {
                match activity.action {
                    Action::Request => requested_at = Some(activity.timestamp),
                    Action::Pickup => {
                        if let Some(requested_at) = requested_at.take() {
                            total = total.saturating_add(activity.timestamp.saturating_sub(requested_at));
                            picked_up += 1;
                        }
                    }
                    Action::Cancel | Action::Dropoff => {}
                }
            }
        }
        mean(total, picked_up)
    }

    fn average_total_distance(drivers: &BTreeMap<&str, Vec<&Activity>>) -> f64 {
        let total = drivers
            .values()
            .flat_map(|activities| activities.windows(2))
            .map(|pair| manhattan_distance(pair[0].position, pair[1].position))
            .fold(0u64, u64::saturating_add);
        mean(total, drivers.len())
    }

    fn average_ride_distance(drivers: &BTreeMap<&str, Vec<&Activity>>) -> f64 {
        let mut total = 0u64;
        for activities in drivers.values() {
            let mut pickup = None;
            for activity in activities {
                match activity.action {
                    Action::Pickup => pickup = Some(activity.position),
                    Action::Dropoff => {
                        if let Some(from) = pickup.take() {
                            total = total.saturating_add(manhattan_distance(from, activity.position));
                        }
                    }
                    Action::Request | Action::Cancel => {}
                }
            }
        }
        mean(total, drivers.len())
    }
}

fn mean(total: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

impl Monitor for ActivityLog {
    fn notify(
        &mut self,
        timestamp: u64,
        category: Category,
        action: Action,
        id: &str,
        position: Position,
    ) {
        self.activities.push(Activity {
            timestamp,
            category,
            action,
            id: id.to_string(),
            position,
        });
    }

    fn activities(&self) -> &[Activity] {
        &self.activities
    }

    fn report(&self) -> Option<MonitorReport> {
        let riders = self.by_id(Category::Rider);
        let drivers = self.by_id(Category::Driver);
        Some(MonitorReport {
            rider_count: riders.len(),
            driver_count: drivers.len(),
            rider_wait_time: Self::average_wait_time(&riders),
            driver_total_distance: Self::average_total_distance(&drivers),
            driver_ride_distance: Self::average_ride_distance(&drivers),
        })
    }
}

/// Resource wrapper for the monitor trait object.
#[derive(Resource)]
pub struct MonitorResource(pub Box<dyn Monitor>);

impl MonitorResource {
    pub fn new(monitor: Box<dyn Monitor>) -> Self {
        Self(monitor)
    }
}

impl Default for MonitorResource {
    fn default() -> Self {
        Self::new(Box::new(ActivityLog::new()))
    }
}

impl std::ops::Deref for MonitorResource {
    type Target = dyn Monitor;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl std::ops::DerefMut for MonitorResource {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}
