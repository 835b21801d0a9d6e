//! Dispatcher: pairs riders with drivers and queues whichever side is unmatched.
//!
//! Matching is greedy and local. A rider request is resolved against the idle
//! drivers known right now; a driver request takes the rider who has waited
//! longest. Nothing is ever re-optimized across the waiting list.
//!
//! The dispatcher owns only entity handles. Driver and rider state stays in
//! their components, so callers hand in lookups instead of the dispatcher
//! holding references into the world.

use std::collections::{HashMap, VecDeque};

use bevy_ecs::prelude::{Entity, Resource};

use crate::ecs::{DriverAvailability, DriverId, Rider};
use crate::geo::{travel_time, Position, TravelMetric};

#[derive(Debug, Default, Resource)]
pub struct Dispatcher {
    /// Riders with no driver yet, oldest request first.
    waiting: VecDeque<Entity>,
    /// Registered drivers in registration order; scan order for matching.
    drivers: Vec<Entity>,
    registered: HashMap<DriverId, Entity>,
}

impl Dispatcher {
    /// Pick the registered idle driver that reaches `pickup` soonest.
    ///
    /// `availability` reports a driver's location and speed when it is idle with
    /// no rider assigned, and `None` otherwise. Among equal travel times the
    /// earliest-registered driver wins. When nobody qualifies the rider joins
    /// the back of the waiting list (once).
    ///
    /// The chosen driver is not touched; the caller starts the drive.
    pub fn request_driver<F>(
        &mut self,
        rider: Entity,
        pickup: Position,
        metric: &dyn TravelMetric,
        availability: F,
    ) -> Option<Entity>
    where
        F: Fn(Entity) -> Option<DriverAvailability>,
    {
        let mut best: Option<(Entity, u64)> = None;

        for &driver in &self.drivers {
            let Some(candidate) = availability(driver) else {
                continue;
            };
            let eta = travel_time(metric.distance(candidate.location, pickup), candidate.speed);
            match best {
                Some((_, best_eta)) if eta >= best_eta => {}
                _ => best = Some((driver, eta)),
            }
        }

        match best {
            Some((driver, eta)) => {
                log::debug!("rider {rider:?} matched to driver {driver:?} (eta {eta})");
                Some(driver)
            }
            None => {
                if !self.waiting.contains(&rider) {
                    self.waiting.push_back(rider);
                }
                log::debug!(
                    "no idle driver for rider {rider:?}; {} waiting",
                    self.waiting.len()
                );
                None
            }
        }
    }

    /// Register `driver` on first sight and return the longest-waiting rider.
    ///
    /// The rider stays in the waiting list; the caller removes it with
    /// [Dispatcher::remove_waiting] once the driver commits to the pickup.
    pub fn request_rider(&mut self, driver: Entity, id: &DriverId) -> Option<Entity> {
        self.register(driver, id);
        self.waiting.front().copied()
    }

    /// Add `driver` to the registry unless its identifier is already known.
    /// Returns true if this call registered it.
    pub fn register(&mut self, driver: Entity, id: &DriverId) -> bool {
        if self.registered.contains_key(id) {
            return false;
        }
        self.registered.insert(id.clone(), driver);
        self.drivers.push(driver);
        log::debug!("registered driver {id} as {driver:?}");
        true
    }

    /// Withdraw `rider` from the waiting list (if queued) and mark them cancelled.
    pub fn cancel_ride(&mut self, rider_entity: Entity, rider: &mut Rider) {
        self.remove_waiting(rider_entity);
        rider.cancel();
    }

    /// Returns true if the rider was queued.
    pub fn remove_waiting(&mut self, rider: Entity) -> bool {
        match self.waiting.iter().position(|&queued| queued == rider) {
            Some(index) => {
                self.waiting.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn is_waiting(&self, rider: Entity) -> bool {
        self.waiting.contains(&rider)
    }

    pub fn waiting_riders(&self) -> impl Iterator<Item = Entity> + '_ {
        self.waiting.iter().copied()
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    /// Registered drivers in registration order.
    pub fn drivers(&self) -> &[Entity] {
        &self.drivers
    }

    pub fn driver_entity(&self, id: &DriverId) -> Option<Entity> {
        self.registered.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{RiderId, RiderStatus};
    use crate::geo::ManhattanMetric;

    fn entity(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    fn idle(row: i64, col: i64, speed: u64) -> Option<DriverAvailability> {
        Some(DriverAvailability {
            location: Position::new(row, col),
            speed,
        })
    }

    fn register_all(dispatcher: &mut Dispatcher, drivers: &[u32]) {
        for &index in drivers {
            dispatcher.register(entity(index), &DriverId::new(format!("d{index}")));
        }
    }

    #[test]
    fn queues_riders_in_arrival_order_when_no_driver_is_idle() {
        let mut dispatcher = Dispatcher::default();
        register_all(&mut dispatcher, &[10]);

        for index in 1..=3 {
            let matched =
                dispatcher.request_driver(entity(index), Position::new(0, 0), &ManhattanMetric, |_| None);
            assert_eq!(matched, None);
            assert_eq!(dispatcher.waiting_riders().last(), Some(entity(index)));
        }
        // A repeated request does not enqueue the rider twice.
        dispatcher.request_driver(entity(2), Position::new(0, 0), &ManhattanMetric, |_| None);

        let waiting: Vec<_> = dispatcher.waiting_riders().collect();
        assert_eq!(waiting, vec![entity(1), entity(2), entity(3)]);
    }

    #[test]
    fn selects_driver_with_lowest_travel_time() {
        let mut dispatcher = Dispatcher::default();
        register_all(&mut dispatcher, &[10, 11, 12]);
        let pickup = Position::new(0, 0);

        // 10: 20 blocks at speed 2 -> 10; 11: 12 blocks at speed 4 -> 3; 12: 2 blocks at speed 1 -> 2.
        let matched = dispatcher.request_driver(entity(1), pickup, &ManhattanMetric, |driver| {
            match driver.index() {
                10 => idle(10, 10, 2),
                11 => idle(6, 6, 4),
                12 => idle(1, 1, 1),
                _ => None,
            }
        });

        assert_eq!(matched, Some(entity(12)));
        assert_eq!(dispatcher.waiting_len(), 0);
    }

    #[test]
    fn exact_tie_goes_to_first_registered_driver() {
        let mut dispatcher = Dispatcher::default();
        register_all(&mut dispatcher, &[21, 20, 22]);

        let matched = dispatcher.request_driver(entity(1), Position::new(0, 0), &ManhattanMetric, |driver| {
            match driver.index() {
                20 | 21 => idle(0, 5, 5),
                22 => idle(5, 0, 5),
                _ => None,
            }
        });

        assert_eq!(matched, Some(entity(21)));
    }

    #[test]
    fn unavailable_drivers_are_skipped() {
        let mut dispatcher = Dispatcher::default();
        register_all(&mut dispatcher, &[10, 11]);

        let matched = dispatcher.request_driver(entity(1), Position::new(0, 0), &ManhattanMetric, |driver| {
            (driver.index() == 11).then(|| DriverAvailability {
                location: Position::new(50, 50),
                speed: 1,
            })
        });

        assert_eq!(matched, Some(entity(11)));
    }

    #[test]
    fn request_rider_registers_once_and_returns_longest_waiting() {
        let mut dispatcher = Dispatcher::default();
        let id = DriverId::new("fire");

        assert_eq!(dispatcher.request_rider(entity(10), &id), None);
        assert_eq!(dispatcher.request_rider(entity(10), &id), None);
        assert_eq!(dispatcher.drivers(), &[entity(10)]);

        dispatcher.request_driver(entity(1), Position::new(0, 0), &ManhattanMetric, |_| None);
        dispatcher.request_driver(entity(2), Position::new(0, 0), &ManhattanMetric, |_| None);

        assert_eq!(dispatcher.request_rider(entity(10), &id), Some(entity(1)));
        // Handing out the head does not dequeue it.
        assert_eq!(dispatcher.request_rider(entity(10), &id), Some(entity(1)));
        assert_eq!(dispatcher.drivers().len(), 1);
        assert_eq!(dispatcher.driver_entity(&id), Some(entity(10)));
    }

    #[test]
    fn cancel_ride_is_idempotent_and_dequeues() {
        let mut dispatcher = Dispatcher::default();
        let mut rider = Rider::new(
            RiderId::new("kal"),
            Position::new(5, 2),
            Position::new(3, 2),
            5,
            3,
        );
        dispatcher.request_driver(entity(1), rider.origin, &ManhattanMetric, |_| None);
        assert!(dispatcher.is_waiting(entity(1)));

        dispatcher.cancel_ride(entity(1), &mut rider);
        assert_eq!(rider.status, RiderStatus::Cancelled);
        assert!(!dispatcher.is_waiting(entity(1)));

        dispatcher.cancel_ride(entity(1), &mut rider);
        assert_eq!(rider.status, RiderStatus::Cancelled);
        assert_eq!(dispatcher.waiting_len(), 0);
    }
}
