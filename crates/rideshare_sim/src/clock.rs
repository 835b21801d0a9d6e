use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

use crate::error::SequencingError;

/// What happens at an event, and to whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    RiderRequest { rider: Entity },
    DriverRequest { driver: Entity },
    Pickup { driver: Entity, rider: Entity },
    Dropoff { driver: Entity, rider: Entity },
    Cancellation { rider: Entity },
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::RiderRequest { .. } => "RiderRequest",
            EventKind::DriverRequest { .. } => "DriverRequest",
            EventKind::Pickup { .. } => "Pickup",
            EventKind::Dropoff { .. } => "Dropoff",
            EventKind::Cancellation { .. } => "Cancellation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    /// Insertion order; breaks ties between events at the same timestamp.
    pub seq: u64,
    pub kind: EventKind,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, seq).
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event being executed by the current schedule run.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

/// Pending events ordered by timestamp, then by insertion.
#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_seq: u64,
    events: BinaryHeap<Event>,
    discarded: usize,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Queue `kind` at `timestamp`. Events never go into the past.
    pub fn schedule(&mut self, timestamp: u64, kind: EventKind) -> Result<(), SequencingError> {
        if timestamp < self.now {
            return Err(SequencingError::ScheduledInPast {
                now: self.now,
                timestamp,
            });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp,
            seq,
            kind,
        });
        Ok(())
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|event| event.timestamp)
    }

    /// Drop every pending event without executing it; returns how many were dropped.
    pub fn discard_pending(&mut self) -> usize {
        let dropped = self.events.len();
        self.events.clear();
        self.discarded += dropped;
        dropped
    }

    /// Total events dropped by [SimulationClock::discard_pending] so far.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
