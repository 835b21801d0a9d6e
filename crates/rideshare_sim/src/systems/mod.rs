//! Event systems: one per event kind, each gated on [crate::clock::CurrentEvent].
//!
//! Systems return `Result<(), SequencingError>`; the runner pipes the result into
//! [crate::runner::record_fault] so a broken precondition aborts the run.

pub mod cancellation;
pub mod driver_request;
pub mod dropoff;
pub mod pickup;
pub mod rider_request;
