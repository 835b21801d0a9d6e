//! Run a small hand-written city and print every activity plus the report.
//!
//! Run with: cargo run -p rideshare_sim --example scenario_run

use rideshare_sim::loader::load_events_str;
use rideshare_sim::scenario::SimulationConfig;
use rideshare_sim::{SimResult, Simulation};

const EVENTS: &str = "\
0  DriverRequest Amaranth 1,1   1
0  DriverRequest Cobalt   12,4  3
2  RiderRequest  Cerise   4,2   1,15  15
3  RiderRequest  Dahlia   12,9  0,0   4
5  RiderRequest  Ebony    7,7   7,20  30
9  DriverRequest Fuchsia  8,8   2
";

fn main() -> SimResult<()> {
    let records = load_events_str(EVENTS)?;
    let mut sim = Simulation::new(&records, SimulationConfig::default())?;
    let summary = sim.run()?;

    println!("--- Scenario run ({} records) ---", records.len());
    for activity in sim.monitor().activities() {
        println!("{activity}");
    }
    println!("Steps executed: {}", summary.steps);
    println!("Simulation time: {}", summary.final_time);

    if let Some(report) = sim.monitor().report() {
        println!("\nRiders: {}  Drivers: {}", report.rider_count, report.driver_count);
        println!("Average rider wait: {:.2}", report.rider_wait_time);
        println!("Average driver distance: {:.2}", report.driver_total_distance);
        println!("Average ride distance: {:.2}", report.driver_ride_distance);
    }
    Ok(())
}
