//! Performance benchmarks for rideshare_sim using Criterion.rs.

use bevy_ecs::prelude::Entity;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rideshare_sim::clock::{EventKind, SimulationClock};
use rideshare_sim::dispatcher::Dispatcher;
use rideshare_sim::ecs::{DriverAvailability, DriverId};
use rideshare_sim::geo::{ManhattanMetric, Position};
use rideshare_sim::loader::EventRecord;
use rideshare_sim::scenario::SimulationConfig;
use rideshare_sim::Simulation;

fn city(drivers: usize, riders: usize, seed: u64) -> Vec<EventRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::with_capacity(drivers + riders);
    for index in 0..drivers {
        let at = Position::new(rng.gen_range(0..100), rng.gen_range(0..100));
        records.push(EventRecord::driver(0, &format!("d{index}"), at, rng.gen_range(1..=5)));
    }
    for index in 0..riders {
        let origin = Position::new(rng.gen_range(0..100), rng.gen_range(0..100));
        let destination = Position::new(rng.gen_range(0..100), rng.gen_range(0..100));
        records.push(EventRecord::rider(
            rng.gen_range(0..3_600),
            &format!("r{index}"),
            origin,
            destination,
            rng.gen_range(10..=120),
        ));
    }
    records.sort_by_key(|record| record.timestamp);
    records
}

fn bench_simulation_run(c: &mut Criterion) {
    let scenarios = vec![
        ("small", 50, 100),
        ("medium", 200, 500),
        ("large", 500, 1000),
    ];

    let mut group = c.benchmark_group("simulation_run");
    for (name, drivers, riders) in scenarios {
        let records = city(drivers, riders, 42);
        group.bench_with_input(BenchmarkId::from_parameter(name), &records, |b, records| {
            b.iter(|| {
                let mut sim =
                    Simulation::new(records, SimulationConfig::default()).expect("sim");
                black_box(sim.run().expect("run"));
            });
        });
    }
    group.finish();
}

fn bench_request_driver(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_driver");
    for size in [10u32, 100, 1000] {
        let mut dispatcher = Dispatcher::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut fleet = Vec::with_capacity(size as usize);
        for index in 0..size {
            let entity = Entity::from_raw(index + 1);
            dispatcher.register(entity, &DriverId::new(format!("d{index}")));
            fleet.push(DriverAvailability {
                location: Position::new(rng.gen_range(0..100), rng.gen_range(0..100)),
                speed: rng.gen_range(1..=5),
            });
        }
        let rider = Entity::from_raw(0);

        group.bench_with_input(BenchmarkId::from_parameter(size), &fleet, |b, fleet| {
            b.iter(|| {
                black_box(dispatcher.request_driver(
                    rider,
                    Position::new(50, 50),
                    &ManhattanMetric,
                    |driver| fleet.get(driver.index() as usize - 1).copied(),
                ))
            });
        });
    }
    group.finish();
}

fn bench_clock_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("clock_operations");
    let rider = Entity::from_raw(1);

    group.bench_function("schedule_1000_events", |b| {
        b.iter(|| {
            let mut clock = SimulationClock::default();
            for i in 0..1000 {
                clock
                    .schedule(i * 7 % 500, EventKind::Cancellation { rider })
                    .expect("schedule");
            }
            black_box(clock);
        });
    });

    group.bench_function("pop_1000_events", |b| {
        b.iter(|| {
            let mut clock = SimulationClock::default();
            for i in 0..1000 {
                clock
                    .schedule(i * 7 % 500, EventKind::Cancellation { rider })
                    .expect("schedule");
            }
            while let Some(event) = clock.pop_next() {
                black_box(event);
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_simulation_run,
    bench_request_driver,
    bench_clock_operations
);
criterion_main!(benches);
