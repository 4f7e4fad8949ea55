//! depot — smallest runnable demo of the rust_agv simulation core.
//!
//! Three vehicles work a depot with two pickup stations and two dropoff
//! stations for ten simulated minutes, writing CSV output and printing a
//! final fleet/metrics summary.

use std::f32::consts::{FRAC_PI_2, PI};
use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use agv_core::{SimConfig, Vec2};
use agv_layout::{Bounds, LayoutBuilder, StationRegistry};
use agv_output::{CsvWriter, SimOutputObserver};
use agv_sim::{Sim, SimBuilder, SimObserver};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:                  u64 = 42;
const FRAME_DT:              f64 = 1.0 / 30.0; // 30 scheduler ticks per second
const SIM_MINUTES:           u64 = 10;
const OUTPUT_INTERVAL_TICKS: u64 = 30;         // snapshot once per simulated second

// ── Layout ────────────────────────────────────────────────────────────────────

/// A small rectangular floor: pickups along the north wall, dropoffs along
/// the south wall, garages in the middle.
fn build_depot() -> StationRegistry {
    let mut b = LayoutBuilder::new();

    // Pickup guide lines run along +x, so vehicles dock facing +y (north).
    b.add_pickup(Vec2::new(5.0, 25.0), 0.0);
    b.add_pickup(Vec2::new(20.0, 25.0), 0.0);

    // Dropoffs face the opposite wall: guide lines along -x, docking -y.
    b.add_dropoff(Vec2::new(10.0, 0.0), PI);
    b.add_dropoff(Vec2::new(25.0, 0.0), PI);

    // Garage row in the middle of the floor, parked facing north.
    b.add_garage(Vec2::new(8.0, 12.0), FRAC_PI_2);
    b.add_garage(Vec2::new(13.0, 12.0), FRAC_PI_2);
    b.add_garage(Vec2::new(18.0, 12.0), FRAC_PI_2);

    b.bounds(Bounds::new(Vec2::new(-5.0, -8.0), Vec2::new(35.0, 30.0)))
        .fallback_marker(Vec2::new(13.0, 15.0))
        .build()
}

// ── Observer wrapper to count rows ────────────────────────────────────────────

struct CountingObserver<W: agv_output::OutputWriter> {
    inner: SimOutputObserver<W>,
    metric_rows: usize,
    snapshot_rows: usize,
}

impl<W: agv_output::OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, metric_rows: 0, snapshot_rows: 0 }
    }
}

impl<W: agv_output::OutputWriter> SimObserver for CountingObserver<W> {
    fn on_tick_end(&mut self, tick: agv_core::Tick, metrics: &agv_sim::MetricsSnapshot) {
        self.metric_rows += 1;
        self.inner.on_tick_end(tick, metrics);
    }

    fn on_snapshot(
        &mut self,
        tick: agv_core::Tick,
        fleet: &agv_fleet::FleetStore,
        board: &agv_order::OrderBoard,
        now_secs: f64,
    ) {
        self.snapshot_rows += fleet.len();
        self.inner.on_snapshot(tick, fleet, board, now_secs);
    }

    fn on_sim_end(&mut self, final_tick: agv_core::Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== depot — rust_agv warehouse simulation ===");
    println!("Vehicles: 3  |  Minutes: {SIM_MINUTES}  |  Seed: {SEED}");
    println!();

    // 1. Build the floor layout.
    let registry = build_depot();
    println!(
        "Layout: {} pickups, {} dropoffs, {} garages",
        registry.pickups().len(),
        registry.dropoffs().len(),
        registry.garages().len()
    );

    // 2. Sim config.
    let ticks_per_minute = (60.0 / FRAME_DT) as u64;
    let config = SimConfig {
        frame_dt: FRAME_DT,
        speed_factor: 1.0,
        total_ticks: SIM_MINUTES * ticks_per_minute,
        seed: SEED,
        output_interval_ticks: OUTPUT_INTERVAL_TICKS,
    };
    println!(
        "Sim: {} ticks ({} min × {} ticks/min), snapshot every {} ticks",
        config.total_ticks, SIM_MINUTES, ticks_per_minute, OUTPUT_INTERVAL_TICKS
    );
    println!();

    // 3. Build the sim and wake the whole fleet.
    let mut sim: Sim = SimBuilder::new(config, registry).build()?;
    sim.activate_all();

    // 4. Set up CSV output.
    std::fs::create_dir_all("output/depot")?;
    let writer = CsvWriter::new(Path::new("output/depot"))?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(writer));

    // 5. Run.
    let t0 = Instant::now();
    sim.run(&mut obs);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Summary.
    let metrics = *sim.metrics();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  tick_metrics.csv      : {} rows", obs.metric_rows);
    println!("  vehicle_snapshots.csv : {} rows", obs.snapshot_rows);
    println!();
    println!("Delivered packages : {}", metrics.delivered_count);
    println!("Throughput         : {:.2} packages/min", metrics.packages_per_minute);
    println!(
        "Dwell time         : avg {:.1} s, max {:.1} s",
        metrics.dwell_avg_secs, metrics.dwell_max_secs
    );
    println!(
        "Delivery time      : avg {:.1} s, max {:.1} s",
        metrics.delivery_avg_secs, metrics.delivery_max_secs
    );
    println!();

    // 7. Final fleet table.
    println!("{:<10} {:<18} {:<12} {:<10}", "Vehicle", "Phase", "Position", "Order");
    println!("{}", "-".repeat(52));
    for v in sim.fleet.iter() {
        println!(
            "{:<10} {:<18} {:<12} {:<10}",
            v.id.0,
            v.phase.to_string(),
            format!("({:.1},{:.1})", v.pos.x, v.pos.y),
            v.order.map(|o| o.0.to_string()).unwrap_or_else(|| "-".into()),
        );
    }

    Ok(())
}
