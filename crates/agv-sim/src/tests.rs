//! Integration tests for agv-sim.

use std::f32::consts::FRAC_PI_2;

use agv_core::{SimConfig, Tick, Vec2, VehicleId};
use agv_fleet::Phase;
use agv_layout::{LayoutBuilder, StationRegistry};

use crate::{NoopObserver, SimBuilder, SimObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig {
        frame_dt: 1.0 / 30.0,
        speed_factor: 1.0,
        total_ticks,
        seed: 42,
        output_interval_ticks: 30,
    }
}

/// One pickup whose alignment marker is 10 units from the garage slot, one
/// dropoff, one garage.  Guide lines along +x → docking headings +y.
fn small_depot() -> StationRegistry {
    let mut b = LayoutBuilder::new();
    b.add_pickup(Vec2::new(0.0, 10.0), 0.0); // marker at (0, 7)
    b.add_dropoff(Vec2::new(10.0, 10.0), 0.0); // marker at (10, 7)
    b.add_garage(Vec2::new(0.0, -3.0), FRAC_PI_2);
    b.fallback_marker(Vec2::new(5.0, 0.0)).build()
}

fn small_sim(total_ticks: u64) -> crate::Sim {
    SimBuilder::new(test_config(total_ticks), small_depot())
        .build()
        .unwrap()
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;
    use crate::SimError;

    #[test]
    fn builds_one_vehicle_per_garage() {
        let sim = small_sim(10);
        assert_eq!(sim.fleet.len(), 1);
        let v = sim.vehicle(VehicleId(0)).unwrap();
        assert_eq!(v.phase, Phase::Idle);
        assert_eq!(v.pos, Vec2::new(0.0, -3.0));
    }

    #[test]
    fn no_garages_is_an_error() {
        let mut b = LayoutBuilder::new();
        b.add_pickup(Vec2::ZERO, 0.0);
        let result = SimBuilder::new(test_config(10), b.build()).build();
        assert!(matches!(result, Err(SimError::NoGarages)));
    }

    #[test]
    fn non_positive_frame_dt_is_an_error() {
        let config = SimConfig { frame_dt: 0.0, ..test_config(10) };
        let result = SimBuilder::new(config, small_depot()).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }
}

// ── Basic run ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn run_stops_at_end_tick() {
        let mut sim = small_sim(10);
        sim.run(&mut NoopObserver);
        assert_eq!(sim.clock.current_tick, Tick(10));
    }

    #[test]
    fn run_ticks_advances_clock() {
        let mut sim = small_sim(100);
        sim.run_ticks(5, &mut NoopObserver);
        assert_eq!(sim.clock.current_tick, Tick(5));
        sim.run_ticks(3, &mut NoopObserver);
        assert_eq!(sim.clock.current_tick, Tick(8));
    }

    /// Observer that counts hook invocations.
    struct TickCounter {
        starts: usize,
        ends: usize,
        snapshots: usize,
    }
    impl SimObserver for TickCounter {
        fn on_tick_start(&mut self, _t: Tick) {
            self.starts += 1;
        }
        fn on_tick_end(&mut self, _t: Tick, _m: &crate::MetricsSnapshot) {
            self.ends += 1;
        }
        fn on_snapshot(
            &mut self,
            _t: Tick,
            _f: &agv_fleet::FleetStore,
            _b: &agv_order::OrderBoard,
            _now: f64,
        ) {
            self.snapshots += 1;
        }
    }

    #[test]
    fn observer_called_correct_number_of_times() {
        let mut sim = small_sim(90);
        let mut obs = TickCounter { starts: 0, ends: 0, snapshots: 0 };
        sim.run(&mut obs);
        assert_eq!(obs.starts, 90);
        assert_eq!(obs.ends, 90);
        // Interval 30 over ticks 0..90 fires at 0, 30, 60.
        assert_eq!(obs.snapshots, 3);
    }

    #[test]
    fn pause_freezes_time_and_motion() {
        let mut sim = small_sim(1_000);
        sim.activate(VehicleId(0)).unwrap();
        sim.run_ticks(30, &mut NoopObserver);

        let now = sim.clock.now_secs;
        let pos = sim.vehicle(VehicleId(0)).unwrap().pos;
        assert!(pos != Vec2::new(0.0, -3.0), "vehicle should have moved before the pause");

        sim.pause();
        sim.run_ticks(60, &mut NoopObserver);
        assert_eq!(sim.clock.now_secs, now, "paused time stands still");
        assert_eq!(sim.vehicle(VehicleId(0)).unwrap().pos, pos, "paused vehicles hold position");
        // The scheduler itself kept ticking.
        assert_eq!(sim.clock.current_tick, Tick(90));

        sim.resume();
        sim.run_ticks(30, &mut NoopObserver);
        assert!(sim.clock.now_secs > now);
    }

    #[test]
    fn speed_factor_scales_progress() {
        let mut slow = small_sim(300);
        let mut fast = small_sim(150);
        fast.set_speed_factor(2.0);

        slow.run(&mut NoopObserver);
        fast.run(&mut NoopObserver);
        // 300 ticks at ×1 and 150 ticks at ×2 cover the same sim time.
        assert!((slow.clock.now_secs - fast.clock.now_secs).abs() < 1e-9);
    }
}

// ── Dispatch and commands ─────────────────────────────────────────────────────

#[cfg(test)]
mod command_tests {
    use super::*;

    #[test]
    fn spawned_order_is_assignable_same_tick() {
        // The spawn pass runs before vehicle steps, so an idle-activated
        // vehicle picks up a t=0 order during the very first tick.
        let mut sim = small_sim(10);
        sim.activate(VehicleId(0)).unwrap();
        sim.step(sim.config.frame_dt);
        assert!(
            sim.vehicle(VehicleId(0)).unwrap().order.is_some(),
            "order spawned this tick must be visible to same-tick assignment"
        );
    }

    #[test]
    fn activate_wakes_only_idle_vehicles() {
        let mut sim = small_sim(10);
        sim.activate(VehicleId(0)).unwrap();
        assert_eq!(sim.vehicle(VehicleId(0)).unwrap().phase, Phase::Translate);
        // Re-activating a busy vehicle leaves it alone.
        sim.activate(VehicleId(0)).unwrap();
        assert_eq!(sim.vehicle(VehicleId(0)).unwrap().phase, Phase::Translate);
    }

    #[test]
    fn unknown_vehicle_ids_are_rejected() {
        let mut sim = small_sim(10);
        assert!(sim.activate(VehicleId(7)).is_err());
        assert!(sim.request_standby(VehicleId(7)).is_err());
        assert!(sim.vehicle(VehicleId(7)).is_err());
    }

    #[test]
    fn dispatch_first_waiting_pairs_oldest_order_with_idle_vehicle() {
        let mut sim = small_sim(10);
        // One tick spawns the order; the vehicle stays idle so it waits.
        sim.step(sim.config.frame_dt);
        assert_eq!(sim.board.waiting_count(), 1);

        let (order, vehicle) = sim.dispatch_first_waiting().expect("pairing");
        assert_eq!(vehicle, VehicleId(0));
        let v = sim.vehicle(vehicle).unwrap();
        assert_eq!(v.phase, Phase::Translate);
        assert_eq!(v.order, Some(order));
        assert_eq!(sim.board.get(order).unwrap().assigned_to, Some(vehicle));

        // No idle vehicle (and no waiting order) left.
        assert!(sim.dispatch_first_waiting().is_none());
    }

    #[test]
    fn standby_with_nothing_in_flight_parks_immediately() {
        let mut sim = small_sim(100);
        // Keep the board empty so the vehicle never claims an order.
        let registry_has_orders = sim.board.waiting_count() > 0;
        assert!(!registry_has_orders);

        sim.activate(VehicleId(0)).unwrap();
        sim.request_standby(VehicleId(0)).unwrap();
        sim.run_ticks(5, &mut NoopObserver);

        let v = sim.vehicle(VehicleId(0)).unwrap();
        assert_eq!(v.phase, Phase::Idle, "orderless standby returns straight home");
        assert!(!v.standby_requested);
    }
}

// ── End-to-end scenario ───────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use super::*;
    use agv_order::OrderStatus;

    /// Spec scenario: one pickup spawns a package at t=0, one vehicle starts
    /// toward a marker 10 units away, and the order must end `Delivered`
    /// with exactly one delivery counted.
    #[test]
    fn single_order_delivered_end_to_end() {
        let mut sim = small_sim(u64::MAX);
        sim.activate(VehicleId(0)).unwrap();

        let mut delivered_at_tick = None;
        for chunk in 0..200u64 {
            sim.run_ticks(30, &mut NoopObserver);
            if sim.metrics().delivered_count >= 1 {
                delivered_at_tick = Some(chunk * 30);
                break;
            }
        }

        let tick = delivered_at_tick.expect("delivery must complete within 6000 ticks");
        assert_eq!(sim.metrics().delivered_count, 1, "exactly one delivery by tick {tick}");
        assert!(sim.metrics().dwell_avg_secs > 0.0);
        assert!(sim.metrics().delivery_avg_secs > 0.0);
        assert!(sim.metrics().packages_per_minute > 0.0);
    }

    /// The vehicle keeps cycling: with continuous respawns it racks up
    /// multiple deliveries, and the order table shows live statuses only
    /// (delivered orders purge after their grace window).
    #[test]
    fn continuous_operation_delivers_repeatedly() {
        let mut sim = small_sim(9_000); // 5 simulated minutes
        sim.activate(VehicleId(0)).unwrap();
        sim.run(&mut NoopObserver);

        assert!(
            sim.metrics().delivered_count >= 2,
            "expected repeat deliveries, got {}",
            sim.metrics().delivered_count
        );
        for order in sim.order_table() {
            if order.status == OrderStatus::Delivered {
                let age = sim.clock.now_secs - order.delivered_at.unwrap();
                assert!(age < 2.0 + 1e-6, "delivered orders must purge after the grace window");
            }
        }
    }

    /// Standby requested mid-delivery: the vehicle finishes the job, then
    /// heads home instead of looping.
    #[test]
    fn standby_honored_after_delivery() {
        let mut sim = small_sim(u64::MAX);
        sim.activate(VehicleId(0)).unwrap();

        // Wait until the order is claimed, then request standby.
        for _ in 0..200 {
            sim.run_ticks(5, &mut NoopObserver);
            if sim.vehicle(VehicleId(0)).unwrap().order.is_some() {
                break;
            }
        }
        assert!(sim.vehicle(VehicleId(0)).unwrap().order.is_some());
        sim.request_standby(VehicleId(0)).unwrap();

        let mut parked = false;
        for _ in 0..400u64 {
            sim.run_ticks(30, &mut NoopObserver);
            if sim.vehicle(VehicleId(0)).unwrap().phase == Phase::Idle {
                parked = true;
                break;
            }
        }
        assert!(parked, "vehicle must come home after the delivery");
        assert_eq!(sim.metrics().delivered_count, 1);
        let v = sim.vehicle(VehicleId(0)).unwrap();
        assert_eq!(v.pos, Vec2::new(0.0, -3.0));
        assert!((v.heading - FRAC_PI_2).abs() < 1e-6);
        assert!(!v.standby_requested);
    }
}

// ── Metrics ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod metrics_tests {
    use super::*;
    use agv_core::OrderId;
    use agv_fleet::FleetStore;
    use agv_motion::StepEvent;
    use agv_order::{DispatchConfig, OrderBoard};

    use crate::MetricsAggregator;

    fn empty_world() -> (OrderBoard, FleetStore) {
        let mut b = LayoutBuilder::new();
        b.add_garage(Vec2::ZERO, 0.0);
        let registry = b.build();
        (OrderBoard::new(DispatchConfig::default()), FleetStore::from_garages(&registry))
    }

    #[test]
    fn average_dwell_equals_arithmetic_mean() {
        let (board, fleet) = empty_world();
        let mut agg = MetricsAggregator::new();

        let dwells = [2.0, 4.0, 9.0];
        for (i, &dwell_secs) in dwells.iter().enumerate() {
            agg.absorb(&[StepEvent::PackagePicked { order: OrderId(i as u32), dwell_secs }]);
        }

        let snapshot = agg.sample(&board, &fleet, 100.0);
        let mean = dwells.iter().sum::<f64>() / dwells.len() as f64;
        assert!((snapshot.dwell_avg_secs - mean).abs() < 1e-12);
        assert_eq!(snapshot.dwell_max_secs, 9.0);
    }

    #[test]
    fn throughput_counts_deliveries_per_minute() {
        let (board, fleet) = empty_world();
        let mut agg = MetricsAggregator::new();
        agg.absorb(&[
            StepEvent::OrderDelivered { order: OrderId(0) },
            StepEvent::OrderDelivered { order: OrderId(1) },
        ]);
        let snapshot = agg.sample(&board, &fleet, 60.0);
        assert_eq!(snapshot.delivered_count, 2);
        assert!((snapshot.packages_per_minute - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_aggregator_samples_zeroes() {
        let (board, fleet) = empty_world();
        let snapshot = MetricsAggregator::new().sample(&board, &fleet, 0.0);
        assert_eq!(snapshot.delivered_count, 0);
        assert_eq!(snapshot.dwell_avg_secs, 0.0);
        assert_eq!(snapshot.packages_per_minute, 0.0);
    }
}
