//! Unit tests for steering control, proximity throttling, and the phase
//! state machine.

use agv_core::{SimRng, Vec2, VehicleId};
use agv_fleet::{Phase, Vehicle};
use agv_layout::{LayoutBuilder, LockConfig, OccupancyLedger, StationRegistry};
use agv_order::{DispatchConfig, OrderBoard, OrderStatus, PackageStore};

use crate::machine::{StepCtx, step_vehicle};
use crate::proximity::{Falloff, ProximityConfig, Throttle, assess};
use crate::{MotionProfile, StepEvent};

// ── Control helpers ───────────────────────────────────────────────────────────

#[cfg(test)]
mod control {
    use agv_core::Vec2;

    use crate::control::{rotate_about_pivot, steer_toward, turn_to_heading};

    #[test]
    fn steer_clamps_per_tick_turn() {
        // Target is 90° to the left but the clamp allows only 0.1 rad.
        let h = steer_toward(0.0, Vec2::new(0.0, 1.0), 0.1);
        assert!((h - 0.1).abs() < 1e-6);
        // Within the clamp the heading snaps onto the target direction.
        let h = steer_toward(0.0, Vec2::new(0.0, 1.0), 3.0);
        assert!((h - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn steer_takes_shortest_arc() {
        // From just below +π to just above -π is a small positive turn
        // (~0.28 rad) across the wrap, not a near-full rotation back.
        let h = steer_toward(3.0, Vec2::from_angle(-3.0), 0.5);
        assert!((h + 3.0).abs() < 1e-4, "wrapped turn should land on -3.0, got {h}");
    }

    #[test]
    fn turn_to_heading_converges() {
        let mut h = 0.0_f32;
        for _ in 0..100 {
            h = turn_to_heading(h, 1.0, 0.05);
        }
        assert!((h - 1.0).abs() < 1e-4);
    }

    #[test]
    fn pivot_point_stays_fixed() {
        // Rotating the chassis about its fork point must leave the fork
        // point exactly where it was.
        let offset = 1.2_f32;
        let pos = Vec2::new(3.0, 4.0);
        let heading = 0.7_f32;
        let pivot = pos + Vec2::from_angle(heading) * offset;

        let (new_pos, new_heading) = rotate_about_pivot(pos, heading, pivot, 0.3);
        let new_pivot = new_pos + Vec2::from_angle(new_heading) * offset;
        assert!(pivot.distance(new_pivot) < 1e-5, "fork point drifted: {pivot} → {new_pivot}");
        assert!((new_heading - 1.0).abs() < 1e-6);
    }
}

// ── Proximity throttle ────────────────────────────────────────────────────────

#[cfg(test)]
mod proximity {
    use super::*;

    fn cfg(falloff: Falloff) -> ProximityConfig {
        ProximityConfig {
            sensor_radius: 4.0,
            hard_stop_dist: 1.0,
            falloff,
            avoidance_weight: 0.5,
            include_stations: false,
        }
    }

    #[test]
    fn open_floor_is_full_speed() {
        let t = assess(Vec2::ZERO, std::iter::empty(), &cfg(Falloff::Linear));
        assert_eq!(t, Throttle::OPEN);
    }

    #[test]
    fn beyond_sensor_radius_ignored() {
        let t = assess(Vec2::ZERO, [Vec2::new(4.5, 0.0)].into_iter(), &cfg(Falloff::Linear));
        assert_eq!(t.multiplier, 1.0);
        assert_eq!(t.avoid, Vec2::ZERO);
    }

    #[test]
    fn linear_ramp_midpoint() {
        // d = 2.5 → ramp = (2.5 - 1.0) / 3.0 = 0.5.
        let t = assess(Vec2::ZERO, [Vec2::new(2.5, 0.0)].into_iter(), &cfg(Falloff::Linear));
        assert!((t.multiplier - 0.5).abs() < 1e-6);
    }

    #[test]
    fn quadratic_ramp_is_squared() {
        let t = assess(Vec2::ZERO, [Vec2::new(2.5, 0.0)].into_iter(), &cfg(Falloff::Quadratic));
        assert!((t.multiplier - 0.25).abs() < 1e-6);
    }

    #[test]
    fn hard_stop_inside_minimum_distance() {
        let t = assess(Vec2::ZERO, [Vec2::new(0.8, 0.0)].into_iter(), &cfg(Falloff::Linear));
        assert_eq!(t.multiplier, 0.0);
    }

    #[test]
    fn minimum_across_neighbors_wins() {
        let neighbors = [Vec2::new(3.25, 0.0), Vec2::new(2.5, 0.0)];
        let t = assess(Vec2::ZERO, neighbors.into_iter(), &cfg(Falloff::Linear));
        assert!((t.multiplier - 0.5).abs() < 1e-6);
    }

    #[test]
    fn bias_points_away_from_congestion() {
        let t = assess(Vec2::ZERO, [Vec2::new(2.0, 0.0)].into_iter(), &cfg(Falloff::Linear));
        assert!(t.avoid.x < -0.99, "repulsion should point along -x, got {}", t.avoid);
    }

    #[test]
    fn multiplier_bounds_hold() {
        let mut rng = SimRng::new(9);
        for _ in 0..200 {
            let n = Vec2::new(rng.gen_range(-6.0..6.0), rng.gen_range(-6.0..6.0));
            let t = assess(Vec2::ZERO, [n].into_iter(), &cfg(Falloff::Quadratic));
            assert!((0.0..=1.0).contains(&t.multiplier), "multiplier {}", t.multiplier);
        }
    }
}

// ── State machine ─────────────────────────────────────────────────────────────

/// Everything a `StepCtx` borrows, owned in one place for tests.
struct World {
    registry: StationRegistry,
    locks: OccupancyLedger,
    board: OrderBoard,
    packages: PackageStore,
    profile: MotionProfile,
    proximity: ProximityConfig,
}

impl World {
    /// One pickup (guide +x → docking +y), one dropoff, one garage.
    fn new() -> Self {
        let mut b = LayoutBuilder::new();
        b.add_pickup(Vec2::new(0.0, 20.0), 0.0);
        b.add_dropoff(Vec2::new(30.0, 20.0), 0.0);
        b.add_garage(Vec2::new(15.0, 0.0), 0.0);
        let registry = b.fallback_marker(Vec2::new(15.0, 5.0)).build();
        let locks = OccupancyLedger::new(registry.len(), LockConfig::default());
        Self {
            registry,
            locks,
            board: OrderBoard::new(DispatchConfig::default()),
            packages: PackageStore::new(),
            profile: MotionProfile::default(),
            proximity: ProximityConfig::default(),
        }
    }

    fn ctx(&mut self, now: f64) -> StepCtx<'_> {
        StepCtx {
            registry: &self.registry,
            locks: &mut self.locks,
            board: &mut self.board,
            packages: &mut self.packages,
            profile: &self.profile,
            proximity: &self.proximity,
            now,
        }
    }

    fn spawn_order(&mut self, now: f64) -> agv_core::OrderId {
        let station = self.registry.pickups()[0];
        let mut rng = SimRng::new(1);
        self.board
            .try_spawn(&mut self.packages, station, &self.registry, now, &mut rng)
            .expect("spawn")
    }
}

fn vehicle_at(pos: Vec2, heading: f32, phase: Phase) -> Vehicle {
    let mut v = Vehicle::parked(VehicleId(0), agv_core::StationId(2), pos, heading);
    v.phase = phase;
    v
}

fn step(w: &mut World, v: &mut Vehicle, now: f64, dt: f64) -> Vec<StepEvent> {
    let mut events = Vec::new();
    let mut ctx = w.ctx(now);
    step_vehicle(v, &Throttle::OPEN, &mut ctx, dt, &mut events);
    events
}

#[cfg(test)]
mod machine {
    use super::*;

    #[test]
    fn idle_never_moves() {
        let mut w = World::new();
        let mut v = vehicle_at(Vec2::new(15.0, 0.0), 0.0, Phase::Idle);
        let before = v.clone();
        step(&mut w, &mut v, 0.0, 1.0);
        assert_eq!(v, before);
    }

    #[test]
    fn translate_claims_order_and_pickup_lock() {
        let mut w = World::new();
        let order = w.spawn_order(0.0);
        let mut v = vehicle_at(Vec2::new(15.0, 0.0), 0.0, Phase::Translate);

        let events = step(&mut w, &mut v, 0.0, 1.0 / 30.0);
        assert_eq!(v.order, Some(order));
        assert_eq!(w.board.get(order).unwrap().status, OrderStatus::InProgress);
        assert_eq!(w.board.get(order).unwrap().assigned_to, Some(v.id));
        let pickup = w.board.get(order).unwrap().pickup;
        assert_eq!(w.locks.occupant(pickup), Some(v.id));
        assert!(matches!(events[0], StepEvent::OrderAssigned { .. }));
    }

    #[test]
    fn translate_without_orders_heads_for_fallback_marker() {
        let mut w = World::new();
        let mut v = vehicle_at(Vec2::new(15.0, 10.0), -std::f32::consts::FRAC_PI_2, Phase::Translate);
        let d0 = v.pos.distance(w.registry.fallback_marker);
        for tick in 0..60 {
            step(&mut w, &mut v, tick as f64 / 30.0, 1.0 / 30.0);
        }
        let d1 = v.pos.distance(w.registry.fallback_marker);
        assert!(d1 < d0, "should close on the fallback marker: {d0} → {d1}");
    }

    #[test]
    fn throttle_multiplier_scales_translate_speed() {
        let mut w = World::new();
        w.spawn_order(0.0);
        let mut v = vehicle_at(Vec2::new(0.0, 0.0), std::f32::consts::FRAC_PI_2, Phase::Translate);

        let stopped = Throttle { multiplier: 0.0, avoid: Vec2::ZERO };
        let before = v.pos;
        let mut events = Vec::new();
        let mut ctx = w.ctx(0.0);
        step_vehicle(&mut v, &stopped, &mut ctx, 1.0 / 30.0, &mut events);
        assert_eq!(v.pos, before, "zero multiplier must stop forward motion");
    }

    #[test]
    fn rotate_snaps_within_angular_tolerance() {
        let mut w = World::new();
        let order = w.spawn_order(0.0);
        let station = w.registry.get(w.board.get(order).unwrap().pickup).unwrap().clone();

        let marker = w.registry.alignment_point(station.id).unwrap();
        let mut v = vehicle_at(marker, station.docking_heading() + 0.01, Phase::Rotate);
        v.order = Some(order);

        step(&mut w, &mut v, 0.0, 1.0 / 30.0);
        assert_eq!(v.phase, Phase::Approach);
        assert!((v.heading - station.docking_heading()).abs() < 1e-6, "heading snapped exactly");
    }

    #[test]
    fn rotate_without_order_skips_toward_queue_pull() {
        let mut w = World::new();
        let mut v = vehicle_at(Vec2::new(15.0, 5.0), 0.0, Phase::Rotate);
        step(&mut w, &mut v, 0.0, 1.0 / 30.0);
        assert_eq!(v.phase, Phase::Approach);
        step(&mut w, &mut v, 0.0, 1.0 / 30.0);
        assert_eq!(v.phase, Phase::Pickup);
    }

    #[test]
    fn pickup_attaches_package_and_records_dwell() {
        let mut w = World::new();
        let order = w.spawn_order(2.0);
        let pickup = w.board.get(order).unwrap().pickup;
        w.board.mark_in_progress(order, VehicleId(0));
        w.locks.try_acquire(pickup, VehicleId(0));

        let station = *w.registry.get(pickup).unwrap();
        let dock = station.position - station.docking_dir() * w.profile.approach_offset;
        let mut v = vehicle_at(dock, station.docking_heading(), Phase::Pickup);
        v.order = Some(order);

        // Raise the fork over a few ticks, then attach.
        let mut events = Vec::new();
        for tick in 0..100 {
            events.extend(step(&mut w, &mut v, 10.0 + tick as f64 * 0.1, 0.1));
            if v.phase != Phase::Pickup {
                break;
            }
        }
        assert_eq!(v.phase, Phase::DriveOut);
        assert!(v.cargo.is_some());
        assert_eq!(w.board.get(order).unwrap().status, OrderStatus::PickedUp);
        assert!(w.packages.slot(pickup).is_none(), "slot cleared");
        let dwell = events.iter().find_map(|e| match e {
            StepEvent::PackagePicked { dwell_secs, .. } => Some(*dwell_secs),
            _ => None,
        });
        // Spawned at t = 2.0, fork raised after 2 s of lifting from t = 10.0.
        assert!((dwell.unwrap() - 10.0).abs() < 0.11, "dwell {dwell:?}");
    }

    #[test]
    fn pickup_with_dry_queue_backs_out_gracefully() {
        let mut w = World::new();
        let mut v = vehicle_at(Vec2::new(15.0, 5.0), 0.0, Phase::Pickup);
        v.fork_height = w.profile.fork_raised;

        step(&mut w, &mut v, 0.0, 1.0 / 30.0);
        assert_eq!(v.phase, Phase::DriveOut);
        assert!(v.order.is_none());
        assert!(v.cargo.is_none());
        assert!(v.drive_out_target.is_some());
    }

    #[test]
    fn drive_out_releases_pickup_station() {
        let mut w = World::new();
        let order = w.spawn_order(0.0);
        let pickup = w.board.get(order).unwrap().pickup;
        w.board.mark_in_progress(order, VehicleId(0));
        w.locks.try_acquire(pickup, VehicleId(0));

        let mut v = vehicle_at(Vec2::new(0.0, 19.4), std::f32::consts::FRAC_PI_2, Phase::DriveOut);
        v.order = Some(order);
        v.drive_out_target = Some(Vec2::new(0.0, 14.4));

        for tick in 0..400 {
            step(&mut w, &mut v, tick as f64 * 0.1, 0.1);
            if v.phase != Phase::DriveOut {
                break;
            }
        }
        assert_eq!(v.phase, Phase::ToDelivery);
        assert_eq!(w.locks.occupant(pickup), None, "pickup lock released");
        assert_eq!(v.fork_height, 0.0, "fork lowered on the way out");
    }

    #[test]
    fn to_delivery_waits_while_dropoff_is_held() {
        let mut w = World::new();
        let order = w.spawn_order(0.0);
        let dropoff = w.board.get(order).unwrap().dropoff;
        w.board.mark_in_progress(order, VehicleId(0));
        w.locks.try_acquire(dropoff, VehicleId(7)); // someone else holds it

        let mut v = vehicle_at(Vec2::new(10.0, 10.0), 0.0, Phase::ToDelivery);
        v.order = Some(order);
        let before = v.pos;

        step(&mut w, &mut v, 0.0, 1.0);
        assert_eq!(v.pos, before, "no motion while the dropoff is occupied");
        assert_eq!(v.phase, Phase::ToDelivery);

        // Once released, the vehicle claims it and moves.
        w.locks.release(dropoff, 1.0);
        step(&mut w, &mut v, 1.0, 1.0 / 30.0);
        assert_eq!(w.locks.occupant(dropoff), Some(v.id));
        assert!(v.pos != before);
    }

    #[test]
    fn drop_sequence_deposits_then_completes() {
        let mut w = World::new();
        let order = w.spawn_order(0.0);
        let pickup = w.board.get(order).unwrap().pickup;
        let dropoff = w.board.get(order).unwrap().dropoff;
        w.board.mark_in_progress(order, VehicleId(0));
        let pkg = w.packages.take_from_station(pickup, VehicleId(0), 1.0).unwrap();
        w.board.mark_picked_up(order);
        w.locks.try_acquire(dropoff, VehicleId(0));

        let mut v = vehicle_at(Vec2::new(30.0, 19.0), 0.0, Phase::Drop);
        v.order = Some(order);
        v.cargo = Some(pkg);
        v.delivery_started_at = Some(1.0);
        v.fork_height = w.profile.fork_raised;

        // First tick: package set down, fork still raised, order not yet done.
        let events = step(&mut w, &mut v, 21.0, 0.1);
        assert!(v.cargo.is_none());
        assert!(matches!(events[0], StepEvent::PackageDropped { delivery_secs, .. }
            if (delivery_secs - 20.0).abs() < 1e-9));
        assert_eq!(w.board.get(order).unwrap().status, OrderStatus::PickedUp);

        // Lower the fork to zero; the order completes and the exit begins.
        let mut delivered = false;
        for tick in 0..40 {
            let events = step(&mut w, &mut v, 21.1 + tick as f64 * 0.1, 0.1);
            delivered |= events.iter().any(|e| matches!(e, StepEvent::OrderDelivered { .. }));
            if v.phase != Phase::Drop {
                break;
            }
        }
        assert!(delivered);
        assert_eq!(v.phase, Phase::DeliveryExit);
        assert!(v.order.is_none());
        assert_eq!(w.board.get(order).unwrap().status, OrderStatus::Delivered);
        assert_eq!(v.release_pending, Some(dropoff), "exit still owes the lock release");
    }

    #[test]
    fn drop_with_standby_heads_home() {
        let mut w = World::new();
        let mut v = vehicle_at(Vec2::new(30.0, 19.0), 0.0, Phase::Drop);
        v.standby_requested = true;
        v.fork_height = 0.0;

        step(&mut w, &mut v, 0.0, 0.1);
        assert_eq!(v.phase, Phase::ReturnToGarage);
    }

    #[test]
    fn delivery_exit_releases_and_rejoins_loop() {
        let mut w = World::new();
        let dropoff = w.registry.dropoffs()[0];
        w.locks.try_acquire(dropoff, VehicleId(0));

        let mut v = vehicle_at(Vec2::new(30.0, 19.0), std::f32::consts::FRAC_PI_2, Phase::DeliveryExit);
        v.release_pending = Some(dropoff);

        for tick in 0..400 {
            step(&mut w, &mut v, tick as f64 * 0.1, 0.1);
            if v.phase != Phase::DeliveryExit {
                break;
            }
        }
        assert_eq!(v.phase, Phase::Translate);
        assert_eq!(w.locks.occupant(dropoff), None);
        assert_eq!(v.release_pending, None);
    }

    #[test]
    fn return_to_garage_parks_and_clears_standby() {
        let mut w = World::new();
        let garage = w.registry.garages()[0];
        let home = w.registry.get(garage).unwrap().position;

        let mut v = vehicle_at(home + Vec2::new(0.0, 3.0), -std::f32::consts::FRAC_PI_2, Phase::ReturnToGarage);
        v.garage = garage;
        v.parked_heading = 0.0;
        v.standby_requested = true;

        let mut parked = false;
        for tick in 0..600 {
            let events = step(&mut w, &mut v, tick as f64 * 0.1, 0.1);
            parked |= events.iter().any(|e| matches!(e, StepEvent::Parked { .. }));
            if v.phase == Phase::Idle {
                break;
            }
        }
        assert!(parked, "vehicle should reach its slot");
        assert_eq!(v.phase, Phase::Idle);
        assert_eq!(v.pos, home);
        assert_eq!(v.heading, 0.0);
        assert!(!v.standby_requested);
    }
}
