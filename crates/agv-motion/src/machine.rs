//! The per-vehicle motion state machine.
//!
//! One authoritative transition function per phase, dispatched by a single
//! `match` in [`step_vehicle`].  Each function advances the pose by at most
//! one tick's worth of motion and performs the phase's bookkeeping against
//! the order board, package store, and occupancy ledger.
//!
//! # Fault tolerance
//!
//! Every phase tolerates missing preconditions:
//!
//! - no current order → steer at the fallback marker, or skip forward in the
//!   cycle to where the FIFO fallback pull lives (Pickup);
//! - empty package slot / unknown station → benign miss, keep cycling;
//! - lock releases are idempotent, double-release is harmless.
//!
//! Nothing in here returns an error; a step that can make no progress is a
//! no-op and the vehicle re-polls next tick.

use agv_core::{Vec2, angle_diff};
use agv_fleet::{Phase, Vehicle};
use agv_layout::{OccupancyLedger, Station, StationRegistry};
use agv_order::{OrderBoard, PackageStore};

use crate::control::{rotate_about_pivot, steer_toward};
use crate::proximity::{ProximityConfig, Throttle};
use crate::{MotionProfile, StepEvent};

/// Everything a vehicle step may read or mutate, borrowed for one tick.
///
/// The scheduler constructs one `StepCtx` per tick and steps every vehicle
/// through it sequentially, so cross-vehicle effects (lock claims, queue
/// pops) are visible to later vehicles in the same tick.
pub struct StepCtx<'a> {
    pub registry: &'a StationRegistry,
    pub locks: &'a mut OccupancyLedger,
    pub board: &'a mut OrderBoard,
    pub packages: &'a mut PackageStore,
    pub profile: &'a MotionProfile,
    pub proximity: &'a ProximityConfig,
    /// Simulation timestamp at this tick.
    pub now: f64,
}

/// Advance one vehicle by one tick.
///
/// `throttle` is this vehicle's proximity assessment from the tick-start
/// position snapshot; it only applies in the free-travel phases.  Emitted
/// [`StepEvent`]s are appended to `events`.
pub fn step_vehicle(
    v: &mut Vehicle,
    throttle: &Throttle,
    ctx: &mut StepCtx<'_>,
    dt: f64,
    events: &mut Vec<StepEvent>,
) {
    let dt = dt as f32;
    match v.phase {
        Phase::Idle => {}
        Phase::Translate => translate(v, throttle, ctx, dt, events),
        Phase::Rotate => rotate(v, ctx, dt),
        Phase::Approach => approach(v, ctx, dt),
        Phase::Pickup => pickup(v, ctx, dt, events),
        Phase::DriveOut => drive_out(v, ctx, dt),
        Phase::ToDelivery => to_delivery(v, throttle, ctx, dt),
        Phase::AlignDelivery => align_delivery(v, ctx, dt),
        Phase::DeliveryCenter => delivery_center(v, ctx, dt),
        Phase::Drop => drop_cargo(v, ctx, dt, events),
        Phase::DeliveryExit => delivery_exit(v, ctx, dt),
        Phase::ReturnToGarage => return_to_garage(v, throttle, ctx, dt, events),
    }
}

// ── Shared motion helpers ─────────────────────────────────────────────────────

/// Proportional heading-then-forward-motion step used by the free-travel
/// phases.  Steering measures from the fork-offset point; speed is scaled by
/// the throttle multiplier and the position is clamped into the world bound.
fn cruise_step(
    v: &mut Vehicle,
    target: Vec2,
    speed: f32,
    throttle: &Throttle,
    ctx: &StepCtx<'_>,
    dt: f32,
) {
    let p = ctx.profile;
    let fork = v.fork_point(p.fork_offset);
    let seek = (target - fork).normalize_or(v.heading_dir());
    let dir = blend_avoidance(seek, throttle, ctx.proximity);
    v.heading = steer_toward(v.heading, dir, p.heading_gain * dt);
    v.pos += v.heading_dir() * (speed * throttle.multiplier * dt);
    v.pos = ctx.registry.bounds.clamp(v.pos);
}

/// Blend the repulsive bias into the seek direction at the configured
/// weight.  With no bias (or a zero weight) the seek direction passes
/// through unchanged.
fn blend_avoidance(seek: Vec2, throttle: &Throttle, cfg: &ProximityConfig) -> Vec2 {
    if throttle.avoid == Vec2::ZERO || cfg.avoidance_weight <= 0.0 {
        return seek;
    }
    let w = cfg.avoidance_weight.clamp(0.0, 1.0);
    (seek * (1.0 - w) + throttle.avoid * w).normalize_or(seek)
}

/// The station this vehicle's current order picks up from, if resolvable.
fn pickup_station(v: &Vehicle, ctx: &StepCtx<'_>) -> Option<Station> {
    let order = ctx.board.get(v.order?)?;
    ctx.registry.get(order.pickup).copied()
}

/// The station this vehicle's current order delivers to, if resolvable.
fn dropoff_station(v: &Vehicle, ctx: &StepCtx<'_>) -> Option<Station> {
    let order = ctx.board.get(v.order?)?;
    ctx.registry.get(order.dropoff).copied()
}

/// Remember a reverse-out point behind the chassis and enter an exit phase.
fn begin_exit(v: &mut Vehicle, profile: &MotionProfile, phase: Phase) {
    v.drive_out_target = Some(v.pos - v.heading_dir() * profile.drive_out_dist);
    v.phase = phase;
}

/// Straight-line reverse toward the remembered exit point (heading
/// unchanged).  Returns `true` on arrival.
fn reverse_step(v: &mut Vehicle, profile: &MotionProfile, dt: f32) -> bool {
    let target = match v.drive_out_target {
        Some(t) => t,
        None => {
            // Entered an exit phase without a remembered point (graceful
            // fallback path); derive one now.
            let t = v.pos - v.heading_dir() * profile.drive_out_dist;
            v.drive_out_target = Some(t);
            t
        }
    };
    if v.pos.distance(target) <= profile.drive_out_arrive {
        v.drive_out_target = None;
        return true;
    }
    let dir = (target - v.pos).normalize_or(-v.heading_dir());
    v.pos += dir * (profile.drive_out_speed * dt);
    false
}

// ── Phase transition functions ────────────────────────────────────────────────

/// Translate: claim the best waiting order, then cruise to its pickup
/// alignment marker (or the global fallback marker with no order).
fn translate(
    v: &mut Vehicle,
    throttle: &Throttle,
    ctx: &mut StepCtx<'_>,
    dt: f32,
    events: &mut Vec<StepEvent>,
) {
    let p = ctx.profile;

    // A standby request with nothing in flight short-circuits the search
    // loop; with an order in flight it is honored after the drop instead.
    if v.standby_requested && v.order.is_none() {
        v.phase = Phase::ReturnToGarage;
        return;
    }

    if v.order.is_none() {
        if let Some(id) = ctx.board.select_next(v.pos, ctx.now, ctx.registry) {
            ctx.board.mark_in_progress(id, v.id);
            v.order = Some(id);
            if let Some(pickup) = ctx.board.get(id).map(|o| o.pickup) {
                ctx.locks.try_acquire(pickup, v.id);
            }
            events.push(StepEvent::OrderAssigned { order: id, vehicle: v.id });
        }
    }

    let target = match pickup_station(v, ctx) {
        Some(s) => ctx.registry.alignment_point_or_fallback(s.id),
        None => ctx.registry.fallback_marker,
    };

    if v.fork_point(p.fork_offset).distance(target) <= p.translate_arrive {
        v.phase = Phase::Rotate;
        return;
    }
    cruise_step(v, target, p.cruise_speed, throttle, ctx, dt);
}

/// Rotate: align to the pickup docking heading, pivoting about the fork
/// point.  Snaps exactly when close to the station or within the angular
/// tolerance.
fn rotate(v: &mut Vehicle, ctx: &mut StepCtx<'_>, dt: f32) {
    let p = ctx.profile;
    let Some(station) = pickup_station(v, ctx) else {
        // No station to align to; the queue-pull fallback lives in Pickup.
        v.phase = Phase::Approach;
        return;
    };

    let target_heading = station.docking_heading();
    let err = angle_diff(target_heading, v.heading);
    if v.pos.distance(station.position) <= p.rotate_stop_radius || err.abs() < p.rotate_snap_tol {
        v.heading = target_heading;
        v.phase = Phase::Approach;
        return;
    }

    let dtheta = err.clamp(-p.rotate_rate * dt, p.rotate_rate * dt);
    let pivot = v.fork_point(p.fork_offset);
    (v.pos, v.heading) = rotate_about_pivot(v.pos, v.heading, pivot, dtheta);
}

/// Approach: straight line to the stand-off point in front of the station
/// face.
fn approach(v: &mut Vehicle, ctx: &mut StepCtx<'_>, dt: f32) {
    let p = ctx.profile;
    let Some(station) = pickup_station(v, ctx) else {
        v.phase = Phase::Pickup;
        return;
    };

    let target = station.position - station.docking_dir() * p.approach_offset;
    if v.pos.distance(target) <= p.approach_arrive {
        v.phase = Phase::Pickup;
        return;
    }
    let dir = (target - v.pos).normalize_or(v.heading_dir());
    v.pos += dir * (p.approach_speed * dt);
}

/// Pickup: raise the fork, then attach the package.  A vehicle that arrives
/// orderless pulls the oldest waiting order FIFO; if the queue is dry it
/// backs out empty rather than faulting.
fn pickup(v: &mut Vehicle, ctx: &mut StepCtx<'_>, dt: f32, events: &mut Vec<StepEvent>) {
    let p = ctx.profile;

    if v.fork_height < p.fork_raised {
        v.fork_height = (v.fork_height + p.fork_rate * dt).min(p.fork_raised);
        if v.fork_height < p.fork_raised {
            return;
        }
    }

    if v.order.is_none() {
        match ctx.board.pop_waiting() {
            Some(id) => {
                ctx.board.mark_in_progress(id, v.id);
                v.order = Some(id);
                if let Some(pickup) = ctx.board.get(id).map(|o| o.pickup) {
                    ctx.locks.try_acquire(pickup, v.id);
                }
                events.push(StepEvent::OrderAssigned { order: id, vehicle: v.id });
            }
            None => {
                begin_exit(v, p, Phase::DriveOut);
                return;
            }
        }
    }

    // A vehicle that somehow still carries cargo must not double-attach.
    if v.cargo.is_none() {
        let attach = v
            .order
            .and_then(|id| ctx.board.get(id))
            .map(|o| (o.id, o.pickup, o.spawned_at));
        if let Some((id, pickup, spawned_at)) = attach {
            if let Some(pkg) = ctx.packages.take_from_station(pickup, v.id, ctx.now) {
                v.cargo = Some(pkg);
                v.delivery_started_at = Some(ctx.now);
                ctx.board.mark_picked_up(id);
                events.push(StepEvent::PackagePicked { order: id, dwell_secs: ctx.now - spawned_at });
            }
        }
    }

    begin_exit(v, p, Phase::DriveOut);
}

/// DriveOut: lower the fork while backing away, then release the pickup
/// station.
fn drive_out(v: &mut Vehicle, ctx: &mut StepCtx<'_>, dt: f32) {
    let p = ctx.profile;
    v.fork_height = (v.fork_height - p.fork_rate * dt).max(0.0);

    if reverse_step(v, p, dt) {
        if let Some(station) = pickup_station(v, ctx) {
            ctx.locks.release(station.id, ctx.now);
        }
        v.phase = Phase::ToDelivery;
    }
}

/// ToDelivery: cruise to the dropoff alignment marker, waiting in place
/// while the station belongs to someone else.
fn to_delivery(v: &mut Vehicle, throttle: &Throttle, ctx: &mut StepCtx<'_>, dt: f32) {
    let p = ctx.profile;
    let Some(station) = dropoff_station(v, ctx) else {
        // Nothing to deliver; rejoin the search loop.
        v.phase = Phase::Translate;
        return;
    };

    if ctx.locks.is_locked(station.id, v.id, ctx.now) {
        return; // no motion; re-poll next tick
    }
    // Claim it for the whole docking sequence before committing to the
    // crossing.
    ctx.locks.try_acquire(station.id, v.id);

    let target = ctx.registry.alignment_point_or_fallback(station.id);
    if v.fork_point(p.fork_offset).distance(target) <= p.delivery_arrive {
        v.phase = Phase::AlignDelivery;
        return;
    }
    cruise_step(v, target, p.cruise_speed, throttle, ctx, dt);
}

/// AlignDelivery: turn to the delivery docking heading about the fork pivot.
fn align_delivery(v: &mut Vehicle, ctx: &mut StepCtx<'_>, dt: f32) {
    let p = ctx.profile;
    let Some(station) = dropoff_station(v, ctx) else {
        v.phase = Phase::DeliveryCenter;
        return;
    };

    let target_heading = station.docking_heading();
    let err = angle_diff(target_heading, v.heading);
    if err.abs() < p.align_tol {
        v.heading = target_heading;
        v.phase = Phase::DeliveryCenter;
        return;
    }

    let dtheta = err.clamp(-p.align_rate * dt, p.align_rate * dt);
    let pivot = v.fork_point(p.fork_offset);
    (v.pos, v.heading) = rotate_about_pivot(v.pos, v.heading, pivot, dtheta);
}

/// DeliveryCenter: raise the fork while translating to the fine-approach
/// point offset from the dropoff marker.
fn delivery_center(v: &mut Vehicle, ctx: &mut StepCtx<'_>, dt: f32) {
    let p = ctx.profile;
    v.fork_height = (v.fork_height + p.fork_rate * dt).min(p.fork_raised);

    let Some(station) = dropoff_station(v, ctx) else {
        v.phase = Phase::Drop;
        return;
    };

    let marker = ctx.registry.alignment_point_or_fallback(station.id);
    let forward = station.docking_dir();
    let target = marker + forward * p.center_forward + forward.perp() * p.center_lateral;

    if v.pos.distance(target) <= p.center_arrive {
        v.phase = Phase::Drop;
        return;
    }
    let dir = (target - v.pos).normalize_or(v.heading_dir());
    v.pos += dir * (p.approach_speed * dt);
}

/// Drop: set the package down first, then lower the fork; once lowered,
/// complete the order and leave (home if standby was requested).
fn drop_cargo(v: &mut Vehicle, ctx: &mut StepCtx<'_>, dt: f32, events: &mut Vec<StepEvent>) {
    let p = ctx.profile;

    if let Some(pkg) = v.cargo.take() {
        ctx.packages.deposit(pkg, v.fork_point(p.fork_offset), ctx.now);
        if let (Some(id), Some(started)) = (v.order, v.delivery_started_at.take()) {
            events.push(StepEvent::PackageDropped { order: id, delivery_secs: ctx.now - started });
        }
        return; // fork still raised; lower over the following ticks
    }

    v.fork_height = (v.fork_height - p.fork_rate * dt).max(0.0);
    if v.fork_height > 0.0 {
        return;
    }

    // Remember the dropoff before the order is cleared so the exit phase
    // knows what lock to release.
    v.release_pending = dropoff_station(v, ctx).map(|s| s.id);
    if let Some(id) = v.order.take() {
        ctx.board.mark_delivered(id, ctx.now);
        events.push(StepEvent::OrderDelivered { order: id });
    }

    if v.standby_requested {
        v.phase = Phase::ReturnToGarage;
    } else {
        begin_exit(v, p, Phase::DeliveryExit);
    }
}

/// DeliveryExit: back away from the dropoff, release it, and rejoin the
/// search loop.
fn delivery_exit(v: &mut Vehicle, ctx: &mut StepCtx<'_>, dt: f32) {
    let p = ctx.profile;
    if reverse_step(v, p, dt) {
        if let Some(station) = v.release_pending.take() {
            ctx.locks.release(station, ctx.now);
        }
        v.phase = if v.standby_requested { Phase::ReturnToGarage } else { Phase::Translate };
    }
}

/// ReturnToGarage: home to the assigned garage slot, restore the parked
/// heading, and go idle.
///
/// Homing is a straight-line translation (not fork-point steering): the
/// chassis itself must land on the slot, and straight-line motion converges
/// for any starting pose.
fn return_to_garage(
    v: &mut Vehicle,
    throttle: &Throttle,
    ctx: &mut StepCtx<'_>,
    dt: f32,
    events: &mut Vec<StepEvent>,
) {
    let p = ctx.profile;

    // Came straight from Drop: the dropoff lock is still ours.
    if let Some(station) = v.release_pending.take() {
        ctx.locks.release(station, ctx.now);
    }

    let Some(garage) = ctx.registry.get(v.garage).copied() else {
        v.phase = Phase::Idle;
        v.standby_requested = false;
        return;
    };

    if v.pos.distance(garage.position) <= p.return_arrive {
        v.pos = garage.position;
        v.heading = v.parked_heading;
        v.phase = Phase::Idle;
        v.standby_requested = false;
        events.push(StepEvent::Parked { vehicle: v.id });
        return;
    }

    let dir = (garage.position - v.pos).normalize_or(v.heading_dir());
    v.pos += dir * (p.return_speed * throttle.multiplier * dt);
    v.pos = ctx.registry.bounds.clamp(v.pos);
}
