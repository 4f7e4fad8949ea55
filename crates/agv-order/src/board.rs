//! The order board: spawn, priority selection, and status transitions.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use agv_core::{OrderId, SimRng, StationId, Vec2, VehicleId};
use agv_layout::{StationKind, StationRegistry};

use crate::{DispatchConfig, Order, OrderStatus, PackageStore};

/// Live order set: lookup map + FIFO queue of `Waiting` orders.
///
/// See the [crate docs](crate) for why both structures exist.
pub struct OrderBoard {
    orders: FxHashMap<OrderId, Order>,
    /// `Waiting` orders in spawn order.  An order leaves the queue when it is
    /// assigned ([`select_next`](Self::select_next) /
    /// [`mark_in_progress`](Self::mark_in_progress)) or pulled directly by
    /// the Pickup phase ([`pop_waiting`](Self::pop_waiting)).
    queue: VecDeque<OrderId>,
    cfg: DispatchConfig,
    next_id: u32,
}

impl OrderBoard {
    pub fn new(cfg: DispatchConfig) -> Self {
        Self {
            orders: FxHashMap::default(),
            queue: VecDeque::new(),
            cfg,
            next_id: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &DispatchConfig {
        &self.cfg
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    /// Spawn a package and matching order at `station` if the slot is empty
    /// and the refill delay has elapsed.
    ///
    /// The boundary is inclusive: with a 5 s delay and removal at `t0`, the
    /// spawn fires at `t0 + 5.0`, not before.  The dropoff is drawn
    /// uniformly from `rng` — the board's only use of randomness.
    ///
    /// Returns the new order's ID, or `None` when nothing spawned (slot
    /// occupied, delay pending, non-pickup station, or no dropoffs exist).
    pub fn try_spawn(
        &mut self,
        packages: &mut PackageStore,
        station: StationId,
        registry: &StationRegistry,
        now: f64,
        rng: &mut SimRng,
    ) -> Option<OrderId> {
        match registry.get(station) {
            Some(s) if s.kind == StationKind::Pickup => {}
            _ => return None,
        }
        if packages.slot(station).is_some() {
            return None;
        }
        if now - packages.last_removed_at(station) < self.cfg.spawn_delay_secs {
            return None;
        }
        let dropoff = *rng.choose(registry.dropoffs())?;

        let package = packages.spawn_at(station, now);
        let id = OrderId(self.next_id);
        self.next_id += 1;
        self.orders.insert(
            id,
            Order {
                id,
                status: OrderStatus::Waiting,
                pickup: station,
                dropoff,
                package,
                spawned_at: now,
                assigned_to: None,
                delivered_at: None,
            },
        );
        self.queue.push_back(id);
        Some(id)
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// Pick the best `Waiting` order for a vehicle at `vehicle_pos`.
    ///
    /// Two-level priority, age dominating:
    ///
    /// 1. find the maximum dwell time over all waiting orders;
    /// 2. collect the candidates within `dwell_tolerance` of that maximum
    ///    (a near-maximum *set*, not a strict argmax);
    /// 3. among candidates, return the one whose pickup station is closest
    ///    (Euclidean) to `vehicle_pos`.
    ///
    /// Equal distances resolve to the older order because candidates are
    /// scanned in spawn order.  Returns `None` when nothing is waiting.
    /// The winner stays `Waiting` — callers follow up with
    /// [`mark_in_progress`](Self::mark_in_progress).
    pub fn select_next(
        &self,
        vehicle_pos: Vec2,
        now: f64,
        registry: &StationRegistry,
    ) -> Option<OrderId> {
        let max_dwell = self
            .queue
            .iter()
            .filter_map(|id| self.orders.get(id))
            .map(|o| o.dwell_secs(now))
            .fold(f64::NEG_INFINITY, f64::max);
        if max_dwell == f64::NEG_INFINITY {
            return None;
        }

        let mut best: Option<(OrderId, f32)> = None;
        for order in self.queue.iter().filter_map(|id| self.orders.get(id)) {
            if max_dwell - order.dwell_secs(now) > self.cfg.dwell_tolerance {
                continue;
            }
            let dist = match registry.get(order.pickup) {
                Some(s) => vehicle_pos.distance_sq(s.position),
                // Unresolvable station: rank last rather than fault.
                None => f32::INFINITY,
            };
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((order.id, dist)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Pull the oldest `Waiting` order, FIFO.  The Pickup phase uses this
    /// when a vehicle reaches the fork-raised point without an assigned
    /// order; an empty queue is a normal outcome, not an error.
    pub fn pop_waiting(&mut self) -> Option<OrderId> {
        self.queue.pop_front()
    }

    /// The oldest `Waiting` order without removing it.  The manual
    /// "deliver first waiting order" trigger peeks here before it knows
    /// whether an idle vehicle exists to take the job.
    pub fn peek_waiting(&self) -> Option<OrderId> {
        self.queue.front().copied()
    }

    // ── Status transitions ────────────────────────────────────────────────
    //
    // All transitions tolerate unknown IDs (no-op): the state machine is
    // advisory and self-correcting, and a stale ID must never fault it.

    /// `Waiting → InProgress`: record the assigned vehicle and drop the
    /// order from the FIFO queue.
    pub fn mark_in_progress(&mut self, id: OrderId, vehicle: VehicleId) {
        if let Some(order) = self.orders.get_mut(&id) {
            order.status = OrderStatus::InProgress;
            order.assigned_to = Some(vehicle);
        }
        self.queue.retain(|&q| q != id);
    }

    /// `InProgress → PickedUp`.
    pub fn mark_picked_up(&mut self, id: OrderId) {
        if let Some(order) = self.orders.get_mut(&id) {
            order.status = OrderStatus::PickedUp;
        }
    }

    /// `PickedUp → Delivered`, stamping the delivery time.
    pub fn mark_delivered(&mut self, id: OrderId, now: f64) {
        if let Some(order) = self.orders.get_mut(&id) {
            order.status = OrderStatus::Delivered;
            order.delivered_at = Some(now);
        }
    }

    /// Drop `Delivered` orders whose display grace window has elapsed.
    /// Returns how many were removed.
    pub fn purge_delivered(&mut self, now: f64) -> usize {
        let grace = self.cfg.delivered_grace_secs;
        let before = self.orders.len();
        self.orders.retain(|_, o| match (o.status, o.delivered_at) {
            (OrderStatus::Delivered, Some(at)) => now - at < grace,
            _ => true,
        });
        before - self.orders.len()
    }

    // ── Read access ───────────────────────────────────────────────────────

    #[inline]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// The live order table in ID order, for external display.
    pub fn live_table(&self) -> Vec<&Order> {
        let mut rows: Vec<&Order> = self.orders.values().collect();
        rows.sort_by_key(|o| o.id);
        rows
    }

    /// Number of `Waiting` orders.
    pub fn waiting_count(&self) -> usize {
        self.queue.len()
    }

    /// Total live orders (all statuses, pre-purge).
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Iterator over all live orders (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Order> + '_ {
        self.orders.values()
    }
}
