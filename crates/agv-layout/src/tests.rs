//! Unit tests for layout geometry and occupancy locking.

#[cfg(test)]
mod stations {
    use std::f32::consts::FRAC_PI_2;

    use agv_core::Vec2;

    use crate::{LayoutBuilder, StationKind};

    #[test]
    fn docking_heading_is_guide_plus_quarter_turn() {
        let mut b = LayoutBuilder::new();
        let id = b.add_pickup(Vec2::ZERO, 0.0);
        let reg = b.build();
        let s = reg.get(id).unwrap();
        assert!((s.docking_heading() - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn alignment_point_sits_in_front_of_the_face() {
        let mut b = LayoutBuilder::new();
        // Guide line along +x → docking heading +y → marker on the -y side.
        let id = b.add_pickup(Vec2::new(5.0, 5.0), 0.0);
        let reg = b.alignment_offset(3.0).build();
        let marker = reg.alignment_point(id).unwrap();
        assert!((marker.x - 5.0).abs() < 1e-5);
        assert!((marker.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn unknown_station_falls_back_to_global_marker() {
        let reg = LayoutBuilder::new()
            .fallback_marker(agv_core::Vec2::new(1.0, 2.0))
            .build();
        let marker = reg.alignment_point_or_fallback(agv_core::StationId(99));
        assert_eq!(marker, agv_core::Vec2::new(1.0, 2.0));
    }

    #[test]
    fn per_kind_lists_partition_the_arena() {
        let mut b = LayoutBuilder::new();
        b.add_pickup(Vec2::ZERO, 0.0);
        b.add_dropoff(Vec2::new(1.0, 0.0), 0.0);
        b.add_garage(Vec2::new(2.0, 0.0), 0.0);
        b.add_pickup(Vec2::new(3.0, 0.0), 0.0);
        let reg = b.build();
        assert_eq!(reg.pickups().len(), 2);
        assert_eq!(reg.dropoffs().len(), 1);
        assert_eq!(reg.garages().len(), 1);
        assert_eq!(reg.len(), 4);
        assert!(reg.iter().filter(|s| s.kind == StationKind::Pickup).count() == 2);
    }

    #[test]
    fn nearest_and_radius_queries() {
        let mut b = LayoutBuilder::new();
        let near = b.add_pickup(Vec2::new(1.0, 0.0), 0.0);
        b.add_dropoff(Vec2::new(10.0, 0.0), 0.0);
        let reg = b.build();

        assert_eq!(reg.nearest_station(Vec2::ZERO), Some(near));
        let within: Vec<_> = reg.stations_within(Vec2::ZERO, 5.0).collect();
        assert_eq!(within.len(), 1);
        assert_eq!(within[0], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn bounds_clamp() {
        use crate::Bounds;
        let b = Bounds::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert_eq!(b.clamp(Vec2::new(-1.0, 12.0)), Vec2::new(0.0, 10.0));
        assert!(b.contains(Vec2::new(5.0, 5.0)));
        assert!(!b.contains(Vec2::new(11.0, 5.0)));
    }
}

#[cfg(test)]
mod occupancy {
    use agv_core::{StationId, VehicleId};

    use crate::{LockConfig, OccupancyLedger};

    const S: StationId = StationId(0);
    const V0: VehicleId = VehicleId(0);
    const V1: VehicleId = VehicleId(1);

    fn ledger(cooldown: f64) -> OccupancyLedger {
        OccupancyLedger::new(2, LockConfig { reuse_cooldown_secs: cooldown })
    }

    #[test]
    fn single_occupancy_invariant() {
        let mut l = ledger(0.0);
        assert!(l.try_acquire(S, V0));
        assert!(!l.try_acquire(S, V1), "second vehicle must be refused");
        assert_eq!(l.occupant(S), Some(V0));
    }

    #[test]
    fn reacquire_by_holder_is_noop_success() {
        let mut l = ledger(0.0);
        assert!(l.try_acquire(S, V0));
        assert!(l.try_acquire(S, V0));
        assert_eq!(l.occupant(S), Some(V0));
    }

    #[test]
    fn release_is_idempotent() {
        let mut l = ledger(0.0);
        l.try_acquire(S, V0);
        l.release(S, 1.0);
        assert_eq!(l.occupant(S), None);
        // Releasing again must leave the ledger unoccupied, without error.
        l.release(S, 2.0);
        assert_eq!(l.occupant(S), None);
    }

    #[test]
    fn locked_for_others_not_for_holder() {
        let mut l = ledger(0.0);
        l.try_acquire(S, V0);
        assert!(l.is_locked(S, V1, 0.0));
        assert!(!l.is_locked(S, V0, 0.0));
    }

    #[test]
    fn zero_cooldown_frees_immediately() {
        let mut l = ledger(0.0);
        l.try_acquire(S, V0);
        l.release(S, 5.0);
        assert!(!l.is_locked(S, V1, 5.0));
    }

    #[test]
    fn cooldown_window_holds_station_back() {
        let mut l = ledger(10.0);
        l.try_acquire(S, V0);
        l.release(S, 100.0);
        assert!(l.is_locked(S, V1, 105.0), "inside the 10 s window");
        assert!(l.is_locked(S, V0, 105.0), "cooldown applies to the releaser too");
        assert!(!l.is_locked(S, V1, 110.0), "window elapsed");
        // A fresh ledger has no phantom cooldown at t = 0.
        let l2 = ledger(10.0);
        assert!(!l2.is_locked(S, V0, 0.0));
    }

    #[test]
    fn unknown_station_is_never_lockable() {
        let mut l = ledger(0.0);
        let ghost = StationId(42);
        assert!(!l.try_acquire(ghost, V0));
        assert!(!l.is_locked(ghost, V0, 0.0));
        l.release(ghost, 0.0); // no panic
    }
}
