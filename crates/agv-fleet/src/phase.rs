//! The per-vehicle motion phase.

/// One discrete state of the vehicle motion state machine.
///
/// Nominal cycle:
///
/// ```text
/// Idle → Translate → Rotate → Approach → Pickup → DriveOut
///      → ToDelivery → AlignDelivery → DeliveryCenter → Drop
///      → DeliveryExit → Translate (loop)
/// ```
///
/// with the alternate branch `Drop`/`DeliveryExit` → `ReturnToGarage` →
/// `Idle` when a standby request is pending.  Transitions are driven
/// exclusively by `agv_motion::step_vehicle`, except `Idle → Translate`
/// which an external activate command performs.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Parked; no motion until activated.
    #[default]
    Idle,
    /// Cruise toward the pickup alignment marker, claiming an order on the way.
    Translate,
    /// Turn to the pickup station's docking heading about the fork pivot.
    Rotate,
    /// Straight-line fine approach to the station face.
    Approach,
    /// Raise the fork and attach the package.
    Pickup,
    /// Back out of the station area, lowering the fork.
    DriveOut,
    /// Cruise toward the dropoff alignment marker (waits while it is occupied).
    ToDelivery,
    /// Turn to the delivery heading about the fork pivot.
    AlignDelivery,
    /// Fine approach to the deposit point, raising the fork.
    DeliveryCenter,
    /// Set the package down, then lower the fork.
    Drop,
    /// Drive clear of the dropoff and release it.
    DeliveryExit,
    /// Head home, park, and go idle.
    ReturnToGarage,
}

impl Phase {
    /// `true` in the open-floor cruise phases where the proximity throttle
    /// and avoidance bias apply.  Fine-maneuvering phases run unthrottled —
    /// station locking already serializes vehicles there.
    #[inline]
    pub fn is_free_travel(self) -> bool {
        matches!(self, Phase::Translate | Phase::ToDelivery | Phase::ReturnToGarage)
    }

    /// `true` while the vehicle is working a pickup station face.
    #[inline]
    pub fn is_at_pickup(self) -> bool {
        matches!(self, Phase::Rotate | Phase::Approach | Phase::Pickup | Phase::DriveOut)
    }

    /// `true` while the vehicle is working a dropoff station face.
    #[inline]
    pub fn is_at_dropoff(self) -> bool {
        matches!(
            self,
            Phase::AlignDelivery | Phase::DeliveryCenter | Phase::Drop | Phase::DeliveryExit
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Translate => "translate",
            Phase::Rotate => "rotate",
            Phase::Approach => "approach",
            Phase::Pickup => "pickup",
            Phase::DriveOut => "drive_out",
            Phase::ToDelivery => "to_delivery",
            Phase::AlignDelivery => "align_delivery",
            Phase::DeliveryCenter => "delivery_center",
            Phase::Drop => "drop",
            Phase::DeliveryExit => "delivery_exit",
            Phase::ReturnToGarage => "return_to_garage",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
