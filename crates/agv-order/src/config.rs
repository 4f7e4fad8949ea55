//! Dispatch tuning.

/// Knobs for package spawning and order retirement.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchConfig {
    /// Minimum seconds a pickup station stays empty after its package is
    /// collected before the next one may spawn.
    pub spawn_delay_secs: f64,

    /// Seconds a `Delivered` order stays in the live table before being
    /// purged (display grace window).
    pub delivered_grace_secs: f64,

    /// Seconds a deposited package remains in the world before removal.
    pub package_grace_secs: f64,

    /// Dwell-time tolerance for the near-maximum candidate set in
    /// [`OrderBoard::select_next`](crate::OrderBoard::select_next).  Orders
    /// within this many seconds of the oldest dwell compete on proximity
    /// instead of age.
    pub dwell_tolerance: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            spawn_delay_secs: 5.0,
            delivered_grace_secs: 2.0,
            package_grace_secs: 3.0,
            dwell_tolerance: 0.01,
        }
    }
}
