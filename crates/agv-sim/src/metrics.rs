//! Throughput and latency metrics.
//!
//! The aggregator is a read-only observer of the order board and vehicle
//! state: it accumulates the per-event counters from [`StepEvent`]s and, once
//! per tick, derives a [`MetricsSnapshot`] for display and output.  It never
//! influences dispatch or motion.

use agv_fleet::FleetStore;
use agv_motion::StepEvent;
use agv_order::{OrderBoard, OrderStatus};

/// Accumulated counters across the whole run.
#[derive(Debug, Default, Clone)]
pub struct MetricsAggregator {
    delivered_count: u64,
    picked_up_count: u64,
    dropped_count: u64,
    total_dwell_secs: f64,
    max_dwell_secs: f64,
    total_delivery_secs: f64,
    max_delivery_secs: f64,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tick's step events into the counters.
    pub fn absorb(&mut self, events: &[StepEvent]) {
        for event in events {
            match *event {
                StepEvent::PackagePicked { dwell_secs, .. } => {
                    self.picked_up_count += 1;
                    self.total_dwell_secs += dwell_secs;
                    self.max_dwell_secs = self.max_dwell_secs.max(dwell_secs);
                }
                StepEvent::PackageDropped { delivery_secs, .. } => {
                    self.dropped_count += 1;
                    self.total_delivery_secs += delivery_secs;
                    self.max_delivery_secs = self.max_delivery_secs.max(delivery_secs);
                }
                StepEvent::OrderDelivered { .. } => {
                    self.delivered_count += 1;
                }
                StepEvent::OrderAssigned { .. } | StepEvent::Parked { .. } => {}
            }
        }
    }

    /// Derive the per-tick snapshot.
    ///
    /// "Current" values are live maxima: the longest a package has been
    /// waiting right now, and the longest any in-flight delivery has been
    /// underway right now.
    pub fn sample(&self, board: &OrderBoard, fleet: &FleetStore, now: f64) -> MetricsSnapshot {
        let dwell_current = board
            .iter()
            .filter(|o| matches!(o.status, OrderStatus::Waiting | OrderStatus::InProgress))
            .map(|o| o.dwell_secs(now))
            .fold(0.0, f64::max);

        let delivery_current = fleet
            .iter()
            .filter_map(|v| v.delivery_started_at)
            .map(|t| now - t)
            .fold(0.0, f64::max);

        MetricsSnapshot {
            sim_time_secs: now,
            delivered_count: self.delivered_count,
            packages_per_minute: if now > 0.0 {
                self.delivered_count as f64 / (now / 60.0)
            } else {
                0.0
            },
            dwell_current_secs: dwell_current,
            dwell_avg_secs: mean(self.total_dwell_secs, self.picked_up_count),
            dwell_max_secs: self.max_dwell_secs,
            delivery_current_secs: delivery_current,
            delivery_avg_secs: mean(self.total_delivery_secs, self.dropped_count),
            delivery_max_secs: self.max_delivery_secs,
        }
    }
}

#[inline]
fn mean(total: f64, count: u64) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

/// One tick's aggregate metrics, as exposed to the UI layer and the output
/// writers.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSnapshot {
    pub sim_time_secs: f64,
    pub delivered_count: u64,
    /// Deliveries per simulated minute since start.
    pub packages_per_minute: f64,
    pub dwell_current_secs: f64,
    pub dwell_avg_secs: f64,
    pub dwell_max_secs: f64,
    pub delivery_current_secs: f64,
    pub delivery_avg_secs: f64,
    pub delivery_max_secs: f64,
}
