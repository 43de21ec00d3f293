//! Per-frame orchestration.
//!
//! One frame is fully processed before the next begins: partition →
//! animal tracking → behavior inference → lifecycle update → snapshot →
//! alerts. All mutable state is owned here; external consumers only ever
//! receive copies.

use std::time::Instant;

use anyhow::Result;

use crate::alert::{Alert, AlertAggregator};
use crate::config::PipelineConfig;
use crate::detect::{ClassLabels, Detection, FrameObservations};
use crate::ids::MonotonicIds;
use crate::lifecycle::{DepositLedger, GreedyIouMatcher, NotificationSink, Snapshot};
use crate::track::{AnimalTracker, BehaviorDetector, NearestCentroidMatcher};

/// What one processing cycle hands to external consumers.
#[derive(Clone, Debug)]
pub struct CycleOutput {
    pub snapshot: Snapshot,
    pub alerts: Vec<Alert>,
}

pub struct Pipeline {
    classes: ClassLabels,
    tracker: AnimalTracker,
    behavior: BehaviorDetector,
    ledger: DepositLedger,
    alerts: AlertAggregator,
}

impl Pipeline {
    /// Build a pipeline. Fails on invalid configuration; no cycle runs
    /// against an unvalidated config.
    pub fn new(config: &PipelineConfig, sink: Box<dyn NotificationSink>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classes: config.classes.clone(),
            tracker: AnimalTracker::new(
                config.tracking.history_capacity,
                config.tracking.max_age,
                Box::new(NearestCentroidMatcher::new(
                    config.tracking.match_distance_gate,
                )),
                Box::new(MonotonicIds::new()),
            ),
            behavior: BehaviorDetector::new(config.behavior.clone()),
            ledger: DepositLedger::new(
                config.lifecycle.clone(),
                Box::new(GreedyIouMatcher::new(config.lifecycle.iou_threshold)),
                sink,
                Box::new(MonotonicIds::new()),
            ),
            alerts: AlertAggregator::new(config.alerts.clone()),
        })
    }

    /// Process one frame's detections at `now`.
    pub fn process(&mut self, detections: &[Detection], now: Instant) -> CycleOutput {
        let obs = FrameObservations::partition(detections, &self.classes);

        self.tracker.update(&obs.animals, now);
        let candidates = self.behavior.detect(self.tracker.tracks());
        self.ledger
            .update(&obs.deposits, &obs.persons, &candidates, now);

        let snapshot = self.ledger.snapshot();
        let alerts = self.alerts.update(&snapshot, now);

        log::info!(
            "status - active: {}, pending: {}, cleaned: {}, total: {}",
            snapshot.active.len(),
            snapshot.pending.len(),
            snapshot.cleaned_count,
            snapshot.total_deposits
        );

        CycleOutput { snapshot, alerts }
    }

    /// Current lifecycle view without advancing a cycle.
    pub fn snapshot(&self) -> Snapshot {
        self.ledger.snapshot()
    }
}
