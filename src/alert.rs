//! Alert generation from successive lifecycle snapshots.

use std::collections::HashSet;
use std::time::Instant;

use serde::Serialize;

use crate::config::AlertSettings;
use crate::geometry::Point;
use crate::lifecycle::Snapshot;

/// One-way alert; the aggregator holds no acknowledgment state.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    /// A deposit id seen for the first time. Edge-triggered.
    NewDeposit { id: u64, location: Point },
    /// cleaned_count rose since the last call; carries the positive delta.
    Cleanup { count: u64 },
    /// An active deposit older than the configured threshold. Re-emitted
    /// every call while the condition holds.
    Aged {
        id: u64,
        location: Point,
        age_secs: u64,
    },
}

/// Diffs successive snapshots into alert batches.
pub struct AlertAggregator {
    settings: AlertSettings,
    known_ids: HashSet<u64>,
    last_cleaned_count: u64,
}

impl AlertAggregator {
    pub fn new(settings: AlertSettings) -> Self {
        Self {
            settings,
            known_ids: HashSet::new(),
            last_cleaned_count: 0,
        }
    }

    pub fn update(&mut self, snapshot: &Snapshot, now: Instant) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if self.settings.new_deposit {
            for deposit in &snapshot.active {
                if self.known_ids.insert(deposit.id) {
                    log::warn!("ALERT: new deposit {}", deposit.id);
                    alerts.push(Alert::NewDeposit {
                        id: deposit.id,
                        location: deposit.location,
                    });
                }
            }
        }

        if self.settings.cleanup && snapshot.cleaned_count > self.last_cleaned_count {
            let count = snapshot.cleaned_count - self.last_cleaned_count;
            log::info!("ALERT: {} deposit(s) cleaned up", count);
            alerts.push(Alert::Cleanup { count });
        }
        self.last_cleaned_count = snapshot.cleaned_count;

        for deposit in &snapshot.active {
            let age = deposit.age(now);
            if age >= self.settings.aged_threshold {
                log::warn!(
                    "ALERT: deposit {} unaddressed for {}s at ({:.1}, {:.1})",
                    deposit.id,
                    age.as_secs(),
                    deposit.location.x,
                    deposit.location.y
                );
                alerts.push(Alert::Aged {
                    id: deposit.id,
                    location: deposit.location,
                    age_secs: age.as_secs(),
                });
            }
        }

        alerts
    }
}
