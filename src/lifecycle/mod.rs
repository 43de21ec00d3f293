//! Deposit lifecycle.
//!
//! The ledger owns the persistent deposit entities and drives their state
//! machine: pending (behaviorally inferred) → active (visually confirmed) →
//! cleaned (person-proximity streak), forward only. Any state can also be
//! silently abandoned on staleness, which is a removal, never a transition.

mod matcher;
mod notify;

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::LifecycleSettings;
use crate::detect::Detection;
use crate::geometry::{BoundingBox, Point};
use crate::ids::IdProvider;

pub use matcher::{DepositMatcher, GreedyIouMatcher};
pub use notify::{ChannelSink, Notification, NotificationSink, NullSink};

/// How close a person's center must be to an unmatched deposit for the cycle
/// to count toward the cleanup streak, in detection coordinate units.
const PERSON_PROXIMITY_RADIUS: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    /// Inferred from behavior, awaiting visual confirmation.
    Pending,
    /// Visually confirmed, awaiting cleanup.
    Active,
    /// Inferred removed. Terminal; pruned at the end of the update.
    Cleaned,
}

/// One real-world soiling event requiring cleanup.
#[derive(Clone, Debug)]
pub struct Deposit {
    pub id: u64,
    pub location: Point,
    /// Degenerate (zero-area) until visually confirmed.
    pub bbox: BoundingBox,
    pub first_seen: Instant,
    pub last_seen: Instant,
    pub status: DepositStatus,
    /// Consecutive cycles without a visual match.
    pub missing_frames: u32,
    /// Consecutive unmatched cycles with a person nearby.
    pub cleanup_streak: u32,
}

impl Deposit {
    pub fn age(&self, now: Instant) -> Duration {
        now.duration_since(self.first_seen)
    }
}

/// Read-only view of the ledger, handed to external consumers as a copy.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub active: Vec<Deposit>,
    pub pending: Vec<Deposit>,
    pub cleaned_count: u64,
    pub total_deposits: u64,
}

/// Serializable snapshot for the external transport seam.
#[derive(Clone, Debug, Serialize)]
pub struct SnapshotSummary {
    pub active: Vec<DepositSummary>,
    pub pending: Vec<DepositSummary>,
    pub cleaned_count: u64,
    pub total_deposits: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct DepositSummary {
    pub id: u64,
    pub location: Point,
    pub bbox: BoundingBox,
    pub status: DepositStatus,
    pub age_secs: u64,
}

impl SnapshotSummary {
    pub fn new(snapshot: &Snapshot, now: Instant) -> Self {
        let summarize = |deposits: &[Deposit]| {
            deposits
                .iter()
                .map(|d| DepositSummary {
                    id: d.id,
                    location: d.location,
                    bbox: d.bbox,
                    status: d.status,
                    age_secs: d.age(now).as_secs(),
                })
                .collect()
        };
        Self {
            active: summarize(&snapshot.active),
            pending: summarize(&snapshot.pending),
            cleaned_count: snapshot.cleaned_count,
            total_deposits: snapshot.total_deposits,
        }
    }
}

/// Owns the live deposit set and its lifecycle counters.
pub struct DepositLedger {
    deposits: Vec<Deposit>,
    cleaned_count: u64,
    total_deposits: u64,
    settings: LifecycleSettings,
    matcher: Box<dyn DepositMatcher>,
    sink: Box<dyn NotificationSink>,
    ids: Box<dyn IdProvider>,
}

impl DepositLedger {
    pub fn new(
        settings: LifecycleSettings,
        matcher: Box<dyn DepositMatcher>,
        sink: Box<dyn NotificationSink>,
        ids: Box<dyn IdProvider>,
    ) -> Self {
        Self {
            deposits: Vec::new(),
            cleaned_count: 0,
            total_deposits: 0,
            settings,
            matcher,
            sink,
            ids,
        }
    }

    /// Fold one frame's deposit detections, person detections, and inferred
    /// event points into the ledger.
    pub fn update(
        &mut self,
        deposit_detections: &[Detection],
        person_detections: &[Detection],
        candidate_points: &[Point],
        now: Instant,
    ) {
        let assignments = self.matcher.assign(&self.deposits, deposit_detections);
        let mut claimed = vec![false; deposit_detections.len()];

        for index in 0..self.deposits.len() {
            match assignments[index] {
                Some(detection_index) => {
                    claimed[detection_index] = true;
                    self.apply_match(index, &deposit_detections[detection_index], now);
                }
                None => self.apply_miss(index, person_detections),
            }
        }

        for (index, detection) in deposit_detections.iter().enumerate() {
            if !claimed[index] {
                self.create_active(detection, now);
            }
        }

        for point in candidate_points {
            self.create_pending(*point, now);
        }

        self.prune();
    }

    /// Refresh a matched deposit; promote pending to active exactly once.
    fn apply_match(&mut self, index: usize, detection: &Detection, now: Instant) {
        let deposit = &mut self.deposits[index];
        deposit.bbox = detection.bbox;
        deposit.location = detection.center();
        deposit.last_seen = now;
        deposit.missing_frames = 0;
        deposit.cleanup_streak = 0;

        if deposit.status == DepositStatus::Pending {
            deposit.status = DepositStatus::Active;
            let (id, location) = (deposit.id, deposit.location);
            log::info!("deposit {} confirmed as active", id);
            self.notify(Notification::Confirmed { id, location });
        }
    }

    /// An unmatched deposit ages; a sustained person-proximity streak on an
    /// active deposit infers cleanup.
    fn apply_miss(&mut self, index: usize, person_detections: &[Detection]) {
        let deposit = &mut self.deposits[index];
        deposit.missing_frames += 1;

        if person_nearby(deposit.location, person_detections) {
            deposit.cleanup_streak += 1;
            if deposit.status == DepositStatus::Active
                && deposit.cleanup_streak == self.settings.cleanup_confirm_frames
            {
                deposit.status = DepositStatus::Cleaned;
                self.cleaned_count += 1;
                let (id, location) = (deposit.id, deposit.location);
                log::info!("deposit {} marked as cleaned", id);
                self.notify(Notification::Cleaned { id, location });
            }
        } else {
            deposit.cleanup_streak = 0;
        }
    }

    fn create_active(&mut self, detection: &Detection, now: Instant) {
        let id = self.ids.next_id();
        let deposit = Deposit {
            id,
            location: detection.center(),
            bbox: detection.bbox,
            first_seen: now,
            last_seen: now,
            status: DepositStatus::Active,
            missing_frames: 0,
            cleanup_streak: 0,
        };
        let (location, bbox) = (deposit.location, deposit.bbox);
        self.deposits.push(deposit);
        self.total_deposits += 1;
        log::info!("new deposit detected: {}", id);
        self.notify(Notification::Detected { id, location, bbox });
    }

    /// No notification, no total_deposits increment, and no de-duplication
    /// against existing pending deposits at the same location.
    fn create_pending(&mut self, point: Point, now: Instant) {
        let id = self.ids.next_id();
        self.deposits.push(Deposit {
            id,
            location: point,
            bbox: BoundingBox::degenerate_at(point),
            first_seen: now,
            last_seen: now,
            status: DepositStatus::Pending,
            missing_frames: 0,
            cleanup_streak: 0,
        });
        log::info!("soiling event inferred, pending confirmation: {}", id);
    }

    /// Cleaned deposits leave after their one-time notification; deposits
    /// missing past the staleness threshold are abandoned silently.
    fn prune(&mut self) {
        let stale_threshold = self.settings.stale_threshold;
        self.deposits.retain(|deposit| {
            deposit.status != DepositStatus::Cleaned && deposit.missing_frames <= stale_threshold
        });
    }

    fn notify(&mut self, notification: Notification) {
        if let Err(e) = self.sink.publish(&notification) {
            log::warn!("notification dropped: {}", e);
        }
    }

    /// Partition the live set into active/pending copies plus the cumulative
    /// counters.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            active: self
                .deposits
                .iter()
                .filter(|d| d.status == DepositStatus::Active)
                .cloned()
                .collect(),
            pending: self
                .deposits
                .iter()
                .filter(|d| d.status == DepositStatus::Pending)
                .cloned()
                .collect(),
            cleaned_count: self.cleaned_count,
            total_deposits: self.total_deposits,
        }
    }
}

fn person_nearby(location: Point, person_detections: &[Detection]) -> bool {
    person_detections
        .iter()
        .any(|person| location.distance_to(person.center()) < PERSON_PROXIMITY_RADIUS)
}
