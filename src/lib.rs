//! Soiling-event tracking kernel.
//!
//! Turns a stream of per-frame object detections (animal, deposit, person
//! classes) into a durable record of discrete soiling events and their
//! cleanup status. The detector and the presentation/transport layers are
//! external collaborators; this crate owns the part in between:
//!
//! 1. **Animal tracking**: short-term identity for noisy, intermittent
//!    animal detections via nearest-centroid matching.
//! 2. **Behavioral inference**: the event-causing object is never observed
//!    directly; a sustained still, squatting track infers one.
//! 3. **Deposit lifecycle**: persistent entities through
//!    pending → active → cleaned, under detector misses and occlusion, with
//!    person proximity as the removal heuristic.
//! 4. **Alerting**: edge/level alerts diffed from successive snapshots.
//!
//! # Module Structure
//!
//! - `detect`: detection data model, class partition, source seam
//! - `track`: animal tracker and behavioral event detector
//! - `lifecycle`: deposit ledger, matching, notifications
//! - `alert`: alert aggregation
//! - `pipeline`: per-frame orchestration (single-writer)
//! - `config`: file/env configuration and validation
//! - `ids`: injectable id generation

pub mod alert;
pub mod config;
pub mod detect;
pub mod geometry;
pub mod ids;
pub mod lifecycle;
pub mod pipeline;
pub mod track;

pub use alert::{Alert, AlertAggregator};
pub use config::{
    AlertSettings, BehaviorSettings, LifecycleSettings, PipelineConfig, TrackingSettings,
};
pub use detect::{ClassLabels, Detection, DetectionSource, FrameObservations, ScriptedSource};
pub use geometry::{BoundingBox, Point};
pub use ids::{IdProvider, MonotonicIds};
pub use lifecycle::{
    ChannelSink, Deposit, DepositLedger, DepositMatcher, DepositStatus, GreedyIouMatcher,
    Notification, NotificationSink, NullSink, Snapshot, SnapshotSummary,
};
pub use pipeline::{CycleOutput, Pipeline};
pub use track::{AnimalTracker, BehaviorDetector, NearestCentroidMatcher, Track, TrackMatcher};
