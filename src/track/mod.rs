//! Per-animal motion history.
//!
//! The tracker maintains short-term identity for animal-class detections via
//! greedy nearest-centroid matching. Matching is intentionally not a global
//! assignment; the strategy sits behind `TrackMatcher` so an optimal solver
//! can be substituted without touching track state.

mod behavior;
mod matcher;

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::detect::Detection;
use crate::geometry::{BoundingBox, Point};
use crate::ids::IdProvider;

pub use behavior::BehaviorDetector;
pub use matcher::{NearestCentroidMatcher, TrackMatcher};

/// One buffered observation of a tracked animal.
#[derive(Clone, Copy, Debug)]
pub struct TrackSample {
    pub center: Point,
    pub bbox: BoundingBox,
    pub aspect_ratio: f32,
    pub at: Instant,
}

/// Position history inferred to belong to one physical animal.
///
/// A track always holds at least one sample: it is created from an initial
/// detection and only ever appends.
#[derive(Clone, Debug)]
pub struct Track {
    id: u64,
    samples: VecDeque<TrackSample>,
    capacity: usize,
    last_update: Instant,
}

impl Track {
    fn new(id: u64, detection: &Detection, capacity: usize, now: Instant) -> Self {
        let mut track = Self {
            id,
            samples: VecDeque::with_capacity(capacity),
            capacity,
            last_update: now,
        };
        track.push(detection, now);
        track
    }

    fn push(&mut self, detection: &Detection, now: Instant) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(TrackSample {
            center: detection.center(),
            bbox: detection.bbox,
            aspect_ratio: detection.aspect_ratio(),
            at: now,
        });
        self.last_update = now;
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    fn latest(&self) -> &TrackSample {
        self.samples.back().expect("track holds at least one sample")
    }

    pub fn last_center(&self) -> Point {
        self.latest().center
    }

    /// Mean Euclidean distance between consecutive samples.
    ///
    /// `None` when fewer than two samples exist ("movement unknown");
    /// callers must treat that conservatively as still moving.
    pub fn average_step_displacement(&self) -> Option<f32> {
        if self.samples.len() < 2 {
            return None;
        }
        let mut total = 0.0;
        for pair in self.samples.iter().zip(self.samples.iter().skip(1)) {
            total += pair.0.center.distance_to(pair.1.center);
        }
        Some(total / (self.samples.len() - 1) as f32)
    }

    pub fn average_aspect_ratio(&self) -> f32 {
        let sum: f32 = self.samples.iter().map(|s| s.aspect_ratio).sum();
        sum / self.samples.len() as f32
    }

    /// Time between the oldest and newest buffered samples.
    pub fn duration(&self) -> Duration {
        let first = self.samples.front().expect("track holds at least one sample");
        self.latest().at.duration_since(first.at)
    }

    /// Bottom-center of the most recent box: where the animal meets the
    /// ground.
    pub fn ground_contact(&self) -> Point {
        self.latest().bbox.bottom_center()
    }

    fn is_stale(&self, now: Instant, max_age: Duration) -> bool {
        now.duration_since(self.last_update) > max_age
    }
}

/// Maintains the live track set from per-frame animal detections.
pub struct AnimalTracker {
    tracks: Vec<Track>,
    matcher: Box<dyn TrackMatcher>,
    ids: Box<dyn IdProvider>,
    history_capacity: usize,
    max_age: Duration,
}

impl AnimalTracker {
    pub fn new(
        history_capacity: usize,
        max_age: Duration,
        matcher: Box<dyn TrackMatcher>,
        ids: Box<dyn IdProvider>,
    ) -> Self {
        Self {
            tracks: Vec::new(),
            matcher,
            ids,
            history_capacity,
            max_age,
        }
    }

    /// Fold one frame's animal detections into the track set.
    ///
    /// Matched detections extend their track; unmatched detections spawn new
    /// tracks; tracks past `max_age` without an update are dropped.
    pub fn update(&mut self, animals: &[Detection], now: Instant) {
        let assignments = self.matcher.assign(&self.tracks, animals);
        let mut claimed = vec![false; animals.len()];

        for (track, assignment) in self.tracks.iter_mut().zip(assignments) {
            if let Some(index) = assignment {
                track.push(&animals[index], now);
                claimed[index] = true;
            }
        }

        for (index, detection) in animals.iter().enumerate() {
            if !claimed[index] {
                let id = self.ids.next_id();
                log::debug!("new animal track {}", id);
                self.tracks
                    .push(Track::new(id, detection, self.history_capacity, now));
            }
        }

        let max_age = self.max_age;
        self.tracks.retain(|track| {
            let stale = track.is_stale(now, max_age);
            if stale {
                log::debug!("dropping stale animal track {}", track.id());
            }
            !stale
        });
    }

    /// Live tracks in stable creation order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::MonotonicIds;

    fn animal_at(x: f32, y: f32) -> Detection {
        Detection::new("dog", 0.9, BoundingBox::new(x, y, x + 40.0, y + 30.0))
    }

    fn tracker(capacity: usize) -> AnimalTracker {
        AnimalTracker::new(
            capacity,
            Duration::from_secs(1),
            Box::new(NearestCentroidMatcher::new(100.0)),
            Box::new(MonotonicIds::new()),
        )
    }

    #[test]
    fn unmatched_detection_spawns_track_with_initial_sample() {
        let mut tracker = tracker(90);
        tracker.update(&[animal_at(10.0, 10.0)], Instant::now());

        assert_eq!(tracker.tracks().len(), 1);
        assert_eq!(tracker.tracks()[0].sample_count(), 1);
        assert_eq!(tracker.tracks()[0].average_step_displacement(), None);
    }

    #[test]
    fn nearby_detection_extends_existing_track() {
        let mut tracker = tracker(90);
        let start = Instant::now();
        tracker.update(&[animal_at(10.0, 10.0)], start);
        tracker.update(&[animal_at(13.0, 11.0)], start + Duration::from_millis(33));

        assert_eq!(tracker.tracks().len(), 1);
        assert_eq!(tracker.tracks()[0].sample_count(), 2);
        assert!(tracker.tracks()[0].average_step_displacement().unwrap() < 5.0);
    }

    #[test]
    fn far_detection_spawns_a_second_track() {
        let mut tracker = tracker(90);
        let start = Instant::now();
        tracker.update(&[animal_at(10.0, 10.0)], start);
        tracker.update(&[animal_at(500.0, 400.0)], start + Duration::from_millis(33));

        assert_eq!(tracker.tracks().len(), 2);
    }

    #[test]
    fn history_is_bounded_by_capacity() {
        let mut tracker = tracker(4);
        let start = Instant::now();
        for i in 0..10 {
            let now = start + Duration::from_millis(33 * i);
            tracker.update(&[animal_at(10.0 + i as f32, 10.0)], now);
        }

        assert_eq!(tracker.tracks().len(), 1);
        assert_eq!(tracker.tracks()[0].sample_count(), 4);
    }

    #[test]
    fn stale_track_is_dropped_after_max_age() {
        let mut tracker = tracker(90);
        let start = Instant::now();
        tracker.update(&[animal_at(10.0, 10.0)], start);
        tracker.update(&[], start + Duration::from_millis(1500));

        assert!(tracker.tracks().is_empty());
    }

    #[test]
    fn duration_spans_buffered_samples() {
        let mut tracker = tracker(90);
        let start = Instant::now();
        tracker.update(&[animal_at(10.0, 10.0)], start);
        tracker.update(&[animal_at(10.0, 10.0)], start + Duration::from_millis(900));

        assert_eq!(tracker.tracks()[0].duration(), Duration::from_millis(900));
    }
}
