use crate::detect::Detection;
use crate::track::Track;

/// Assignment strategy from live tracks to one frame's detections.
///
/// Returns one entry per track, in track order: the index of the claimed
/// detection, or `None` when nothing acceptable remains. Each detection may
/// be claimed at most once.
pub trait TrackMatcher: Send {
    fn assign(&self, tracks: &[Track], detections: &[Detection]) -> Vec<Option<usize>>;
}

/// Greedy nearest-centroid matching with a fixed distance gate.
///
/// Tracks claim detections first-come-first-served in existing track order,
/// so crossing paths can mis-assign. Accepted as a bounded-cost heuristic.
pub struct NearestCentroidMatcher {
    gate: f32,
}

impl NearestCentroidMatcher {
    pub fn new(gate: f32) -> Self {
        Self { gate }
    }
}

impl TrackMatcher for NearestCentroidMatcher {
    fn assign(&self, tracks: &[Track], detections: &[Detection]) -> Vec<Option<usize>> {
        let mut claimed = vec![false; detections.len()];
        let mut assignments = Vec::with_capacity(tracks.len());

        for track in tracks {
            let last_center = track.last_center();
            let mut best: Option<(usize, f32)> = None;

            for (index, detection) in detections.iter().enumerate() {
                if claimed[index] {
                    continue;
                }
                let distance = last_center.distance_to(detection.center());
                if distance >= self.gate {
                    continue;
                }
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((index, distance));
                }
            }

            match best {
                Some((index, _)) => {
                    claimed[index] = true;
                    assignments.push(Some(index));
                }
                None => assignments.push(None),
            }
        }

        assignments
    }
}
