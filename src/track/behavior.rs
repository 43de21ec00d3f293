use crate::config::BehaviorSettings;
use crate::geometry::Point;
use crate::track::Track;

/// Infers soiling events from track behavior.
///
/// The event-causing object is never observed directly; a sustained still,
/// squatting posture is the signal. All three gates must hold for a track:
/// enough buffered duration, low average displacement, and an average aspect
/// ratio at or below the posture threshold.
///
/// While the gates hold, the track's ground-contact point is emitted every
/// cycle. The output is anonymous (not tied back to the track id), so
/// repeated emissions for one ongoing episode look identical to independent
/// episodes; any de-duplication is the deposit ledger's concern.
pub struct BehaviorDetector {
    settings: BehaviorSettings,
}

impl BehaviorDetector {
    pub fn new(settings: BehaviorSettings) -> Self {
        Self { settings }
    }

    /// Pure read of the live track set.
    pub fn detect(&self, tracks: &[Track]) -> Vec<Point> {
        let mut events = Vec::new();
        for track in tracks {
            if self.qualifies(track) {
                let ground = track.ground_contact();
                log::debug!(
                    "behavioral event for track {} at ({:.1}, {:.1})",
                    track.id(),
                    ground.x,
                    ground.y
                );
                events.push(ground);
            }
        }
        events
    }

    fn qualifies(&self, track: &Track) -> bool {
        if track.duration() < self.settings.stationary_duration {
            return false;
        }

        // Unknown movement (short history) is treated as still moving.
        match track.average_step_displacement() {
            Some(displacement) if displacement <= self.settings.movement_threshold => {}
            _ => return false,
        }

        track.average_aspect_ratio() <= self.settings.posture_threshold
    }
}
