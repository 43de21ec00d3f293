use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point};

/// One frame's classified bounding-box observation.
///
/// Detections are ephemeral: they are not retained past the processing cycle
/// except where copied into track or deposit state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    /// Classifier confidence in 0..=1.
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }

    pub fn center(&self) -> Point {
        self.bbox.center()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.bbox.aspect_ratio()
    }
}

/// Class labels the kernel partitions detections by.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassLabels {
    pub animal: String,
    pub deposit: String,
    pub person: String,
}

/// One frame's detections, split into the three classes the kernel consumes.
///
/// Detections with any other label are dropped: an absent or unrecognized
/// class is "nothing observed", never an error.
#[derive(Clone, Debug, Default)]
pub struct FrameObservations {
    pub animals: Vec<Detection>,
    pub deposits: Vec<Detection>,
    pub persons: Vec<Detection>,
}

impl FrameObservations {
    pub fn partition(detections: &[Detection], labels: &ClassLabels) -> Self {
        let mut obs = FrameObservations::default();
        for detection in detections {
            if detection.label == labels.animal {
                obs.animals.push(detection.clone());
            } else if detection.label == labels.deposit {
                obs.deposits.push(detection.clone());
            } else if detection.label == labels.person {
                obs.persons.push(detection.clone());
            }
        }
        obs
    }
}
