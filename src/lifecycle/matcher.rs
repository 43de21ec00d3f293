use crate::detect::Detection;
use crate::lifecycle::Deposit;

/// Assignment strategy from live deposits to one frame's deposit detections.
///
/// Returns one entry per deposit, in deposit order. Each detection may be
/// claimed at most once.
pub trait DepositMatcher: Send {
    fn assign(&self, deposits: &[Deposit], detections: &[Detection]) -> Vec<Option<usize>>;
}

/// Greedy highest-IoU-first matching above a fixed threshold.
///
/// Deposits claim detections first-come-first-served in existing order, not
/// as a global optimum. A deposit with a zero-area box (behaviorally
/// inferred, not yet confirmed) has IoU 0 against everything, so overlap
/// degenerates to point containment: a detection box that contains the
/// deposit's location scores 1.
pub struct GreedyIouMatcher {
    threshold: f32,
}

impl GreedyIouMatcher {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    fn score(deposit: &Deposit, detection: &Detection) -> f32 {
        if deposit.bbox.area() > 0.0 {
            deposit.bbox.iou(&detection.bbox)
        } else if detection.bbox.contains(deposit.location) {
            1.0
        } else {
            0.0
        }
    }
}

impl DepositMatcher for GreedyIouMatcher {
    fn assign(&self, deposits: &[Deposit], detections: &[Detection]) -> Vec<Option<usize>> {
        let mut claimed = vec![false; detections.len()];
        let mut assignments = Vec::with_capacity(deposits.len());

        for deposit in deposits {
            let mut best: Option<(usize, f32)> = None;

            for (index, detection) in detections.iter().enumerate() {
                if claimed[index] {
                    continue;
                }
                let iou = Self::score(deposit, detection);
                if iou <= self.threshold {
                    continue;
                }
                if best.map_or(true, |(_, score)| iou > score) {
                    best = Some((index, iou));
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
