//! Detection inputs.
//!
//! The detection model itself lives outside the kernel; this module defines
//! the data it exchanges with us (`Detection`), the per-frame class
//! partition, and the `DetectionSource` seam the daemon pulls frames from.

mod result;
mod source;

pub use result::{ClassLabels, Detection, FrameObservations};
pub use source::{DetectionSource, ScriptedSource};
