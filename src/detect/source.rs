use std::collections::VecDeque;

use anyhow::Result;

use crate::detect::result::Detection;

/// Seam to the external classifier collaborator.
///
/// The kernel never runs inference itself; a source hands it one frame's
/// worth of classified detections per cycle. `Ok(None)` means the frame
/// stream has ended.
pub trait DetectionSource: Send {
    /// Source identifier, for logs.
    fn name(&self) -> &'static str;

    /// Produce the next frame's detections.
    fn next_frame(&mut self) -> Result<Option<Vec<Detection>>>;
}

/// Scripted source for tests and hardware-free daemon runs: replays a fixed
/// sequence of frames, then ends the stream.
pub struct ScriptedSource {
    frames: VecDeque<Vec<Detection>>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Vec<Detection>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl DetectionSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn next_frame(&mut self) -> Result<Option<Vec<Detection>>> {
        Ok(self.frames.pop_front())
    }
}
