//! soilwatchd - soiling-event tracking daemon
//!
//! This daemon:
//! 1. Pulls per-frame detections from a configured source
//! 2. Runs the full pipeline cycle (track → infer → lifecycle → alerts)
//! 3. Hands notifications to a bounded-queue consumer
//! 4. Publishes a serializable snapshot summary for external consumers
//!
//! Video acquisition and the detection model are external collaborators;
//! without them this daemon replays a scripted detection file
//! (`SOILWATCH_DETECTIONS`), which is also how it is exercised in CI.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};

use soilwatch::{
    ChannelSink, Detection, DetectionSource, Pipeline, PipelineConfig, ScriptedSource,
    SnapshotSummary,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::load()?;
    log::info!("configuration loaded and validated");

    let (sink, notifications) = ChannelSink::bounded(256);
    let mut pipeline = Pipeline::new(&config, Box::new(sink))?;

    // Notification consumer: logs what an external transport would forward.
    // The bounded queue means a stall here drops notifications instead of
    // back-pressuring frame processing.
    let consumer = std::thread::spawn(move || {
        for notification in notifications {
            match serde_json::to_string(&notification) {
                Ok(json) => log::info!("notification: {}", json),
                Err(e) => log::warn!("notification serialization failed: {}", e),
            }
        }
    });

    let mut source = detection_source()?;
    log::info!("detection source: {}", source.name());

    let target_fps: u64 = match std::env::var("SOILWATCH_FPS") {
        Ok(fps) => fps
            .parse()
            .map_err(|_| anyhow!("SOILWATCH_FPS must be an integer"))?,
        Err(_) => 30,
    };
    if target_fps == 0 {
        return Err(anyhow!("SOILWATCH_FPS must be >= 1"));
    }
    let frame_interval = Duration::from_millis(1000 / target_fps);

    let running = Arc::new(AtomicBool::new(true));
    let running_flag = running.clone();
    ctrlc::set_handler(move || {
        running_flag.store(false, Ordering::SeqCst);
    })
    .context("failed to install shutdown handler")?;

    log::info!("starting soiling-event tracking at {} fps", target_fps);
    while running.load(Ordering::SeqCst) {
        let Some(detections) = source.next_frame()? else {
            log::info!("frame source ended");
            break;
        };

        let now = Instant::now();
        let output = pipeline.process(&detections, now);

        let summary = SnapshotSummary::new(&output.snapshot, now);
        log::debug!("snapshot: {}", serde_json::to_string(&summary)?);
        for alert in &output.alerts {
            log::debug!("alert: {}", serde_json::to_string(alert)?);
        }

        std::thread::sleep(frame_interval);
    }

    drop(pipeline); // closes the notification queue
    if consumer.join().is_err() {
        log::warn!("notification consumer panicked");
    }
    log::info!("shutdown complete");
    Ok(())
}

/// A scripted source from `SOILWATCH_DETECTIONS` (JSON: array of frames,
/// each an array of detections), or an empty stream when unset.
fn detection_source() -> Result<Box<dyn DetectionSource>> {
    match std::env::var("SOILWATCH_DETECTIONS") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read detections file {}", path))?;
            let frames: Vec<Vec<Detection>> = serde_json::from_str(&raw)
                .with_context(|| format!("invalid detections file {}", path))?;
            let source = ScriptedSource::new(frames);
            log::info!(
                "replaying {} scripted frames from {}",
                source.remaining(),
                path
            );
            Ok(Box::new(source))
        }
        Err(_) => {
            log::warn!("SOILWATCH_DETECTIONS not set; nothing to process");
            Ok(Box::new(ScriptedSource::new(Vec::new())))
        }
    }
}
