//! demo - end-to-end synthetic run of the soiling-event pipeline
//!
//! Replays a scripted yard scenario against a simulated clock: a dog walks
//! in, squats long enough for behavioral inference, the deposit is later
//! confirmed visually, and a person walking up to it confirms the cleanup.
//! No camera or model is involved; every frame is synthesized.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::Parser;

use soilwatch::{
    BoundingBox, ChannelSink, Detection, Pipeline, PipelineConfig, SnapshotSummary,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Simulated frames per second.
    #[arg(long, default_value_t = 10)]
    fps: u32,
    /// Print the final snapshot as JSON instead of a human summary.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    if args.fps == 0 {
        return Err(anyhow!("fps must be >= 1"));
    }
    let frame_interval = Duration::from_secs_f64(1.0 / args.fps as f64);

    let config = PipelineConfig::default();
    let (sink, notifications) = ChannelSink::bounded(256);
    let mut pipeline = Pipeline::new(&config, Box::new(sink))?;

    let frames = scripted_frames(args.fps);
    stage(&format!(
        "replaying {} synthetic frames at {} fps (simulated clock)",
        frames.len(),
        args.fps
    ));

    let start = Instant::now();
    let mut alert_count = 0usize;
    let mut last_snapshot = pipeline.snapshot();
    for (index, frame) in frames.iter().enumerate() {
        let now = start + frame_interval * index as u32;
        let output = pipeline.process(frame, now);
        alert_count += output.alerts.len();
        last_snapshot = output.snapshot;
    }

    stage("notifications emitted");
    for notification in notifications.try_iter() {
        println!("  {}", serde_json::to_string(&notification)?);
    }

    let end = start + frame_interval * frames.len() as u32;
    let summary = SnapshotSummary::new(&last_snapshot, end);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        stage("final state");
        println!(
            "  active: {}, pending: {}, cleaned: {}, total confirmed: {}, alerts: {}",
            summary.active.len(),
            summary.pending.len(),
            summary.cleaned_count,
            summary.total_deposits,
            alert_count
        );
    }

    if summary.cleaned_count == 0 {
        return Err(anyhow!("scenario did not reach cleanup"));
    }
    stage("demo complete");
    Ok(())
}

fn stage(message: &str) {
    println!("==> {}", message);
}

/// The scripted scenario, scaled so each phase holds long enough in wall
/// time for the duration gates regardless of the chosen fps.
fn scripted_frames(fps: u32) -> Vec<Vec<Detection>> {
    let per_sec = fps as usize;
    let mut frames = Vec::new();

    // Dog walks in upright, left to right. Tall box, large steps: the
    // movement and posture gates both block inference here.
    for i in 0..3 * per_sec {
        let step = 100.0 * i as f32 / (3 * per_sec) as f32;
        let x = 100.0 + step;
        frames.push(vec![Detection::new(
            "dog",
            0.92,
            BoundingBox::new(x, 170.0, x + 40.0, 230.0),
        )]);
    }

    // Dog squats: wide low box, sub-pixel jitter, held well past the
    // stationary gate. Inference fires once the averaged history settles.
    for i in 0..8 * per_sec {
        let jitter = if i % 2 == 0 { 0.5 } else { -0.5 };
        frames.push(vec![Detection::new(
            "dog",
            0.92,
            BoundingBox::new(300.0 + jitter, 200.0, 360.0 + jitter, 230.0),
        )]);
    }

    // Dog leaves; the deposit becomes visible where it squatted. The
    // detection box covers the inferred ground-contact point (330, 230),
    // promoting one pending deposit to active.
    let deposit = Detection::new("poop", 0.81, BoundingBox::new(318.0, 222.0, 342.0, 238.0));
    for _ in 0..2 * per_sec {
        frames.push(vec![deposit.clone()]);
    }

    // A person walks up; the deposit detection drops out (occluded by the
    // pickup) while the person stays in proximity, confirming the cleanup.
    let person = Detection::new("person", 0.95, BoundingBox::new(310.0, 130.0, 350.0, 240.0));
    for _ in 0..per_sec {
        frames.push(vec![person.clone()]);
    }

    // Empty tail, long enough for every leftover pending inference to age
    // past the staleness threshold and be abandoned.
    for _ in 0..4 * per_sec {
        frames.push(Vec::new());
    }

    frames
}
