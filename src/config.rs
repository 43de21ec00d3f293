use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::detect::ClassLabels;

const DEFAULT_ANIMAL_LABEL: &str = "dog";
const DEFAULT_DEPOSIT_LABEL: &str = "poop";
const DEFAULT_PERSON_LABEL: &str = "person";
const DEFAULT_MATCH_DISTANCE_GATE: f32 = 100.0;
const DEFAULT_HISTORY_CAPACITY: usize = 90;
const DEFAULT_TRACK_MAX_AGE_SECS: f64 = 1.0;
const DEFAULT_STATIONARY_SECS: f64 = 5.0;
const DEFAULT_MOVEMENT_THRESHOLD: f32 = 5.0;
const DEFAULT_POSTURE_THRESHOLD: f32 = 0.8;
const DEFAULT_IOU_THRESHOLD: f32 = 0.3;
const DEFAULT_STALE_THRESHOLD: u32 = 30;
const DEFAULT_CLEANUP_CONFIRM_FRAMES: u32 = 5;
const DEFAULT_AGED_MINUTES: u64 = 30;

#[derive(Debug, Deserialize, Default)]
struct PipelineConfigFile {
    classes: Option<ClassesFile>,
    tracking: Option<TrackingFile>,
    behavior: Option<BehaviorFile>,
    lifecycle: Option<LifecycleFile>,
    alerts: Option<AlertsFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ClassesFile {
    animal: Option<String>,
    deposit: Option<String>,
    person: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TrackingFile {
    match_distance_gate: Option<f32>,
    history_capacity: Option<usize>,
    max_age_secs: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct BehaviorFile {
    stationary_secs: Option<f64>,
    movement_threshold: Option<f32>,
    posture_threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct LifecycleFile {
    iou_threshold: Option<f32>,
    stale_threshold: Option<u32>,
    cleanup_confirm_frames: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct AlertsFile {
    new_deposit: Option<bool>,
    cleanup: Option<bool>,
    aged_minutes: Option<u64>,
}

/// Animal tracker settings.
#[derive(Debug, Clone)]
pub struct TrackingSettings {
    /// Maximum centroid distance for a detection to extend a track.
    pub match_distance_gate: f32,
    /// Samples buffered per track (sized to a fixed time window).
    pub history_capacity: usize,
    /// Track age without an update before it is dropped.
    pub max_age: Duration,
}

/// Behavioral event gates.
#[derive(Debug, Clone)]
pub struct BehaviorSettings {
    pub stationary_duration: Duration,
    /// Average displacement per sample interval at or below which a track
    /// counts as still.
    pub movement_threshold: f32,
    /// Average aspect ratio (height/width) at or below which the posture
    /// counts as squatting.
    pub posture_threshold: f32,
}

/// Deposit lifecycle settings.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    /// IoU above which a detection matches an existing deposit, in (0, 1].
    pub iou_threshold: f32,
    /// Consecutive missed frames beyond which a deposit is abandoned.
    pub stale_threshold: u32,
    /// Consecutive person-proximity frames that confirm a cleanup.
    pub cleanup_confirm_frames: u32,
}

/// Alert toggles and thresholds.
#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub new_deposit: bool,
    pub cleanup: bool,
    pub aged_threshold: Duration,
}

/// Full pipeline configuration, validated before any cycle runs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub classes: ClassLabels,
    pub tracking: TrackingSettings,
    pub behavior: BehaviorSettings,
    pub lifecycle: LifecycleSettings,
    pub alerts: AlertSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            classes: ClassLabels {
                animal: DEFAULT_ANIMAL_LABEL.to_string(),
                deposit: DEFAULT_DEPOSIT_LABEL.to_string(),
                person: DEFAULT_PERSON_LABEL.to_string(),
            },
            tracking: TrackingSettings {
                match_distance_gate: DEFAULT_MATCH_DISTANCE_GATE,
                history_capacity: DEFAULT_HISTORY_CAPACITY,
                max_age: Duration::from_secs_f64(DEFAULT_TRACK_MAX_AGE_SECS),
            },
            behavior: BehaviorSettings {
                stationary_duration: Duration::from_secs_f64(DEFAULT_STATIONARY_SECS),
                movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
                posture_threshold: DEFAULT_POSTURE_THRESHOLD,
            },
            lifecycle: LifecycleSettings {
                iou_threshold: DEFAULT_IOU_THRESHOLD,
                stale_threshold: DEFAULT_STALE_THRESHOLD,
                cleanup_confirm_frames: DEFAULT_CLEANUP_CONFIRM_FRAMES,
            },
            alerts: AlertSettings {
                new_deposit: true,
                cleanup: true,
                aged_threshold: Duration::from_secs(DEFAULT_AGED_MINUTES * 60),
            },
        }
    }
}

impl PipelineConfig {
    /// Load from the file named by `SOILWATCH_CONFIG` (when set), apply env
    /// overrides, and validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SOILWATCH_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: PipelineConfigFile) -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(classes) = file.classes {
            if let Some(animal) = classes.animal {
                cfg.classes.animal = animal;
            }
            if let Some(deposit) = classes.deposit {
                cfg.classes.deposit = deposit;
            }
            if let Some(person) = classes.person {
                cfg.classes.person = person;
            }
        }
        if let Some(tracking) = file.tracking {
            if let Some(gate) = tracking.match_distance_gate {
                cfg.tracking.match_distance_gate = gate;
            }
            if let Some(capacity) = tracking.history_capacity {
                cfg.tracking.history_capacity = capacity;
            }
            if let Some(secs) = tracking.max_age_secs {
                cfg.tracking.max_age = duration_secs("tracking.max_age_secs", secs)?;
            }
        }
        if let Some(behavior) = file.behavior {
            if let Some(secs) = behavior.stationary_secs {
                cfg.behavior.stationary_duration = duration_secs("behavior.stationary_secs", secs)?;
            }
            if let Some(threshold) = behavior.movement_threshold {
                cfg.behavior.movement_threshold = threshold;
            }
            if let Some(threshold) = behavior.posture_threshold {
                cfg.behavior.posture_threshold = threshold;
            }
        }
        if let Some(lifecycle) = file.lifecycle {
            if let Some(threshold) = lifecycle.iou_threshold {
                cfg.lifecycle.iou_threshold = threshold;
            }
            if let Some(threshold) = lifecycle.stale_threshold {
                cfg.lifecycle.stale_threshold = threshold;
            }
            if let Some(frames) = lifecycle.cleanup_confirm_frames {
                cfg.lifecycle.cleanup_confirm_frames = frames;
            }
        }
        if let Some(alerts) = file.alerts {
            if let Some(enabled) = alerts.new_deposit {
                cfg.alerts.new_deposit = enabled;
            }
            if let Some(enabled) = alerts.cleanup {
                cfg.alerts.cleanup = enabled;
            }
            if let Some(minutes) = alerts.aged_minutes {
                cfg.alerts.aged_threshold = Duration::from_secs(minutes * 60);
            }
        }

        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(threshold) = std::env::var("SOILWATCH_IOU_THRESHOLD") {
            self.lifecycle.iou_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("SOILWATCH_IOU_THRESHOLD must be a number"))?;
        }
        if let Ok(frames) = std::env::var("SOILWATCH_CLEANUP_CONFIRM_FRAMES") {
            self.lifecycle.cleanup_confirm_frames = frames
                .parse()
                .map_err(|_| anyhow!("SOILWATCH_CLEANUP_CONFIRM_FRAMES must be an integer"))?;
        }
        if let Ok(frames) = std::env::var("SOILWATCH_STALE_THRESHOLD") {
            self.lifecycle.stale_threshold = frames
                .parse()
                .map_err(|_| anyhow!("SOILWATCH_STALE_THRESHOLD must be an integer"))?;
        }
        if let Ok(minutes) = std::env::var("SOILWATCH_AGED_MINUTES") {
            let minutes: u64 = minutes
                .parse()
                .map_err(|_| anyhow!("SOILWATCH_AGED_MINUTES must be an integer"))?;
            self.alerts.aged_threshold = Duration::from_secs(minutes * 60);
        }
        Ok(())
    }

    /// Every threshold is required to be sane before any cycle runs.
    pub fn validate(&self) -> Result<()> {
        if self.classes.animal.trim().is_empty()
            || self.classes.deposit.trim().is_empty()
            || self.classes.person.trim().is_empty()
        {
            return Err(anyhow!("class labels must be non-empty"));
        }
        if self.classes.animal == self.classes.deposit
            || self.classes.animal == self.classes.person
            || self.classes.deposit == self.classes.person
        {
            return Err(anyhow!("class labels must be pairwise distinct"));
        }
        if !(self.tracking.match_distance_gate > 0.0) {
            return Err(anyhow!("tracking.match_distance_gate must be > 0"));
        }
        if self.tracking.history_capacity < 2 {
            return Err(anyhow!("tracking.history_capacity must be >= 2"));
        }
        if self.tracking.max_age.is_zero() {
            return Err(anyhow!("tracking.max_age_secs must be > 0"));
        }
        if self.behavior.stationary_duration.is_zero() {
            return Err(anyhow!("behavior.stationary_secs must be > 0"));
        }
        if !(self.behavior.movement_threshold >= 0.0) {
            return Err(anyhow!("behavior.movement_threshold must be >= 0"));
        }
        if !(self.behavior.posture_threshold > 0.0) {
            return Err(anyhow!("behavior.posture_threshold must be > 0"));
        }
        if !(self.lifecycle.iou_threshold > 0.0 && self.lifecycle.iou_threshold <= 1.0) {
            return Err(anyhow!("lifecycle.iou_threshold must be in (0, 1]"));
        }
        if self.lifecycle.stale_threshold == 0 {
            return Err(anyhow!("lifecycle.stale_threshold must be >= 1"));
        }
        if self.lifecycle.cleanup_confirm_frames == 0 {
            return Err(anyhow!("lifecycle.cleanup_confirm_frames must be >= 1"));
        }
        if self.alerts.aged_threshold.is_zero() {
            return Err(anyhow!("alerts.aged_minutes must be > 0"));
        }
        Ok(())
    }
}

/// Negative, NaN, or out-of-range second counts from the config file are
/// configuration errors, not panics.
fn duration_secs(field: &str, secs: f64) -> Result<Duration> {
    if !(secs.is_finite() && secs > 0.0) {
        return Err(anyhow!("{} must be a positive number of seconds", field));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| anyhow!("{} is out of range", field))
}

fn read_config_file(path: &Path) -> Result<PipelineConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
