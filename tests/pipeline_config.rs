use std::sync::Mutex;
use std::time::Duration;

use tempfile::NamedTempFile;

use soilwatch::PipelineConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "SOILWATCH_CONFIG",
        "SOILWATCH_IOU_THRESHOLD",
        "SOILWATCH_CLEANUP_CONFIRM_FRAMES",
        "SOILWATCH_STALE_THRESHOLD",
        "SOILWATCH_AGED_MINUTES",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "classes": {
            "animal": "cat",
            "deposit": "waste"
        },
        "tracking": {
            "match_distance_gate": 80.0,
            "history_capacity": 60
        },
        "behavior": {
            "stationary_secs": 3.0,
            "posture_threshold": 0.7
        },
        "lifecycle": {
            "iou_threshold": 0.4,
            "stale_threshold": 20
        },
        "alerts": {
            "cleanup": false,
            "aged_minutes": 15
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("SOILWATCH_CONFIG", file.path());
    std::env::set_var("SOILWATCH_IOU_THRESHOLD", "0.5");
    std::env::set_var("SOILWATCH_AGED_MINUTES", "45");

    let cfg = PipelineConfig::load().expect("load config");

    assert_eq!(cfg.classes.animal, "cat");
    assert_eq!(cfg.classes.deposit, "waste");
    // Unset file fields keep their defaults.
    assert_eq!(cfg.classes.person, "person");
    assert_eq!(cfg.tracking.match_distance_gate, 80.0);
    assert_eq!(cfg.tracking.history_capacity, 60);
    assert_eq!(cfg.tracking.max_age, Duration::from_secs(1));
    assert_eq!(cfg.behavior.stationary_duration, Duration::from_secs(3));
    assert_eq!(cfg.behavior.movement_threshold, 5.0);
    assert_eq!(cfg.behavior.posture_threshold, 0.7);
    // Env wins over the file.
    assert_eq!(cfg.lifecycle.iou_threshold, 0.5);
    assert_eq!(cfg.lifecycle.stale_threshold, 20);
    assert_eq!(cfg.lifecycle.cleanup_confirm_frames, 5);
    assert!(cfg.alerts.new_deposit);
    assert!(!cfg.alerts.cleanup);
    assert_eq!(cfg.alerts.aged_threshold, Duration::from_secs(45 * 60));

    clear_env();
}

#[test]
fn negative_duration_in_file_is_an_error_not_a_panic() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{"tracking": {"max_age_secs": -1.0}}"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("SOILWATCH_CONFIG", file.path());
    assert!(PipelineConfig::load().is_err());

    clear_env();
}

#[test]
fn non_finite_duration_in_file_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    // JSON has no NaN literal; a huge exponent overflows Duration instead.
    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{"behavior": {"stationary_secs": 1e300}}"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("SOILWATCH_CONFIG", file.path());
    assert!(PipelineConfig::load().is_err());

    clear_env();
}

#[test]
fn missing_config_file_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("SOILWATCH_CONFIG", "/nonexistent/soilwatch.json");
    assert!(PipelineConfig::load().is_err());

    clear_env();
}

#[test]
fn invalid_override_value_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("SOILWATCH_IOU_THRESHOLD", "not-a-number");
    assert!(PipelineConfig::load().is_err());

    clear_env();
}

#[test]
fn override_outside_valid_range_fails_validation() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("SOILWATCH_IOU_THRESHOLD", "1.5");
    assert!(PipelineConfig::load().is_err());

    clear_env();
}

#[test]
fn no_file_and_no_env_yields_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = PipelineConfig::load().expect("defaults");
    assert_eq!(cfg.classes.animal, "dog");
    assert_eq!(cfg.lifecycle.cleanup_confirm_frames, 5);
    assert_eq!(cfg.alerts.aged_threshold, Duration::from_secs(30 * 60));
}
