use std::sync::Mutex;

use tempfile::NamedTempFile;

use framepipe::config::PipelineConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "FRAMEPIPE_CONFIG",
        "FRAMEPIPE_FOURCC",
        "FRAMEPIPE_OUTPUT_DIR",
        "FRAMEPIPE_MOTION_MATCH_PERCENT",
        "FRAMEPIPE_MOTION_RESET_PERCENT",
        "FRAMEPIPE_MOTION_AVG_WEIGHT",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_match_the_stock_demos() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = PipelineConfig::load().expect("load config");

    assert_eq!(cfg.fourcc.to_string(), "DIVX");
    assert_eq!(cfg.output_path("canny").to_str().unwrap(), "output/canny.avi");
    assert_eq!(cfg.motion.avg_weight, 0.03);
    assert_eq!(cfg.motion.diff_threshold, 25);
    assert_eq!(cfg.motion.match_percent, 0.75);
    assert_eq!(cfg.motion.reset_percent, 25.0);
    assert_eq!(cfg.edge.low_threshold, 100.0);
    assert_eq!(cfg.edge.high_threshold, 200.0);
    assert_eq!(cfg.person.win_stride, 8);
    assert_eq!(cfg.person.padding, 32);
    assert_eq!(cfg.person.scale_step, 1.05);
    assert_eq!(cfg.person.group_threshold, 2.0);

    clear_env();
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "fourcc": "XVID",
        "output_dir": "/tmp/framepipe-out",
        "motion": {
            "avg_weight": 0.05,
            "match_percent": 1.5
        },
        "edge": {
            "low_threshold": 50.0,
            "high_threshold": 150.0
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("FRAMEPIPE_CONFIG", file.path());
    std::env::set_var("FRAMEPIPE_MOTION_RESET_PERCENT", "40");

    let cfg = PipelineConfig::load().expect("load config");

    assert_eq!(cfg.fourcc.to_string(), "XVID");
    assert_eq!(
        cfg.output_path("writer").to_str().unwrap(),
        "/tmp/framepipe-out/writer.avi"
    );
    // File overrides defaults; untouched fields keep defaults.
    assert_eq!(cfg.motion.avg_weight, 0.05);
    assert_eq!(cfg.motion.match_percent, 1.5);
    assert_eq!(cfg.motion.diff_threshold, 25);
    assert_eq!(cfg.edge.low_threshold, 50.0);
    assert_eq!(cfg.edge.high_threshold, 150.0);
    // Env overrides the file.
    assert_eq!(cfg.motion.reset_percent, 40.0);

    clear_env();
}

#[test]
fn rejects_invalid_fourcc_from_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("FRAMEPIPE_FOURCC", "TOOLONG");
    assert!(PipelineConfig::load().is_err());

    clear_env();
}

#[test]
fn rejects_inverted_motion_thresholds() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    // Reset bar below the match bar makes the reset unreachable.
    std::env::set_var("FRAMEPIPE_MOTION_MATCH_PERCENT", "30");
    std::env::set_var("FRAMEPIPE_MOTION_RESET_PERCENT", "10");
    assert!(PipelineConfig::load().is_err());

    clear_env();
}

#[test]
fn rejects_non_numeric_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("FRAMEPIPE_MOTION_AVG_WEIGHT", "heavy");
    assert!(PipelineConfig::load().is_err());

    clear_env();
}
