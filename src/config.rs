//! Configuration for the demo pipelines.
//!
//! Layered the usual way: defaults, then an optional JSON file named by
//! `FRAMEPIPE_CONFIG`, then `FRAMEPIPE_*` environment overrides, then
//! validation. The detector thresholds live here rather than as constants
//! because the stock values are inherited magic numbers with no stated
//! derivation; deployments tune them per camera.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::fourcc::FourCc;
use crate::transform::{EdgeParams, MotionParams, PersonParams};

/// Sample input the traffic-scene demos fall back to when no source
/// argument is given.
pub const DEFAULT_TRAFFIC_SOURCE: &str = "media/traffic.mp4";
/// Sample input for the pedestrian demo.
pub const DEFAULT_WALKING_SOURCE: &str = "media/walking.mp4";

const DEFAULT_FOURCC: &str = "DIVX";
const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Deserialize, Default)]
struct PipelineConfigFile {
    fourcc: Option<String>,
    output_dir: Option<PathBuf>,
    motion: Option<MotionParams>,
    edge: Option<EdgeParams>,
    person: Option<PersonParams>,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Codec tag requested from the sink, verbatim.
    pub fourcc: FourCc,
    pub output_dir: PathBuf,
    pub motion: MotionParams,
    pub edge: EdgeParams,
    pub person: PersonParams,
}

impl PipelineConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("FRAMEPIPE_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => read_config_file(Path::new(path))?,
            None => PipelineConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg)?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Output container path for one demo, e.g. `output/canny.avi`.
    pub fn output_path(&self, demo: &str) -> PathBuf {
        self.output_dir.join(format!("{demo}.avi"))
    }

    fn from_file(file: PipelineConfigFile) -> Result<Self> {
        let fourcc = FourCc::new(file.fourcc.as_deref().unwrap_or(DEFAULT_FOURCC))?;
        Ok(Self {
            fourcc,
            output_dir: file
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            motion: file.motion.unwrap_or_default(),
            edge: file.edge.unwrap_or_default(),
            person: file.person.unwrap_or_default(),
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(tag) = std::env::var("FRAMEPIPE_FOURCC") {
            if !tag.trim().is_empty() {
                self.fourcc = FourCc::new(tag.trim())?;
            }
        }
        if let Ok(dir) = std::env::var("FRAMEPIPE_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
        if let Some(value) = env_f32("FRAMEPIPE_MOTION_MATCH_PERCENT")? {
            self.motion.match_percent = value;
        }
        if let Some(value) = env_f32("FRAMEPIPE_MOTION_RESET_PERCENT")? {
            self.motion.reset_percent = value;
        }
        if let Some(value) = env_f32("FRAMEPIPE_MOTION_AVG_WEIGHT")? {
            self.motion.avg_weight = value;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(self.motion.avg_weight > 0.0 && self.motion.avg_weight <= 1.0) {
            return Err(anyhow!(
                "motion avg_weight must be in (0, 1], got {}",
                self.motion.avg_weight
            ));
        }
        if !(0.0..100.0).contains(&self.motion.match_percent) {
            return Err(anyhow!(
                "motion match_percent must be in [0, 100), got {}",
                self.motion.match_percent
            ));
        }
        if !(0.0..=100.0).contains(&self.motion.reset_percent) {
            return Err(anyhow!(
                "motion reset_percent must be in [0, 100], got {}",
                self.motion.reset_percent
            ));
        }
        if self.motion.reset_percent <= self.motion.match_percent {
            return Err(anyhow!(
                "motion reset_percent ({}) must exceed match_percent ({})",
                self.motion.reset_percent,
                self.motion.match_percent
            ));
        }
        if self.edge.low_threshold >= self.edge.high_threshold {
            return Err(anyhow!(
                "edge low_threshold ({}) must be below high_threshold ({})",
                self.edge.low_threshold,
                self.edge.high_threshold
            ));
        }
        if self.person.scale_step <= 1.0 {
            return Err(anyhow!(
                "person scale_step must exceed 1.0, got {}",
                self.person.scale_step
            ));
        }
        Ok(())
    }
}

fn env_f32(key: &str) -> Result<Option<f32>> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            let value: f32 = raw
                .trim()
                .parse()
                .map_err(|_| anyhow!("{} must be a number, got {:?}", key, raw))?;
            Ok(Some(value))
        }
        _ => Ok(None),
    }
}

fn read_config_file(path: &Path) -> Result<PipelineConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
