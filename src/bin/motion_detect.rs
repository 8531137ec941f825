//! motion_detect - running-average motion detection demo.
//!
//! Uses an exponentially-weighted running average as the background
//! reference, boxes every moving region on matched frames, and re-encodes
//! to `output/motion_detect.avi`.

use anyhow::Result;
use clap::Parser;

use framepipe::config::{PipelineConfig, DEFAULT_TRAFFIC_SOURCE};
use framepipe::ui::Progress;
use framepipe::{sink, source, Driver, MotionDetect, SourceDescriptor};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Video file, stream URL, or camera index. Defaults to the sample
    /// traffic clip.
    source: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let cfg = PipelineConfig::load()?;

    let descriptor: SourceDescriptor = args
        .source
        .as_deref()
        .unwrap_or(DEFAULT_TRAFFIC_SOURCE)
        .parse()?;
    let output = cfg.output_path("motion_detect");

    log::info!("framepipe {}", env!("CARGO_PKG_VERSION"));
    log::info!("input: {}", descriptor);
    log::info!("output: {}", output.display());

    let mut source = source::open(&descriptor)?;
    let mut sink = sink::open(
        &output,
        cfg.fourcc,
        source.fps(),
        source.width(),
        source.height(),
    )?;

    let stats = Driver::new(MotionDetect::new(cfg.motion.clone()))
        .with_progress(Progress::for_run("motion"))
        .run(source.as_mut(), sink.as_mut())?;

    log::info!("{} frames, {} frames with motion", stats.frames, stats.matches);
    log::info!("elapsed time: {:.2} seconds", stats.elapsed_secs());
    Ok(())
}
