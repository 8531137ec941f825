//! people_detect - pedestrian detection demo.
//!
//! Boxes each detected person (confidence in the debug log next to it) and
//! re-encodes to `output/people_detect.avi`. The stub detector is built in;
//! with the `detector-tract` feature, point `FRAMEPIPE_ONNX_MODEL` at a
//! person-classifier model to use real inference.

use anyhow::Result;
use clap::Parser;

use framepipe::config::{PipelineConfig, DEFAULT_WALKING_SOURCE};
use framepipe::ui::Progress;
use framepipe::{sink, source, Driver, PersonDetect, SourceDescriptor};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Video file, stream URL, or camera index. Defaults to the sample
    /// walking clip.
    source: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let cfg = PipelineConfig::load()?;

    let descriptor: SourceDescriptor = args
        .source
        .as_deref()
        .unwrap_or(DEFAULT_WALKING_SOURCE)
        .parse()?;
    let output = cfg.output_path("people_detect");

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

    let transform = build_transform(&cfg, source.width(), source.height())?;
    let stats = Driver::new(transform)
        .with_progress(Progress::for_run("people"))
        .run(source.as_mut(), sink.as_mut())?;

    log::info!("{} frames, {} frames with people", stats.frames, stats.matches);
    log::info!("elapsed time: {:.2} seconds", stats.elapsed_secs());
    Ok(())
}

#[cfg(feature = "detector-tract")]
fn build_transform(cfg: &PipelineConfig, width: u32, height: u32) -> Result<PersonDetect> {
    use framepipe::TractPersonDetector;

    match std::env::var("FRAMEPIPE_ONNX_MODEL") {
        Ok(path) if !path.trim().is_empty() => {
            let detector = TractPersonDetector::new(path.trim(), width, height)?;
            Ok(PersonDetect::new(cfg.person.clone(), Box::new(detector)))
        }
        _ => {
            log::warn!("FRAMEPIPE_ONNX_MODEL not set; using the stub detector");
            Ok(PersonDetect::with_stub(cfg.person.clone()))
        }
    }
}

#[cfg(not(feature = "detector-tract"))]
fn build_transform(cfg: &PipelineConfig, _width: u32, _height: u32) -> Result<PersonDetect> {
    Ok(PersonDetect::with_stub(cfg.person.clone()))
}
