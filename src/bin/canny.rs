//! canny - Canny edge-detection demo.
//!
//! Reads a video source, recolors edges with the original frame content,
//! and re-encodes the result to `output/canny.avi`.

use anyhow::Result;
use clap::Parser;

use framepipe::config::{PipelineConfig, DEFAULT_TRAFFIC_SOURCE};
use framepipe::ui::Progress;
use framepipe::{sink, source, Driver, EdgeDetect, SourceDescriptor};

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
    let output = cfg.output_path("canny");

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

    let stats = Driver::new(EdgeDetect::new(cfg.edge.clone()))
        .with_progress(Progress::for_run("canny"))
        .run(source.as_mut(), sink.as_mut())?;

    log::info!("{} frames processed", stats.frames);
    log::info!("elapsed time: {:.2} seconds", stats.elapsed_secs());
    Ok(())
}
