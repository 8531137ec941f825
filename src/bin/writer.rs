//! writer - plain re-encode demo.
//!
//! Exercises the capture and encode path with the identity transform:
//! every frame goes to `output/writer.avi` unchanged, encoded with the
//! configured FourCC tag (DIVX by default; XVID also container-tested).

use anyhow::Result;
use clap::Parser;

use framepipe::config::{PipelineConfig, DEFAULT_TRAFFIC_SOURCE};
use framepipe::ui::Progress;
use framepipe::{sink, source, Driver, Identity, SourceDescriptor};

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
    let output = cfg.output_path("writer");

    log::info!("framepipe {}", env!("CARGO_PKG_VERSION"));
    log::info!("input: {}", descriptor);
    log::info!("output: {} (fourcc {})", output.display(), cfg.fourcc);

    let mut source = source::open(&descriptor)?;
    let mut sink = sink::open(
        &output,
        cfg.fourcc,
        source.fps(),
        source.width(),
        source.height(),
    )?;

    let stats = Driver::new(Identity)
        .with_progress(Progress::for_run("writer"))
        .run(source.as_mut(), sink.as_mut())?;

    log::info!("{} frames written", stats.frames);
    log::info!("elapsed time: {:.2} seconds", stats.elapsed_secs());
    Ok(())
}
