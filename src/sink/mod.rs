//! Output sinks.
//!
//! The driver writes every transformed frame to a sink and releases it
//! exactly once, on both the success and the fatal-error path. The encoding
//! sink requires the `video-ffmpeg` feature; without it `open` falls back to
//! a counting sink so the demos still run end to end.

#[cfg(feature = "video-ffmpeg")]
mod ffmpeg;

#[cfg(feature = "video-ffmpeg")]
pub(crate) use self::ffmpeg::FfmpegSink;

use std::path::Path;

use anyhow::{anyhow, Result};

use crate::error::PipelineError;
use crate::fourcc::FourCc;
use crate::frame::Frame;

/// A sequential frame consumer.
pub trait FrameSink {
    fn write(&mut self, frame: &Frame) -> Result<()>;

    /// Finalize the sink. Called exactly once per run; writing after release
    /// is an error.
    fn release(&mut self) -> Result<()>;
}

/// Open an encoding sink at `path` for the given codec tag and geometry.
///
/// The FourCC tag is passed to the container layer verbatim; whether the
/// requested codec is actually supported is the container's concern.
#[allow(unused_variables)]
pub fn open(
    path: &Path,
    fourcc: FourCc,
    fps: f64,
    width: u32,
    height: u32,
) -> Result<Box<dyn FrameSink>, PipelineError> {
    #[cfg(feature = "video-ffmpeg")]
    {
        let sink = FfmpegSink::create(path, fourcc, fps, width, height)
            .map_err(PipelineError::Sink)?;
        Ok(Box::new(sink))
    }
    #[cfg(not(feature = "video-ffmpeg"))]
    {
        log::warn!(
            "built without video-ffmpeg; {} will not be written, frames are counted and discarded",
            path.display()
        );
        Ok(Box::new(NullSink::default()))
    }
}

/// Counting sink: discards frames, records how it was used.
#[derive(Debug, Default)]
pub struct NullSink {
    pub frames_written: u64,
    pub releases: u64,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for NullSink {
    fn write(&mut self, _frame: &Frame) -> Result<()> {
        if self.releases > 0 {
            return Err(anyhow!("write after release"));
        }
        self.frames_written += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.releases += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn null_sink_counts_frames_and_releases() {
        let mut sink = NullSink::new();
        let frame = Frame::new(RgbImage::new(8, 8), 0);
        sink.write(&frame).unwrap();
        sink.write(&frame).unwrap();
        sink.release().unwrap();
        assert_eq!(sink.frames_written, 2);
        assert_eq!(sink.releases, 1);
    }

    #[test]
    fn null_sink_rejects_writes_after_release() {
        let mut sink = NullSink::new();
        sink.release().unwrap();
        let frame = Frame::new(RgbImage::new(8, 8), 0);
        assert!(sink.write(&frame).is_err());
    }
}
