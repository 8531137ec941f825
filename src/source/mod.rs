//! Capture sources.
//!
//! A source descriptor is either a file path / stream URL or a non-negative
//! camera index (distinguished by whether it parses as an integer).
//! Descriptors beginning with `stub://` open a synthetic in-process source,
//! so the default build needs no media files or system codec libraries.
//! Everything else requires the `video-ffmpeg` feature; camera indexes
//! resolve to `/dev/video<N>` through the same ffmpeg backend.

#[cfg(feature = "video-ffmpeg")]
mod ffmpeg;
mod synthetic;

#[cfg(feature = "video-ffmpeg")]
pub(crate) use ffmpeg::FfmpegSource;
pub use synthetic::{SyntheticConfig, SyntheticSource};

use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::error::PipelineError;
use crate::frame::Frame;

/// Where frames come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceDescriptor {
    /// Local capture device, by index.
    Camera(u32),
    /// File path or stream URL, including `stub://` synthetic sources.
    Path(String),
}

impl FromStr for SourceDescriptor {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::InvalidArgument(
                "source descriptor is empty".into(),
            ));
        }
        match trimmed.parse::<u32>() {
            Ok(index) => Ok(Self::Camera(index)),
            Err(_) => Ok(Self::Path(trimmed.to_string())),
        }
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera(index) => write!(f, "camera {}", index),
            Self::Path(path) => f.write_str(path),
        }
    }
}

/// A sequential frame producer.
///
/// `read` returns `Ok(None)` when the source is exhausted; that is the sole
/// normal termination condition of a run. Errors are fatal to the run.
pub trait FrameSource: fmt::Debug {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn fps(&self) -> f64;
    fn read(&mut self) -> Result<Option<Frame>>;
}

/// Open a capture source for `descriptor`.
///
/// Fails with [`PipelineError::SourceUnavailable`] when the backend reports
/// a zero-area resolution: some capture backends report success indefinitely
/// on a device they never actually opened, so a degenerate resolution is the
/// reliable "could not open" signal.
pub fn open(descriptor: &SourceDescriptor) -> Result<Box<dyn FrameSource>, PipelineError> {
    let source: Box<dyn FrameSource> = match descriptor {
        SourceDescriptor::Path(path) if path.starts_with("stub://") => {
            Box::new(SyntheticSource::from_url(path)?)
        }
        #[cfg(feature = "video-ffmpeg")]
        SourceDescriptor::Path(path) => Box::new(FfmpegSource::open(path)?),
        #[cfg(feature = "video-ffmpeg")]
        SourceDescriptor::Camera(index) => {
            Box::new(FfmpegSource::open(&format!("/dev/video{}", index))?)
        }
        #[cfg(not(feature = "video-ffmpeg"))]
        other => {
            return Err(PipelineError::SourceUnavailable(format!(
                "{} requires the video-ffmpeg feature; only stub:// sources are built in",
                other
            )))
        }
    };
    if source.width() == 0 || source.height() == 0 {
        return Err(PipelineError::SourceUnavailable(format!(
            "{} reports {}x{} resolution",
            descriptor,
            source.width(),
            source.height()
        )));
    }
    log::info!(
        "opened {} ({}x{} @ {:.2} fps)",
        descriptor,
        source.width(),
        source.height(),
        source.fps()
    );
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_descriptors_are_cameras() {
        assert_eq!(
            "0".parse::<SourceDescriptor>().unwrap(),
            SourceDescriptor::Camera(0)
        );
        assert_eq!(
            "3".parse::<SourceDescriptor>().unwrap(),
            SourceDescriptor::Camera(3)
        );
    }

    #[test]
    fn everything_else_is_a_path() {
        assert_eq!(
            "media/traffic.mp4".parse::<SourceDescriptor>().unwrap(),
            SourceDescriptor::Path("media/traffic.mp4".into())
        );
        assert_eq!(
            "rtsp://cam/stream".parse::<SourceDescriptor>().unwrap(),
            SourceDescriptor::Path("rtsp://cam/stream".into())
        );
        // A negative number does not parse as a camera index.
        assert_eq!(
            "-1".parse::<SourceDescriptor>().unwrap(),
            SourceDescriptor::Path("-1".into())
        );
    }

    #[test]
    fn empty_descriptor_is_rejected() {
        assert!(matches!(
            "  ".parse::<SourceDescriptor>(),
            Err(PipelineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn open_rejects_zero_area_sources() {
        let err = open(&"stub://dead?width=0".parse().unwrap()).unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable(_)));
    }

    #[test]
    fn open_builds_stub_sources() {
        let source = open(&"stub://traffic?frames=5".parse().unwrap()).unwrap();
        assert_eq!(source.width(), 320);
        assert_eq!(source.height(), 240);
    }
}
