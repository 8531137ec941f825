//! framepipe — per-frame video pipeline demos.
//!
//! Four demo programs share one loop: open a video source, read frames,
//! apply one transform per frame, write the result to an output container,
//! and print statistics at the end. The pieces:
//!
//! - [`fourcc`]: the four-character codec tag handed to the output
//!   container.
//! - [`source`] / [`sink`]: capture and encode backends. `stub://`
//!   synthetic sources and a counting sink are always built in; real
//!   decode/encode is behind the `video-ffmpeg` feature.
//! - [`transform`]: the per-frame capability — identity, Canny edges,
//!   running-average motion detection, pedestrian detection.
//! - [`pipeline`]: the shared driver loop and its run statistics.
//!
//! The crate is strictly single-threaded and synchronous: read, transform,
//! and write happen in sequence on one thread, and any failure is fatal to
//! the run (batch processing, not a service).

pub mod config;
pub mod error;
pub mod fourcc;
pub mod frame;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod transform;
pub mod ui;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use fourcc::FourCc;
pub use frame::{Detection, Frame, Rect};
pub use pipeline::{Driver, RunStats};
pub use sink::{FrameSink, NullSink};
pub use source::{FrameSource, SourceDescriptor, SyntheticConfig, SyntheticSource};
#[cfg(feature = "detector-tract")]
pub use transform::TractPersonDetector;
pub use transform::{
    EdgeDetect, EdgeParams, FrameTransform, Identity, MotionDetect, MotionParams, PersonDetect,
    PersonDetector, PersonParams, StubPersonDetector, TransformOutput,
};
