//! Per-frame transforms.
//!
//! Every demo is the same loop with a different transform plugged in:
//! "apply one frame, produce a derived frame and a match flag". The driver
//! owns the loop; the transform owns whatever cross-frame state it needs
//! (only the motion detector has any — its running-average reference).

mod edges;
mod identity;
mod motion;
mod person;

pub use edges::{EdgeDetect, EdgeParams};
pub use identity::Identity;
pub use motion::{MotionDetect, MotionParams};
pub use person::{PersonDetect, PersonDetector, PersonParams, StubPersonDetector};
#[cfg(feature = "detector-tract")]
pub use person::TractPersonDetector;

use anyhow::Result;

use crate::frame::Frame;

/// Result of applying a transform to one frame.
#[derive(Debug)]
pub struct TransformOutput {
    /// The derived or annotated frame handed to the sink.
    pub frame: Frame,
    /// Whether this frame counts toward the run's match statistic
    /// (frame with motion, frame with a person). Always false for
    /// transforms with no match notion.
    pub matched: bool,
}

/// One-frame-in, one-frame-out capability the driver is parametrized by.
///
/// Implementations must treat the input frame as read-only; any failure is
/// fatal to the run (the driver does not retry).
pub trait FrameTransform {
    /// Transform label used in logs and statistics lines.
    fn name(&self) -> &'static str;

    fn apply(&mut self, frame: &Frame) -> Result<TransformOutput>;
}
