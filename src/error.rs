use thiserror::Error;

/// Failure taxonomy for a pipeline run.
///
/// Library traits (`FrameSource`, `FrameSink`, `FrameTransform`) speak
/// `anyhow::Result`; the driver classifies their failures into one of these
/// variants when it aborts a run. There is no per-frame recovery anywhere:
/// the first error ends the run after resources are released.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed caller input, e.g. a bad FourCC string or source descriptor.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The capture source could not be opened, or reported a degenerate
    /// (zero-area) resolution. Some backends report success indefinitely on a
    /// dead device, so zero width/height is treated as "could not open".
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// The source failed mid-run while reading a frame.
    #[error("frame source failed")]
    Source(#[source] anyhow::Error),

    /// A per-frame transform failed. Fatal to the run.
    #[error("frame transform failed")]
    Transform(#[source] anyhow::Error),

    /// The output sink rejected a frame or failed to finalize.
    #[error("frame sink failed")]
    Sink(#[source] anyhow::Error),
}
