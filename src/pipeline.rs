//! The shared per-frame loop.
//!
//! Every demo builds a [`Driver`] around one transform and runs it over a
//! source/sink pair. The loop is strictly sequential: read, transform,
//! write, count. Reading `None` ends the run; the first error of any kind
//! aborts it. Either way the sink is released exactly once before `run`
//! returns.
//!
//! A driver is single-shot: `run` consumes it, so a new run requires a
//! fresh driver (aborted runs are not resumable).

use std::time::{Duration, Instant};

use crate::error::PipelineError;
use crate::sink::FrameSink;
use crate::source::FrameSource;
use crate::transform::FrameTransform;
use crate::ui::Progress;

/// Counters for one completed run.
#[derive(Clone, Debug)]
pub struct RunStats {
    /// Frames read from the source and written to the sink.
    pub frames: u64,
    /// Frames the transform flagged (motion / person present).
    pub matches: u64,
    /// Wall-clock duration of the loop.
    pub elapsed: Duration,
}

impl RunStats {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Owns a transform and drives it over a whole source.
pub struct Driver<T: FrameTransform> {
    transform: T,
    progress: Option<Progress>,
}

impl<T: FrameTransform> Driver<T> {
    pub fn new(transform: T) -> Self {
        Self {
            transform,
            progress: None,
        }
    }

    /// Attach per-frame progress reporting (used by the demo binaries).
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run the loop to source exhaustion.
    ///
    /// There is no per-frame recovery: a source, transform, or sink failure
    /// aborts the run and surfaces as the matching [`PipelineError`]
    /// variant. The sink is released on every exit path; frames already
    /// flushed before an abort stay in the output.
    pub fn run(
        mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
    ) -> Result<RunStats, PipelineError> {
        let started = Instant::now();
        let result = self.run_loop(source, sink, started);
        if let Some(progress) = &self.progress {
            progress.finish();
        }
        let released = sink.release().map_err(PipelineError::Sink);
        match result {
            Ok(stats) => {
                released?;
                log::info!(
                    "{}: {} frames, {} matched, {:.2} seconds",
                    self.transform.name(),
                    stats.frames,
                    stats.matches,
                    stats.elapsed_secs()
                );
                Ok(stats)
            }
            Err(err) => {
                if let Err(release_err) = released {
                    log::warn!("sink release also failed after abort: {}", release_err);
                }
                Err(err)
            }
        }
    }

    fn run_loop(
        &mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        started: Instant,
    ) -> Result<RunStats, PipelineError> {
        let mut frames = 0u64;
        let mut matches = 0u64;
        while let Some(frame) = source.read().map_err(PipelineError::Source)? {
            let output = self
                .transform
                .apply(&frame)
                .map_err(PipelineError::Transform)?;
            if output.matched {
                matches += 1;
            }
            sink.write(&output.frame).map_err(PipelineError::Sink)?;
            frames += 1;
            if let Some(progress) = &self.progress {
                progress.tick(frames, matches);
            }
        }
        Ok(RunStats {
            frames,
            matches,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::sink::NullSink;
    use crate::source::{SyntheticConfig, SyntheticSource};
    use crate::transform::{Identity, TransformOutput};
    use anyhow::anyhow;

    fn synthetic(frames: u64) -> SyntheticSource {
        SyntheticSource::new(SyntheticConfig {
            frames,
            width: 32,
            height: 32,
            ..SyntheticConfig::default()
        })
    }

    #[test]
    fn empty_source_yields_zero_stats_and_one_release() {
        let mut source = synthetic(0);
        let mut sink = NullSink::new();
        let stats = Driver::new(Identity)
            .run(&mut source, &mut sink)
            .unwrap();
        assert_eq!(stats.frames, 0);
        assert_eq!(stats.matches, 0);
        assert_eq!(sink.frames_written, 0);
        assert_eq!(sink.releases, 1);
    }

    #[test]
    fn every_frame_reaches_the_sink() {
        let mut source = synthetic(9);
        let mut sink = NullSink::new();
        let stats = Driver::new(Identity)
            .run(&mut source, &mut sink)
            .unwrap();
        assert_eq!(stats.frames, 9);
        assert_eq!(stats.matches, 0);
        assert_eq!(sink.frames_written, 9);
        assert_eq!(sink.releases, 1);
    }

    struct FailingTransform {
        fail_at: u64,
    }

    impl FrameTransform for FailingTransform {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn apply(&mut self, frame: &Frame) -> anyhow::Result<TransformOutput> {
            if frame.index >= self.fail_at {
                Err(anyhow!("injected failure on frame {}", frame.index))
            } else {
                Ok(TransformOutput {
                    frame: frame.clone(),
                    matched: true,
                })
            }
        }
    }

    #[test]
    fn transform_failure_aborts_but_still_releases_the_sink() {
        let mut source = synthetic(10);
        let mut sink = NullSink::new();
        let err = Driver::new(FailingTransform { fail_at: 3 })
            .run(&mut source, &mut sink)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Transform(_)));
        // Frames up to the failure were flushed; no further frames ran.
        assert_eq!(sink.frames_written, 3);
        assert_eq!(sink.releases, 1);
    }

    struct RejectingSink {
        releases: u64,
    }

    impl FrameSink for RejectingSink {
        fn write(&mut self, _frame: &Frame) -> anyhow::Result<()> {
            Err(anyhow!("sink full"))
        }

        fn release(&mut self) -> anyhow::Result<()> {
            self.releases += 1;
            Ok(())
        }
    }

    #[test]
    fn sink_failure_aborts_and_releases() {
        let mut source = synthetic(5);
        let mut sink = RejectingSink { releases: 0 };
        let err = Driver::new(Identity)
            .run(&mut source, &mut sink)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Sink(_)));
        assert_eq!(sink.releases, 1);
    }

    #[test]
    fn matched_frames_are_counted() {
        struct AlwaysMatch;
        impl FrameTransform for AlwaysMatch {
            fn name(&self) -> &'static str {
                "always"
            }
            fn apply(&mut self, frame: &Frame) -> anyhow::Result<TransformOutput> {
                Ok(TransformOutput {
                    frame: frame.clone(),
                    matched: frame.index % 2 == 0,
                })
            }
        }

        let mut source = synthetic(10);
        let mut sink = NullSink::new();
        let stats = Driver::new(AlwaysMatch)
            .run(&mut source, &mut sink)
            .unwrap();
        assert_eq!(stats.frames, 10);
        assert_eq!(stats.matches, 5);
    }
}
