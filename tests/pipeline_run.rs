//! End-to-end runs over the public API: synthetic source in, counting
//! sink out, real transforms in between.

use framepipe::{
    source, Driver, EdgeDetect, EdgeParams, Identity, MotionDetect, MotionParams, NullSink,
    PipelineError, SourceDescriptor, SyntheticConfig, SyntheticSource,
};

#[test]
fn identity_run_writes_every_frame_and_matches_none() {
    let mut source = SyntheticSource::new(SyntheticConfig {
        frames: 12,
        width: 64,
        height: 48,
        ..SyntheticConfig::default()
    });
    let mut sink = NullSink::new();

    let stats = Driver::new(Identity).run(&mut source, &mut sink).unwrap();

    assert_eq!(stats.frames, 12);
    assert_eq!(stats.matches, 0);
    assert_eq!(sink.frames_written, 12);
    assert_eq!(sink.releases, 1);
}

#[test]
fn motion_run_over_a_moving_square_reports_matches() {
    // A 16px square drifting across a 64x64 scene covers ~6% of it, well
    // above the 0.75% match bar once a reference frame exists.
    let mut source = SyntheticSource::new(SyntheticConfig {
        frames: 30,
        width: 64,
        height: 64,
        square_side: 16,
        ..SyntheticConfig::default()
    });
    let mut sink = NullSink::new();

    let stats = Driver::new(MotionDetect::new(MotionParams::default()))
        .run(&mut source, &mut sink)
        .unwrap();

    assert_eq!(stats.frames, 30);
    assert!(stats.matches > 0, "moving square never flagged as motion");
    // The first frame only seeds the reference and cannot match.
    assert!(stats.matches < 30);
    assert_eq!(sink.frames_written, 30);
    assert_eq!(sink.releases, 1);
}

#[test]
fn motion_run_over_a_static_scene_reports_nothing() {
    let mut source = SyntheticSource::new(SyntheticConfig {
        frames: 20,
        width: 64,
        height: 64,
        square_side: 0,
        ..SyntheticConfig::default()
    });
    let mut sink = NullSink::new();

    let stats = Driver::new(MotionDetect::new(MotionParams::default()))
        .run(&mut source, &mut sink)
        .unwrap();

    assert_eq!(stats.frames, 20);
    assert_eq!(stats.matches, 0);
}

#[test]
fn edge_run_completes_over_a_stub_descriptor() {
    let descriptor: SourceDescriptor = "stub://traffic?frames=8&width=80&height=60"
        .parse()
        .unwrap();
    let mut source = source::open(&descriptor).unwrap();
    let mut sink = NullSink::new();

    let stats = Driver::new(EdgeDetect::new(EdgeParams::default()))
        .run(source.as_mut(), &mut sink)
        .unwrap();

    assert_eq!(stats.frames, 8);
    assert_eq!(sink.frames_written, 8);
}

#[test]
fn zero_area_stub_source_is_rejected_at_open() {
    let descriptor: SourceDescriptor = "stub://dead?width=0".parse().unwrap();
    let err = source::open(&descriptor).unwrap_err();
    assert!(matches!(err, PipelineError::SourceUnavailable(_)));
}
