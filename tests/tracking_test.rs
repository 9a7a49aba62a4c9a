mod common;

use std::time::Duration;

use common::{HEIGHT, RecordingSink, WIDTH, blank_frame, dark_rect_frame, rect_frame};
use recttrack_rs::{
    AsyncTrackerPipeline, DisplaySize, GeometryConverter, Orientation, PipelineConfig,
    TrackerPipeline,
};

const DISPLAY: DisplaySize = DisplaySize {
    width: 320.0,
    height: 240.0,
};

#[test]
fn test_detect_track_lose_redetect() {
    let mut pipeline = TrackerPipeline::from_config(&PipelineConfig::default(), DISPLAY);
    let mut sink = RecordingSink::default();

    // Frame 1: nothing held, so the rectangle is detected.
    let first = pipeline
        .process_and_render(&rect_frame(1, (40, 30, 119, 89)), &mut sink)
        .unwrap();
    let target = first.target.expect("rectangle should be detected");
    assert_eq!(target.start_frame, 1);
    let id = target.id;

    // Frames 2-6: the rectangle moves and is tracked under the same id.
    for step in 1..=5usize {
        let (dx, dy) = (2 * step, step);
        let frame = rect_frame(step as u64 + 1, (40 + dx, 30 + dy, 119 + dx, 89 + dy));
        let report = pipeline.process_and_render(&frame, &mut sink).unwrap();
        let target = report.target.expect("rectangle should stay tracked");
        assert_eq!(target.id, id);
        assert_eq!(target.tracked_frames, step as u32);
        assert!(target.observation.confidence >= 0.5);
    }
    let tracked = pipeline.controller().current().unwrap().observation.quad;
    let top_left = tracked.top_left();
    assert!((top_left.x * WIDTH as f32 - 50.0).abs() < 2.0, "x {}", top_left.x);
    assert!((top_left.y * HEIGHT as f32 - 35.0).abs() < 2.0, "y {}", top_left.y);

    // Frame 7: the rectangle is gone and the overlay is cleared.
    let lost = pipeline.process_and_render(&blank_frame(7), &mut sink).unwrap();
    assert!(lost.target.is_none());
    assert!(lost.polygon.is_none());

    // Frame 8: detection runs again and starts a new target.
    let again = pipeline
        .process_and_render(&rect_frame(8, (60, 40, 139, 99)), &mut sink)
        .unwrap();
    let target = again.target.expect("rectangle should be detected again");
    assert_ne!(target.id, id);
    assert_eq!(target.start_frame, 8);

    assert_eq!(sink.frames.len(), 8);
    assert!(sink.frames[..6].iter().all(Option::is_some));
    assert!(sink.frames[6].is_none());
    assert!(sink.frames[7].is_some());
}

#[test]
fn test_dark_rectangle_on_bright_background_is_held_without_flicker() {
    let mut pipeline = TrackerPipeline::from_config(&PipelineConfig::default(), DISPLAY);
    let mut sink = RecordingSink::default();

    let first = pipeline
        .process_and_render(&dark_rect_frame(1, (40, 30, 119, 89)), &mut sink)
        .unwrap();
    let target = first.target.expect("dark rectangle should be detected");
    let top_left = target.observation.quad.top_left();
    assert!((top_left.x - 0.25).abs() < 0.01, "x {}", top_left.x);
    assert!((top_left.y - 0.25).abs() < 0.01, "y {}", top_left.y);
    let id = target.id;

    for step in 1..=5usize {
        let frame = dark_rect_frame(step as u64 + 1, (40 + step, 30 + step, 119 + step, 89 + step));
        let report = pipeline.process_and_render(&frame, &mut sink).unwrap();
        let target = report.target.expect("dark rectangle should stay tracked");
        assert_eq!(target.id, id);
        assert_eq!(target.tracked_frames, step as u32);
    }

    assert_eq!(sink.frames.len(), 6);
    assert!(sink.frames.iter().all(Option::is_some));
    let tracked = pipeline.controller().current().unwrap().observation.quad;
    assert!((tracked.top_left().x * WIDTH as f32 - 45.0).abs() < 2.0);
    assert!((tracked.top_left().y * HEIGHT as f32 - 35.0).abs() < 2.0);
}

#[test]
fn test_overlay_matches_portrait_mapping() {
    let mut pipeline = TrackerPipeline::from_config(&PipelineConfig::default(), DISPLAY);
    let report = pipeline
        .process_frame(&rect_frame(1, (40, 30, 119, 89)))
        .unwrap();
    let quad = report.target.unwrap().observation.quad;
    let polygon = report.polygon.unwrap();
    assert_eq!(
        polygon,
        GeometryConverter::to_display(&quad, Orientation::Portrait, DISPLAY)
    );

    // Portrait swaps the axes: detector (0.25, 0.25) lands at (80, 60).
    assert!((polygon.points[0].x - 80.0).abs() < 0.5, "{:?}", polygon.points[0]);
    assert!((polygon.points[0].y - 60.0).abs() < 0.5, "{:?}", polygon.points[0]);
}

#[test]
fn test_empty_scene_never_draws() {
    let mut pipeline = TrackerPipeline::from_config(&PipelineConfig::default(), DISPLAY);
    let mut sink = RecordingSink::default();
    let mut frames = (1..=3).map(blank_frame);
    assert_eq!(pipeline.run(&mut frames, &mut sink), 3);
    assert!(sink.frames.iter().all(Option::is_none));
    assert!(!pipeline.controller().is_tracking());
}

#[test]
fn test_async_pipeline_detects_then_tracks() {
    let mut pipeline = AsyncTrackerPipeline::from_config(
        &PipelineConfig::default(),
        DISPLAY,
        RecordingSink::default(),
    )
    .unwrap();
    let timeout = Duration::from_secs(10);

    assert_eq!(pipeline.submit(rect_frame(1, (40, 30, 119, 89))), Ok(true));
    let detected = pipeline.wait_for_result(timeout).unwrap().unwrap();
    let id = detected.target.expect("rectangle should be detected").id;

    assert_eq!(pipeline.submit(rect_frame(2, (42, 31, 121, 90))), Ok(true));
    let tracked = pipeline.wait_for_result(timeout).unwrap().unwrap();
    let target = tracked.target.expect("rectangle should stay tracked");
    assert_eq!(target.id, id);
    assert_eq!(target.tracked_frames, 1);

    assert_eq!(pipeline.sink().frames.len(), 2);
    assert_eq!(pipeline.dropped_frames(), 0);
}
