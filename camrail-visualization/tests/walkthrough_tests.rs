//! End-to-end tests of the walk-through, interpolator and playback driver

use camrail_algorithms::InterpolationParams;
use camrail_core::{BoundingBox, Drawable, Error, Point3f, Pose, Result, Rotation3f, Vector3f};
use camrail_visualization::{
    Camera, FrameEncoder, LiveCamera, PlaybackDriver, PreviewStopped, RecordSettings, RenderSurface,
    StopReason, WalkStatus, WalkThrough,
};
use image::RgbaImage;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct MockSurface {
    redraws: usize,
    rendered: Vec<Pose>,
    fail_at: Option<usize>,
}

impl RenderSurface for MockSurface {
    fn request_redraw(&mut self) {
        self.redraws += 1;
    }

    fn render_frame(&mut self, camera: &dyn LiveCamera) -> Result<RgbaImage> {
        if self.fail_at == Some(self.rendered.len()) {
            return Err(Error::Encoding("capture failed".to_string()));
        }
        self.rendered.push(camera.pose());
        Ok(RgbaImage::new(2, 2))
    }
}

#[derive(Default)]
struct MockEncoder {
    opened: usize,
    closed: usize,
    frames: Vec<usize>,
}

impl FrameEncoder for MockEncoder {
    fn open(&mut self, _settings: &RecordSettings) -> Result<()> {
        self.opened += 1;
        Ok(())
    }

    fn push_frame(&mut self, index: usize, _frame: &RgbaImage) -> Result<()> {
        self.frames.push(index);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed += 1;
        Ok(())
    }
}

fn settings() -> RecordSettings {
    RecordSettings {
        output: PathBuf::from("walk.png"),
        frame_rate: 4,
        bit_rate: 8000,
        show_progress: true,
    }
}

fn pose_at(x: f32, yaw: f32) -> Pose {
    Pose::new(Point3f::new(x, 0.0, 1.0), Rotation3f::from_euler_angles(0.0, 0.0, yaw))
}

/// A free-mode walk-through at 4 fps with `count` keyframes along x
fn walk_with(count: usize) -> (WalkThrough, Camera) {
    let mut walk = WalkThrough::new();
    walk.set_status(WalkStatus::FreeMode);
    walk.set_frame_rate(4).unwrap();
    let mut camera = Camera::default();
    for i in 0..count {
        camera.set_pose(pose_at(i as f32, i as f32 * 0.3));
        walk.record_keyframe(&camera).unwrap();
    }
    (walk, camera)
}

fn preview_events(driver: &mut PlaybackDriver) -> Arc<Mutex<Vec<PreviewStopped>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    driver.subscribe(move |e| sink.lock().unwrap().push(*e));
    events
}

#[test]
fn test_save_read_roundtrip() {
    for count in [0, 1, 2, 5] {
        let (walk, _) = walk_with(count);
        let mut buffer = Vec::new();
        assert!(walk.interpolator().save_keyframes(walk.path(), &mut buffer));

        let mut loaded = WalkThrough::new();
        let mut target = camrail_core::CameraPath::new();
        assert!(loaded.interpolator_mut().read_keyframes(&mut target, Cursor::new(buffer)));

        assert_eq!(target.len(), count);
        assert_eq!(loaded.interpolator().frame_rate(), 4);
        for (read, written) in target.iter().zip(walk.path()) {
            assert!(read.pose().approx_eq(written.pose(), 1e-5, 1e-5));
        }
    }
}

#[test]
fn test_export_import_files() {
    let (walk, _) = walk_with(3);
    let file = std::env::temp_dir().join("camrail_walkthrough_export.kf");
    walk.export_path(&file).unwrap();

    let mut imported = WalkThrough::new();
    let mut camera = Camera::default();
    assert_eq!(imported.import_path(&file, &mut camera).unwrap(), 3);
    let _ = std::fs::remove_file(&file);

    assert_eq!(imported.interpolator().params(), InterpolationParams::new(4, 1.0).unwrap());
    assert_eq!(imported.current_keyframe_index(), None);
}

#[test]
fn test_import_is_atomic() {
    let (walk, _) = walk_with(3);
    let mut buffer = Vec::new();
    assert!(walk.interpolator().save_keyframes(walk.path(), &mut buffer));
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    for prior in [0, 1, 2] {
        for k in 0..lines.len() {
            let mut broken = lines.clone();
            broken[k] = "1 2 not-a-number";
            let broken = broken.join("\n");

            let (mut target, mut camera) = walk_with(prior);
            let before = target.path().keyframes().to_vec();
            let revision = target.path().revision();
            let cursor = target.current_keyframe_index();
            target.set_interpolation_speed(2.5).unwrap();

            let file = std::env::temp_dir().join(format!("camrail_broken_{}_{}.kf", prior, k));
            std::fs::write(&file, broken).unwrap();
            assert!(target.import_path(&file, &mut camera).is_err());
            let _ = std::fs::remove_file(&file);

            assert_eq!(target.path().keyframes(), before.as_slice());
            assert_eq!(target.path().revision(), revision);
            assert_eq!(target.current_keyframe_index(), cursor);
            assert_eq!(target.interpolator().interpolation_speed(), 2.5);
        }
    }
}

#[test]
fn test_import_grows_scene_to_cover_visible_path() {
    let mut source = WalkThrough::new();
    source.set_status(WalkStatus::FreeMode);
    let mut camera = Camera::default();
    for x in [0.0, 20.0, 50.0] {
        camera.set_pose(pose_at(x, 0.0));
        source.record_keyframe(&camera).unwrap();
    }
    let file = std::env::temp_dir().join("camrail_far_path.kf");
    source.export_path(&file).unwrap();

    let scene = BoundingBox::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0));
    let mut hidden = WalkThrough::new();
    let mut hidden_camera = Camera::default();
    hidden_camera.set_scene_bounding_box(&scene);
    hidden.set_path_visible(false, &mut hidden_camera, &[&scene as &dyn Drawable]);
    let fitted_radius = hidden_camera.scene_radius();
    hidden.import_path(&file, &mut hidden_camera).unwrap();
    assert_eq!(hidden_camera.scene_radius(), fitted_radius);

    let mut shown = WalkThrough::new();
    let mut shown_camera = Camera::default();
    shown_camera.set_scene_bounding_box(&scene);
    assert!(shown.path_visible());
    shown.import_path(&file, &mut shown_camera).unwrap();
    let _ = std::fs::remove_file(&file);

    let center = shown_camera.scene_center();
    for position in shown.path().positions() {
        assert!((position - center).norm() <= shown_camera.scene_radius() + 1e-4);
    }
    assert!(shown_camera.scene_radius() > fitted_radius);
}

#[test]
fn test_import_refused_during_preview() {
    let (mut walk, mut camera) = walk_with(3);
    let file = std::env::temp_dir().join("camrail_import_during_preview.kf");
    walk.export_path(&file).unwrap();

    let mut surface = MockSurface::default();
    let mut driver = PlaybackDriver::new(0.0);
    let events = preview_events(&mut driver);
    driver.start_preview(&mut walk).unwrap();
    driver.tick(&mut walk, &mut camera, &mut surface);

    let revision = walk.path().revision();
    assert!(matches!(walk.import_path(&file, &mut camera), Err(Error::InvalidState(_))));
    assert_eq!(walk.path().revision(), revision);
    assert!(driver.is_previewing());

    assert!(driver.stop_preview(&mut walk));
    assert_eq!(walk.import_path(&file, &mut camera).unwrap(), 3);
    let _ = std::fs::remove_file(&file);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, StopReason::Cancelled);
}

#[test]
fn test_degenerate_trajectories() {
    let (mut walk, _) = walk_with(0);
    assert!(walk.trajectory().unwrap().is_empty());

    let (mut walk, _) = walk_with(1);
    let trajectory = walk.trajectory().unwrap();
    assert_eq!(trajectory.len(), 1);
    let keyframe = walk.path().keyframes()[0];
    assert!(trajectory.samples()[0].pose.approx_eq(keyframe.pose(), 1e-6, 1e-6));
}

#[test]
fn test_cursor_follows_appends_and_deletes() {
    let (mut walk, _) = walk_with(4);
    assert_eq!(walk.current_keyframe_index(), Some(3));

    for expected in [Some(2), Some(1), Some(0), None] {
        assert!(walk.delete_last_keyframe().is_some());
        assert_eq!(walk.current_keyframe_index(), expected);
    }
    assert!(walk.path().is_empty());
}

#[test]
fn test_preview_runs_to_completion() {
    let (mut walk, mut camera) = walk_with(2);
    let mut surface = MockSurface::default();
    let mut driver = PlaybackDriver::new(0.0);
    let events = preview_events(&mut driver);

    driver.start_preview(&mut walk).unwrap();
    assert!(driver.interaction_locked());

    // 5 samples at 0.25s each
    assert_eq!(driver.update(Duration::from_millis(100), &mut walk, &mut camera, &mut surface), 0);
    assert_eq!(driver.update(Duration::from_millis(900), &mut walk, &mut camera, &mut surface), 4);
    assert_eq!(driver.update(Duration::from_millis(250), &mut walk, &mut camera, &mut surface), 1);
    assert_eq!(driver.update(Duration::from_secs(1), &mut walk, &mut camera, &mut surface), 0);

    assert!(!driver.is_previewing());
    assert_eq!(surface.redraws, 5);
    assert!(camera.pose().approx_eq(walk.path().keyframes()[1].pose(), 1e-5, 1e-4));

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, StopReason::Finished);
    assert_eq!(events[0].frames_shown, 5);
}

#[test]
fn test_preview_resumes_after_stop() {
    let (mut walk, mut camera) = walk_with(2);
    let mut surface = MockSurface::default();
    let mut driver = PlaybackDriver::default();
    let events = preview_events(&mut driver);

    driver.start_preview(&mut walk).unwrap();
    driver.tick(&mut walk, &mut camera, &mut surface);
    driver.tick(&mut walk, &mut camera, &mut surface);
    assert!(driver.stop_preview(&mut walk));
    assert!(!driver.stop_preview(&mut walk));

    driver.start_preview(&mut walk).unwrap();
    while driver.tick(&mut walk, &mut camera, &mut surface) {}

    let events = events.lock().unwrap();
    let summary: Vec<_> = events.iter().map(|e| (e.reason, e.frames_shown)).collect();
    assert_eq!(summary, vec![(StopReason::Cancelled, 2), (StopReason::Finished, 3)]);
}

#[test]
fn test_preview_restarts_after_path_change() {
    let (mut walk, mut camera) = walk_with(2);
    let mut surface = MockSurface::default();
    let mut driver = PlaybackDriver::default();

    driver.start_preview(&mut walk).unwrap();
    driver.tick(&mut walk, &mut camera, &mut surface);
    driver.stop_preview(&mut walk);

    camera.set_pose(pose_at(5.0, 0.0));
    walk.record_keyframe(&camera).unwrap();
    driver.start_preview(&mut walk).unwrap();
    assert_eq!(walk.interpolator().session().unwrap().cursor(), 0);
}

#[test]
fn test_record_stops_preview_first() {
    let (mut walk, mut camera) = walk_with(3);
    let mut surface = MockSurface::default();
    let mut encoder = MockEncoder::default();
    let mut driver = PlaybackDriver::default();
    let events = preview_events(&mut driver);

    driver.start_preview(&mut walk).unwrap();
    driver.tick(&mut walk, &mut camera, &mut surface);

    let summary = driver
        .record(&mut walk, &mut camera, &mut surface, &mut encoder, &settings())
        .unwrap();

    assert_eq!(events.lock().unwrap().len(), 1);
    assert_eq!(events.lock().unwrap()[0].reason, StopReason::Cancelled);
    assert!(!driver.is_previewing());

    // 2 segments at 4 fps plus the closing sample, one frame each, in order
    assert_eq!(summary.frames, 9);
    assert_eq!(encoder.frames, (0..9).collect::<Vec<_>>());
    assert_eq!((encoder.opened, encoder.closed), (1, 1));
    assert!(surface.rendered[8].approx_eq(walk.path().keyframes()[2].pose(), 1e-5, 1e-4));
    assert!(walk.path_visible());
}

#[test]
fn test_record_failure_restores_visibility() {
    let (mut walk, mut camera) = walk_with(2);
    let mut surface = MockSurface {
        fail_at: Some(2),
        ..MockSurface::default()
    };
    let mut encoder = MockEncoder::default();
    let mut driver = PlaybackDriver::default();

    let result = driver.record(&mut walk, &mut camera, &mut surface, &mut encoder, &settings());
    assert!(matches!(result, Err(Error::Encoding(_))));
    assert_eq!(encoder.frames, vec![0, 1]);
    assert_eq!(encoder.closed, 1);
    assert!(walk.path_visible());
    assert!(!driver.is_recording());
}

#[test]
fn test_hiding_path_restores_model_bounds() {
    let (mut walk, mut camera) = walk_with(3);
    let a = BoundingBox::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(0.0, 0.0, 0.0));
    let b = vec![Point3f::new(2.0, 2.0, 2.0), Point3f::new(1.0, 1.0, 1.0)];
    let models: [&dyn Drawable; 2] = [&a, &b];

    camera.set_scene_bounding_box(&a);
    walk.set_path_visible(true, &mut camera, &models);
    assert!(camera.scene_radius() > a.radius());

    walk.set_path_visible(false, &mut camera, &models);
    let union = BoundingBox::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(2.0, 2.0, 2.0));
    assert_eq!(camera.scene_center(), union.center());
    assert_eq!(camera.scene_radius(), union.radius());
    assert!(!walk.path_visible());
}

#[test]
fn test_empty_path_guards() {
    let (mut walk, mut camera) = walk_with(0);
    let mut surface = MockSurface::default();
    let mut encoder = MockEncoder::default();
    let mut driver = PlaybackDriver::default();
    let events = preview_events(&mut driver);
    let revision = walk.path().revision();

    assert!(walk.delete_last_keyframe().is_none());
    assert_eq!(walk.delete_path(), 0);
    assert!(matches!(driver.start_preview(&mut walk), Err(Error::EmptyPath(_))));
    assert!(matches!(
        driver.record(&mut walk, &mut camera, &mut surface, &mut encoder, &settings()),
        Err(Error::EmptyPath(_))
    ));

    assert_eq!(walk.path().revision(), revision);
    assert!(!driver.is_previewing());
    assert!(events.lock().unwrap().is_empty());
    assert_eq!(encoder.opened, 0);
    assert_eq!(surface.redraws, 0);
}

#[test]
fn test_glide_to_keyframe() {
    let (mut walk, mut camera) = walk_with(3);
    let mut surface = MockSurface::default();
    let mut driver = PlaybackDriver::new(1.0);

    let mv = walk.move_to(0, true).unwrap();
    assert!(driver.apply_move(&mv, &mut camera, &mut surface));
    assert!(driver.is_gliding());
    assert!(!driver.interaction_locked());

    driver.update(Duration::from_millis(500), &mut walk, &mut camera, &mut surface);
    let halfway = camera.pose().position.x;
    assert!(halfway > 0.0 && halfway < 2.0);

    driver.update(Duration::from_millis(600), &mut walk, &mut camera, &mut surface);
    assert!(!driver.is_gliding());
    assert!(camera.pose().approx_eq(&mv.pose, 1e-5, 1e-4));

    let snap = walk.move_to(2, false).unwrap();
    driver.apply_move(&snap, &mut camera, &mut surface);
    assert_eq!(camera.pose(), snap.pose);
}

#[test]
fn test_walking_mode_keyframes() {
    let mut walk = WalkThrough::new();
    walk.set_status(WalkStatus::WalkingMode);
    let mut camera = Camera::looking_at(Point3f::new(0.0, -10.0, 5.0), Point3f::origin(), Vector3f::z()).unwrap();
    camera.set_scene_radius(10.0);

    walk.walk_to(Point3f::new(0.0, 0.0, 0.0), &mut camera).unwrap();
    walk.walk_to(Point3f::new(0.0, 4.0, 0.0), &mut camera).unwrap();

    let positions: Vec<_> = walk.path().positions().collect();
    assert_eq!(positions.len(), 2);
    // eyes stay at character height above the ground
    for p in &positions {
        assert!((p.z - 1.0).abs() < 1e-5);
    }
    assert!((positions[1].y - positions[0].y - 4.0).abs() < 1e-5);
}
