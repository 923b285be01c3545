//! File-level tests for the keyframe format

use camrail_core::{Keyframe, Point3f, Rotation3f};
use camrail_io::{read_keyframe_file, write_keyframe_file};
use std::fs;

fn orbit(count: usize) -> Vec<Keyframe> {
    (0..count)
        .map(|i| {
            let angle = i as f32 * 0.4;
            Keyframe::from_parts(
                Point3f::new(angle.cos() * 5.0, angle.sin() * 5.0, 1.5),
                Rotation3f::from_euler_angles(0.0, 0.0, angle),
            )
        })
        .collect()
}

#[test]
fn test_file_roundtrip_for_several_sizes() {
    for count in [0, 1, 2, 7] {
        let path = std::env::temp_dir().join(format!("camrail_roundtrip_{}.kf", count));
        let keyframes = orbit(count);

        write_keyframe_file(&path, 30, 2.0, &keyframes).unwrap();
        let file = read_keyframe_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(file.frame_rate, 30);
        assert_eq!(file.interpolation_speed, 2.0);
        assert_eq!(file.keyframes.len(), count);
        for (read, written) in file.keyframes.iter().zip(&keyframes) {
            assert!(read.pose().approx_eq(written.pose(), 1e-5, 1e-5));
        }
    }
}

#[test]
fn test_missing_file() {
    let path = std::env::temp_dir().join("camrail_definitely_missing.kf");
    assert!(matches!(read_keyframe_file(&path), Err(camrail_core::Error::Io(_))));
}
