//! Frame output for recording

use camrail_core::{Error, Result};
use image::RgbaImage;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Output parameters of a recording
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSettings {
    pub output: PathBuf,
    pub frame_rate: u32,
    /// Bit rate in kbit/s, used by video encoders
    pub bit_rate: u32,
    pub show_progress: bool,
}

/// Sink for the frames of a recording
pub trait FrameEncoder {
    fn open(&mut self, settings: &RecordSettings) -> Result<()>;

    /// Encode the frame at `index`; frames arrive in index order
    fn push_frame(&mut self, index: usize, frame: &RgbaImage) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

/// Writes every frame as a numbered PNG next to the requested output:
/// `out/walk.png` becomes `out/walk_00000.png`, `out/walk_00001.png`, ...
#[derive(Debug, Default)]
pub struct ImageSequenceEncoder {
    target: Option<(PathBuf, String)>,
    frames_written: usize,
}

impl ImageSequenceEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// File name of the frame at `index` for an output path
    pub fn frame_path(output: &Path, index: usize) -> Option<PathBuf> {
        let stem = output.file_stem()?.to_str()?;
        let dir = output.parent().unwrap_or_else(|| Path::new(""));
        Some(dir.join(format!("{}_{:05}.png", stem, index)))
    }
}

impl FrameEncoder for ImageSequenceEncoder {
    fn open(&mut self, settings: &RecordSettings) -> Result<()> {
        let stem = settings
            .output
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidParameter(format!("invalid output path {}", settings.output.display())))?;
        let dir = settings.output.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(&dir)?;
        }
        debug!("writing frames to {}/{}_*.png", dir.display(), stem);
        self.target = Some((dir, stem.to_string()));
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, index: usize, frame: &RgbaImage) -> Result<()> {
        let (dir, stem) = self
            .target
            .as_ref()
            .ok_or_else(|| Error::InvalidState("encoder is not open".to_string()))?;
        let path = dir.join(format!("{}_{:05}.png", stem, index));
        frame
            .save(&path)
            .map_err(|e| Error::Encoding(format!("{}: {}", path.display(), e)))?;
        self.frames_written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.target.take().is_some() {
            info!("{} frames written", self.frames_written);
        }
        Ok(())
    }
}

/// Default output file name derived from the current model name.
///
/// Without a model the name falls back to `./keyframes.kf` for keyframe files
/// and `./video.<ext>` for everything else.
pub fn suggested_output_path(model_name: Option<&str>, extension: &str) -> PathBuf {
    match model_name.filter(|name| !name.is_empty()) {
        Some(name) => Path::new(name).with_extension(extension),
        None => {
            let stem = if extension == camrail_io::KEYFRAME_FILE_EXTENSION {
                "keyframes"
            } else {
                "video"
            };
            Path::new(".").join(format!("{}.{}", stem, extension))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_suggested_output_path() {
        assert_eq!(
            suggested_output_path(Some("/data/building.ply"), "kf"),
            PathBuf::from("/data/building.kf")
        );
        assert_eq!(suggested_output_path(Some("scan.obj"), "mp4"), PathBuf::from("scan.mp4"));
        assert_eq!(suggested_output_path(None, "kf"), PathBuf::from("./keyframes.kf"));
        assert_eq!(suggested_output_path(Some(""), "png"), PathBuf::from("./video.png"));
    }

    #[test]
    fn test_frame_path() {
        assert_eq!(
            ImageSequenceEncoder::frame_path(Path::new("out/walk.png"), 12),
            Some(PathBuf::from("out/walk_00012.png"))
        );
    }

    #[test]
    fn test_push_before_open_fails() {
        let mut encoder = ImageSequenceEncoder::new();
        let frame = RgbaImage::new(2, 2);
        assert!(matches!(encoder.push_frame(0, &frame), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_writes_numbered_pngs() {
        let dir = std::env::temp_dir().join("camrail_encoder_test");
        let settings = RecordSettings {
            output: dir.join("clip.png"),
            frame_rate: 30,
            bit_rate: 8000,
            show_progress: false,
        };
        let mut encoder = ImageSequenceEncoder::new();
        encoder.open(&settings).unwrap();
        for index in 0..3 {
            let frame = RgbaImage::from_pixel(4, 4, Rgba([index as u8 * 40, 0, 0, 255]));
            encoder.push_frame(index, &frame).unwrap();
        }
        encoder.close().unwrap();

        assert_eq!(encoder.frames_written(), 3);
        for index in 0..3 {
            let path = ImageSequenceEncoder::frame_path(&settings.output, index).unwrap();
            let frame = image::open(&path).unwrap().to_rgba8();
            assert_eq!(frame.get_pixel(0, 0)[0], index as u8 * 40);
        }
        let _ = fs::remove_dir_all(&dir);
    }
}
