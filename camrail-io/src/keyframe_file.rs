//! Keyframe file (`.kf`) format support
//!
//! ```text
//! # comment
//! frame_rate 30
//! interpolation_speed 1
//! keyframes 2
//! 0 0 5 0 0 0 1
//! 1 0 5 0 0.38268343 0 0.9238795
//! ```
//!
//! Every keyframe line holds the position followed by the orientation
//! quaternion in `x y z w` order. Reading is all-or-nothing: any malformed
//! line fails the whole read.

use crate::error::IoError;
use camrail_core::{Keyframe, Point3f, Result, Rotation3f};
use log::debug;
use nalgebra::{Quaternion, UnitQuaternion};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// File extension used for keyframe files
pub const KEYFRAME_FILE_EXTENSION: &str = "kf";

const FRAME_RATE_KEY: &str = "frame_rate";
const SPEED_KEY: &str = "interpolation_speed";
const KEYFRAMES_KEY: &str = "keyframes";
const KEYFRAME_FIELDS: usize = 7;

/// Contents of a keyframe file
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeFile {
    pub frame_rate: u32,
    pub interpolation_speed: f32,
    pub keyframes: Vec<Keyframe>,
}

/// Keyframe file reader
pub struct KeyframeReader;

impl KeyframeReader {
    /// Parse a complete keyframe file from a buffered reader
    pub fn read<R: BufRead>(reader: R) -> Result<KeyframeFile> {
        Ok(Self::parse(reader)?)
    }

    fn parse<R: BufRead>(reader: R) -> std::result::Result<KeyframeFile, IoError> {
        let mut frame_rate = None;
        let mut speed = None;
        let mut expected = None;
        let mut keyframes = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some(count) = expected else {
                let (key, value) = split_header(trimmed, line_no)?;
                match key {
                    FRAME_RATE_KEY => {
                        let fps: u32 = parse_value(value, line_no, FRAME_RATE_KEY)?;
                        if fps == 0 {
                            return Err(IoError::parse(line_no, "frame rate must be positive"));
                        }
                        frame_rate = Some(fps);
                    }
                    SPEED_KEY => {
                        let s: f32 = parse_value(value, line_no, SPEED_KEY)?;
                        if !(s.is_finite() && s > 0.0) {
                            return Err(IoError::parse(line_no, "interpolation speed must be positive"));
                        }
                        speed = Some(s);
                    }
                    KEYFRAMES_KEY => {
                        let n: usize = parse_value(value, line_no, KEYFRAMES_KEY)?;
                        if frame_rate.is_none() {
                            return Err(IoError::MissingHeader { field: FRAME_RATE_KEY });
                        }
                        if speed.is_none() {
                            return Err(IoError::MissingHeader { field: SPEED_KEY });
                        }
                        expected = Some(n);
                    }
                    other => {
                        return Err(IoError::parse(line_no, format!("unknown header field `{}`", other)));
                    }
                }
                continue;
            };

            if keyframes.len() == count {
                return Err(IoError::CountMismatch {
                    expected: count,
                    found: count + 1,
                });
            }
            keyframes.push(parse_keyframe(trimmed, line_no)?);
        }

        let (Some(frame_rate), Some(interpolation_speed)) = (frame_rate, speed) else {
            let field = if frame_rate.is_none() { FRAME_RATE_KEY } else { SPEED_KEY };
            return Err(IoError::MissingHeader { field });
        };
        let Some(count) = expected else {
            return Err(IoError::MissingHeader { field: KEYFRAMES_KEY });
        };
        if keyframes.len() != count {
            return Err(IoError::CountMismatch {
                expected: count,
                found: keyframes.len(),
            });
        }

        debug!("parsed keyframe file: {} keyframes", keyframes.len());
        Ok(KeyframeFile {
            frame_rate,
            interpolation_speed,
            keyframes,
        })
    }
}

/// Keyframe file writer
pub struct KeyframeWriter;

impl KeyframeWriter {
    /// Write the timing header and every keyframe in index order
    pub fn write<W: Write>(
        mut writer: W,
        frame_rate: u32,
        interpolation_speed: f32,
        keyframes: &[Keyframe],
    ) -> Result<()> {
        writeln!(writer, "{} {}", FRAME_RATE_KEY, frame_rate)?;
        writeln!(writer, "{} {}", SPEED_KEY, interpolation_speed)?;
        writeln!(writer, "{} {}", KEYFRAMES_KEY, keyframes.len())?;

        for keyframe in keyframes {
            let p = keyframe.position();
            let q = keyframe.orientation();
            writeln!(
                writer,
                "{} {} {} {} {} {} {}",
                p.x, p.y, p.z, q.i, q.j, q.k, q.w
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Read a keyframe file from disk
pub fn read_keyframe_file<P: AsRef<Path>>(path: P) -> Result<KeyframeFile> {
    let file = File::open(path.as_ref())?;
    KeyframeReader::read(BufReader::new(file))
}

/// Write a keyframe file to disk
pub fn write_keyframe_file<P: AsRef<Path>>(
    path: P,
    frame_rate: u32,
    interpolation_speed: f32,
    keyframes: &[Keyframe],
) -> Result<()> {
    let file = File::create(path.as_ref())?;
    KeyframeWriter::write(BufWriter::new(file), frame_rate, interpolation_speed, keyframes)
}

fn split_header(line: &str, line_no: usize) -> std::result::Result<(&str, &str), IoError> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) => Ok((key, value)),
        _ => Err(IoError::parse(line_no, "expected `<field> <value>`")),
    }
}

fn parse_value<T: std::str::FromStr>(
    value: &str,
    line_no: usize,
    field: &str,
) -> std::result::Result<T, IoError> {
    value
        .parse()
        .map_err(|_| IoError::parse(line_no, format!("invalid value `{}` for {}", value, field)))
}

fn parse_keyframe(line: &str, line_no: usize) -> std::result::Result<Keyframe, IoError> {
    let values = line
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| IoError::parse(line_no, format!("invalid number `{}`", token)))
        })
        .collect::<std::result::Result<Vec<f32>, IoError>>()?;

    if values.len() != KEYFRAME_FIELDS {
        return Err(IoError::parse(
            line_no,
            format!("expected {} values, found {}", KEYFRAME_FIELDS, values.len()),
        ));
    }

    let position = Point3f::new(values[0], values[1], values[2]);
    let quaternion = Quaternion::new(values[6], values[3], values[4], values[5]);
    let orientation: Rotation3f = UnitQuaternion::try_new(quaternion, 1.0e-6)
        .ok_or_else(|| IoError::parse(line_no, "zero-length orientation quaternion"))?;

    Ok(Keyframe::from_parts(position, orientation))
}
